use agora_core::Timestamp;
use agora_ports::Clock;
use chrono::Utc;
use parking_lot::RwLock;

/// Wall-clock time source for production use.
#[derive(Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        SystemClock
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

/// Manually advanced clock for deterministic tests.
pub struct ManualClock {
    now: RwLock<Timestamp>,
}

impl ManualClock {
    /// Start at the current wall-clock time, then advance only on demand.
    pub fn new() -> Self {
        Self::fixed(Utc::now())
    }

    pub fn fixed(at: Timestamp) -> Self {
        ManualClock {
            now: RwLock::new(at),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.write();
        *now += duration;
    }

    pub fn set(&self, at: Timestamp) {
        *self.now.write() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_demand() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now() - start, chrono::Duration::seconds(30));
    }
}
