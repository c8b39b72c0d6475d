use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Volume(Decimal);

impl Volume {
    pub const ZERO: Volume = Volume(Decimal::ZERO);

    /// Create a validated volume. Order volumes must be strictly positive.
    pub fn new(value: Decimal) -> Result<Self, &'static str> {
        if value <= Decimal::ZERO {
            return Err("Volume must be positive");
        }
        Ok(Volume(value))
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Saturating subtraction (floors at zero)
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs.0 >= self.0 {
            Volume::ZERO
        } else {
            Volume(self.0 - rhs.0)
        }
    }

    pub fn min(self, other: Self) -> Self {
        Volume(self.0.min(other.0))
    }
}

impl From<Decimal> for Volume {
    fn from(value: Decimal) -> Self {
        Volume(value)
    }
}

impl From<Volume> for Decimal {
    fn from(volume: Volume) -> Decimal {
        volume.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Volume {
    type Output = Volume;
    fn add(self, rhs: Self) -> Self::Output {
        Volume(self.0 + rhs.0)
    }
}

impl Sub for Volume {
    type Output = Volume;
    fn sub(self, rhs: Self) -> Self::Output {
        Volume(self.0 - rhs.0)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_positive_volumes() {
        assert!(Volume::new(dec!(0)).is_err());
        assert!(Volume::new(dec!(-1)).is_err());
        assert!(Volume::new(dec!(0.5)).is_ok());
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let a = Volume::from(dec!(10));
        let b = Volume::from(dec!(20));
        assert_eq!(a.saturating_sub(b), Volume::ZERO);
        assert_eq!(b.saturating_sub(a), Volume::from(dec!(10)));
    }

    #[test]
    fn min_picks_smaller() {
        let a = Volume::from(dec!(30));
        let b = Volume::from(dec!(20));
        assert_eq!(a.min(b), b);
    }
}
