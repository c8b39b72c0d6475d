//! Agora Matching
//!
//! The order matching engine: given a newly submitted order, finds
//! compatible resting orders through the repository port, fills them in
//! price-time priority, records trades, and emits notifications.
//!
//! Matching rules:
//! 1. Best price first (lowest ask for a buyer, highest bid for a seller)
//! 2. Time priority among equal prices (first in, first out)
//! 3. Trades execute at the resting (maker) order's price
//!
//! The engine is written to run inside a per-product serialized processor;
//! the optimistic-concurrency retry on fills is a defensive fallback for
//! writes that originate outside that processor (e.g. cancels).

mod engine;

pub use engine::{MatchError, MatchOutcome, MatchingEngine};
