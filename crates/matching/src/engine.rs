use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use agora_core::{Order, Product, Side, Trade, UserId, Volume};
use agora_ports::{
    Notifier, OrderRepository, RepositoryError, RepositoryResult, TradeNotification,
};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Result of matching one incoming order against the book.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Trades committed by this match, in execution order.
    pub trades: Vec<Trade>,
    /// Taker volume left unmatched; rests in the book for future orders.
    pub remaining: Volume,
}

impl MatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// A halted match. Trades already committed stand; the taker keeps its
/// unmatched remainder and may be re-matched later.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A repository failure stopped matching at the current candidate.
    /// Never collapsed into "no match": the committed prefix is carried.
    #[error("matching incomplete after {} trade(s): {source}", .trades.len())]
    Partial {
        trades: Vec<Trade>,
        remaining: Volume,
        #[source]
        source: RepositoryError,
    },

    /// Volume accounting would have been corrupted; the offending pairing
    /// was aborted before anything was committed for it.
    #[error("matching invariant violated: {detail}")]
    Invariant {
        trades: Vec<Trade>,
        remaining: Volume,
        detail: String,
    },
}

impl MatchError {
    pub fn committed_trades(&self) -> &[Trade] {
        match self {
            MatchError::Partial { trades, .. } => trades,
            MatchError::Invariant { trades, .. } => trades,
        }
    }

    pub fn remaining(&self) -> Volume {
        match self {
            MatchError::Partial { remaining, .. } => *remaining,
            MatchError::Invariant { remaining, .. } => *remaining,
        }
    }

    /// Split into the committed outcome and a human-readable reason.
    pub fn into_outcome(self) -> (MatchOutcome, String) {
        match self {
            MatchError::Partial {
                trades,
                remaining,
                source,
            } => (MatchOutcome { trades, remaining }, source.to_string()),
            MatchError::Invariant {
                trades,
                remaining,
                detail,
            } => (MatchOutcome { trades, remaining }, detail),
        }
    }
}

enum StepOutcome {
    Filled(Trade),
    Skipped,
}

enum StepFailure {
    Repository(RepositoryError),
    Invariant(String),
}

/// Continuous, single-pass, greedy price-time priority matcher.
///
/// One instance serves one product processor; all repository access goes
/// through bounded-timeout calls so a match attempt can never block
/// indefinitely.
pub struct MatchingEngine<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    call_timeout: Duration,
}

impl<R, N> MatchingEngine<R, N>
where
    R: OrderRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, call_timeout: Duration) -> Self {
        MatchingEngine {
            repository,
            notifier,
            call_timeout,
        }
    }

    /// Match `taker` against resting orders for `product`.
    ///
    /// Returns the committed trades and the unmatched remainder. On a
    /// repository failure the committed prefix is returned inside
    /// [`MatchError::Partial`]; trades are final once recorded.
    pub async fn match_order(
        &self,
        taker: &Order,
        product: &Product,
    ) -> Result<MatchOutcome, MatchError> {
        let mut remaining = taker.remaining();
        let mut taker_filled = taker.filled;
        let mut trades = Vec::new();

        if remaining.is_zero() {
            return Ok(MatchOutcome { trades, remaining });
        }

        let candidates = match self
            .bounded(self.repository.find_resting_orders(
                taker.product_id,
                taker.side,
                taker.price,
                taker.owner_id,
            ))
            .await
        {
            Ok(candidates) => candidates,
            Err(source) => {
                error!(order_id = %taker.id, error = %source, "candidate query failed");
                return Err(MatchError::Partial {
                    trades,
                    remaining,
                    source,
                });
            }
        };

        debug!(
            order_id = %taker.id,
            side = %taker.side,
            candidates = candidates.len(),
            "fetched crossing candidates"
        );

        for candidate in candidates {
            if remaining.is_zero() {
                break;
            }

            match self
                .fill_candidate(taker, &mut taker_filled, remaining, candidate, product)
                .await
            {
                Ok(StepOutcome::Filled(trade)) => {
                    remaining = remaining.saturating_sub(trade.volume);
                    trades.push(trade);
                }
                Ok(StepOutcome::Skipped) => {}
                Err(StepFailure::Repository(source)) => {
                    error!(
                        order_id = %taker.id,
                        error = %source,
                        committed = trades.len(),
                        "matching halted by repository failure"
                    );
                    return Err(MatchError::Partial {
                        trades,
                        remaining,
                        source,
                    });
                }
                Err(StepFailure::Invariant(detail)) => {
                    error!(order_id = %taker.id, detail = %detail, "matching invariant violated");
                    return Err(MatchError::Invariant {
                        trades,
                        remaining,
                        detail,
                    });
                }
            }
        }

        Ok(MatchOutcome { trades, remaining })
    }

    /// Execute one taker/candidate pairing.
    ///
    /// The candidate's fill commits first: it is the only write another
    /// writer can contend on, so the optimistic retry window closes before
    /// anything else is persisted. The taker fill and the trade record are
    /// conflict-free under per-product serialization.
    async fn fill_candidate(
        &self,
        taker: &Order,
        taker_filled: &mut Volume,
        remaining: Volume,
        candidate: Order,
        product: &Product,
    ) -> Result<StepOutcome, StepFailure> {
        let available = candidate.remaining();
        if !available.is_positive() {
            // The query filters these out; treat a stale row defensively.
            debug!(candidate = %candidate.id, "candidate has no remaining volume, skipping");
            return Ok(StepOutcome::Skipped);
        }

        let trade_volume = remaining.min(available);
        if !trade_volume.is_positive() {
            return Err(StepFailure::Invariant(format!(
                "non-positive trade volume {} for candidate {}",
                trade_volume, candidate.id
            )));
        }

        // Execution price is always the maker's price.
        let price = candidate.price;

        let (maker, trade_volume) = match self
            .bounded(
                self.repository
                    .apply_fill(candidate.id, trade_volume, candidate.filled),
            )
            .await
        {
            Ok(updated) => (updated, trade_volume),
            Err(RepositoryError::ConcurrentModification(_)) => {
                match self.retry_candidate_fill(&candidate, remaining).await? {
                    Some(retried) => retried,
                    None => return Ok(StepOutcome::Skipped),
                }
            }
            Err(source) => return Err(StepFailure::Repository(source)),
        };

        // The taker is owned by this processor; a conflict here means an
        // out-of-band writer touched it and the match must abort.
        let updated_taker = self
            .bounded(
                self.repository
                    .apply_fill(taker.id, trade_volume, *taker_filled),
            )
            .await
            .map_err(StepFailure::Repository)?;
        *taker_filled = updated_taker.filled;

        let (buyer_id, seller_id) = resolve_parties(taker, &maker);
        let trade = self
            .bounded(self.repository.record_trade(
                taker.product_id,
                price,
                trade_volume,
                buyer_id,
                seller_id,
            ))
            .await
            .map_err(StepFailure::Repository)?;

        debug!(
            trade_id = %trade.id,
            price = %trade.price,
            volume = %trade.volume,
            "trade executed"
        );

        self.notify_detached(&trade, product);

        Ok(StepOutcome::Filled(trade))
    }

    /// One re-fetch and retry after an optimistic conflict on the
    /// candidate. `None` means the candidate was consumed by a concurrent
    /// writer and should be skipped.
    async fn retry_candidate_fill(
        &self,
        candidate: &Order,
        remaining: Volume,
    ) -> Result<Option<(Order, Volume)>, StepFailure> {
        let current = self
            .bounded(self.repository.get(candidate.id))
            .await
            .map_err(StepFailure::Repository)?;

        let Some(current) = current else {
            debug!(candidate = %candidate.id, "candidate vanished during retry, skipping");
            return Ok(None);
        };

        if !current.status.is_active() || !current.remaining().is_positive() {
            debug!(candidate = %candidate.id, "candidate consumed by concurrent writer, skipping");
            return Ok(None);
        }

        let trade_volume = remaining.min(current.remaining());
        match self
            .bounded(
                self.repository
                    .apply_fill(current.id, trade_volume, current.filled),
            )
            .await
        {
            Ok(updated) => Ok(Some((updated, trade_volume))),
            Err(RepositoryError::ConcurrentModification(_)) => {
                debug!(candidate = %candidate.id, "second conflict on candidate, skipping");
                Ok(None)
            }
            Err(source) => Err(StepFailure::Repository(source)),
        }
    }

    /// Best-effort notification on a detached task; delivery failure never
    /// reaches the match path.
    fn notify_detached(&self, trade: &Trade, product: &Product) {
        let notification = TradeNotification::new(trade.clone(), product.name.clone());
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(notification).await {
                warn!(error = %e, "trade notification failed");
            }
        });
    }

    async fn bounded<T, F>(&self, call: F) -> RepositoryResult<T>
    where
        F: Future<Output = RepositoryResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RepositoryError::Timeout {
                elapsed: self.call_timeout,
            }),
        }
    }
}

/// Buyer and seller of a trade, resolved by the taker's side.
fn resolve_parties(taker: &Order, maker: &Order) -> (UserId, UserId) {
    match taker.side {
        Side::Buy => (taker.owner_id, maker.owner_id),
        Side::Sell => (maker.owner_id, taker.owner_id),
    }
}
