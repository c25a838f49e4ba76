//! Tier error types.

use thiserror::Error;

use crate::tier::types::PlanTier;

/// Errors raised while parsing or validating tiers.
#[derive(Debug, Error)]
pub enum TierError {
    /// Value does not name a known tier.
    #[error("Unknown plan tier: {0}")]
    UnknownTier(String),

    /// Tier ranks are not strictly ascending.
    #[error("Tier {higher} does not rank above {lower}")]
    RankCollision {
        /// The tier expected to rank lower.
        lower: PlanTier,
        /// The tier expected to rank higher.
        higher: PlanTier,
    },
}
