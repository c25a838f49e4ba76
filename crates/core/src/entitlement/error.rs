//! Entitlement error types.

use thiserror::Error;

use crate::tier::{PlanTier, TierError};

/// Errors raised while building the tier to module-type map.
#[derive(Debug, Error)]
pub enum EntitlementError {
    /// A tier key could not be parsed.
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Tiers must be listed in strictly ascending order.
    #[error("Tier {tier} is listed after {previous}; tiers must ascend without repeats")]
    TierOutOfOrder {
        /// The offending tier.
        tier: PlanTier,
        /// The tier listed before it.
        previous: PlanTier,
    },

    /// Module types must be non-empty.
    #[error("Empty module type configured for {0}")]
    EmptyModuleType(String),
}
