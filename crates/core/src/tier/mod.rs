//! Plan tiers.
//!
//! Tiers carry an explicit integer rank so that comparisons never depend on
//! string literals. `enterprise` ranks above every other tier.

pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod props;

pub use error::TierError;
pub use types::{PlanTier, TierChange, validate_catalog_tiers};
