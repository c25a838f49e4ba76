//! Module entitlement for plan tiers.
//!
//! This module maps tiers to the module types they include and computes
//! which grants an organization is missing for a given tier.
//!
//! # Modules
//!
//! - `tier_map` - Stacked tier to module-type sets
//! - `resolver` - Grant delta computation
//! - `error` - Entitlement configuration errors

pub mod error;
pub mod resolver;
pub mod tier_map;

#[cfg(test)]
mod resolver_props;

pub use error::EntitlementError;
pub use resolver::{CatalogModule, GrantPlan, GrantResolver};
pub use tier_map::{REQUIRED_MODULE_TYPES, TierModuleMap};
