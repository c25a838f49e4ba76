//! Tier to module-type map.
//!
//! Each tier introduces a set of module types and inherits every type of the
//! tiers below it. A required set is granted at every tier.

use std::collections::BTreeSet;

use backoffice_shared::EntitlementConfig;

use crate::entitlement::error::EntitlementError;
use crate::tier::PlanTier;

/// Module types granted regardless of tier.
pub const REQUIRED_MODULE_TYPES: [&str; 2] = ["dashboard", "onboarding"];

/// Ordered tier to module-type sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierModuleMap {
    required: BTreeSet<String>,
    tiers: Vec<(PlanTier, BTreeSet<String>)>,
}

impl Default for TierModuleMap {
    fn default() -> Self {
        let set = |types: &[&str]| types.iter().map(ToString::to_string).collect();
        Self {
            required: set(&REQUIRED_MODULE_TYPES),
            tiers: vec![
                (PlanTier::Free, BTreeSet::new()),
                (PlanTier::Seed, set(&["support", "notifications"])),
                (PlanTier::Grow, set(&["payments", "reports"])),
                (PlanTier::Pro, set(&["lab", "production"])),
                (PlanTier::Enterprise, set(&["pharmacy", "audit_log"])),
            ],
        }
    }
}

impl TierModuleMap {
    /// Builds a map from a required set and per-tier additions.
    ///
    /// Tiers must be given in strictly ascending order. Tiers left out simply
    /// add nothing of their own.
    ///
    /// # Errors
    ///
    /// Returns an error if tiers repeat or descend, or a module type is blank.
    pub fn new<R, T, M>(required: R, tiers: T) -> Result<Self, EntitlementError>
    where
        R: IntoIterator<Item = String>,
        T: IntoIterator<Item = (PlanTier, M)>,
        M: IntoIterator<Item = String>,
    {
        let required = normalize(required, "required modules")?;

        let mut ordered: Vec<(PlanTier, BTreeSet<String>)> = Vec::new();
        for (tier, modules) in tiers {
            if let Some((previous, _)) = ordered.last() {
                if *previous >= tier {
                    return Err(EntitlementError::TierOutOfOrder {
                        tier,
                        previous: *previous,
                    });
                }
            }
            ordered.push((tier, normalize(modules, tier.as_str())?));
        }

        Ok(Self {
            required,
            tiers: ordered,
        })
    }

    /// Builds the map from configuration, falling back to the built-in default.
    ///
    /// # Errors
    ///
    /// Returns an error if a tier name is unknown or the tiers are misordered.
    pub fn from_config(config: &EntitlementConfig) -> Result<Self, EntitlementError> {
        if config.is_empty() {
            return Ok(Self::default());
        }

        let required = if config.required_modules.is_empty() {
            REQUIRED_MODULE_TYPES.iter().map(ToString::to_string).collect()
        } else {
            config.required_modules.clone()
        };

        let tiers = config
            .tiers
            .iter()
            .map(|entry| Ok((entry.tier.parse::<PlanTier>()?, entry.modules.clone())))
            .collect::<Result<Vec<_>, EntitlementError>>()?;

        Self::new(required, tiers)
    }

    /// Module types granted at every tier.
    #[must_use]
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// Union of required types and every tier's types up to and including `tier`.
    #[must_use]
    pub fn module_types_for(&self, tier: PlanTier) -> BTreeSet<String> {
        let mut types = self.required.clone();
        for (level, modules) in &self.tiers {
            if *level > tier {
                break;
            }
            types.extend(modules.iter().cloned());
        }
        types
    }

    /// Every module type known to the map.
    #[must_use]
    pub fn all_module_types(&self) -> BTreeSet<String> {
        let mut types = self.required.clone();
        for (_, modules) in &self.tiers {
            types.extend(modules.iter().cloned());
        }
        types
    }
}

fn normalize<I>(types: I, context: &str) -> Result<BTreeSet<String>, EntitlementError>
where
    I: IntoIterator<Item = String>,
{
    types
        .into_iter()
        .map(|raw| {
            let trimmed = raw.trim().to_lowercase();
            if trimmed.is_empty() {
                Err(EntitlementError::EmptyModuleType(context.to_string()))
            } else {
                Ok(trimmed)
            }
        })
        .collect()
}
