//! Grant delta computation.
//!
//! The resolver is pure: given the catalog and the modules an organization
//! already holds, it returns the modules to grant for a target tier. It never
//! proposes revoking a grant.

use std::collections::{BTreeSet, HashSet};

use backoffice_shared::types::ModuleId;
use serde::Serialize;

use crate::entitlement::tier_map::TierModuleMap;
use crate::tier::PlanTier;

/// A module row from the catalog, as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogModule {
    /// Module ID.
    pub id: ModuleId,
    /// Module type key, such as `dashboard`.
    pub module_type: String,
    /// Inactive catalog modules are never granted.
    pub is_active: bool,
}

/// Result of resolving a tier against an organization's grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantPlan {
    /// Modules that must be granted, ordered by type then ID.
    pub to_add: Vec<CatalogModule>,
    /// Entitled modules the organization already holds.
    pub already_granted: Vec<ModuleId>,
    /// Entitled module types with no active catalog row.
    pub unmatched_types: Vec<String>,
}

impl GrantPlan {
    /// Returns true if nothing needs to be granted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty()
    }

    /// IDs of the modules to grant.
    #[must_use]
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.to_add.iter().map(|module| module.id).collect()
    }

    /// Records the planned grants into an in-memory grant set.
    pub fn apply_to(&self, granted: &mut HashSet<ModuleId>) {
        granted.extend(self.to_add.iter().map(|module| module.id));
    }
}

/// Computes grant deltas from a tier map.
#[derive(Debug, Clone, Copy)]
pub struct GrantResolver<'a> {
    map: &'a TierModuleMap,
}

impl<'a> GrantResolver<'a> {
    /// Creates a resolver over the given tier map.
    #[must_use]
    pub const fn new(map: &'a TierModuleMap) -> Self {
        Self { map }
    }

    /// Module types an organization on `tier` is entitled to.
    #[must_use]
    pub fn entitled_types(&self, tier: PlanTier) -> BTreeSet<String> {
        self.map.module_types_for(tier)
    }

    /// Resolves the modules to grant for `tier`.
    ///
    /// Every active catalog module whose type is entitled at `tier` and which
    /// is not in `granted` is returned in `to_add`.
    #[must_use]
    pub fn resolve(
        &self,
        tier: PlanTier,
        catalog: &[CatalogModule],
        granted: &HashSet<ModuleId>,
    ) -> GrantPlan {
        let entitled = self.entitled_types(tier);

        let mut plan = GrantPlan::default();
        let mut matched: BTreeSet<&str> = BTreeSet::new();

        for module in catalog {
            if !module.is_active || !entitled.contains(&module.module_type) {
                continue;
            }
            matched.insert(module.module_type.as_str());
            if granted.contains(&module.id) {
                plan.already_granted.push(module.id);
            } else if !plan.to_add.iter().any(|m| m.id == module.id) {
                plan.to_add.push(module.clone());
            }
        }

        plan.to_add
            .sort_by(|a, b| a.module_type.cmp(&b.module_type).then(a.id.cmp(&b.id)));
        plan.already_granted.sort();
        plan.already_granted.dedup();
        plan.unmatched_types = entitled
            .into_iter()
            .filter(|module_type| !matched.contains(module_type.as_str()))
            .collect();

        plan
    }
}
