//! Property-based tests for grant resolution.

use std::collections::HashSet;

use backoffice_shared::types::ModuleId;
use proptest::prelude::*;
use uuid::Uuid;

use crate::entitlement::resolver::{CatalogModule, GrantResolver};
use crate::entitlement::tier_map::TierModuleMap;
use crate::tier::props::arb_tier;

const TYPES: [&str; 11] = [
    "dashboard",
    "onboarding",
    "support",
    "notifications",
    "payments",
    "reports",
    "lab",
    "production",
    "pharmacy",
    "audit_log",
    "unmapped",
];

fn arb_module() -> impl Strategy<Value = CatalogModule> {
    (0..TYPES.len(), any::<u128>(), any::<bool>()).prop_map(|(idx, raw, is_active)| {
        CatalogModule {
            id: ModuleId::from_uuid(Uuid::from_u128(raw)),
            module_type: TYPES[idx].to_string(),
            is_active,
        }
    })
}

fn arb_catalog() -> impl Strategy<Value = Vec<CatalogModule>> {
    prop::collection::vec(arb_module(), 0..25)
}

/// Catalog plus an arbitrary subset of it already granted.
fn arb_catalog_with_grants() -> impl Strategy<Value = (Vec<CatalogModule>, HashSet<ModuleId>)> {
    arb_catalog().prop_flat_map(|catalog| {
        let len = catalog.len();
        (Just(catalog), prop::collection::vec(any::<bool>(), len)).prop_map(|(catalog, picks)| {
            let granted = catalog
                .iter()
                .zip(picks)
                .filter(|(_, pick)| *pick)
                .map(|(module, _)| module.id)
                .collect();
            (catalog, granted)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Applying a plan and resolving again proposes nothing new.
    #[test]
    fn prop_resolve_is_idempotent(
        tier in arb_tier(),
        (catalog, mut granted) in arb_catalog_with_grants(),
    ) {
        let map = TierModuleMap::default();
        let resolver = GrantResolver::new(&map);

        let first = resolver.resolve(tier, &catalog, &granted);
        first.apply_to(&mut granted);
        let after_first = granted.clone();

        let second = resolver.resolve(tier, &catalog, &granted);
        second.apply_to(&mut granted);

        prop_assert!(second.is_noop());
        prop_assert_eq!(granted, after_first);
    }

    /// A lower tier is entitled to a subset of a higher tier's types.
    #[test]
    fn prop_tier_inclusion_is_monotonic(a in arb_tier(), b in arb_tier()) {
        let map = TierModuleMap::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(map.module_types_for(low).is_subset(&map.module_types_for(high)));
    }

    /// Resolving for a higher tier never grants fewer modules.
    #[test]
    fn prop_resolved_grants_are_monotonic(
        a in arb_tier(),
        b in arb_tier(),
        catalog in arb_catalog(),
    ) {
        let map = TierModuleMap::default();
        let resolver = GrantResolver::new(&map);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let none = HashSet::new();

        let low_ids: HashSet<ModuleId> =
            resolver.resolve(low, &catalog, &none).module_ids().into_iter().collect();
        let high_ids: HashSet<ModuleId> =
            resolver.resolve(high, &catalog, &none).module_ids().into_iter().collect();

        prop_assert!(low_ids.is_subset(&high_ids));
    }

    /// Every proposed module is active, entitled and not already granted.
    #[test]
    fn prop_plan_only_adds_entitled_modules(
        tier in arb_tier(),
        (catalog, granted) in arb_catalog_with_grants(),
    ) {
        let map = TierModuleMap::default();
        let resolver = GrantResolver::new(&map);
        let entitled = map.module_types_for(tier);

        let plan = resolver.resolve(tier, &catalog, &granted);
        let mut seen = HashSet::new();
        for module in &plan.to_add {
            prop_assert!(module.is_active);
            prop_assert!(entitled.contains(&module.module_type));
            prop_assert!(!granted.contains(&module.id));
            prop_assert!(seen.insert(module.id));
        }
        prop_assert!(map.module_types_for(tier).iter().all(|t| t != "unmapped"));
    }
}
