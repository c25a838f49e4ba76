//! Property-based tests for tier ordering.

use proptest::prelude::*;

use crate::tier::types::{PlanTier, TierChange};

/// Strategy for generating random tiers.
pub(crate) fn arb_tier() -> impl Strategy<Value = PlanTier> {
    prop_oneof![
        Just(PlanTier::Free),
        Just(PlanTier::Seed),
        Just(PlanTier::Grow),
        Just(PlanTier::Pro),
        Just(PlanTier::Enterprise),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Order agrees with rank.
    #[test]
    fn prop_order_matches_rank(a in arb_tier(), b in arb_tier()) {
        prop_assert_eq!(a.cmp(&b), a.rank().cmp(&b.rank()));
    }

    /// Reversing a transition swaps upgrade and downgrade.
    #[test]
    fn prop_classify_is_antisymmetric(a in arb_tier(), b in arb_tier()) {
        let forward = TierChange::classify(Some(a), b);
        let backward = TierChange::classify(Some(b), a);
        let expected = match forward {
            TierChange::Upgrade => TierChange::Downgrade,
            TierChange::Downgrade => TierChange::Upgrade,
            TierChange::Same => TierChange::Same,
        };
        prop_assert_eq!(backward, expected);
    }

    /// Parsing the display form returns the same tier.
    #[test]
    fn prop_parse_display(tier in arb_tier()) {
        prop_assert_eq!(PlanTier::parse(&tier.to_string()), Some(tier));
    }
}
