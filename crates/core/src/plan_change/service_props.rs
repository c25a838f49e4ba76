//! Property-based tests for `PlanChangeService`.

use backoffice_shared::types::{OrganizationId, PlanId, UserId};
use proptest::prelude::*;
use uuid::Uuid;

use crate::plan_change::error::PlanChangeError;
use crate::plan_change::service::PlanChangeService;
use crate::plan_change::types::{
    HistoryKind, OrganizationSnapshot, OrganizationStatus, PlanChangeAction, PlanRef,
};
use crate::tier::props::arb_tier;
use crate::tier::{PlanTier, TierChange};

/// Fixed catalog with one plan per tier.
fn catalog() -> Vec<PlanRef> {
    PlanTier::ALL
        .iter()
        .enumerate()
        .map(|(idx, tier)| PlanRef {
            id: PlanId::from_uuid(Uuid::from_u128(idx as u128 + 1)),
            name: tier.to_string(),
            tier: *tier,
            is_active: true,
        })
        .collect()
}

fn plan_for(tier: PlanTier) -> PlanRef {
    catalog()
        .into_iter()
        .find(|plan| plan.tier == tier)
        .unwrap_or_else(|| unreachable!("catalog covers every tier"))
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|raw| UserId::from_uuid(Uuid::from_u128(raw)))
}

/// Workflow operation applied to an organization.
#[derive(Debug, Clone)]
enum Op {
    Request(PlanTier),
    Approve,
    ApproveOther(PlanTier),
    Reject,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_tier().prop_map(Op::Request),
        Just(Op::Approve),
        arb_tier().prop_map(Op::ApproveOther),
        Just(Op::Reject),
    ]
}

fn active_org(tier: PlanTier) -> OrganizationSnapshot {
    let plan = plan_for(tier);
    OrganizationSnapshot {
        id: OrganizationId::from_uuid(Uuid::from_u128(99)),
        status: OrganizationStatus::Active,
        plan_id: Some(plan.id),
        plan_tier: Some(plan.tier),
        requested_plan_id: None,
        plan_requested_at: None,
    }
}

fn run(org: &OrganizationSnapshot, op: &Op, user: UserId) -> Result<PlanChangeAction, PlanChangeError> {
    let current = org.plan_tier.map(plan_for);
    match op {
        Op::Request(tier) => PlanChangeService::request(org, &plan_for(*tier), user),
        Op::Approve => {
            let requested = catalog()
                .into_iter()
                .find(|plan| Some(plan.id) == org.requested_plan_id);
            match requested {
                Some(target) => PlanChangeService::approve(org, current.as_ref(), &target, user),
                None => PlanChangeService::approve(org, current.as_ref(), &plan_for(PlanTier::Free), user),
            }
        }
        Op::ApproveOther(tier) => {
            PlanChangeService::approve(org, current.as_ref(), &plan_for(*tier), user)
        }
        Op::Reject => PlanChangeService::reject(org, user, None),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The request invariant holds after every accepted transition, and
    /// failed transitions leave the organization untouched.
    #[test]
    fn prop_invariant_holds_after_every_transition(
        start in arb_tier(),
        ops in prop::collection::vec(arb_op(), 1..30),
        user in arb_user(),
    ) {
        let mut org = active_org(start);
        for op in &ops {
            let before = org.clone();
            match run(&org, op, user) {
                Ok(action) => org = PlanChangeService::apply(&org, &action),
                Err(_) => prop_assert_eq!(&org, &before),
            }
            prop_assert!(org.satisfies_request_invariant());
        }
    }

    /// History grows by exactly one entry per approve or reject.
    #[test]
    fn prop_history_is_append_only(
        start in arb_tier(),
        ops in prop::collection::vec(arb_op(), 1..30),
        user in arb_user(),
    ) {
        let mut org = active_org(start);
        let mut history = Vec::new();
        let mut completed = 0usize;

        for op in &ops {
            if let Ok(action) = run(&org, op, user) {
                if let Some(entry) = action.history() {
                    history.push(entry.clone());
                    completed += 1;
                }
                org = PlanChangeService::apply(&org, &action);
            }
        }

        prop_assert_eq!(history.len(), completed);
        for entry in &history {
            prop_assert_eq!(entry.changed_by(), user);
        }
    }

    /// Reject without a pending request fails and changes nothing.
    #[test]
    fn prop_reject_requires_pending(start in arb_tier(), user in arb_user()) {
        let org = active_org(start);
        let result = PlanChangeService::reject(&org, user, None);
        prop_assert!(
            matches!(result, Err(PlanChangeError::NoPendingRequest(id)) if id == org.id),
            "expected NoPendingRequest"
        );
    }

    /// Approve classifies by tier rank.
    #[test]
    fn prop_approve_classification(from in arb_tier(), to in arb_tier(), user in arb_user()) {
        prop_assume!(from != to);
        let org = active_org(from);
        let target = plan_for(to);
        let pending = PlanChangeService::apply(
            &org,
            &PlanChangeService::request(&org, &target, user).unwrap(),
        );
        let current = plan_for(from);

        let action = PlanChangeService::approve(&pending, Some(&current), &target, user).unwrap();
        let expected = TierChange::classify(Some(from), to);
        let kind = action.history().map(|entry| entry.kind());

        prop_assert_eq!(kind, Some(HistoryKind::from(expected)));
        prop_assert!(matches!(
            action,
            PlanChangeAction::Approve { change, .. } if change == expected
        ), "expected Approve action with change {:?}", expected);
    }
}
