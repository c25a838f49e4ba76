//! Plan change state machine.
//!
//! Validates request, approve and reject transitions against an organization
//! snapshot and returns the action to persist. Persisting the action, granting
//! modules and notifying are left to the caller.

use backoffice_shared::types::UserId;
use chrono::Utc;

use crate::plan_change::error::PlanChangeError;
use crate::plan_change::types::{
    OrganizationSnapshot, OrganizationStatus, PlanChangeAction, PlanHistoryEntry, PlanRef,
    PlanRejection, PlanTransition,
};
use crate::tier::TierChange;

/// Stateless service for plan change transitions.
pub struct PlanChangeService;

impl PlanChangeService {
    /// Request a move to `target`.
    ///
    /// Requesting while a request is outstanding replaces it.
    ///
    /// # Errors
    ///
    /// * `RequestNotAllowed` if the organization's registration is not approved
    /// * `InactivePlan` if the target plan is not offered
    /// * `AlreadyOnPlan` if the organization is already on the target plan
    pub fn request(
        org: &OrganizationSnapshot,
        target: &PlanRef,
        requested_by: UserId,
    ) -> Result<PlanChangeAction, PlanChangeError> {
        if !org.status.can_request_plan_change() {
            return Err(PlanChangeError::RequestNotAllowed { status: org.status });
        }
        if !target.is_active {
            return Err(PlanChangeError::InactivePlan(target.id));
        }
        if org.plan_id == Some(target.id) {
            return Err(PlanChangeError::AlreadyOnPlan(target.id));
        }

        Ok(PlanChangeAction::Request {
            new_status: OrganizationStatus::PendingPlanChange,
            requested_plan_id: target.id,
            replaces: org.requested_plan_id.filter(|id| *id != target.id),
            requested_by,
            requested_at: Utc::now(),
        })
    }

    /// Approve the outstanding request, moving the organization onto `target`.
    ///
    /// `current_plan` is the organization's plan before the change, if any.
    ///
    /// # Errors
    ///
    /// * `NoPendingRequest` if nothing is outstanding
    /// * `PlanMismatch` if `target` is not the requested plan
    pub fn approve(
        org: &OrganizationSnapshot,
        current_plan: Option<&PlanRef>,
        target: &PlanRef,
        approved_by: UserId,
    ) -> Result<PlanChangeAction, PlanChangeError> {
        let requested = org
            .requested_plan_id
            .ok_or(PlanChangeError::NoPendingRequest(org.id))?;
        if requested != target.id {
            return Err(PlanChangeError::PlanMismatch {
                requested,
                provided: target.id,
            });
        }

        Ok(Self::move_to(org, current_plan, target, approved_by))
    }

    /// Assign `target` directly, without a request. Any outstanding request
    /// is dropped.
    ///
    /// # Errors
    ///
    /// * `InactivePlan` if the target plan is not offered
    pub fn assign(
        org: &OrganizationSnapshot,
        current_plan: Option<&PlanRef>,
        target: &PlanRef,
        assigned_by: UserId,
    ) -> Result<PlanChangeAction, PlanChangeError> {
        if !target.is_active {
            return Err(PlanChangeError::InactivePlan(target.id));
        }
        Ok(Self::move_to(org, current_plan, target, assigned_by))
    }

    fn move_to(
        org: &OrganizationSnapshot,
        current_plan: Option<&PlanRef>,
        target: &PlanRef,
        changed_by: UserId,
    ) -> PlanChangeAction {
        let previous_tier = current_plan.map(|plan| plan.tier).or(org.plan_tier);
        let change = TierChange::classify(previous_tier, target.tier);
        let history = PlanHistoryEntry::transition(PlanTransition {
            previous_plan_id: current_plan.map(|plan| plan.id).or(org.plan_id),
            previous_tier,
            new_plan_id: target.id,
            new_tier: target.tier,
            changed_by,
            changed_at: Utc::now(),
        });

        PlanChangeAction::Approve {
            new_status: OrganizationStatus::Active,
            plan_id: target.id,
            plan_tier: target.tier,
            change,
            history,
        }
    }

    /// Reject the outstanding request. The current plan is kept.
    ///
    /// # Errors
    ///
    /// * `NoPendingRequest` if nothing is outstanding
    pub fn reject(
        org: &OrganizationSnapshot,
        rejected_by: UserId,
        reason: Option<String>,
    ) -> Result<PlanChangeAction, PlanChangeError> {
        let requested = org
            .requested_plan_id
            .ok_or(PlanChangeError::NoPendingRequest(org.id))?;

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(PlanChangeAction::Reject {
            new_status: OrganizationStatus::Active,
            history: PlanHistoryEntry::Rejected(PlanRejection {
                current_plan_id: org.plan_id,
                current_tier: org.plan_tier,
                requested_plan_id: requested,
                reason,
                changed_by: rejected_by,
                changed_at: Utc::now(),
            }),
        })
    }

    /// Returns the snapshot after applying `action`.
    #[must_use]
    pub fn apply(org: &OrganizationSnapshot, action: &PlanChangeAction) -> OrganizationSnapshot {
        let mut next = org.clone();
        next.status = action.new_status();
        match action {
            PlanChangeAction::Request {
                requested_plan_id,
                requested_at,
                ..
            } => {
                next.requested_plan_id = Some(*requested_plan_id);
                next.plan_requested_at = Some(*requested_at);
            }
            PlanChangeAction::Approve {
                plan_id, plan_tier, ..
            } => {
                next.plan_id = Some(*plan_id);
                next.plan_tier = Some(*plan_tier);
                next.requested_plan_id = None;
                next.plan_requested_at = None;
            }
            PlanChangeAction::Reject { .. } => {
                next.requested_plan_id = None;
                next.plan_requested_at = None;
            }
        }
        next
    }
}
