//! Plan change repository.
//!
//! Persists the transitions validated by [`PlanChangeService`]. Approve,
//! reject and direct assignment each run in one transaction that locks the
//! organization row first, so concurrent decisions for one organization are
//! serialized and the second one sees the first one's result.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QuerySelect,
    Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use backoffice_core::entitlement::TierModuleMap;
use backoffice_core::plan_change::{
    OrganizationSnapshot, PlanChangeAction, PlanChangeError, PlanChangeService, PlanHistoryEntry,
    PlanRef,
};
use backoffice_core::tier::TierChange;
use backoffice_shared::types::{OrganizationId, PlanId, UserId};

use crate::entities::{modules, organizations, plan_history, plans};
use crate::rls::set_platform_context;

use super::grant::grant_modules_for_tier;

/// Result of an approval or a direct plan assignment.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// Organization after the change.
    pub organization: organizations::Model,
    /// The plan the organization is now on.
    pub plan: plans::Model,
    /// Tier movement.
    pub change: TierChange,
    /// Modules granted by this change.
    pub modules_added: Vec<modules::Model>,
    /// The appended history entry.
    pub history: PlanHistoryEntry,
}

/// Result of a rejection.
#[derive(Debug, Clone)]
pub struct RejectionOutcome {
    /// Organization after the change.
    pub organization: organizations::Model,
    /// The plan that was requested and refused.
    pub requested_plan: Option<plans::Model>,
    /// The appended history entry.
    pub history: PlanHistoryEntry,
}

/// Plan change repository.
#[derive(Debug, Clone)]
pub struct PlanChangeRepository {
    db: DatabaseConnection,
}

impl PlanChangeRepository {
    /// Creates a new plan change repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a request to move `organization_id` onto `plan_id`.
    ///
    /// # Errors
    ///
    /// Returns `OrganizationNotFound`/`PlanNotFound` for unknown ids, or the
    /// workflow error when the request is not allowed.
    pub async fn request(
        &self,
        organization_id: OrganizationId,
        plan_id: PlanId,
        requested_by: UserId,
    ) -> Result<organizations::Model, PlanChangeError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let org = lock_organization(&txn, organization_id).await?;
        let target = load_plan(&txn, plan_id).await?;
        let target_ref = plan_ref(&target)?;

        let action = PlanChangeService::request(&org.snapshot(), &target_ref, requested_by)?;
        if let PlanChangeAction::Request {
            replaces: Some(previous),
            ..
        } = &action
        {
            debug!(
                organization_id = %organization_id,
                previous_plan_id = %previous,
                "Replacing outstanding plan change request"
            );
        }

        let organization = apply_action(&txn, org, &action).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            organization_id = %organization_id,
            plan_id = %plan_id,
            requested_by = %requested_by,
            "Plan change requested"
        );
        Ok(organization)
    }

    /// Approves the outstanding request and grants the target tier's modules.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingRequest` if nothing is outstanding, `PlanMismatch` if
    /// `plan_id` is not the requested plan, or a lookup/database error.
    pub async fn approve(
        &self,
        organization_id: OrganizationId,
        plan_id: PlanId,
        approved_by: UserId,
        map: &TierModuleMap,
    ) -> Result<ApprovalOutcome, PlanChangeError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        set_platform_context(&txn).await.map_err(db_err)?;

        let org = lock_organization(&txn, organization_id).await?;
        let current = current_plan_ref(&txn, &org).await?;
        let target = load_plan(&txn, plan_id).await?;
        let target_ref = plan_ref(&target)?;

        let action =
            PlanChangeService::approve(&org.snapshot(), current.as_ref(), &target_ref, approved_by)?;
        let outcome = commit_move(txn, org, target, &action, map).await?;

        info!(
            organization_id = %organization_id,
            plan_id = %plan_id,
            change = %outcome.change,
            modules_added = outcome.modules_added.len(),
            "Plan change approved"
        );
        Ok(outcome)
    }

    /// Moves the organization onto `plan_id` without a request, dropping any
    /// outstanding one, and grants the plan tier's modules.
    ///
    /// # Errors
    ///
    /// Returns `InactivePlan` if the plan is not offered, or a lookup/database
    /// error.
    pub async fn set_organization_plan(
        &self,
        organization_id: OrganizationId,
        plan_id: PlanId,
        assigned_by: UserId,
        map: &TierModuleMap,
    ) -> Result<ApprovalOutcome, PlanChangeError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        set_platform_context(&txn).await.map_err(db_err)?;

        let org = lock_organization(&txn, organization_id).await?;
        let current = current_plan_ref(&txn, &org).await?;
        let target = load_plan(&txn, plan_id).await?;
        let target_ref = plan_ref(&target)?;

        let action =
            PlanChangeService::assign(&org.snapshot(), current.as_ref(), &target_ref, assigned_by)?;
        let outcome = commit_move(txn, org, target, &action, map).await?;

        info!(
            organization_id = %organization_id,
            plan_id = %plan_id,
            change = %outcome.change,
            "Organization plan assigned"
        );
        Ok(outcome)
    }

    /// Rejects the outstanding request. The current plan and grants are kept.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingRequest` if nothing is outstanding, or a
    /// lookup/database error.
    pub async fn reject(
        &self,
        organization_id: OrganizationId,
        rejected_by: UserId,
        reason: Option<String>,
    ) -> Result<RejectionOutcome, PlanChangeError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        set_platform_context(&txn).await.map_err(db_err)?;

        let org = lock_organization(&txn, organization_id).await?;
        let action = PlanChangeService::reject(&org.snapshot(), rejected_by, reason)?;

        let requested_plan = match org.requested_plan_id {
            Some(id) => plans::Entity::find_by_id(id).one(&txn).await.map_err(db_err)?,
            None => None,
        };
        let history = action
            .history()
            .cloned()
            .ok_or_else(|| PlanChangeError::Database("reject produced no history".into()))?;

        let organization = apply_action(&txn, org, &action).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            organization_id = %organization_id,
            rejected_by = %rejected_by,
            "Plan change rejected"
        );
        Ok(RejectionOutcome {
            organization,
            requested_plan,
            history,
        })
    }
}

async fn commit_move(
    txn: DatabaseTransaction,
    org: organizations::Model,
    plan: plans::Model,
    action: &PlanChangeAction,
    map: &TierModuleMap,
) -> Result<ApprovalOutcome, PlanChangeError> {
    let PlanChangeAction::Approve {
        plan_tier,
        change,
        history,
        ..
    } = action
    else {
        return Err(PlanChangeError::Database(
            "expected an approve action".into(),
        ));
    };

    let organization = apply_action(&txn, org, action).await?;
    let modules_added = grant_modules_for_tier(
        &txn,
        OrganizationId::from_uuid(organization.id),
        *plan_tier,
        map,
    )
    .await
    .map_err(db_err)?;
    txn.commit().await.map_err(db_err)?;

    Ok(ApprovalOutcome {
        organization,
        plan,
        change: *change,
        modules_added,
        history: history.clone(),
    })
}

/// Writes the snapshot produced by `action` and appends its history entry.
async fn apply_action(
    txn: &DatabaseTransaction,
    org: organizations::Model,
    action: &PlanChangeAction,
) -> Result<organizations::Model, PlanChangeError> {
    let next: OrganizationSnapshot = PlanChangeService::apply(&org.snapshot(), action);
    let org_id = org.id;

    let mut active: organizations::ActiveModel = org.into();
    active.status = Set(next.status.into());
    active.plan_id = Set(next.plan_id.map(PlanId::into_inner));
    active.plan_tier = Set(next.plan_tier.map(Into::into));
    active.requested_plan_id = Set(next.requested_plan_id.map(PlanId::into_inner));
    active.plan_requested_at = Set(next.plan_requested_at.map(Into::into));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(txn).await.map_err(db_err)?;

    if let Some(entry) = action.history() {
        plan_history::active_model(Uuid::now_v7(), org_id, entry)
            .insert(txn)
            .await
            .map_err(db_err)?;
    }

    Ok(updated)
}

async fn lock_organization(
    txn: &DatabaseTransaction,
    organization_id: OrganizationId,
) -> Result<organizations::Model, PlanChangeError> {
    organizations::Entity::find_by_id(organization_id.into_inner())
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(PlanChangeError::OrganizationNotFound(organization_id))
}

async fn load_plan(
    txn: &DatabaseTransaction,
    plan_id: PlanId,
) -> Result<plans::Model, PlanChangeError> {
    plans::Entity::find_by_id(plan_id.into_inner())
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(PlanChangeError::PlanNotFound(plan_id))
}

async fn current_plan_ref(
    txn: &DatabaseTransaction,
    org: &organizations::Model,
) -> Result<Option<PlanRef>, PlanChangeError> {
    let Some(plan_id) = org.plan_id else {
        return Ok(None);
    };
    let plan = load_plan(txn, PlanId::from_uuid(plan_id)).await?;
    plan_ref(&plan).map(Some)
}

fn plan_ref(plan: &plans::Model) -> Result<PlanRef, PlanChangeError> {
    plan.plan_ref()
        .map_err(|e| PlanChangeError::Database(format!("plan {}: {e}", plan.id)))
}

fn db_err(err: DbErr) -> PlanChangeError {
    PlanChangeError::Database(err.to_string())
}
