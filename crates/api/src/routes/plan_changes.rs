//! Platform admin plan change endpoints.
//!
//! - `GET /plan-change-requests` lists outstanding requests
//! - `POST /plan-change-requests/approve` moves an organization onto its
//!   requested plan and grants the modules of the new tier
//! - `POST /plan-change-requests/reject` drops the outstanding request
//!
//! Notifications go out after the transaction commits.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser, notify};
use backoffice_db::{
    OrganizationRepository, PlanChangeRepository, entities::modules,
    repositories::PendingPlanChange,
};
use backoffice_shared::types::{OrganizationId, PlanId};

use super::{json_body, required};

/// Creates the plan change router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plan-change-requests", get(list_requests))
        .route("/plan-change-requests/approve", post(approve_request))
        .route("/plan-change-requests/reject", post(reject_request))
}

/// An outstanding request as listed to platform admins.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChangeRequestView {
    /// Organization ID.
    pub id: Uuid,
    /// Organization name.
    pub name: String,
    /// Organization contact email.
    pub email: String,
    /// Plan the organization is on.
    pub current_plan_id: Option<Uuid>,
    /// Plan the organization asked for.
    pub requested_plan_id: Option<Uuid>,
    /// Name of the requested plan.
    pub requested_plan_name: Option<String>,
    /// When the request was made.
    pub request_date: Option<DateTime<FixedOffset>>,
}

impl From<PendingPlanChange> for PlanChangeRequestView {
    fn from(pending: PendingPlanChange) -> Self {
        let org = pending.organization;
        Self {
            id: org.id,
            name: org.name,
            email: org.email,
            current_plan_id: org.plan_id,
            requested_plan_id: org.requested_plan_id,
            requested_plan_name: pending.requested_plan.map(|plan| plan.name),
            request_date: org.plan_requested_at,
        }
    }
}

/// A module granted by an approval.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantedModuleView {
    /// Module ID.
    pub id: Uuid,
    /// Module name.
    pub name: String,
    /// Module type key.
    pub module_type: String,
}

impl From<modules::Model> for GrantedModuleView {
    fn from(module: modules::Model) -> Self {
        Self {
            id: module.id,
            name: module.name,
            module_type: module.module_type,
        }
    }
}

/// Request body for approve.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    /// Organization to approve.
    pub organization_id: Option<OrganizationId>,
    /// Must equal the requested plan.
    pub plan_id: Option<PlanId>,
}

/// Request body for reject.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    /// Organization to reject.
    pub organization_id: Option<OrganizationId>,
    /// Optional reason recorded in the plan history.
    #[serde(default)]
    pub reason: Option<String>,
}

/// GET /plan-change-requests
async fn list_requests(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Value>, ApiError> {
    ctx.require_platform_admin()?;

    let requests: Vec<PlanChangeRequestView> = OrganizationRepository::new((*state.db).clone())
        .list_pending_plan_changes()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({
        "success": true,
        "totalRequests": requests.len(),
        "requests": requests,
    })))
}

/// POST /plan-change-requests/approve
async fn approve_request(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    ctx.require_platform_admin()?;
    let body = json_body(payload)?;
    let organization_id = required(body.organization_id, "organizationId")?;
    let plan_id = required(body.plan_id, "planId")?;

    let outcome = PlanChangeRepository::new((*state.db).clone())
        .approve(organization_id, plan_id, ctx.user_id(), &state.tier_map)
        .await?;

    notify::dispatch_in_background(
        state.notifier.clone(),
        notify::plan_approved(&outcome.organization, &outcome.plan),
    );

    let modules_added: Vec<GrantedModuleView> =
        outcome.modules_added.into_iter().map(Into::into).collect();

    Ok(Json(json!({
        "success": true,
        "organizationId": outcome.organization.id,
        "planId": outcome.plan.id,
        "planName": outcome.plan.name,
        "planTier": outcome.plan.tier,
        "change": outcome.change,
        "modulesAdded": modules_added,
    })))
}

/// POST /plan-change-requests/reject
async fn reject_request(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    payload: Result<Json<RejectRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    ctx.require_platform_admin()?;
    let body = json_body(payload)?;
    let organization_id = required(body.organization_id, "organizationId")?;

    let outcome = PlanChangeRepository::new((*state.db).clone())
        .reject(organization_id, ctx.user_id(), body.reason)
        .await?;

    let reason = outcome
        .history
        .as_rejection()
        .and_then(|rejection| rejection.reason.clone());
    notify::dispatch_in_background(
        state.notifier.clone(),
        notify::plan_rejected(
            &outcome.organization,
            outcome.requested_plan.as_ref(),
            reason.as_deref(),
        ),
    );

    Ok(Json(json!({
        "success": true,
        "message": "Plan change request rejected",
        "organizationId": outcome.organization.id,
    })))
}
