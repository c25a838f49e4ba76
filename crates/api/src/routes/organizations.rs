//! Tenant-scoped organization routes.
//!
//! Every handler checks the path organization against the session's
//! [`TenantContext`](backoffice_core::tenant::TenantContext) before touching
//! the store.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use backoffice_core::plan_change::{OrganizationStatus, PlanHistoryEntry};
use backoffice_core::tenant::TenantError;
use backoffice_db::{
    CatalogRepository, GrantRepository, OrganizationRepository, PlanChangeRepository,
    entities::{organizations, plan_history, sea_orm_active_enums::GrantStatus},
    repositories::{GrantFields, GrantWithModule, UpdateOrganizationInput},
};
use backoffice_shared::types::{ModuleId, OrganizationId, PlanId};

use super::{json_body, required};

/// Creates the organizations router (auth middleware is applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}",
            get(get_organization).put(update_organization),
        )
        .route("/organizations/{org_id}/plan-change", post(request_plan_change))
        .route("/organizations/{org_id}/plan-history", get(list_plan_history))
        .route(
            "/organizations/{org_id}/modules",
            get(list_modules).post(grant_module),
        )
        .route(
            "/organizations/{org_id}/modules/{module_id}",
            patch(toggle_module),
        )
}

/// Organization as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    /// Organization ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Lifecycle status.
    pub status: OrganizationStatus,
    /// Current plan.
    pub plan_id: Option<Uuid>,
    /// Name of the current plan.
    pub plan_name: Option<String>,
    /// Tier of the current plan.
    pub plan_tier: Option<String>,
    /// Outstanding requested plan.
    pub requested_plan_id: Option<Uuid>,
    /// When the outstanding request was made.
    pub plan_requested_at: Option<DateTime<FixedOffset>>,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update time.
    pub updated_at: DateTime<FixedOffset>,
}

impl OrganizationView {
    fn new(org: organizations::Model, plan_name: Option<String>) -> Self {
        let snapshot = org.snapshot();
        Self {
            id: org.id,
            name: org.name,
            email: org.email,
            status: snapshot.status,
            plan_id: org.plan_id,
            plan_name,
            plan_tier: snapshot.plan_tier.map(|tier| tier.as_str().to_string()),
            requested_plan_id: org.requested_plan_id,
            plan_requested_at: org.plan_requested_at,
            created_at: org.created_at,
            updated_at: org.updated_at,
        }
    }
}

/// Grant as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantView {
    /// Grant ID.
    pub id: Uuid,
    /// Granted module.
    pub module_id: Uuid,
    /// Module name.
    pub module_name: Option<String>,
    /// Module type key.
    pub module_type: Option<String>,
    /// Whether the grant is usable.
    pub is_active: bool,
    /// Grant status.
    pub status: GrantStatus,
    /// Grant start.
    pub start_date: DateTime<FixedOffset>,
    /// Grant end.
    pub end_date: Option<DateTime<FixedOffset>>,
}

impl From<GrantWithModule> for GrantView {
    fn from(row: GrantWithModule) -> Self {
        let GrantWithModule { grant, module } = row;
        Self {
            id: grant.id,
            module_id: grant.module_id,
            module_name: module.as_ref().map(|m| m.name.clone()),
            module_type: module.map(|m| m.module_type),
            is_active: grant.is_active,
            status: grant.status,
            start_date: grant.start_date,
            end_date: grant.end_date,
        }
    }
}

/// Request body for a profile update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    /// New name.
    pub name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New registration status; platform admins only.
    pub status: Option<String>,
}

/// Request body for a plan change request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChangeBody {
    /// Requested plan.
    pub plan_id: Option<PlanId>,
}

/// Request body for an individual grant.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantModuleRequest {
    /// Module to grant.
    pub module_id: Option<ModuleId>,
}

/// Request body for toggling a grant.
#[derive(Debug, Deserialize)]
pub struct ToggleModuleRequest {
    /// Whether the grant should be active.
    pub active: Option<bool>,
}

async fn organization_view(
    state: &AppState,
    org: organizations::Model,
) -> Result<OrganizationView, ApiError> {
    let plan_name = match org.plan_id {
        Some(id) => CatalogRepository::new((*state.db).clone())
            .find_plan(PlanId::from_uuid(id))
            .await?
            .map(|plan| plan.name),
        None => None,
    };
    Ok(OrganizationView::new(org, plan_name))
}

/// GET `/api/organizations/{org_id}`
async fn get_organization(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(org_id): Path<OrganizationId>,
) -> Result<Json<Value>, ApiError> {
    ctx.authorize(org_id)?;

    let org = OrganizationRepository::new((*state.db).clone())
        .get_organization(org_id)
        .await?;
    let view = organization_view(&state, org).await?;

    Ok(Json(json!({ "success": true, "organization": view })))
}

/// PUT `/api/organizations/{org_id}`
async fn update_organization(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(org_id): Path<OrganizationId>,
    payload: Result<Json<UpdateOrganizationRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    ctx.authorize_admin(org_id)?;
    let body = json_body(payload)?;

    let name = body.name.map(|n| n.trim().to_string());
    if name.as_deref().is_some_and(str::is_empty) {
        return Err(ApiError::validation("name cannot be empty"));
    }
    let email = body.email.map(|e| e.trim().to_string());
    if email.as_deref().is_some_and(|e| !is_plausible_email(e)) {
        return Err(ApiError::validation("email is not a valid address"));
    }

    let status = match body.status.as_deref() {
        None => None,
        Some(raw) => {
            if !ctx.is_platform_admin() {
                return Err(TenantError::InsufficientRole {
                    role: ctx.role(),
                    action: "change registration status",
                }
                .into());
            }
            Some(parse_registration_status(raw)?)
        }
    };

    let org = OrganizationRepository::new((*state.db).clone())
        .update_profile(
            org_id,
            UpdateOrganizationInput {
                name,
                email,
                status,
            },
        )
        .await?;
    let view = organization_view(&state, org).await?;

    Ok(Json(json!({ "success": true, "organization": view })))
}

/// POST `/api/organizations/{org_id}/plan-change`
async fn request_plan_change(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(org_id): Path<OrganizationId>,
    payload: Result<Json<PlanChangeBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    ctx.authorize_admin(org_id)?;
    let plan_id = required(json_body(payload)?.plan_id, "planId")?;

    let org = PlanChangeRepository::new((*state.db).clone())
        .request(org_id, plan_id, ctx.user_id())
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "organizationId": org.id,
            "requestedPlanId": org.requested_plan_id,
            "status": org.snapshot().status,
        })),
    ))
}

/// GET `/api/organizations/{org_id}/plan-history`
async fn list_plan_history(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(org_id): Path<OrganizationId>,
) -> Result<Json<Value>, ApiError> {
    ctx.authorize(org_id)?;

    let rows = OrganizationRepository::new((*state.db).clone())
        .list_history(org_id)
        .await?;
    let history = decode_history(&rows);

    Ok(Json(json!({ "success": true, "history": history })))
}

/// Rebuilds typed history entries, logging any row that cannot be decoded.
fn decode_history(rows: &[plan_history::Model]) -> Vec<PlanHistoryEntry> {
    rows.iter()
        .filter_map(|row| {
            let entry = row.entry();
            if entry.is_none() {
                warn!(
                    history_id = %row.id,
                    organization_id = %row.organization_id,
                    kind = ?row.kind,
                    "Plan history row is missing required fields; omitted from response"
                );
            }
            entry
        })
        .collect()
}

/// GET `/api/organizations/{org_id}/modules`
async fn list_modules(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(org_id): Path<OrganizationId>,
) -> Result<Json<Value>, ApiError> {
    ctx.authorize(org_id)?;

    let grants: Vec<GrantView> = GrantRepository::new((*state.db).clone())
        .list_grants_with_modules(org_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({ "success": true, "modules": grants })))
}

/// POST `/api/organizations/{org_id}/modules`
///
/// Individual grants outside the plan tier are a platform admin action.
async fn grant_module(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(org_id): Path<OrganizationId>,
    payload: Result<Json<GrantModuleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    ctx.require_platform_admin()?;
    let module_id = required(json_body(payload)?.module_id, "moduleId")?;

    let grant = GrantRepository::new((*state.db).clone())
        .create_grant(org_id, module_id, GrantFields::active())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "grant": GrantView::from(GrantWithModule { grant, module: None }),
        })),
    ))
}

/// PATCH `/api/organizations/{org_id}/modules/{module_id}`
async fn toggle_module(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path((org_id, module_id)): Path<(OrganizationId, ModuleId)>,
    payload: Result<Json<ToggleModuleRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    // Upsert may insert a grant, so tenant admins cannot toggle.
    ctx.require_platform_admin()?;
    let active = required(json_body(payload)?.active, "active")?;

    let grant = GrantRepository::new((*state.db).clone())
        .upsert_grant(org_id, module_id, GrantFields::toggled(active))
        .await?;

    Ok(Json(json!({
        "success": true,
        "grant": GrantView::from(GrantWithModule { grant, module: None }),
    })))
}

/// Registration statuses an admin may set by hand.
fn parse_registration_status(raw: &str) -> Result<OrganizationStatus, ApiError> {
    match OrganizationStatus::parse(raw) {
        Some(
            status @ (OrganizationStatus::Approved
            | OrganizationStatus::Rejected
            | OrganizationStatus::Active),
        ) => Ok(status),
        _ => Err(ApiError::validation(format!(
            "status must be one of approved, rejected, active (got {raw})"
        ))),
    }
}

fn is_plausible_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}
