//! Plan and module catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use backoffice_db::{
    CatalogRepository,
    entities::{module_plans, modules, plans, sea_orm_active_enums::BillingCycle},
};
use backoffice_shared::types::{ModuleId, PlanId};

/// Creates the catalog router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/{plan_id}", get(get_plan))
        .route("/modules", get(list_modules))
        .route("/modules/{module_id}/plans", get(list_module_plans))
}

/// Plan as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    /// Plan ID.
    pub id: Uuid,
    /// Plan name.
    pub name: String,
    /// Tier key.
    pub tier: String,
    /// Price.
    pub price: Decimal,
    /// Feature list.
    pub features: Vec<String>,
    /// Record cap; `None` means unlimited.
    pub max_records: Option<i32>,
    /// Whether the plan can be requested.
    pub is_active: bool,
}

impl From<plans::Model> for PlanView {
    fn from(plan: plans::Model) -> Self {
        let features = plan.feature_list();
        Self {
            id: plan.id,
            name: plan.name,
            tier: plan.tier,
            price: plan.price,
            features,
            max_records: plan.max_records,
            is_active: plan.is_active,
        }
    }
}

/// Module as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleView {
    /// Module ID.
    pub id: Uuid,
    /// Module name.
    pub name: String,
    /// Module type key.
    pub module_type: String,
    /// Description.
    pub description: Option<String>,
    /// Whether the module is offered.
    pub is_active: bool,
}

impl From<modules::Model> for ModuleView {
    fn from(module: modules::Model) -> Self {
        Self {
            id: module.id,
            name: module.name,
            module_type: module.module_type,
            description: module.description,
            is_active: module.is_active,
        }
    }
}

/// Module plan as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePlanView {
    /// Module plan ID.
    pub id: Uuid,
    /// Module plan name.
    pub name: String,
    /// Price per billing cycle.
    pub price: Decimal,
    /// Billing cycle.
    pub billing_cycle: BillingCycle,
    /// Feature list.
    pub features: serde_json::Value,
    /// Seat cap.
    pub max_users: Option<i32>,
}

impl From<module_plans::Model> for ModulePlanView {
    fn from(plan: module_plans::Model) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            price: plan.price,
            billing_cycle: plan.billing_cycle,
            features: plan.features,
            max_users: plan.max_users,
        }
    }
}

/// GET /api/plans
///
/// Platform admins also see retired plans.
async fn list_plans(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Value>, ApiError> {
    let plans: Vec<PlanView> = CatalogRepository::new((*state.db).clone())
        .list_plans(!ctx.is_platform_admin())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({ "success": true, "plans": plans })))
}

/// GET `/api/plans/{plan_id}`
async fn get_plan(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<Value>, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let plan = repo.get_plan(plan_id).await?;
    let modules: Vec<ModuleView> = repo
        .list_plan_modules(plan_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({
        "success": true,
        "plan": PlanView::from(plan),
        "modules": modules,
    })))
}

/// GET /api/modules
async fn list_modules(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let modules: Vec<ModuleView> = CatalogRepository::new((*state.db).clone())
        .list_modules()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({ "success": true, "modules": modules })))
}

/// GET `/api/modules/{module_id}/plans`
async fn list_module_plans(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(module_id): Path<ModuleId>,
) -> Result<Json<Value>, ApiError> {
    let plans: Vec<ModulePlanView> = CatalogRepository::new((*state.db).clone())
        .list_module_plans(module_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(json!({ "success": true, "modulePlans": plans })))
}
