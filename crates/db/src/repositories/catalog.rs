//! Catalog repository: plans, modules, module plans and plan defaults.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::warn;

use backoffice_core::entitlement::{CatalogModule, TierModuleMap};
use backoffice_core::tier::{PlanTier, TierError, validate_catalog_tiers};
use backoffice_shared::types::{ModuleId, PlanId};

use crate::entities::{module_plans, modules, plan_modules, plans};

use super::error::StoreError;

/// Errors raised while validating the catalog at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A plan names an unknown tier.
    #[error("Invalid plan catalog: {0}")]
    Tier(#[from] TierError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Result of a catalog check.
#[derive(Debug, Clone)]
pub struct CatalogReport {
    /// Number of plans checked.
    pub plan_count: usize,
    /// Tiers with at least one plan.
    pub tiers: Vec<PlanTier>,
    /// Entitled module types with no active catalog module.
    pub unmatched_module_types: Vec<String>,
}

/// Read access to the plan and module catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a plan by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_plan(&self, id: PlanId) -> Result<Option<plans::Model>, DbErr> {
        plans::Entity::find_by_id(id.into_inner()).one(&self.db).await
    }

    /// Gets a plan by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the plan does not exist.
    pub async fn get_plan(&self, id: PlanId) -> Result<plans::Model, StoreError> {
        self.find_plan(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Plan {id}")))
    }

    /// Lists plans, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_plans(&self, active_only: bool) -> Result<Vec<plans::Model>, DbErr> {
        let mut query = plans::Entity::find();
        if active_only {
            query = query.filter(plans::Column::IsActive.eq(true));
        }
        query
            .order_by_asc(plans::Column::Price)
            .order_by_asc(plans::Column::Name)
            .all(&self.db)
            .await
    }

    /// Lists the modules a plan includes by default.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_plan_modules(&self, plan_id: PlanId) -> Result<Vec<modules::Model>, DbErr> {
        modules::Entity::find()
            .inner_join(plan_modules::Entity)
            .filter(plan_modules::Column::PlanId.eq(plan_id.into_inner()))
            .order_by_asc(modules::Column::Name)
            .all(&self.db)
            .await
    }

    /// Lists every catalog module.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_modules(&self) -> Result<Vec<modules::Model>, DbErr> {
        modules::Entity::find()
            .order_by_asc(modules::Column::Name)
            .all(&self.db)
            .await
    }

    /// Gets a module by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the module does not exist.
    pub async fn get_module(&self, id: ModuleId) -> Result<modules::Model, StoreError> {
        modules::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Module {id}")))
    }

    /// Lists the purchasable plans of one module.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the module does not exist.
    pub async fn list_module_plans(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<module_plans::Model>, StoreError> {
        self.get_module(module_id).await?;
        Ok(module_plans::Entity::find()
            .filter(module_plans::Column::ModuleId.eq(module_id.into_inner()))
            .filter(module_plans::Column::IsActive.eq(true))
            .order_by_asc(module_plans::Column::Price)
            .all(&self.db)
            .await?)
    }

    /// Checks every plan tier against the tier order and reports entitled
    /// module types missing from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Tier` if any plan names an unknown tier.
    pub async fn validate_catalog(&self, map: &TierModuleMap) -> Result<CatalogReport, CatalogError> {
        let plans = plans::Entity::find().all(&self.db).await?;
        let mut tiers = validate_catalog_tiers(plans.iter().map(|plan| plan.tier.as_str()))?;
        tiers.sort();
        tiers.dedup();

        let catalog = catalog_modules(&self.db).await?;
        let unmatched_module_types: Vec<String> = map
            .all_module_types()
            .into_iter()
            .filter(|module_type| {
                !catalog
                    .iter()
                    .any(|m| m.is_active && &m.module_type == module_type)
            })
            .collect();

        for module_type in &unmatched_module_types {
            warn!(module_type = %module_type, "Entitled module type has no active catalog module");
        }

        Ok(CatalogReport {
            plan_count: plans.len(),
            tiers,
            unmatched_module_types,
        })
    }
}

/// Loads the module catalog in resolver form.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn catalog_modules<C: ConnectionTrait>(conn: &C) -> Result<Vec<CatalogModule>, DbErr> {
    Ok(modules::Entity::find()
        .all(conn)
        .await?
        .iter()
        .map(CatalogModule::from)
        .collect())
}
