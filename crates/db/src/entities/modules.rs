//! `SeaORM` Entity for modules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use backoffice_core::entitlement::CatalogModule;
use backoffice_shared::types::ModuleId;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "modules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub module_type: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::module_plans::Entity")]
    ModulePlans,
    #[sea_orm(has_many = "super::organization_modules::Entity")]
    OrganizationModules,
    #[sea_orm(has_many = "super::plan_modules::Entity")]
    PlanModules,
}

impl Related<super::module_plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModulePlans.def()
    }
}

impl Related<super::organization_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationModules.def()
    }
}

impl Related<super::plan_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanModules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for CatalogModule {
    fn from(model: &Model) -> Self {
        Self {
            id: ModuleId::from_uuid(model.id),
            module_type: model.module_type.clone(),
            is_active: model.is_active,
        }
    }
}
