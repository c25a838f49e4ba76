//! `SeaORM` Entity for organizations table.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use backoffice_core::plan_change::OrganizationSnapshot;
use backoffice_shared::types::{OrganizationId, PlanId};

use super::sea_orm_active_enums::{OrganizationStatus, PlanTier};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: OrganizationStatus,
    pub plan_id: Option<Uuid>,
    pub plan_tier: Option<PlanTier>,
    pub requested_plan_id: Option<Uuid>,
    pub plan_requested_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plans::Entity",
        from = "Column::PlanId",
        to = "super::plans::Column::Id"
    )]
    Plans,
    #[sea_orm(has_many = "super::organization_modules::Entity")]
    OrganizationModules,
    #[sea_orm(has_many = "super::plan_history::Entity")]
    PlanHistory,
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plans.def()
    }
}

impl Related<super::organization_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationModules.def()
    }
}

impl Related<super::plan_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Plan-related state used by the plan change workflow.
    #[must_use]
    pub fn snapshot(&self) -> OrganizationSnapshot {
        OrganizationSnapshot {
            id: OrganizationId::from_uuid(self.id),
            status: self.status.into(),
            plan_id: self.plan_id.map(PlanId::from_uuid),
            plan_tier: self.plan_tier.map(Into::into),
            requested_plan_id: self.requested_plan_id.map(PlanId::from_uuid),
            plan_requested_at: self.plan_requested_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}
