//! `SeaORM` Entity for plans table.
//!
//! `tier` is stored as text so that the catalog can be checked against the
//! tier order at startup instead of failing on first decode.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use backoffice_core::plan_change::PlanRef;
use backoffice_core::tier::{PlanTier, TierError};
use backoffice_shared::types::PlanId;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub tier: String,
    pub price: Decimal,
    pub features: Json,
    pub max_records: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::plan_modules::Entity")]
    PlanModules,
}

impl Related<super::plan_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlanModules.def()
    }
}

impl Related<super::modules::Entity> for Entity {
    fn to() -> RelationDef {
        super::plan_modules::Relation::Modules.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::plan_modules::Relation::Plans.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parsed tier of the plan.
    ///
    /// # Errors
    ///
    /// Returns `TierError::UnknownTier` if the stored tier is not recognized.
    pub fn plan_tier(&self) -> Result<PlanTier, TierError> {
        self.tier.parse()
    }

    /// The plan as seen by the plan change workflow.
    ///
    /// # Errors
    ///
    /// Returns `TierError::UnknownTier` if the stored tier is not recognized.
    pub fn plan_ref(&self) -> Result<PlanRef, TierError> {
        Ok(PlanRef {
            id: PlanId::from_uuid(self.id),
            name: self.name.clone(),
            tier: self.plan_tier()?,
            is_active: self.is_active,
        })
    }

    /// Feature list as strings, ignoring malformed entries.
    #[must_use]
    pub fn feature_list(&self) -> Vec<String> {
        self.features
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
