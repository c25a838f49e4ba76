//! `SeaORM` Entity for plan_history table.
//!
//! Append-only. Rows are written by the plan change repository and never
//! updated or deleted.

use chrono::Utc;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use backoffice_core::plan_change::{PlanHistoryEntry, PlanRejection, PlanTransition};
use backoffice_shared::types::{PlanId, UserId};

use super::sea_orm_active_enums::{PlanHistoryKind, PlanTier};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "plan_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub kind: PlanHistoryKind,
    pub previous_plan_id: Option<Uuid>,
    pub new_plan_id: Option<Uuid>,
    pub previous_tier: Option<PlanTier>,
    pub new_tier: Option<PlanTier>,
    pub reason: Option<String>,
    pub changed_by: Uuid,
    pub changed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds an insertable row from a history entry.
///
/// A rejection stores the current plan as `previous_*` and the rejected
/// request as `new_plan_id` with no `new_tier`.
#[must_use]
pub fn active_model(id: Uuid, organization_id: Uuid, entry: &PlanHistoryEntry) -> ActiveModel {
    use sea_orm::Set;

    let (previous_plan_id, previous_tier, new_plan_id, new_tier, reason): (
        Option<Uuid>,
        Option<PlanTier>,
        Option<Uuid>,
        Option<PlanTier>,
        Option<String>,
    ) = match entry {
        PlanHistoryEntry::Upgrade(t) | PlanHistoryEntry::Downgrade(t) | PlanHistoryEntry::Same(t) => (
            t.previous_plan_id.map(Into::into),
            t.previous_tier.map(Into::into),
            Some(t.new_plan_id.into()),
            Some(t.new_tier.into()),
            None,
        ),
        PlanHistoryEntry::Rejected(r) => (
            r.current_plan_id.map(Into::into),
            r.current_tier.map(Into::into),
            Some(r.requested_plan_id.into()),
            None,
            r.reason.clone(),
        ),
    };

    ActiveModel {
        id: Set(id),
        organization_id: Set(organization_id),
        kind: Set(entry.kind().into()),
        previous_plan_id: Set(previous_plan_id),
        new_plan_id: Set(new_plan_id),
        previous_tier: Set(previous_tier),
        new_tier: Set(new_tier),
        reason: Set(reason),
        changed_by: Set(entry.changed_by().into_inner()),
        changed_at: Set(entry.changed_at().into()),
    }
}

impl Model {
    /// Rebuilds the typed history entry.
    ///
    /// Returns `None` for rows missing a field their kind requires.
    #[must_use]
    pub fn entry(&self) -> Option<PlanHistoryEntry> {
        let changed_by = UserId::from_uuid(self.changed_by);
        let changed_at = self.changed_at.with_timezone(&Utc);
        let new_plan_id = PlanId::from_uuid(self.new_plan_id?);

        if self.kind == PlanHistoryKind::Rejected {
            return Some(PlanHistoryEntry::Rejected(PlanRejection {
                current_plan_id: self.previous_plan_id.map(PlanId::from_uuid),
                current_tier: self.previous_tier.map(Into::into),
                requested_plan_id: new_plan_id,
                reason: self.reason.clone(),
                changed_by,
                changed_at,
            }));
        }

        let transition = PlanTransition {
            previous_plan_id: self.previous_plan_id.map(PlanId::from_uuid),
            previous_tier: self.previous_tier.map(Into::into),
            new_plan_id,
            new_tier: self.new_tier?.into(),
            changed_by,
            changed_at,
        };
        Some(match self.kind {
            PlanHistoryKind::Upgrade => PlanHistoryEntry::Upgrade(transition),
            PlanHistoryKind::Downgrade => PlanHistoryEntry::Downgrade(transition),
            PlanHistoryKind::Same | PlanHistoryKind::Rejected => PlanHistoryEntry::Same(transition),
        })
    }
}
