//! `SeaORM` active enums mapped to `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use backoffice_core::plan_change as core_plan_change;
use backoffice_core::tier as core_tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "organization_status")]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "pending_plan_change")]
    PendingPlanChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_tier")]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "seed")]
    Seed,
    #[sea_orm(string_value = "grow")]
    Grow,
    #[sea_orm(string_value = "pro")]
    Pro,
    #[sea_orm(string_value = "enterprise")]
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "grant_status")]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_history_kind")]
#[serde(rename_all = "lowercase")]
pub enum PlanHistoryKind {
    #[sea_orm(string_value = "upgrade")]
    Upgrade,
    #[sea_orm(string_value = "downgrade")]
    Downgrade,
    #[sea_orm(string_value = "same")]
    Same,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "billing_cycle")]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

impl From<OrganizationStatus> for core_plan_change::OrganizationStatus {
    fn from(status: OrganizationStatus) -> Self {
        match status {
            OrganizationStatus::Pending => Self::Pending,
            OrganizationStatus::Approved => Self::Approved,
            OrganizationStatus::Rejected => Self::Rejected,
            OrganizationStatus::Active => Self::Active,
            OrganizationStatus::PendingPlanChange => Self::PendingPlanChange,
        }
    }
}

impl From<core_plan_change::OrganizationStatus> for OrganizationStatus {
    fn from(status: core_plan_change::OrganizationStatus) -> Self {
        use core_plan_change::OrganizationStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Approved => Self::Approved,
            Core::Rejected => Self::Rejected,
            Core::Active => Self::Active,
            Core::PendingPlanChange => Self::PendingPlanChange,
        }
    }
}

impl From<PlanTier> for core_tier::PlanTier {
    fn from(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Free => Self::Free,
            PlanTier::Seed => Self::Seed,
            PlanTier::Grow => Self::Grow,
            PlanTier::Pro => Self::Pro,
            PlanTier::Enterprise => Self::Enterprise,
        }
    }
}

impl From<core_tier::PlanTier> for PlanTier {
    fn from(tier: core_tier::PlanTier) -> Self {
        use core_tier::PlanTier as Core;
        match tier {
            Core::Free => Self::Free,
            Core::Seed => Self::Seed,
            Core::Grow => Self::Grow,
            Core::Pro => Self::Pro,
            Core::Enterprise => Self::Enterprise,
        }
    }
}

impl From<PlanHistoryKind> for core_plan_change::HistoryKind {
    fn from(kind: PlanHistoryKind) -> Self {
        match kind {
            PlanHistoryKind::Upgrade => Self::Upgrade,
            PlanHistoryKind::Downgrade => Self::Downgrade,
            PlanHistoryKind::Same => Self::Same,
            PlanHistoryKind::Rejected => Self::Rejected,
        }
    }
}

impl From<core_plan_change::HistoryKind> for PlanHistoryKind {
    fn from(kind: core_plan_change::HistoryKind) -> Self {
        use core_plan_change::HistoryKind as Core;
        match kind {
            Core::Upgrade => Self::Upgrade,
            Core::Downgrade => Self::Downgrade,
            Core::Same => Self::Same,
            Core::Rejected => Self::Rejected,
        }
    }
}
