//! `SeaORM` entity definitions.

pub mod module_plans;
pub mod modules;
pub mod organization_modules;
pub mod organizations;
pub mod plan_history;
pub mod plan_modules;
pub mod plans;
pub mod sea_orm_active_enums;
