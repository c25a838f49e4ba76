//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod catalog;
pub mod error;
pub mod grant;
pub mod organization;
pub mod plan_change;

pub use catalog::{CatalogError, CatalogReport, CatalogRepository, catalog_modules};
pub use error::StoreError;
pub use grant::{GrantFields, GrantRepository, GrantWithModule, grant_modules_for_tier};
pub use organization::{
    CreateOrganizationInput, OrganizationRepository, PendingPlanChange, UpdateOrganizationInput,
};
pub use plan_change::{ApprovalOutcome, PlanChangeRepository, RejectionOutcome};
