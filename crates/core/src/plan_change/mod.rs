//! Plan change workflow.
//!
//! State machine over an organization's plan:
//! - any requestable status → `pending_plan_change` (request)
//! - `pending_plan_change` → `active` (approve, onto the requested plan)
//! - `pending_plan_change` → `active` (reject, keeping the current plan)
//!
//! Every transition keeps `requested_plan_id` set exactly while the status is
//! `pending_plan_change`, and approve/reject append one history entry.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PlanChangeError;
pub use service::PlanChangeService;
pub use types::{
    HistoryKind, OrganizationSnapshot, OrganizationStatus, PlanChangeAction, PlanHistoryEntry,
    PlanRef, PlanRejection, PlanTransition,
};
