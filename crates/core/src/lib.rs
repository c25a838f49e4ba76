//! Core entitlement logic for Backoffice.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state transitions live here.
//!
//! # Modules
//!
//! - `tier` - Plan tiers and their total order
//! - `entitlement` - Tier to module mapping and the grant resolver
//! - `plan_change` - Plan change request/approve/reject state machine
//! - `tenant` - Per-request tenant context and scoping checks

pub mod entitlement;
pub mod plan_change;
pub mod tenant;
pub mod tier;
