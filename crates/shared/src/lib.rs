//! Shared types, errors, and configuration for Backoffice.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Session tokens and roles
//! - Notification dispatch over email

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

#[cfg(test)]
mod error_tests;

pub use auth::{Claims, Role};
pub use config::{AppConfig, EmailConfig, EntitlementConfig, JwtConfig, TierModulesConfig};
pub use email::{EmailError, EmailService, LogNotifier, Notification, Notifier};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
