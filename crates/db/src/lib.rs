//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the entitlement store
//! - Repositories for organizations, the catalog, grants and plan changes
//! - Database migrations and the row-level security context helper

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use repositories::{
    CatalogRepository, GrantRepository, OrganizationRepository, PlanChangeRepository,
};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect_with(database_url, 10).await
}

/// Establishes a connection pool with at most `max_connections` connections.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(
    database_url: &str,
    max_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url);
    options.max_connections(max_connections).sqlx_logging(false);
    Database::connect(options).await
}
