//! Database migration runner for Backoffice.
//!
//! Usage:
//!   migrator up      - Run all pending migrations (also seeds the plan catalog)
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations

use backoffice_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI reads DATABASE_URL and sets up its own tracing
    cli::run_cli(Migrator).await;
}
