//! Row-Level Security (RLS) context management.
//!
//! Tenant tables (`organization_modules`, `plan_history`) carry RLS policies
//! keyed on `app.current_organization_id`. Platform admin work that spans
//! tenants sets `app.platform_admin` instead. Both settings use `SET LOCAL`
//! and so only last for the enclosing transaction.
//!
//! # Usage
//!
//! ```ignore
//! use backoffice_db::rls::RlsExt;
//!
//! let rls = db.with_rls(organization_id).await?;
//! let grants = organization_modules::Entity::find().all(rls.transaction()).await?;
//! rls.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

use backoffice_shared::types::OrganizationId;

/// A transaction scoped to one tenant, or to platform admin work.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction scoped to `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(
        db: &DatabaseConnection,
        organization_id: OrganizationId,
    ) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_rls_context(&txn, organization_id).await?;
        Ok(Self { txn })
    }

    /// Begins a transaction that may touch every tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the context
    /// cannot be set.
    pub async fn platform(db: &DatabaseConnection) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_platform_context(&txn).await?;
        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to create tenant-scoped transactions.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Begins a transaction scoped to `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_rls(&self, organization_id: OrganizationId) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_rls(&self, organization_id: OrganizationId) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, organization_id).await
    }
}

fn tenant_sql(organization_id: OrganizationId) -> String {
    // OrganizationId renders as a hyphenated UUID, so it cannot break out of the literal
    format!("SET LOCAL app.current_organization_id = '{organization_id}'")
}

const PLATFORM_SQL: &str = "SET LOCAL app.platform_admin = 'on'";

/// Sets the tenant context on an existing transaction.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_rls_context(
    txn: &DatabaseTransaction,
    organization_id: OrganizationId,
) -> Result<(), DbErr> {
    txn.execute_unprepared(&tenant_sql(organization_id)).await?;
    Ok(())
}

/// Marks an existing transaction as platform admin work.
///
/// # Errors
///
/// Returns an error if the setting cannot be applied.
pub async fn set_platform_context(txn: &DatabaseTransaction) -> Result<(), DbErr> {
    txn.execute_unprepared(PLATFORM_SQL).await?;
    Ok(())
}
