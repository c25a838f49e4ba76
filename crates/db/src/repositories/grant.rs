//! Grant repository for organization module grants.
//!
//! Tenant-facing reads run under the organization's RLS context; writes are
//! platform admin work. Tier grants are additive: rows are only ever
//! inserted, never revoked, by a tier change.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use backoffice_core::entitlement::{GrantResolver, TierModuleMap};
use backoffice_core::tier::PlanTier;
use backoffice_shared::types::{ModuleId, OrganizationId};

use crate::entities::{
    modules, organization_modules, organizations, sea_orm_active_enums::GrantStatus,
};
use crate::rls::{RlsExt, set_platform_context};

use super::catalog::catalog_modules;
use super::error::StoreError;

/// Writable fields of a grant.
#[derive(Debug, Clone)]
pub struct GrantFields {
    /// Whether the organization may use the module.
    pub is_active: bool,
    /// Grant status.
    pub status: GrantStatus,
    /// Start of the grant; defaults to now on insert.
    pub start_date: Option<DateTime<Utc>>,
    /// Optional end of the grant.
    pub end_date: Option<DateTime<Utc>>,
}

impl GrantFields {
    /// An active grant starting now.
    #[must_use]
    pub const fn active() -> Self {
        Self {
            is_active: true,
            status: GrantStatus::Active,
            start_date: None,
            end_date: None,
        }
    }

    /// Active or inactive grant, as toggled by an administrator.
    #[must_use]
    pub const fn toggled(active: bool) -> Self {
        Self {
            is_active: active,
            status: if active {
                GrantStatus::Active
            } else {
                GrantStatus::Inactive
            },
            start_date: None,
            end_date: None,
        }
    }
}

/// A grant together with its catalog module.
#[derive(Debug, Clone)]
pub struct GrantWithModule {
    /// The grant row.
    pub grant: organization_modules::Model,
    /// The granted module.
    pub module: Option<modules::Model>,
}

/// Grant repository.
#[derive(Debug, Clone)]
pub struct GrantRepository {
    db: DatabaseConnection,
}

impl GrantRepository {
    /// Creates a new grant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an organization's grants.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_grants(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<organization_modules::Model>, DbErr> {
        let rls = self.db.with_rls(organization_id).await?;
        let grants = organization_modules::Entity::find()
            .filter(organization_modules::Column::OrganizationId.eq(organization_id.into_inner()))
            .order_by_asc(organization_modules::Column::CreatedAt)
            .all(rls.transaction())
            .await?;
        rls.commit().await?;
        Ok(grants)
    }

    /// Lists an organization's grants with their modules.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_grants_with_modules(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<GrantWithModule>, DbErr> {
        let rls = self.db.with_rls(organization_id).await?;
        let rows = organization_modules::Entity::find()
            .filter(organization_modules::Column::OrganizationId.eq(organization_id.into_inner()))
            .find_also_related(modules::Entity)
            .order_by_asc(organization_modules::Column::CreatedAt)
            .all(rls.transaction())
            .await?;
        rls.commit().await?;

        Ok(rows
            .into_iter()
            .map(|(grant, module)| GrantWithModule { grant, module })
            .collect())
    }

    /// Creates a grant.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the organization already holds the module, and
    /// `NotFound` if the organization or module does not exist.
    pub async fn create_grant(
        &self,
        organization_id: OrganizationId,
        module_id: ModuleId,
        fields: GrantFields,
    ) -> Result<organization_modules::Model, StoreError> {
        let txn = self.db.begin().await?;
        set_platform_context(&txn).await?;
        ensure_targets_exist(&txn, organization_id, module_id).await?;

        if find_grant(&txn, organization_id, module_id).await?.is_some() {
            return Err(StoreError::Conflict(format!(
                "Module {module_id} is already granted to organization {organization_id}"
            )));
        }

        let grant = new_grant(organization_id, module_id, &fields)
            .insert(&txn)
            .await
            .map_err(|e| {
                StoreError::from_insert(e, || {
                    format!("Module {module_id} is already granted to organization {organization_id}")
                })
            })?;
        txn.commit().await?;

        info!(
            organization_id = %organization_id,
            module_id = %module_id,
            "Module granted"
        );
        Ok(grant)
    }

    /// Updates the grant for the pair, or inserts it if missing.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the organization or module does not exist.
    pub async fn upsert_grant(
        &self,
        organization_id: OrganizationId,
        module_id: ModuleId,
        fields: GrantFields,
    ) -> Result<organization_modules::Model, StoreError> {
        let txn = self.db.begin().await?;
        set_platform_context(&txn).await?;
        ensure_targets_exist(&txn, organization_id, module_id).await?;

        let grant = match find_grant(&txn, organization_id, module_id).await? {
            Some(existing) => {
                let mut active: organization_modules::ActiveModel = existing.into();
                active.is_active = Set(fields.is_active);
                active.status = Set(fields.status);
                if let Some(start) = fields.start_date {
                    active.start_date = Set(start.into());
                }
                active.end_date = Set(fields.end_date.map(Into::into));
                active.updated_at = Set(Utc::now().into());
                active.update(&txn).await?
            }
            None => new_grant(organization_id, module_id, &fields).insert(&txn).await?,
        };
        txn.commit().await?;

        debug!(
            organization_id = %organization_id,
            module_id = %module_id,
            is_active = grant.is_active,
            "Grant upserted"
        );
        Ok(grant)
    }

    /// Grants every module entitled at `tier` that the organization lacks.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn apply_tier_grants(
        &self,
        organization_id: OrganizationId,
        tier: PlanTier,
        map: &TierModuleMap,
    ) -> Result<Vec<modules::Model>, DbErr> {
        let txn = self.db.begin().await?;
        set_platform_context(&txn).await?;
        let added = grant_modules_for_tier(&txn, organization_id, tier, map).await?;
        txn.commit().await?;
        Ok(added)
    }
}

/// Inserts grants for every module entitled at `tier` that the organization
/// does not hold yet. Returns the modules that were granted.
///
/// Safe to re-run: existing pairs are skipped and the insert ignores
/// conflicting rows.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn grant_modules_for_tier<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    tier: PlanTier,
    map: &TierModuleMap,
) -> Result<Vec<modules::Model>, DbErr> {
    let catalog = catalog_modules(conn).await?;
    let granted: HashSet<ModuleId> = organization_modules::Entity::find()
        .filter(organization_modules::Column::OrganizationId.eq(organization_id.into_inner()))
        .all(conn)
        .await?
        .into_iter()
        .map(|grant| ModuleId::from_uuid(grant.module_id))
        .collect();

    let plan = GrantResolver::new(map).resolve(tier, &catalog, &granted);
    for module_type in &plan.unmatched_types {
        warn!(
            organization_id = %organization_id,
            module_type = %module_type,
            "No active catalog module for entitled type; skipping"
        );
    }
    if plan.is_noop() {
        return Ok(Vec::new());
    }

    let fields = GrantFields::active();
    let mut inserted_ids = Vec::with_capacity(plan.to_add.len());
    for module in &plan.to_add {
        let rows = organization_modules::Entity::insert(new_grant(organization_id, module.id, &fields))
            .on_conflict(
                OnConflict::columns([
                    organization_modules::Column::OrganizationId,
                    organization_modules::Column::ModuleId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        if rows > 0 {
            inserted_ids.push(module.id.into_inner());
        }
    }

    let added = modules::Entity::find()
        .filter(modules::Column::Id.is_in(inserted_ids))
        .order_by_asc(modules::Column::ModuleType)
        .all(conn)
        .await?;

    info!(
        organization_id = %organization_id,
        tier = %tier,
        added = added.len(),
        "Tier grants applied"
    );
    Ok(added)
}

fn new_grant(
    organization_id: OrganizationId,
    module_id: ModuleId,
    fields: &GrantFields,
) -> organization_modules::ActiveModel {
    let now = Utc::now();
    organization_modules::ActiveModel {
        id: Set(Uuid::now_v7()),
        organization_id: Set(organization_id.into_inner()),
        module_id: Set(module_id.into_inner()),
        is_active: Set(fields.is_active),
        status: Set(fields.status),
        start_date: Set(fields.start_date.unwrap_or(now).into()),
        end_date: Set(fields.end_date.map(Into::into)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

async fn find_grant<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    module_id: ModuleId,
) -> Result<Option<organization_modules::Model>, DbErr> {
    organization_modules::Entity::find()
        .filter(organization_modules::Column::OrganizationId.eq(organization_id.into_inner()))
        .filter(organization_modules::Column::ModuleId.eq(module_id.into_inner()))
        .one(conn)
        .await
}

async fn ensure_targets_exist<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    module_id: ModuleId,
) -> Result<(), StoreError> {
    if organizations::Entity::find_by_id(organization_id.into_inner())
        .one(conn)
        .await?
        .is_none()
    {
        return Err(StoreError::NotFound(format!("Organization {organization_id}")));
    }
    if modules::Entity::find_by_id(module_id.into_inner())
        .one(conn)
        .await?
        .is_none()
    {
        return Err(StoreError::NotFound(format!("Module {module_id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grant_defaults() {
        let org = OrganizationId::new();
        let module = ModuleId::new();
        let grant = new_grant(org, module, &GrantFields::active());

        assert_eq!(grant.organization_id.as_ref(), &org.into_inner());
        assert_eq!(grant.module_id.as_ref(), &module.into_inner());
        assert_eq!(grant.is_active.as_ref(), &true);
        assert_eq!(grant.status.as_ref(), &GrantStatus::Active);
        assert_eq!(grant.end_date.as_ref(), &None);
    }

    #[test]
    fn test_toggled_fields() {
        let off = GrantFields::toggled(false);
        assert!(!off.is_active);
        assert_eq!(off.status, GrantStatus::Inactive);

        let on = GrantFields::toggled(true);
        assert!(on.is_active);
        assert_eq!(on.status, GrantStatus::Active);
    }
}
