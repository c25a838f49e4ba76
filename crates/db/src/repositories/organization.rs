//! Organization repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use backoffice_core::plan_change::OrganizationStatus;
use backoffice_shared::types::OrganizationId;

use crate::entities::{organizations, plan_history, plans};
use crate::rls::RlsExt;

use super::error::StoreError;

/// Input for creating an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganizationInput {
    /// Display name.
    pub name: String,
    /// Contact email, used as the notification recipient.
    pub email: String,
    /// Initial registration status.
    pub status: OrganizationStatus,
}

/// Input for updating an organization's profile.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrganizationInput {
    /// New display name.
    pub name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New registration status.
    pub status: Option<OrganizationStatus>,
}

/// An organization awaiting a plan change decision.
#[derive(Debug, Clone)]
pub struct PendingPlanChange {
    /// The organization.
    pub organization: organizations::Model,
    /// The requested plan.
    pub requested_plan: Option<plans::Model>,
}

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Gets an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the organization does not exist.
    pub async fn get_organization(
        &self,
        id: OrganizationId,
    ) -> Result<organizations::Model, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Organization {id}")))
    }

    /// Creates an organization with no plan.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` for a status that cannot be assigned directly.
    pub async fn create(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<organizations::Model, StoreError> {
        if input.status == OrganizationStatus::PendingPlanChange {
            return Err(StoreError::InvalidState(
                "A new organization cannot start with a pending plan change".into(),
            ));
        }

        let now = Utc::now().into();
        let org = organizations::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            email: Set(input.email),
            status: Set(input.status.into()),
            plan_id: Set(None),
            plan_tier: Set(None),
            requested_plan_id: Set(None),
            plan_requested_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(org.insert(&self.db).await?)
    }

    /// Lists organizations with an outstanding plan change request, oldest
    /// request first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_pending_plan_changes(&self) -> Result<Vec<PendingPlanChange>, DbErr> {
        let orgs = organizations::Entity::find()
            .filter(organizations::Column::RequestedPlanId.is_not_null())
            .order_by_asc(organizations::Column::PlanRequestedAt)
            .all(&self.db)
            .await?;

        let plan_ids: Vec<Uuid> = orgs.iter().filter_map(|o| o.requested_plan_id).collect();
        let plans = plans::Entity::find()
            .filter(plans::Column::Id.is_in(plan_ids))
            .all(&self.db)
            .await?;

        Ok(orgs
            .into_iter()
            .map(|organization| {
                let requested_plan = organization
                    .requested_plan_id
                    .and_then(|id| plans.iter().find(|p| p.id == id).cloned());
                PendingPlanChange {
                    organization,
                    requested_plan,
                }
            })
            .collect())
    }

    /// Updates name, email and registration status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the organization does not exist, and
    /// `InvalidState` if the status cannot be set directly or a plan change
    /// request is outstanding.
    pub async fn update_profile(
        &self,
        id: OrganizationId,
        input: UpdateOrganizationInput,
    ) -> Result<organizations::Model, StoreError> {
        let txn = self.db.begin().await?;
        let org = organizations::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Organization {id}")))?;
        let mut active: organizations::ActiveModel = org.clone().into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(status) = input.status {
            if !status.is_directly_assignable() {
                return Err(StoreError::InvalidState(format!(
                    "Status {status} cannot be set directly"
                )));
            }
            if org.requested_plan_id.is_some() {
                return Err(StoreError::InvalidState(
                    "Resolve the pending plan change before changing status".into(),
                ));
            }
            info!(organization_id = %id, %status, "Setting organization status");
            active.status = Set(status.into());
        }

        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Lists an organization's plan history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_history(
        &self,
        id: OrganizationId,
    ) -> Result<Vec<plan_history::Model>, DbErr> {
        let rls = self.db.with_rls(id).await?;
        let history = plan_history::Entity::find()
            .filter(plan_history::Column::OrganizationId.eq(id.into_inner()))
            .order_by_asc(plan_history::Column::ChangedAt)
            .order_by_asc(plan_history::Column::Id)
            .all(rls.transaction())
            .await?;
        rls.commit().await?;
        Ok(history)
    }
}
