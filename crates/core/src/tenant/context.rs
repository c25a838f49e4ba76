//! Per-request tenant context.

use backoffice_shared::auth::{Claims, Role};
use backoffice_shared::types::{OrganizationId, UserId};

use crate::tenant::error::TenantError;

/// The acting user, their organization and their role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    user_id: UserId,
    organization_id: OrganizationId,
    role: Role,
}

impl TenantContext {
    /// Creates a context.
    #[must_use]
    pub const fn new(user_id: UserId, organization_id: OrganizationId, role: Role) -> Self {
        Self {
            user_id,
            organization_id,
            role,
        }
    }

    /// Builds a context from validated session claims.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if the claims carry an unknown role.
    pub fn from_claims(claims: &Claims) -> Result<Self, TenantError> {
        let role = claims.role().ok_or(TenantError::Unauthenticated)?;
        Ok(Self::new(
            UserId::from_uuid(claims.user_id()),
            OrganizationId::from_uuid(claims.organization_id()),
            role,
        ))
    }

    /// The acting user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The session's organization; every tenant query is parameterized by it.
    #[must_use]
    pub const fn current_organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// The session role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns true for the platform admin, who is not bound to one tenant.
    #[must_use]
    pub const fn is_platform_admin(&self) -> bool {
        self.role.is_platform_admin()
    }

    /// Checks that the context may act on `target`.
    ///
    /// Platform admins may act on any organization.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when `target` is another tenant.
    pub fn authorize(&self, target: OrganizationId) -> Result<(), TenantError> {
        if self.is_platform_admin() || self.organization_id == target {
            Ok(())
        } else {
            Err(TenantError::Forbidden { target })
        }
    }

    /// Checks that the context may administer `target`.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for another tenant and `InsufficientRole` for members.
    pub fn authorize_admin(&self, target: OrganizationId) -> Result<(), TenantError> {
        self.authorize(target)?;
        match self.role {
            Role::SuperAdmin | Role::Admin => Ok(()),
            Role::Member => Err(TenantError::InsufficientRole {
                role: self.role,
                action: "administer the organization",
            }),
        }
    }

    /// Checks for the platform admin role.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientRole` for any other role.
    pub fn require_platform_admin(&self) -> Result<(), TenantError> {
        if self.is_platform_admin() {
            Ok(())
        } else {
            Err(TenantError::InsufficientRole {
                role: self.role,
                action: "manage plan change requests",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;

    fn context(role: Role) -> TenantContext {
        TenantContext::new(UserId::new(), OrganizationId::new(), role)
    }

    #[test]
    fn test_from_claims() {
        let user = UserId::new();
        let org = OrganizationId::new();
        let claims = Claims::new(
            user.into_inner(),
            org.into_inner(),
            Role::Admin,
            Utc::now() + Duration::hours(1),
        );

        let ctx = TenantContext::from_claims(&claims).unwrap();
        assert_eq!(ctx.user_id(), user);
        assert_eq!(ctx.current_organization_id(), org);
        assert_eq!(ctx.role(), Role::Admin);
    }

    #[test]
    fn test_from_claims_unknown_role() {
        let mut claims = Claims::new(
            UserId::new().into_inner(),
            OrganizationId::new().into_inner(),
            Role::Member,
            Utc::now() + Duration::hours(1),
        );
        claims.role = "owner".to_string();

        assert!(matches!(
            TenantContext::from_claims(&claims),
            Err(TenantError::Unauthenticated)
        ));
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Member)]
    fn test_own_organization_allowed(#[case] role: Role) {
        let ctx = context(role);
        assert!(ctx.authorize(ctx.current_organization_id()).is_ok());
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Member)]
    fn test_other_organization_forbidden(#[case] role: Role) {
        let ctx = context(role);
        let other = OrganizationId::new();
        let err = ctx.authorize(other).unwrap_err();
        assert!(matches!(err, TenantError::Forbidden { target } if target == other));
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_platform_admin_bypasses_scope() {
        let ctx = context(Role::SuperAdmin);
        assert!(ctx.authorize(OrganizationId::new()).is_ok());
        assert!(ctx.authorize_admin(OrganizationId::new()).is_ok());
        assert!(ctx.require_platform_admin().is_ok());
    }

    #[test]
    fn test_member_cannot_administer() {
        let ctx = context(Role::Member);
        let err = ctx.authorize_admin(ctx.current_organization_id()).unwrap_err();
        assert!(matches!(err, TenantError::InsufficientRole { .. }));
    }

    #[test]
    fn test_org_admin_is_not_platform_admin() {
        let ctx = context(Role::Admin);
        assert!(ctx.authorize_admin(ctx.current_organization_id()).is_ok());
        assert!(matches!(
            ctx.require_platform_admin(),
            Err(TenantError::InsufficientRole { role: Role::Admin, .. })
        ));
    }

    #[test]
    fn test_error_converts_to_app_error() {
        use backoffice_shared::AppError;

        let app: AppError = TenantError::Unauthenticated.into();
        assert_eq!(app.status_code(), 401);

        let app: AppError = TenantError::Forbidden {
            target: OrganizationId::new(),
        }
        .into();
        assert_eq!(app.status_code(), 403);
    }
}
