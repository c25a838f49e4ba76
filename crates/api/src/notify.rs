//! Plan change notifications.
//!
//! Notifications are built after the transaction commits and dispatched on a
//! spawned task. A failed dispatch is logged and never reaches the caller.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use backoffice_db::entities::{organizations, plans};
use backoffice_shared::email::{PLAN_APPROVED_TEMPLATE, PLAN_REJECTED_TEMPLATE};
use backoffice_shared::{Notification, Notifier};

/// Notification for an approved plan change.
#[must_use]
pub fn plan_approved(organization: &organizations::Model, plan: &plans::Model) -> Notification {
    Notification::new(
        &organization.email,
        format!("Your {} plan is now active", plan.name),
        PLAN_APPROVED_TEMPLATE,
        json!({
            "organizationName": organization.name,
            "planName": plan.name,
        }),
    )
}

/// Notification for a rejected plan change.
#[must_use]
pub fn plan_rejected(
    organization: &organizations::Model,
    requested_plan: Option<&plans::Model>,
    reason: Option<&str>,
) -> Notification {
    Notification::new(
        &organization.email,
        "Your plan change request was not approved",
        PLAN_REJECTED_TEMPLATE,
        json!({
            "organizationName": organization.name,
            "planName": requested_plan.map(|plan| plan.name.as_str()),
            "reason": reason,
        }),
    )
}

/// Dispatches `notification` in the background.
pub fn dispatch_in_background(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        let recipient = notification.recipient_email.clone();
        let template = notification.template_name.clone();
        match notifier.dispatch(notification).await {
            Ok(()) => debug!(recipient = %recipient, template = %template, "Notification sent"),
            Err(e) => warn!(
                error = %e,
                recipient = %recipient,
                template = %template,
                "Failed to send notification"
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use backoffice_db::entities::sea_orm_active_enums::OrganizationStatus;

    fn organization() -> organizations::Model {
        let now = Utc::now().into();
        organizations::Model {
            id: Uuid::now_v7(),
            name: "Acme Clinic".into(),
            email: "owner@acme.test".into(),
            status: OrganizationStatus::Active,
            plan_id: None,
            plan_tier: None,
            requested_plan_id: None,
            plan_requested_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn plan() -> plans::Model {
        let now = Utc::now().into();
        plans::Model {
            id: Uuid::now_v7(),
            name: "Pro".into(),
            tier: "pro".into(),
            price: Decimal::new(199, 0),
            features: json!([]),
            max_records: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_approved_notification() {
        let n = plan_approved(&organization(), &plan());

        assert_eq!(n.recipient_email, "owner@acme.test");
        assert_eq!(n.template_name, PLAN_APPROVED_TEMPLATE);
        assert_eq!(n.template_data["organizationName"], "Acme Clinic");
        assert_eq!(n.template_data["planName"], "Pro");
    }

    #[test]
    fn test_rejected_notification_without_plan() {
        let n = plan_rejected(&organization(), None, Some("over budget"));

        assert_eq!(n.template_name, PLAN_REJECTED_TEMPLATE);
        assert!(n.template_data["planName"].is_null());
        assert_eq!(n.template_data["reason"], "over budget");
    }
}
