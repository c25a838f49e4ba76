//! Plan change domain types.
//!
//! These types describe an organization's plan state and the transitions the
//! plan change workflow produces.

use backoffice_shared::types::{OrganizationId, PlanId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tier::{PlanTier, TierChange};

/// Organization lifecycle status.
///
/// Registration moves `pending` to `approved` or `rejected`. Plan changes move
/// any requestable status to `pending_plan_change` and back to `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    /// Registration awaiting review.
    Pending,
    /// Registration approved.
    Approved,
    /// Registration rejected.
    Rejected,
    /// Operating normally.
    Active,
    /// A plan change request is outstanding.
    PendingPlanChange,
}

impl OrganizationStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Active => "active",
            Self::PendingPlanChange => "pending_plan_change",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "active" => Some(Self::Active),
            "pending_plan_change" => Some(Self::PendingPlanChange),
            _ => None,
        }
    }

    /// Returns true if a plan change may be requested from this status.
    ///
    /// Requesting while already pending replaces the outstanding request.
    #[must_use]
    pub const fn can_request_plan_change(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Active | Self::PendingPlanChange
        )
    }

    /// Returns true if an administrator may set this status directly.
    ///
    /// `pending_plan_change` is only reachable through a request.
    #[must_use]
    pub const fn is_directly_assignable(&self) -> bool {
        !matches!(self, Self::PendingPlanChange)
    }
}

impl fmt::Display for OrganizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog plan as seen by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRef {
    /// Plan ID.
    pub id: PlanId,
    /// Plan display name.
    pub name: String,
    /// Plan tier.
    pub tier: PlanTier,
    /// Inactive plans cannot be requested.
    pub is_active: bool,
}

/// The plan-related state of one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationSnapshot {
    /// Organization ID.
    pub id: OrganizationId,
    /// Lifecycle status.
    pub status: OrganizationStatus,
    /// Current plan, if one has been assigned.
    pub plan_id: Option<PlanId>,
    /// Tier of the current plan.
    pub plan_tier: Option<PlanTier>,
    /// Outstanding requested plan.
    pub requested_plan_id: Option<PlanId>,
    /// When the outstanding request was made.
    pub plan_requested_at: Option<DateTime<Utc>>,
}

impl OrganizationSnapshot {
    /// `requested_plan_id` is set exactly when the status is `pending_plan_change`.
    #[must_use]
    pub fn satisfies_request_invariant(&self) -> bool {
        self.requested_plan_id.is_some() == (self.status == OrganizationStatus::PendingPlanChange)
    }

    /// Returns true if a plan change request is outstanding.
    #[must_use]
    pub const fn has_pending_request(&self) -> bool {
        self.requested_plan_id.is_some()
    }
}

/// Discriminant of a plan history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// Moved to a higher tier.
    Upgrade,
    /// Moved to a lower tier.
    Downgrade,
    /// Moved within the same tier.
    Same,
    /// A request was rejected.
    Rejected,
}

impl HistoryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
            Self::Same => "same",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "upgrade" => Some(Self::Upgrade),
            "downgrade" => Some(Self::Downgrade),
            "same" => Some(Self::Same),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl From<TierChange> for HistoryKind {
    fn from(change: TierChange) -> Self {
        match change {
            TierChange::Upgrade => Self::Upgrade,
            TierChange::Downgrade => Self::Downgrade,
            TierChange::Same => Self::Same,
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An approved move from one plan to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTransition {
    /// Plan before the change.
    pub previous_plan_id: Option<PlanId>,
    /// Tier before the change.
    pub previous_tier: Option<PlanTier>,
    /// Plan after the change.
    pub new_plan_id: PlanId,
    /// Tier after the change.
    pub new_tier: PlanTier,
    /// Approving administrator.
    pub changed_by: UserId,
    /// When the change was approved.
    pub changed_at: DateTime<Utc>,
}

/// A rejected plan change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRejection {
    /// Plan the organization stays on.
    pub current_plan_id: Option<PlanId>,
    /// Tier the organization stays on.
    pub current_tier: Option<PlanTier>,
    /// The plan that was requested.
    pub requested_plan_id: PlanId,
    /// Optional reason given by the administrator.
    pub reason: Option<String>,
    /// Rejecting administrator.
    pub changed_by: UserId,
    /// When the request was rejected.
    pub changed_at: DateTime<Utc>,
}

/// One entry of an organization's append-only plan history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlanHistoryEntry {
    /// Approved change to a higher tier.
    Upgrade(PlanTransition),
    /// Approved change to a lower tier.
    Downgrade(PlanTransition),
    /// Approved change within one tier.
    Same(PlanTransition),
    /// Rejected request.
    Rejected(PlanRejection),
}

impl PlanHistoryEntry {
    /// Builds an approval entry, classified by tier rank.
    #[must_use]
    pub fn transition(transition: PlanTransition) -> Self {
        match TierChange::classify(transition.previous_tier, transition.new_tier) {
            TierChange::Upgrade => Self::Upgrade(transition),
            TierChange::Downgrade => Self::Downgrade(transition),
            TierChange::Same => Self::Same(transition),
        }
    }

    /// Returns the entry's discriminant.
    #[must_use]
    pub const fn kind(&self) -> HistoryKind {
        match self {
            Self::Upgrade(_) => HistoryKind::Upgrade,
            Self::Downgrade(_) => HistoryKind::Downgrade,
            Self::Same(_) => HistoryKind::Same,
            Self::Rejected(_) => HistoryKind::Rejected,
        }
    }

    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        match self {
            Self::Upgrade(t) | Self::Downgrade(t) | Self::Same(t) => t.changed_at,
            Self::Rejected(r) => r.changed_at,
        }
    }

    /// Returns who recorded the entry.
    #[must_use]
    pub const fn changed_by(&self) -> UserId {
        match self {
            Self::Upgrade(t) | Self::Downgrade(t) | Self::Same(t) => t.changed_by,
            Self::Rejected(r) => r.changed_by,
        }
    }

    /// Returns the approved transition, if this entry is one.
    #[must_use]
    pub const fn as_transition(&self) -> Option<&PlanTransition> {
        match self {
            Self::Upgrade(t) | Self::Downgrade(t) | Self::Same(t) => Some(t),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the rejection, if this entry is one.
    #[must_use]
    pub const fn as_rejection(&self) -> Option<&PlanRejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// A validated plan change transition with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanChangeAction {
    /// Record a request for a new plan.
    Request {
        /// Always `pending_plan_change`.
        new_status: OrganizationStatus,
        /// The requested plan.
        requested_plan_id: PlanId,
        /// A previous outstanding request that this one replaces.
        replaces: Option<PlanId>,
        /// Requesting user.
        requested_by: UserId,
        /// When the request was made.
        requested_at: DateTime<Utc>,
    },
    /// Move the organization onto the requested plan.
    Approve {
        /// Always `active`.
        new_status: OrganizationStatus,
        /// Plan to assign.
        plan_id: PlanId,
        /// Tier of the assigned plan.
        plan_tier: PlanTier,
        /// Classification of the move.
        change: TierChange,
        /// History entry to append.
        history: PlanHistoryEntry,
    },
    /// Drop the outstanding request.
    Reject {
        /// Always `active`.
        new_status: OrganizationStatus,
        /// History entry to append.
        history: PlanHistoryEntry,
    },
}

impl PlanChangeAction {
    /// Returns the status the organization moves to.
    #[must_use]
    pub const fn new_status(&self) -> OrganizationStatus {
        match self {
            Self::Request { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. } => *new_status,
        }
    }

    /// Returns the history entry this action appends, if any.
    #[must_use]
    pub const fn history(&self) -> Option<&PlanHistoryEntry> {
        match self {
            Self::Request { .. } => None,
            Self::Approve { history, .. } | Self::Reject { history, .. } => Some(history),
        }
    }
}
