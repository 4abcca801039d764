//! Approval model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::role::{ApprovalType, ManagerRole, UnknownValue};

/// Lifecycle state of an approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    #[serde(alias = "declined")]
    Rejected,
}

impl ApprovalStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, ApprovalStatus::Pending)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `declined` is read as `rejected`.
impl FromStr for ApprovalStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" | "declined" => Ok(ApprovalStatus::Rejected),
            _ => Err(UnknownValue::new("status", s)),
        }
    }
}

/// Risk level reported by the originating alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(RiskLevel::High),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "LOW" => Ok(RiskLevel::Low),
            _ => Err(UnknownValue::new("risk level", s)),
        }
    }
}

/// Display priority, echoed from the risk level when the approval is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    /// Identity mapping from risk level; no risk level means `Medium`.
    pub fn from_risk(risk: Option<RiskLevel>) -> Self {
        match risk {
            Some(RiskLevel::High) => Priority::High,
            Some(RiskLevel::Medium) => Priority::Medium,
            Some(RiskLevel::Low) => Priority::Low,
            None => Priority::default(),
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<RiskLevel>()
            .map(|risk| Priority::from_risk(Some(risk)))
            .map_err(|_| UnknownValue::new("priority", s))
    }
}

/// Approval entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub id: Uuid,
    pub business_id: Uuid,
    pub required_role: ManagerRole,
    pub approval_type: ApprovalType,
    pub product_name: String,
    pub quantity: String,
    pub location: String,
    pub days_left: i32,
    pub risk_level: Option<RiskLevel>,
    pub ai_suggestion: String,
    pub priority: Priority,
    pub submitted_by: Uuid,
    pub status: ApprovalStatus,
    pub reviewed_by: Option<Uuid>,
    pub comments: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// New approval creation payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewApproval {
    pub business_id: Uuid,
    pub required_role: ManagerRole,
    pub approval_type: ApprovalType,
    pub product_name: String,
    pub quantity: String,
    pub location: String,
    pub days_left: i32,
    pub risk_level: Option<RiskLevel>,
    pub ai_suggestion: String,
    pub priority: Priority,
    pub submitted_by: Uuid,
}

impl NewApproval {
    /// Materialize the record a store persists, status `pending`
    pub fn into_approval(self, id: Uuid, created_at: DateTime<Utc>) -> Approval {
        Approval {
            id,
            business_id: self.business_id,
            required_role: self.required_role,
            approval_type: self.approval_type,
            product_name: self.product_name,
            quantity: self.quantity,
            location: self.location,
            days_left: self.days_left,
            risk_level: self.risk_level,
            ai_suggestion: self.ai_suggestion,
            priority: self.priority,
            submitted_by: self.submitted_by,
            status: ApprovalStatus::Pending,
            reviewed_by: None,
            comments: None,
            decided_at: None,
            created_at,
        }
    }
}

/// Terminal state a manager moves a pending approval to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Reject,
}

impl Verdict {
    pub const fn status(self) -> ApprovalStatus {
        match self {
            Verdict::Approve => ApprovalStatus::Approved,
            Verdict::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// Fields written by a decision
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub status: ApprovalStatus,
    pub reviewer_id: Uuid,
    pub notes: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// Spoilage alert accepted for manager review
///
/// Only `product_name` is required; the rest fall back to the defaults
/// applied by `ApprovalService::create_from_alert`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertData {
    #[serde(default)]
    pub product_name: String,
    pub quantity: Option<String>,
    pub location: Option<String>,
    pub days_left: Option<i32>,
    pub risk_level: Option<String>,
    pub ai_suggestion: Option<String>,
}
