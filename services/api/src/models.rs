//! API models for request and response payloads

use approvals::models::{ApprovalType, ManagerRole};
use serde::{Deserialize, Serialize};

/// Query parameters for queue listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalListQuery {
    /// Status filter (default: pending)
    pub status: Option<String>,
    /// Manager queue to read, admins only
    pub role: Option<String>,
}

/// Query parameters for the pending counter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingCountQuery {
    pub role: Option<String>,
}

/// Query parameters for decision history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of records, 1 to 200 (default: 50)
    pub limit: Option<i64>,
    pub role: Option<String>,
}

/// Body of an approve or reject call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionRequest {
    pub notes: Option<String>,
}

/// One row of the role to approval type table
#[derive(Debug, Clone, Serialize)]
pub struct RoleApprovalType {
    pub role: ManagerRole,
    pub approval_type: ApprovalType,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
