//! Approval workflow service
//!
//! Composes the role resolver with an [`ApprovalStore`]. Each operation is a
//! pure function of the caller, its arguments and the store; nothing is
//! cached between calls.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::authorization::{ensure_manager_role, resolve_readable_role};
use crate::error::{ApprovalError, ApprovalResult};
use crate::models::{
    AlertData, Approval, ApprovalStatus, ApprovalType, Caller, Decision, ManagerRole,
    NewApproval, Priority, Verdict,
};
use crate::store::ApprovalStore;

/// History size when the caller does not ask for one
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
/// Largest history page served
pub const MAX_HISTORY_LIMIT: i64 = 200;

const DEFAULT_QUANTITY: &str = "N/A";
const DEFAULT_LOCATION: &str = "Warehouse";

/// Approvals of one queue in one status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalList {
    pub approvals: Vec<Approval>,
    pub count: usize,
    pub role: ManagerRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingCount {
    pub count: i64,
}

/// Decided approvals of one queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalHistory {
    pub history: Vec<Approval>,
    pub count: usize,
    pub role: ManagerRole,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedApproval {
    pub approval: Approval,
}

/// Approval workflow over a shared store
#[derive(Clone)]
pub struct ApprovalService {
    store: Arc<dyn ApprovalStore>,
}

impl ApprovalService {
    /// Create a new approval service
    pub fn new(store: Arc<dyn ApprovalStore>) -> Self {
        Self { store }
    }

    /// List the caller's queue in the given status (default `pending`)
    pub async fn list_approvals(
        &self,
        caller: Option<&Caller>,
        status: Option<&str>,
        requested_role: Option<&str>,
    ) -> ApprovalResult<ApprovalList> {
        let role = resolve_readable_role(caller, requested_role)?;
        let status = match status {
            Some(raw) => raw
                .parse::<ApprovalStatus>()
                .map_err(|_| ApprovalError::invalid_input(format!("Invalid status: {}", raw)))?,
            None => ApprovalStatus::Pending,
        };
        let business_id = business_of(caller)?;

        let approvals = self
            .store
            .find_by_business_role_and_status(business_id, role, status)
            .await?;

        Ok(ApprovalList {
            count: approvals.len(),
            approvals,
            role,
        })
    }

    /// Number of pending approvals in the caller's queue
    pub async fn get_pending_count(
        &self,
        caller: Option<&Caller>,
        requested_role: Option<&str>,
    ) -> ApprovalResult<PendingCount> {
        let role = resolve_readable_role(caller, requested_role)?;
        let business_id = business_of(caller)?;

        let count = self
            .store
            .count_pending_by_business_and_role(business_id, role)
            .await?;

        Ok(PendingCount { count })
    }

    /// Most recently decided approvals of the caller's queue
    ///
    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`] and must lie in
    /// `1..=MAX_HISTORY_LIMIT`.
    pub async fn get_approval_history(
        &self,
        caller: Option<&Caller>,
        limit: Option<i64>,
        requested_role: Option<&str>,
    ) -> ApprovalResult<ApprovalHistory> {
        let role = resolve_readable_role(caller, requested_role)?;
        let business_id = business_of(caller)?;
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
            return Err(ApprovalError::invalid_input(format!(
                "limit must be between 1 and {}",
                MAX_HISTORY_LIMIT
            )));
        }

        let history = self
            .store
            .find_history_by_business_and_role(business_id, role, limit)
            .await?;

        Ok(ApprovalHistory {
            count: history.len(),
            history,
            role,
        })
    }

    pub async fn approve_item(
        &self,
        caller: Option<&Caller>,
        approval_id: Uuid,
        notes: Option<String>,
    ) -> ApprovalResult<()> {
        self.decide(caller, approval_id, notes, Verdict::Approve)
            .await
    }

    pub async fn reject_item(
        &self,
        caller: Option<&Caller>,
        approval_id: Uuid,
        notes: Option<String>,
    ) -> ApprovalResult<()> {
        self.decide(caller, approval_id, notes, Verdict::Reject).await
    }

    async fn decide(
        &self,
        caller: Option<&Caller>,
        approval_id: Uuid,
        notes: Option<String>,
        verdict: Verdict,
    ) -> ApprovalResult<()> {
        let caller = caller.ok_or(ApprovalError::Unauthenticated)?;
        let role = ensure_manager_role(Some(caller))?;

        let approval = self
            .store
            .find_by_id_and_role(caller.business_id, approval_id, role)
            .await?
            .ok_or_else(ApprovalError::not_found)?;

        if !approval.status.is_pending() {
            warn!(%approval_id, status = %approval.status, "Approval already reviewed");
            return Err(ApprovalError::already_reviewed());
        }

        let decision = Decision {
            status: verdict.status(),
            reviewer_id: caller.user_id,
            notes: notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            decided_at: Utc::now(),
        };

        // The store re-checks `pending` in the same write; a concurrent
        // decision that got there first leaves zero rows changed.
        let changed = self
            .store
            .update_status_with_role(caller.business_id, approval_id, role, &decision)
            .await?;
        if changed == 0 {
            warn!(%approval_id, "Approval decided concurrently");
            return Err(ApprovalError::already_reviewed());
        }

        info!(
            %approval_id,
            reviewer = %caller.user_id,
            status = %decision.status,
            "Approval reviewed"
        );
        Ok(())
    }

    /// Open a spoilage-action approval for the inventory manager from an
    /// accepted alert
    pub async fn create_from_alert(
        &self,
        caller: Option<&Caller>,
        alert: AlertData,
    ) -> ApprovalResult<CreatedApproval> {
        let caller = caller.ok_or(ApprovalError::Unauthenticated)?;

        let product_name = alert.product_name.trim();
        if product_name.is_empty() {
            return Err(ApprovalError::invalid_input("product_name is required"));
        }

        let risk_level = alert.risk_level.as_deref().and_then(|r| r.parse().ok());
        let new_approval = NewApproval {
            business_id: caller.business_id,
            required_role: ManagerRole::InventoryManager,
            approval_type: ApprovalType::SpoilageAction,
            product_name: product_name.to_string(),
            quantity: non_blank(alert.quantity).unwrap_or_else(|| DEFAULT_QUANTITY.to_string()),
            location: non_blank(alert.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            days_left: alert.days_left.unwrap_or(0),
            risk_level,
            ai_suggestion: alert.ai_suggestion.unwrap_or_default(),
            priority: Priority::from_risk(risk_level),
            submitted_by: caller.user_id,
        };

        let approval = self.store.create(new_approval).await?;
        info!(
            approval_id = %approval.id,
            product = %approval.product_name,
            priority = approval.priority.as_str(),
            "Approval created from alert"
        );

        Ok(CreatedApproval { approval })
    }
}

fn business_of(caller: Option<&Caller>) -> ApprovalResult<Uuid> {
    caller
        .map(|c| c.business_id)
        .ok_or(ApprovalError::Unauthenticated)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
