//! In-memory approval store for tests and local runs

use async_trait::async_trait;
use chrono::Utc;
use common::error::DatabaseResult;
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ApprovalStore;
use crate::models::{Approval, ApprovalStatus, Decision, ManagerRole, NewApproval};

#[derive(Default)]
pub struct InMemoryApprovalStore {
    approvals: RwLock<HashMap<Uuid, Approval>>,
}

impl InMemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as is, bypassing the creation defaults
    pub async fn insert(&self, approval: Approval) {
        let mut approvals = self.approvals.write().await;
        approvals.insert(approval.id, approval);
    }

    /// Fetch a record by id without any scoping
    pub async fn get(&self, approval_id: Uuid) -> Option<Approval> {
        let approvals = self.approvals.read().await;
        approvals.get(&approval_id).cloned()
    }
}

fn in_scope(approval: &Approval, business_id: Uuid, role: ManagerRole) -> bool {
    approval.business_id == business_id && approval.required_role == role
}

#[async_trait]
impl ApprovalStore for InMemoryApprovalStore {
    async fn find_by_business_role_and_status(
        &self,
        business_id: Uuid,
        role: ManagerRole,
        status: ApprovalStatus,
    ) -> DatabaseResult<Vec<Approval>> {
        let approvals = self.approvals.read().await;
        let mut found: Vec<Approval> = approvals
            .values()
            .filter(|a| in_scope(a, business_id, role) && a.status == status)
            .cloned()
            .collect();
        found.sort_by_key(|a| (Reverse(a.created_at), a.id));
        Ok(found)
    }

    async fn count_pending_by_business_and_role(
        &self,
        business_id: Uuid,
        role: ManagerRole,
    ) -> DatabaseResult<i64> {
        let approvals = self.approvals.read().await;
        let count = approvals
            .values()
            .filter(|a| in_scope(a, business_id, role) && a.status.is_pending())
            .count();
        Ok(count as i64)
    }

    async fn find_history_by_business_and_role(
        &self,
        business_id: Uuid,
        role: ManagerRole,
        limit: i64,
    ) -> DatabaseResult<Vec<Approval>> {
        let approvals = self.approvals.read().await;
        let mut history: Vec<Approval> = approvals
            .values()
            .filter(|a| in_scope(a, business_id, role) && !a.status.is_pending())
            .cloned()
            .collect();
        history.sort_by_key(|a| (Reverse(a.decided_at), Reverse(a.created_at), a.id));
        history.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(history)
    }

    async fn find_by_id_and_role(
        &self,
        business_id: Uuid,
        approval_id: Uuid,
        role: ManagerRole,
    ) -> DatabaseResult<Option<Approval>> {
        let approvals = self.approvals.read().await;
        Ok(approvals
            .get(&approval_id)
            .filter(|a| in_scope(a, business_id, role))
            .cloned())
    }

    async fn update_status_with_role(
        &self,
        business_id: Uuid,
        approval_id: Uuid,
        role: ManagerRole,
        decision: &Decision,
    ) -> DatabaseResult<u64> {
        // Check and write under the same guard.
        let mut approvals = self.approvals.write().await;
        let Some(approval) = approvals.get_mut(&approval_id) else {
            return Ok(0);
        };
        if !in_scope(approval, business_id, role) || !approval.status.is_pending() {
            return Ok(0);
        }

        approval.status = decision.status;
        approval.reviewed_by = Some(decision.reviewer_id);
        approval.comments = decision.notes.clone();
        approval.decided_at = Some(decision.decided_at);
        Ok(1)
    }

    async fn create(&self, approval: NewApproval) -> DatabaseResult<Approval> {
        let approval = approval.into_approval(Uuid::new_v4(), Utc::now());
        let mut approvals = self.approvals.write().await;
        approvals.insert(approval.id, approval.clone());
        Ok(approval)
    }
}
