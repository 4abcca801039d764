//! Persistence contract for approvals

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{Approval, ApprovalStatus, Decision, ManagerRole, NewApproval};

pub mod memory;

pub use memory::InMemoryApprovalStore;

/// Store accessor for the approvals table
///
/// Every query is scoped to one business and one manager role. Records come
/// back in canonical shape: one `id`, one `comments`.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Approvals of a role in the given status, newest first
    async fn find_by_business_role_and_status(
        &self,
        business_id: Uuid,
        role: ManagerRole,
        status: ApprovalStatus,
    ) -> DatabaseResult<Vec<Approval>>;

    /// Number of pending approvals of a role
    async fn count_pending_by_business_and_role(
        &self,
        business_id: Uuid,
        role: ManagerRole,
    ) -> DatabaseResult<i64>;

    /// Up to `limit` decided approvals of a role, most recently decided first
    async fn find_history_by_business_and_role(
        &self,
        business_id: Uuid,
        role: ManagerRole,
        limit: i64,
    ) -> DatabaseResult<Vec<Approval>>;

    /// A single approval, only if it belongs to this business and role
    async fn find_by_id_and_role(
        &self,
        business_id: Uuid,
        approval_id: Uuid,
        role: ManagerRole,
    ) -> DatabaseResult<Option<Approval>>;

    /// Apply a decision to an approval that is still pending
    ///
    /// The status check and the write are one atomic step. Returns the
    /// number of rows changed; zero means the approval was not pending (or
    /// not visible to this business and role).
    async fn update_status_with_role(
        &self,
        business_id: Uuid,
        approval_id: Uuid,
        role: ManagerRole,
        decision: &Decision,
    ) -> DatabaseResult<u64>;

    /// Persist a new pending approval
    async fn create(&self, approval: NewApproval) -> DatabaseResult<Approval>;
}
