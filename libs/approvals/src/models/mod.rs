//! Approval workflow models

pub mod approval;
pub mod caller;
pub mod role;

// Re-export for convenience
pub use approval::{
    AlertData, Approval, ApprovalStatus, Decision, NewApproval, Priority, RiskLevel, Verdict,
};
pub use caller::Caller;
pub use role::{ApprovalType, ManagerRole, ROLE_APPROVAL_TYPES, UnknownValue, UserRole};
