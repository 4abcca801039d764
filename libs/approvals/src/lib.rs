//! Role-scoped approval workflow for the eco-tracking backend
//!
//! Approvals are opened from spoilage alerts and decided (approved or
//! rejected) by exactly one manager role. Admins can read every manager
//! queue for oversight but never decide.
//!
//! - [`authorization`] resolves which queue a caller may read or decide
//! - [`store`] is the persistence contract, with an in-memory implementation
//! - [`service`] implements the list, count, history, decision and
//!   create-from-alert operations

pub mod authorization;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use error::{ApprovalError, ApprovalResult};
pub use service::ApprovalService;
pub use store::{ApprovalStore, InMemoryApprovalStore};
