//! Repositories for database operations

pub mod approval;

pub use approval::PgApprovalStore;
