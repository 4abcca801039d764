//! Application state shared across handlers

use approvals::ApprovalService;
use sqlx::PgPool;

use crate::middleware::JwtVerifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Absent when approvals are kept in memory
    pub db_pool: Option<PgPool>,
    pub approval_service: ApprovalService,
    pub jwt_verifier: JwtVerifier,
}
