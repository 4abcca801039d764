//! PostgreSQL approval store

use approvals::models::{Approval, ApprovalStatus, Decision, ManagerRole, NewApproval};
use approvals::store::ApprovalStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

const APPROVAL_COLUMNS: &str = r#"
    id, business_id, required_role, approval_type, product_name, quantity, location,
    days_left, risk_level, ai_suggestion, priority, submitted_by, status, reviewed_by,
    comments, decided_at, created_at
"#;

/// Database row mapping for the approvals table
#[derive(Debug, FromRow)]
struct ApprovalRow {
    id: Uuid,
    business_id: Uuid,
    required_role: String,
    approval_type: String,
    product_name: String,
    quantity: String,
    location: String,
    days_left: i32,
    risk_level: Option<String>,
    ai_suggestion: String,
    priority: String,
    submitted_by: Uuid,
    status: String,
    reviewed_by: Option<Uuid>,
    comments: Option<String>,
    decided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn decode<T: FromStr>(column: &str, value: &str) -> DatabaseResult<T> {
    value.parse().map_err(|_| {
        DatabaseError::Decode(format!("unexpected value '{}' in column {}", value, column))
    })
}

impl TryFrom<ApprovalRow> for Approval {
    type Error = DatabaseError;

    fn try_from(row: ApprovalRow) -> Result<Self, Self::Error> {
        Ok(Approval {
            id: row.id,
            business_id: row.business_id,
            required_role: decode("required_role", &row.required_role)?,
            approval_type: decode("approval_type", &row.approval_type)?,
            product_name: row.product_name,
            quantity: row.quantity,
            location: row.location,
            days_left: row.days_left,
            risk_level: row
                .risk_level
                .as_deref()
                .map(|r| decode("risk_level", r))
                .transpose()?,
            ai_suggestion: row.ai_suggestion,
            priority: decode("priority", &row.priority)?,
            submitted_by: row.submitted_by,
            status: decode("status", &row.status)?,
            reviewed_by: row.reviewed_by,
            comments: row.comments,
            decided_at: row.decided_at,
            created_at: row.created_at,
        })
    }
}

fn into_approvals(rows: Vec<ApprovalRow>) -> DatabaseResult<Vec<Approval>> {
    rows.into_iter().map(Approval::try_from).collect()
}

/// Approval store for database operations
#[derive(Clone)]
pub struct PgApprovalStore {
    pool: PgPool,
}

impl PgApprovalStore {
    /// Create a new approval store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalStore for PgApprovalStore {
    async fn find_by_business_role_and_status(
        &self,
        business_id: Uuid,
        role: ManagerRole,
        status: ApprovalStatus,
    ) -> DatabaseResult<Vec<Approval>> {
        let rows = sqlx::query_as::<_, ApprovalRow>(&format!(
            r#"
            SELECT {APPROVAL_COLUMNS}
            FROM approvals
            WHERE business_id = $1 AND required_role = $2 AND status = $3
            ORDER BY created_at DESC, id
            "#
        ))
        .bind(business_id)
        .bind(role.as_str())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_approvals(rows)
    }

    async fn count_pending_by_business_and_role(
        &self,
        business_id: Uuid,
        role: ManagerRole,
    ) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM approvals
            WHERE business_id = $1 AND required_role = $2 AND status = 'pending'
            "#,
        )
        .bind(business_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn find_history_by_business_and_role(
        &self,
        business_id: Uuid,
        role: ManagerRole,
        limit: i64,
    ) -> DatabaseResult<Vec<Approval>> {
        let rows = sqlx::query_as::<_, ApprovalRow>(&format!(
            r#"
            SELECT {APPROVAL_COLUMNS}
            FROM approvals
            WHERE business_id = $1 AND required_role = $2 AND status <> 'pending'
            ORDER BY decided_at DESC NULLS LAST, created_at DESC, id
            LIMIT $3
            "#
        ))
        .bind(business_id)
        .bind(role.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_approvals(rows)
    }

    async fn find_by_id_and_role(
        &self,
        business_id: Uuid,
        approval_id: Uuid,
        role: ManagerRole,
    ) -> DatabaseResult<Option<Approval>> {
        let row = sqlx::query_as::<_, ApprovalRow>(&format!(
            r#"
            SELECT {APPROVAL_COLUMNS}
            FROM approvals
            WHERE id = $1 AND business_id = $2 AND required_role = $3
            "#
        ))
        .bind(approval_id)
        .bind(business_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Approval::try_from).transpose()
    }

    async fn update_status_with_role(
        &self,
        business_id: Uuid,
        approval_id: Uuid,
        role: ManagerRole,
        decision: &Decision,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE approvals
            SET status = $1, reviewed_by = $2, comments = $3, decided_at = $4
            WHERE id = $5 AND business_id = $6 AND required_role = $7 AND status = 'pending'
            "#,
        )
        .bind(decision.status.as_str())
        .bind(decision.reviewer_id)
        .bind(decision.notes.as_deref())
        .bind(decision.decided_at)
        .bind(approval_id)
        .bind(business_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn create(&self, approval: NewApproval) -> DatabaseResult<Approval> {
        let row = sqlx::query_as::<_, ApprovalRow>(&format!(
            r#"
            INSERT INTO approvals (
                business_id, required_role, approval_type, product_name, quantity, location,
                days_left, risk_level, ai_suggestion, priority, submitted_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {APPROVAL_COLUMNS}
            "#
        ))
        .bind(approval.business_id)
        .bind(approval.required_role.as_str())
        .bind(approval.approval_type.as_str())
        .bind(&approval.product_name)
        .bind(&approval.quantity)
        .bind(&approval.location)
        .bind(approval.days_left)
        .bind(approval.risk_level.map(|r| r.as_str()))
        .bind(&approval.ai_suggestion)
        .bind(approval.priority.as_str())
        .bind(approval.submitted_by)
        .fetch_one(&self.pool)
        .await?;

        Approval::try_from(row)
    }
}
