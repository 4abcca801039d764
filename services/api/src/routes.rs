//! API service routes

use approvals::ApprovalError;
use approvals::models::{AlertData, Caller, ROLE_APPROVAL_TYPES};
use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::auth_middleware,
    models::{
        ApprovalListQuery, DecisionRequest, HistoryQuery, MessageResponse, PendingCountQuery,
        RoleApprovalType,
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/approvals", get(list_approvals))
        .route("/approvals/count", get(pending_count))
        .route("/approvals/history", get(approval_history))
        .route("/approvals/types", get(approval_types))
        .route("/approvals/from-alert", post(create_from_alert))
        .route("/approvals/:id/approve", post(approve_item))
        .route("/approvals/:id/reject", post(reject_item))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match &state.db_pool {
        Some(pool) => match common::database::health_check(pool).await {
            Ok(true) => (StatusCode::OK, "up"),
            _ => (StatusCode::SERVICE_UNAVAILABLE, "down"),
        },
        None => (StatusCode::OK, "memory"),
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "service": "approval-service",
            "database": database,
        })),
    )
}

/// List the caller's approval queue
pub async fn list_approvals(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ApprovalListQuery>,
) -> ApiResult<impl IntoResponse> {
    let list = state
        .approval_service
        .list_approvals(
            Some(&caller),
            query.status.as_deref(),
            query.role.as_deref(),
        )
        .await?;

    Ok(Json(list))
}

/// Count pending approvals in the caller's queue
pub async fn pending_count(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<PendingCountQuery>,
) -> ApiResult<impl IntoResponse> {
    let count = state
        .approval_service
        .get_pending_count(Some(&caller), query.role.as_deref())
        .await?;

    Ok(Json(count))
}

/// Recently decided approvals of the caller's queue
pub async fn approval_history(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<impl IntoResponse> {
    let history = state
        .approval_service
        .get_approval_history(Some(&caller), query.limit, query.role.as_deref())
        .await?;

    Ok(Json(history))
}

/// Role to approval type table
pub async fn approval_types() -> impl IntoResponse {
    let table: Vec<RoleApprovalType> = ROLE_APPROVAL_TYPES
        .into_iter()
        .map(|(role, approval_type)| RoleApprovalType {
            role,
            approval_type,
        })
        .collect();

    Json(table)
}

/// Approve a pending approval
pub async fn approve_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let notes = parse_body::<DecisionRequest>(&body)?.and_then(|body| body.notes);
    state
        .approval_service
        .approve_item(Some(&caller), id, notes)
        .await?;

    Ok(Json(MessageResponse {
        message: "Approval approved".to_string(),
    }))
}

/// Reject a pending approval
pub async fn reject_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let notes = parse_body::<DecisionRequest>(&body)?.and_then(|body| body.notes);
    state
        .approval_service
        .reject_item(Some(&caller), id, notes)
        .await?;

    Ok(Json(MessageResponse {
        message: "Approval rejected".to_string(),
    }))
}

/// Open an inventory approval from an accepted alert
pub async fn create_from_alert(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let alert = parse_body::<AlertData>(&body)?.unwrap_or_default();
    let created = state
        .approval_service
        .create_from_alert(Some(&caller), alert)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Decode an optional JSON body; a blank body is `None`
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(body).map(Some).map_err(|e| {
        ApiError::from(ApprovalError::invalid_input(format!(
            "Invalid request body: {}",
            e
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Claims, JwtVerifier};
    use approvals::models::{ApprovalStatus, ManagerRole};
    use approvals::{ApprovalService, InMemoryApprovalStore};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tower::ServiceExt;

    const SECRET: &[u8] = b"routes-test-secret";

    struct TestApp {
        router: Router,
        store: Arc<InMemoryApprovalStore>,
        business_id: Uuid,
    }

    impl TestApp {
        fn new() -> Self {
            let store = Arc::new(InMemoryApprovalStore::new());
            let state = AppState {
                db_pool: None,
                approval_service: ApprovalService::new(store.clone()),
                jwt_verifier: JwtVerifier::with_secret(SECRET),
            };
            Self {
                router: create_router(state),
                store,
                business_id: Uuid::new_v4(),
            }
        }

        fn token(&self, role: &str) -> String {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs();
            let claims = Claims {
                sub: Uuid::new_v4(),
                role: role.to_string(),
                business_id: self.business_id,
                iat: now,
                exp: now + 900,
            };
            encode(
                &Header::new(Algorithm::HS256),
                &claims,
                &EncodingKey::from_secret(SECRET),
            )
            .unwrap()
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }

        async fn get(&self, uri: &str, role: &str) -> (StatusCode, Value) {
            let request = Request::get(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token(role)))
                .body(Body::empty())
                .unwrap();
            self.send(request).await
        }

        async fn post(&self, uri: &str, role: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::post(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token(role)))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn alert(&self, product: &str) -> Uuid {
            let (status, body) = self
                .post(
                    "/approvals/from-alert",
                    "admin",
                    json!({ "product_name": product, "risk_level": "HIGH" }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["approval"]["id"].as_str().unwrap().parse().unwrap()
        }
    }

    #[tokio::test]
    async fn health_reports_memory_backend() {
        let app = TestApp::new();
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = app.send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "memory");
    }

    #[tokio::test]
    async fn approvals_require_a_valid_token() {
        let app = TestApp::new();

        let request = Request::get("/approvals").body(Body::empty()).unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::get("/approvals")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn create_then_list_and_count() {
        let app = TestApp::new();
        let (status, body) = app
            .post(
                "/approvals/from-alert",
                "admin",
                json!({ "product_name": "Milk", "risk_level": "HIGH" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["approval"]["priority"], "HIGH");
        assert_eq!(body["approval"]["quantity"], "N/A");
        assert_eq!(body["approval"]["location"], "Warehouse");
        assert_eq!(body["approval"]["days_left"], 0);
        assert_eq!(body["approval"]["required_role"], "inventory_manager");
        assert_eq!(body["approval"]["approval_type"], "spoilage_action");
        assert_eq!(body["approval"]["status"], "pending");

        let (status, body) = app.get("/approvals", "inventory_manager").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["role"], "inventory_manager");
        assert_eq!(body["approvals"][0]["product_name"], "Milk");

        let (status, body) = app.get("/approvals/count", "admin").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "count": 1 }));

        let (status, body) = app
            .get("/approvals?role=logistics_manager", "admin")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["role"], "logistics_manager");
    }

    #[tokio::test]
    async fn queue_errors_map_to_status_codes() {
        let app = TestApp::new();

        let (status, _) = app
            .get("/approvals?role=finance_manager", "inventory_manager")
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.get("/approvals?role=not_a_role", "admin").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.get("/approvals?status=archived", "admin").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.get("/approvals", "driver").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn decisions_flow_through_to_history() {
        let app = TestApp::new();
        let id = app.alert("Lettuce").await;

        let (status, _) = app
            .post(&format!("/approvals/{}/approve", id), "admin", json!({}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .post(
                &format!("/approvals/{}/reject", id),
                "inventory_manager",
                json!({ "notes": "past saving" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Approval rejected");

        let (status, _) = app
            .post(
                &format!("/approvals/{}/approve", id),
                "inventory_manager",
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let stored = app.store.get(id).await.unwrap();
        assert_eq!(stored.status, ApprovalStatus::Rejected);
        assert_eq!(stored.comments.as_deref(), Some("past saving"));

        let (status, body) = app
            .get("/approvals/history?limit=10", "inventory_manager")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["history"][0]["status"], "rejected");
        assert_eq!(body["history"][0]["comments"], "past saving");
    }

    #[tokio::test]
    async fn decision_without_body_and_on_foreign_queue() {
        let app = TestApp::new();
        let id = app.alert("Cheese").await;

        let (status, _) = app
            .post(
                &format!("/approvals/{}/approve", id),
                "logistics_manager",
                json!({}),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::post(format!("/approvals/{}/approve", id))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", app.token("inventory_manager")),
            )
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);

        let stored = app.store.get(id).await.unwrap();
        assert_eq!(stored.status, ApprovalStatus::Approved);
        assert_eq!(stored.comments, None);
    }

    #[tokio::test]
    async fn malformed_decision_body_is_rejected_before_deciding() {
        let app = TestApp::new();
        let id = app.alert("Yogurt").await;

        let (status, body) = app
            .post(
                &format!("/approvals/{}/reject", id),
                "inventory_manager",
                json!({ "notes": 42 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

        let request = Request::post(format!("/approvals/{}/approve", id))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", app.token("inventory_manager")),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"notes\": "))
            .unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let stored = app.store.get(id).await.unwrap();
        assert_eq!(stored.status, ApprovalStatus::Pending);
        assert_eq!(stored.reviewed_by, None);
    }

    #[tokio::test]
    async fn decision_notes_are_kept_without_content_type() {
        let app = TestApp::new();
        let id = app.alert("Bread").await;

        let request = Request::post(format!("/approvals/{}/approve", id))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", app.token("inventory_manager")),
            )
            .body(Body::from(json!({ "notes": "donate today" }).to_string()))
            .unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);

        let stored = app.store.get(id).await.unwrap();
        assert_eq!(stored.status, ApprovalStatus::Approved);
        assert_eq!(stored.comments.as_deref(), Some("donate today"));
    }

    #[tokio::test]
    async fn alert_without_product_name_is_a_bad_request() {
        let app = TestApp::new();

        let (status, body) = app
            .post(
                "/approvals/from-alert",
                "admin",
                json!({ "risk_level": "HIGH" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "product_name is required");

        let (status, body) = app
            .post("/approvals/from-alert", "admin", json!({ "days_left": "soon" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn history_limit_out_of_range_is_a_bad_request() {
        let app = TestApp::new();

        for uri in ["/approvals/history?limit=0", "/approvals/history?limit=500"] {
            let (status, body) = app.get(uri, "inventory_manager").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "limit must be between 1 and 200");
        }
    }

    #[tokio::test]
    async fn approval_types_lists_every_manager_role() {
        let app = TestApp::new();
        let (status, body) = app.get("/approvals/types", "admin").await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), ManagerRole::ALL.len());
        assert!(entries.contains(&json!({
            "role": "finance_manager",
            "approval_type": "cost_approval",
        })));
    }
}
