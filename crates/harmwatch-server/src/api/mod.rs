mod messages;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::agent::Agent;
use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    queued: Option<usize>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/messages", post(messages::handle_message))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.agent.queued().await {
        Ok(queued) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                queued: Some(queued),
            }),
        ),
        Err(e) => {
            tracing::warn!(request_id = %req_id.0, error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    queued: None,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::agent::tests::test_config;

    fn app(store_path: &std::path::Path) -> Router {
        let agent = Agent::from_config(&test_config(store_path)).expect("agent");
        build_app(AppState {
            agent: Arc::new(agent),
        })
    }

    /// A directory where the store file should be, so every read fails.
    fn unreadable_store(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("store.json");
        std::fs::create_dir(&path).unwrap();
        path
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    fn post_json(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/messages")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_queue_length() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            app(&dir.path().join("store.json")),
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "queued": 0}));
    }

    #[tokio::test]
    async fn extract_message_replies_with_buffered_payload() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir.path().join("store.json"));
        let (status, body) = call(
            app.clone(),
            post_json(&json!({
                "action": "EXTRACT_AND_SEND",
                "html": "<article>Hello #world, great day! #weather</article>",
                "url": "https://blog.example.com/p/1"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["result"]["status"], "buffered");
        assert_eq!(body["result"]["payload"]["platform"], "generic");
        assert_eq!(
            body["result"]["payload"]["hashtags"],
            json!(["#world", "#weather"])
        );

        let (_, health) = call(
            app,
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(health["queued"], 1);
    }

    #[tokio::test]
    async fn feedback_message_is_acknowledged() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            app(&dir.path().join("store.json")),
            post_json(&json!({
                "type": "user_feedback",
                "postId": "42",
                "snippet": "a post",
                "label": "spam"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn feedback_persistence_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            app(&unreadable_store(dir.path())),
            post_json(&json!({
                "type": "user_feedback",
                "snippet": "a post",
                "label": "hate"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn prompt_check_without_consent_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            app(&dir.path().join("store.json")),
            post_json(&json!({"action": "PROMPT_CHECK"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "prompt": false}));
    }

    #[tokio::test]
    async fn unknown_message_is_bad_request_with_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = post_json(&json!({"action": "DANCE"}));
        request
            .headers_mut()
            .insert("x-request-id", "req-123".parse().unwrap());
        let (status, body) = call(app(&dir.path().join("store.json")), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
        assert_eq!(body["meta"]["request_id"], "req-123");
    }

    #[tokio::test]
    async fn malformed_json_gets_the_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/messages")
            .header("content-type", "application/json")
            .header("x-request-id", "req-456")
            .body(Body::from("{\"action\": "))
            .unwrap();
        let (status, body) = call(app(&dir.path().join("store.json")), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
        assert!(body["error"]["message"].is_string());
        assert_eq!(body["meta"]["request_id"], "req-456");
    }

    #[tokio::test]
    async fn health_degrades_when_store_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(
            app(&unreadable_store(dir.path())),
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"status": "degraded", "queued": null}));
    }
}
