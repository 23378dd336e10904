//! `POST /messages`: the extraction trigger, feedback events and prompt
//! checks sent by the page-side scripts.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::agent::FeedbackEvent;
use crate::middleware::RequestId;

/// Messages keyed by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action")]
pub(super) enum ActionMessage {
    #[serde(rename = "EXTRACT_AND_SEND")]
    ExtractAndSend { html: String, url: String },
    #[serde(rename = "PROMPT_CHECK")]
    PromptCheck,
}

/// Messages keyed by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(super) enum EventMessage {
    #[serde(rename = "user_feedback")]
    UserFeedback(FeedbackEvent),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum InboundMessage {
    Action(ActionMessage),
    Event(EventMessage),
}

pub(super) async fn handle_message(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(request_id = %req_id.0, error = %rejection, "malformed message body");
            return ApiError::new(req_id.0, "bad_request", rejection.body_text())
                .into_response();
        }
    };
    let message = match serde_json::from_value::<InboundMessage>(body) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(request_id = %req_id.0, error = %e, "unrecognised message");
            return ApiError::new(
                req_id.0,
                "bad_request",
                "expected EXTRACT_AND_SEND, PROMPT_CHECK or user_feedback",
            )
            .into_response();
        }
    };

    match message {
        InboundMessage::Action(ActionMessage::ExtractAndSend { html, url }) => {
            let reply = state.agent.extract_and_send(html, url).await;
            Json(reply).into_response()
        }
        InboundMessage::Action(ActionMessage::PromptCheck) => {
            match state.agent.prompt_check(Utc::now().timestamp_millis()).await {
                Ok(prompt) => Json(json!({ "status": "ok", "prompt": prompt })).into_response(),
                Err(e) => {
                    tracing::error!(request_id = %req_id.0, error = %e, "prompt check failed");
                    failure(&e.to_string())
                }
            }
        }
        InboundMessage::Event(EventMessage::UserFeedback(event)) => {
            match state.agent.record_feedback(event).await {
                Ok(_) => Json(json!({ "status": "ok" })).into_response(),
                Err(e) => {
                    tracing::error!(request_id = %req_id.0, error = %e, "feedback not persisted");
                    failure(&e.to_string())
                }
            }
        }
    }
}

fn failure(error: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "error": error })),
    )
        .into_response()
}
