//! REST endpoints the chat widget talks to.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, warn};
use uuid::Uuid;

use super::store::SessionStore;
use crate::dialogue::{ConversationState, DialogueMachine, OutgoingMessage};

/// Shared state for widget routes.
#[derive(Clone)]
pub struct WidgetState {
    pub machine: Arc<DialogueMachine>,
    pub sessions: Arc<SessionStore>,
}

/// Text submitted by the user.
#[derive(Debug, Deserialize)]
pub struct UserText {
    pub text: String,
}

/// What the widget renders after each call.
#[derive(Debug, Serialize, Deserialize)]
pub struct WidgetReply {
    pub session_id: Uuid,
    pub state: ConversationState,
    pub messages: Vec<OutgoingMessage>,
    /// Quick replies to show now.
    pub options: Vec<String>,
}

impl WidgetReply {
    fn new(session_id: Uuid, state: ConversationState, messages: Vec<OutgoingMessage>) -> Self {
        let options = messages
            .last()
            .map(|m| m.options.clone())
            .unwrap_or_default();
        Self {
            session_id,
            state,
            messages,
            options,
        }
    }
}

/// Build the widget router. An empty `cors_origins` allows any origin.
pub fn widget_routes(state: WidgetState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/widget/sessions", post(create_session))
        .route("/api/widget/sessions/{id}", delete(delete_session))
        .route("/api/widget/sessions/{id}/messages", post(post_message))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "campus-assist-widget"
    }))
}

// ── Sessions ────────────────────────────────────────────────────────────

/// POST /api/widget/sessions
///
/// Opens a session and returns the greeting.
async fn create_session(State(state): State<WidgetState>) -> impl IntoResponse {
    let id = state.sessions.create().await;
    let reply = WidgetReply::new(id, ConversationState::default(), state.machine.greeting());
    (StatusCode::CREATED, Json(reply))
}

/// POST /api/widget/sessions/{id}/messages
///
/// Runs one dialogue turn. Input arriving while the previous turn is still
/// waiting on the backend is rejected with 409.
async fn post_message(
    State(state): State<WidgetState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UserText>,
) -> impl IntoResponse {
    let Some(slot) = state.sessions.get(id).await else {
        return not_found();
    };
    let Ok(mut session) = slot.try_lock() else {
        debug!(session_id = %id, "Input rejected while a turn is in flight");
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "A previous message is still being processed"})),
        )
            .into_response();
    };

    let turn = state.machine.handle(session.clone(), &body.text).await;
    *session = turn.session;
    Json(WidgetReply::new(id, session.state, turn.messages)).into_response()
}

/// DELETE /api/widget/sessions/{id}
async fn delete_session(
    State(state): State<WidgetState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if state.sessions.remove(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found()
    }
}

fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Session not found"})),
    )
        .into_response()
}
