//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{AskRequest, ChatSessionIdResponse, ChatTurnResponse, ClientMessage},
    state::AppState,
    turn_task,
};
use axum::{
    extract::{Path, State},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::error;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        start_chat_handler,
        ask_handler,
    ),
    components(
        schemas(ChatSessionIdResponse, AskRequest, ChatTurnResponse, ClientMessage)
    ),
    tags(
        (name = "Movie Tracker API", description = "API endpoints for the conversational movie-discovery assistant.")
    )
)]
pub struct ApiDoc;

/// The API routes over a shared state. The binary layers CORS and the
/// Swagger UI on top.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/chat/start", get(start_chat_handler))
        .route("/chat/{chat_id}/ask", post(ask_handler))
        .with_state(app_state)
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Start a new chat session.
///
/// Creates a session seeded with the assistant's instructions and returns the
/// id to use on subsequent asks.
#[utoipa::path(
    get,
    path = "/chat/start",
    responses(
        (status = 200, description = "Session created successfully", body = ChatSessionIdResponse),
        (status = 400, description = "Session could not be created")
    )
)]
pub async fn start_chat_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match turn_task::start_session(&app_state).await {
        Ok(chat_id) => Ok(Json(ChatSessionIdResponse { chat_id })),
        Err(e) => {
            error!("Failed to start chat session: {:?}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

/// Ask the assistant one question within an existing session.
///
/// Runs the full turn pipeline and returns the whole conversation so far,
/// with assistant movie references enriched into full records.
#[utoipa::path(
    post,
    path = "/chat/{chat_id}/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Turn completed", body = ChatTurnResponse),
        (status = 400, description = "Bad request (missing body, empty input, or unknown session)")
    ),
    params(
        ("chat_id" = String, Path, description = "The chat session id returned by /chat/start.")
    )
)]
pub async fn ask_handler(
    State(app_state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Json(ask) = payload.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid request, missing ask object".to_string(),
        )
    })?;

    match turn_task::process_turn(&app_state, &chat_id, &ask.input).await {
        Ok(outcome) => Ok(Json(ChatTurnResponse {
            funny_fact: outcome.funny_fact,
            messages: outcome.messages,
        })),
        Err(e) => {
            error!(%chat_id, "Failed to process chat turn: {:?}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}
