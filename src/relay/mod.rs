//! The stateless relay behind `POST /api/chat`.
//!
//! Each request carries the conversation it wants answered, either as a
//! single `query` or as a replayed `history`.  The relay validates the
//! envelope, hands the turns to an [`Answerer`], and replies with `{answer}`
//! or, on failure, `{detail}` under a non-2xx status.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::{Error, Result};
use crate::observability::{
    RELAY_ANSWER_DURATION, RELAY_ANSWER_ERRORS, RELAY_REJECTED, RELAY_REQUESTS,
};
use crate::types::{ChatRequest, ChatResponse, ErrorResponse, Role, Turn};

mod answer;
mod config;

pub use answer::{Answerer, EchoAnswerer, format_transcript};
pub use config::{DEFAULT_BIND, RelayArgs, RelayConfig};

/// Path of the single chat endpoint.
pub const CHAT_ROUTE: &str = "/api/chat";

/// Builds the relay's router around `answerer`.
pub fn router<A: Answerer + 'static>(answerer: A) -> Router {
    let answerer: Arc<dyn Answerer> = Arc::new(answerer);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    Router::new()
        .route(CHAT_ROUTE, post(handle_chat))
        .with_state(answerer)
        .layer(cors_layer())
        .layer(trace_layer)
}

/// Serves the relay on an already-bound listener until the process exits.
pub async fn serve<A: Answerer + 'static>(listener: TcpListener, answerer: A) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "relay listening");
    axum::serve(listener, router(answerer))
        .await
        .map_err(|e| Error::io("relay server failed", e))
}

/// Any origin, method and header, with credentials.
///
/// A wildcard origin cannot be combined with credentials, so the request's own
/// origin, method and headers are mirrored back instead.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn handle_chat(
    State(answerer): State<Arc<dyn Answerer>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    RELAY_REQUESTS.click();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            RELAY_REJECTED.click();
            tracing::debug!(status = %rejection.status(), "malformed chat request");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let turns = match validate(&request) {
        Ok(turns) => turns,
        Err(detail) => {
            RELAY_REJECTED.click();
            tracing::debug!(detail, "invalid chat request");
            return error_response(StatusCode::BAD_REQUEST, detail);
        }
    };

    let start = Instant::now();
    let result = answerer.answer(&turns).await;
    RELAY_ANSWER_DURATION.add(start.elapsed().as_secs_f64());

    match result {
        Ok(answer) => (StatusCode::OK, Json(ChatResponse::new(answer))).into_response(),
        Err(err) => {
            RELAY_ANSWER_ERRORS.click();
            tracing::error!(error = %err, turns = turns.len(), "answerer failed");
            let status = if err.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_response(status, err.to_string())
        }
    }
}

/// Checks the envelope and returns the conversation it carries.
fn validate(request: &ChatRequest) -> std::result::Result<Vec<Turn>, &'static str> {
    if request.query.is_none() && request.history.is_none() {
        return Err("request must carry a query or a history");
    }
    if let Some(query) = &request.query
        && query.trim().is_empty()
    {
        return Err("query must not be empty");
    }
    let turns = request.turns();
    match turns.last() {
        None => Err("history must not be empty"),
        Some(last) if last.role() != Role::User => {
            Err("the last turn in history must come from the user")
        }
        Some(last) if last.text().trim().is_empty() => Err("the last user turn is empty"),
        Some(_) => Ok(turns),
    }
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(detail))).into_response()
}
