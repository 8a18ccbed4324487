//! # notavoz-api
//!
//! HTTP surface for the note ingestion pipeline: authenticate the caller,
//! classify the request body, run it through the pipeline, and expose the
//! owner's stored notes.
//!
//! Every route except `/health` requires a bearer token; the [`RequireAuth`]
//! extractor resolves it to a [`Principal`] before any body bytes are read.

pub mod classify;
pub mod identity;
pub mod ingest;

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use governor::{Quota, RateLimiter};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use notavoz_core::{
    AudioStore, Error, IdentityService, NoteStore, Principal, ServerConfig, TitleGenerator,
    TranscriptionService,
};

/// Largest accepted request body. Covers multipart audio uploads.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Build the global rate limiter described by the server configuration.
pub fn rate_limiter_from_config(server: &ServerConfig) -> Option<Arc<GlobalRateLimiter>> {
    if !server.rate_limit_enabled {
        return None;
    }
    let requests = NonZeroU32::new(server.rate_limit_requests).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(server.rate_limit_period)
        .unwrap_or_else(|| Quota::per_minute(requests))
        .allow_burst(requests);
    Some(Arc::new(RateLimiter::direct(quota)))
}

/// Application state shared across handlers.
///
/// Every external collaborator sits behind its trait object so tests can
/// exercise the full router with in-process fakes.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityService>,
    pub audio_store: Arc<dyn AudioStore>,
    pub transcriber: Arc<dyn TranscriptionService>,
    pub titles: Arc<dyn TitleGenerator>,
    pub notes: Arc<dyn NoteStore>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Notes
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route("/api/v1/notes/:id", get(get_note).delete(delete_note))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Extractor for authenticated requests.
///
/// Pulls the bearer token from the `Authorization` header and resolves it to
/// the owning [`Principal`] via the identity service. Handlers taking this
/// extractor never run for unauthenticated callers.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Principal);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(value) if value.starts_with("Bearer ") => {
                value.trim_start_matches("Bearer ").trim()
            }
            _ => return Err(ApiError::Unauthorized("Missing bearer token".to_string())),
        };
        if token.is_empty() {
            return Err(ApiError::Unauthorized("Missing bearer token".to_string()));
        }

        let principal = state.identity.resolve_user(token).await?;
        Ok(RequireAuth(principal))
    }
}

// =============================================================================
// RATE LIMITING MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(subsystem = "api", "Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ingest one note (multipart audio or JSON text) and return the stored record.
async fn create_note(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    request: axum::extract::Request,
) -> Result<impl IntoResponse, ApiError> {
    let decoded = classify::classify_request(request).await?;
    let record = ingest::run(&state, &principal, decoded).await?;
    Ok(Json(record))
}

async fn list_notes(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.notes.list(&principal).await?;
    Ok(Json(notes))
}

async fn get_note(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.notes.get(&principal, id).await?;
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.notes.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    UnsupportedMediaType(String),
    NotFound(String),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::EmptyTranscript => ApiError::BadRequest(Error::EmptyTranscript.to_string()),
            Error::UnsupportedMediaType(msg) => ApiError::UnsupportedMediaType(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Unsupported media type: {}", msg),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => {
                // Upstream detail goes to the log; the caller gets a generic
                // message so credentials and internal URLs never leak.
                error!(subsystem = "api", error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
