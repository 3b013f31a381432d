//! HTTP handlers for a worker node
//!
//! ```text
//! GET  /             shard for the client type (text or HTML)
//! POST /set-config   ingest a shard triple, returns the archive password
//! GET  /api/health   liveness
//! ```

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{Error, ErrorCategory};

use super::expose::Exposure;
use super::ingest::{IngestRequest, IngestResponse};
use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the node router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/set-config", post(set_config))
        .route("/api/health", get(health_check))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Serve the curl shard to command-line clients, the web shard to everyone else
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    match state.service.expose(user_agent).await {
        Ok(Exposure::PlainText(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response(),
        Ok(Exposure::Html(body)) => (StatusCode::OK, Html(body)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Ingest a shard triple
async fn set_config(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected ingestion body");
            return (
                rejection.status(),
                Json(ErrorResponse::new(rejection.body_text())),
            )
                .into_response();
        }
    };

    match state.service.ingest(request).await {
        Ok(zip_password) => {
            (StatusCode::CREATED, Json(IngestResponse { zip_password })).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}

/// Map a service error to a status code and JSON body
fn error_response(err: &Error) -> Response {
    match err.category() {
        ErrorCategory::Validation => {
            tracing::warn!(error = %err, "Invalid ingestion payload");
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(err.to_string()))).into_response()
        }
        _ => {
            tracing::error!(error = %err, "Request failed");
            // internal details stay in the log
            let message = match err {
                Error::Archive(_) => "Failed to create zip archive",
                _ => "Internal server error",
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(message)),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert_eq!(response.data, "test data");
    }

    #[test]
    fn test_error_response() {
        let response = ErrorResponse::new("test error");
        assert!(!response.success);
        assert_eq!(response.error, "test error");
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: Error = crate::error::ValidationError::TooLong {
            field: "web",
            max: 1,
            actual: 2,
        }
        .into();
        assert_eq!(error_response(&err).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_archive_failure_maps_to_server_error() {
        let err: Error = crate::archive::ArchiveError::EmptyPassword.into();
        assert_eq!(
            error_response(&err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
