//! Maps the core's fixed error-code taxonomy onto HTTP status codes and a
//! uniform JSON error body, independent of which component raised the code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ytsize_core::CoreErrorCode;

/// An error ready to be rendered as an HTTP response, already carrying the
/// status it maps to and the request id it happened under.
pub struct ApiError {
    pub code: CoreErrorCode,
    pub message: String,
    pub request_id: String,
}

impl ApiError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code {
            CoreErrorCode::InvalidUrl | CoreErrorCode::Validation => StatusCode::BAD_REQUEST,
            CoreErrorCode::ShuttingDown
            | CoreErrorCode::CircuitOpen
            | CoreErrorCode::QueueFull
            | CoreErrorCode::NotFound => StatusCode::SERVICE_UNAVAILABLE,
            CoreErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            CoreErrorCode::VideoUnavailable => StatusCode::NOT_FOUND,
            CoreErrorCode::RateLimited => StatusCode::BAD_GATEWAY,
            CoreErrorCode::NetworkError | CoreErrorCode::WorkerError | CoreErrorCode::Unknown => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    error: &'a str,
    code: &'a str,
    #[serde(rename = "requestId")]
    request_id: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            ok: false,
            error: &self.message,
            code: self.code.as_str(),
            request_id: &self.request_id,
        };
        (status, Json(body)).into_response()
    }
}

/// A client's own admission has been rejected by the rate limiter — a
/// distinct HTTP status (429) from any core error code, since it is not
/// one of the twelve yt-dlp/resilience outcomes, just "too many requests".
pub struct RateLimitedResponse {
    pub retry_after_secs: u64,
    pub request_id: String,
}

impl IntoResponse for RateLimitedResponse {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            ok: false,
            error: "rate limit exceeded",
            code: "RATE_LIMITED",
            request_id: &self.request_id,
        };
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        if let Ok(value) = axum::http::HeaderValue::from_str(&self.retry_after_secs.to_string()) {
            response.headers_mut().insert("Retry-After", value);
        }
        response
    }
}
