//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes. The body is the same `{code, message}` envelope the WebSocket
//! adapter uses for its error frames.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::GuardViolation => StatusCode::CONFLICT,
        ErrorCode::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Persistence failures carry backend detail that stays in the logs.
fn client_message(error: &Error) -> String {
    match error.code() {
        ErrorCode::Persistence => {
            error!(error = %error, "persistence failure surfaced to HTTP");
            "internal server error".to_owned()
        }
        _ => error.to_string(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "code": self.code(),
            "message": client_message(self),
        }))
    }
}
