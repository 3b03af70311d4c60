//! Gateway error taxonomy and its HTTP mapping.
//!
//! Error bodies are short plain-text messages. Store failures never leak
//! their underlying cause to the client; it is logged instead.

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use kvgate_store::StoreError;

/// Request-terminal failure.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Malformed or missing input.
    #[error("{0}")]
    BadRequest(String),

    /// The path exists but not for this verb.
    #[error("Only {0} is allowed")]
    MethodNotAllowed(Method),

    /// Exact-key read found nothing.
    #[error("{0}")]
    NotFound(String),

    /// The store call failed, for any reason.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Map a store failure to `Internal`, logging the cause.
    ///
    /// Used as `.map_err(GatewayError::store("Failed to ..."))`.
    pub fn store(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |err| {
            tracing::error!(error = %err, "{}", message);
            Self::Internal(message.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        match self {
            Self::MethodNotAllowed(allowed) => {
                (status, [(header::ALLOW, allowed.to_string())], message).into_response()
            }
            _ => (status, message).into_response(),
        }
    }
}

/// Handler result type.
pub type GatewayResult<T> = Result<T, GatewayError>;
