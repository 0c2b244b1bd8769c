//! Error types.
//!
//! Two families live here and they never mix:
//!
//! - [`Error`] surfaces infrastructure failures, such as a port that cannot
//!   be bound. It is what [`Server::serve`](crate::Server::serve) returns;
//!   per-connection failures are logged instead.
//! - [`ApiError`] is the request-level taxonomy. Handlers return
//!   `Result<_, ApiError>` and every variant turns into a JSON error
//!   response of the shape `{"error": <string | array>}`.

use std::net::SocketAddr;

use serde_json::json;
use tracing::error;

use crate::response::{IntoResponse, Json, Response};
use crate::status::Status;
use crate::validate::Violation;

/// The error type returned by roster's fallible server operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// A request that terminated before a handler could produce a success body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The `{id}` path parameter names no stored user.
    #[error("User not found")]
    NotFound,

    /// One or more declared field constraints were violated.
    #[error("validation failed with {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    /// Anything else. The detail is logged, never sent to the client.
    #[error("{0}")]
    Internal(String),

    /// No route matched the method and path.
    #[error("Route not found")]
    NoRoute,
}

impl ApiError {
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::NotFound | Self::NoRoute => Status::NotFound,
            Self::Validation(_)            => Status::BadRequest,
            Self::Internal(_)              => Status::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(violations) => json!({ "error": violations }),
            Self::Internal(detail) => {
                error!(%detail, "Server Error");
                json!({ "error": "Internal Server Error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(err: ApiError) -> (u16, serde_json::Value) {
        let res = err.into_response();
        (res.status_code(), serde_json::from_slice(res.body()).unwrap())
    }

    #[test]
    fn not_found_is_a_404_with_message() {
        assert_eq!(body_of(ApiError::NotFound), (404, json!({ "error": "User not found" })));
    }

    #[test]
    fn no_route_is_a_404_with_message() {
        assert_eq!(body_of(ApiError::NoRoute), (404, json!({ "error": "Route not found" })));
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let (status, body) = body_of(ApiError::internal("lock poisoned"));
        assert_eq!(status, 500);
        assert_eq!(body, json!({ "error": "Internal Server Error" }));
    }

    #[test]
    fn validation_lists_every_violation() {
        let (status, body) = body_of(ApiError::Validation(vec![
            Violation { field: "username".into(), message: "a".into() },
            Violation { field: "username".into(), message: "b".into() },
        ]));
        assert_eq!(status, 400);
        assert_eq!(body["error"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["error"][1], json!({ "field": "username", "message": "b" }));
    }
}
