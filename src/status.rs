//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or paired with a [`Json`](crate::Json)
//! body as a handler return value.
//!
//! ```rust
//! use roster::{Json, Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::NotFound);
//!
//! // status + serialised body
//! async fn create(_req: roster::Request, _state: ()) -> (Status, Json<u64>) {
//!     (Status::Created, Json(42))
//! }
//! ```

/// The status codes the API answers with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200
    Created,             // 201

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    NotFound,            // 404

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Created             => 201,
            Status::BadRequest          => 400,
            Status::NotFound            => 404,
            Status::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        match s {
            Status::Ok                  => http::StatusCode::OK,
            Status::Created             => http::StatusCode::CREATED,
            Status::BadRequest          => http::StatusCode::BAD_REQUEST,
            Status::NotFound            => http::StatusCode::NOT_FOUND,
            Status::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_their_wire_values() {
        assert_eq!(u16::from(Status::Created), 201);
        assert_eq!(u16::from(Status::NotFound), 404);
        assert_eq!(
            http::StatusCode::from(Status::BadRequest).as_u16(),
            u16::from(Status::BadRequest),
        );
    }
}
