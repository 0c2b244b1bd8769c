//! # roster
//!
//! A small JSON API over an in-memory list of users and a fixed product
//! catalogue, plus the thin HTTP layer it runs on.
//!
//! ## The request pipeline
//!
//! ```text
//! Server ─▶ log_request ─▶ log_finished ─▶ Router ─┬─▶ handler ─▶ Response
//!                                                  └─▶ fallback (404)
//! ```
//!
//! Inside a handler the steps are explicit calls, not hidden request state:
//! lock the store, [`resolve`](api::resolve::resolve) the `{id}` parameter,
//! [`validate`](validate::Schema::validate) the input, mutate, reply. Each
//! step returns `Result<_, ApiError>` and `?` ends the request with the
//! matching error body.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster::{Server, Store, api};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = api::router(Arc::new(Store::seeded()));
//!     Server::bind(([0, 0, 0, 0], 3000).into()).serve(app).await.unwrap();
//! }
//! ```
//!
//! The framework pieces work for any state type:
//!
//! ```rust
//! use roster::{Json, Method, Request, Router, Status};
//!
//! async fn ping(_req: Request, _state: ()) -> (Status, Json<&'static str>) {
//!     (Status::Ok, Json("pong"))
//! }
//!
//! let app = Router::new().on(Method::Get, "/ping", ping);
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod middleware;
pub mod store;
pub mod telemetry;
pub mod validate;

pub use config::Config;
pub use error::{ApiError, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::{Router, Service};
pub use server::Server;
pub use status::Status;
pub use store::Store;
