//! The users and products JSON API.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/api` | [`hello`] |
//! | GET | `/api/users` | [`users::list`] |
//! | POST | `/api/users` | [`users::create`] |
//! | GET | `/api/users/{id}` | [`users::show`] |
//! | PUT | `/api/users/{id}` | [`users::replace`] |
//! | PATCH | `/api/users/{id}` | [`users::update`] |
//! | DELETE | `/api/users/{id}` | [`users::remove`] |
//! | GET | `/api/products` | [`products::list`] |
//!
//! Anything else answers `404 {"error": "Route not found"}`.

pub mod products;
pub mod resolve;
pub mod users;

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::ApiError;
use crate::method::Method;
use crate::middleware::{log_finished, log_request};
use crate::request::Request;
use crate::response::Json;
use crate::router::Router;
use crate::store::Store;

/// Builds the full application router over `store`.
pub fn router(store: Arc<Store>) -> Router<Arc<Store>> {
    Router::with_state(store)
        .layer(log_request)
        .layer(log_finished)
        .on(Method::Get,    "/api",            hello)
        .on(Method::Get,    "/api/users",      users::list)
        .on(Method::Post,   "/api/users",      users::create)
        .on(Method::Get,    "/api/users/{id}", users::show)
        .on(Method::Put,    "/api/users/{id}", users::replace)
        .on(Method::Patch,  "/api/users/{id}", users::update)
        .on(Method::Delete, "/api/users/{id}", users::remove)
        .on(Method::Get,    "/api/products",   products::list)
        .fallback(route_not_found)
}

/// `GET /api`
pub async fn hello(_req: Request, _store: Arc<Store>) -> Json<Value> {
    Json(json!({ "msg": "Hello" }))
}

async fn route_not_found(_req: Request, _store: Arc<Store>) -> ApiError {
    ApiError::NoRoute
}
