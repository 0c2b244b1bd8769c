//! `/api/users` handlers.
//!
//! Each handler takes the user lock once and does resolve, validate and
//! mutate under it, so no other request observes a half-applied change.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::info;

use super::resolve::resolve;
use crate::error::ApiError;
use crate::request::Request;
use crate::response::Json;
use crate::status::Status;
use crate::store::{Store, User};
use crate::validate::{Check, Rule, Schema};

/// Query string of `GET /api/users`.
pub const LIST_QUERY: Schema = Schema {
    optional: &["filter", "value"],
    checks: &[
        Check::new("filter", Rule::IsString, "Invalid value"),
        Check::new("filter", Rule::Length { min: 3, max: 10 }, "Filter must be 3-10 characters long."),
        Check::new("value", Rule::IsString, "Value must be a string."),
    ],
};

/// Body of `POST /api/users`.
pub const CREATE_USER: Schema = Schema {
    optional: &[],
    checks: &[
        Check::new("username", Rule::NotEmpty, "Username can not be empty."),
        Check::new(
            "username",
            Rule::Length { min: 5, max: 32 },
            "Username must be at least 5 characters with a max of 32 characters",
        ),
    ],
};

/// Fields `POST` copies from the body into the new record.
const CREATE_FIELDS: [&str; 2] = ["username", "displayName"];

/// `GET /api/users[?filter=<field>&value=<text>]`
pub async fn list(req: Request, store: Arc<Store>) -> Result<Json<Vec<User>>, ApiError> {
    LIST_QUERY.validate(req.query())?;
    let users = store.users()?;

    let found = match (req.query_str("filter"), req.query_str("value")) {
        (Some(filter), Some(value)) if !filter.is_empty() && !value.is_empty() => {
            users.matching(filter, value)
        }
        _ => users.all().to_vec(),
    };
    Ok(Json(found))
}

/// `GET /api/users/{id}`
pub async fn show(req: Request, store: Arc<Store>) -> Result<Json<User>, ApiError> {
    let users = store.users()?;
    let at = resolve(&users, req.param("id"))?;
    Ok(Json(users.get(at).clone()))
}

/// `POST /api/users`
pub async fn create(req: Request, store: Arc<Store>) -> Result<(Status, Json<User>), ApiError> {
    let body = req.json_object()?;
    CREATE_USER.validate(&body)?;

    let fields: Map<String, Value> = CREATE_FIELDS.iter()
        .filter_map(|&key| Some((key.to_owned(), body.get(key)?.clone())))
        .collect();

    let mut users = store.users()?;
    let user = users.insert(fields).clone();
    info!(id = user.id, "user created");
    Ok((Status::Created, Json(user)))
}

/// `PUT /api/users/{id}`
pub async fn replace(req: Request, store: Arc<Store>) -> Result<Json<User>, ApiError> {
    let body = req.json_object()?;
    let mut users = store.users()?;
    let at = resolve(&users, req.param("id"))?;
    let user = users.replace(at, body).clone();
    info!(id = user.id, "user replaced");
    Ok(Json(user))
}

/// `PATCH /api/users/{id}`
pub async fn update(req: Request, store: Arc<Store>) -> Result<Json<User>, ApiError> {
    let body = req.json_object()?;
    let mut users = store.users()?;
    let at = resolve(&users, req.param("id"))?;
    let user = users.merge(at, body).clone();
    info!(id = user.id, "user updated");
    Ok(Json(user))
}

/// `DELETE /api/users/{id}`
pub async fn remove(req: Request, store: Arc<Store>) -> Result<Json<Value>, ApiError> {
    let mut users = store.users()?;
    let at = resolve(&users, req.param("id"))?;
    let user = users.remove(at);
    info!(id = user.id, remaining = users.len(), "user deleted");
    Ok(Json(json!({ "message": "User deleted" })))
}
