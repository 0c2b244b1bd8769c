//! `/api/products` handler.

use std::sync::Arc;

use crate::request::Request;
use crate::response::Json;
use crate::store::{Product, Store};

/// `GET /api/products`
pub async fn list(_req: Request, store: Arc<Store>) -> Json<Vec<Product>> {
    Json(store.products().to_vec())
}
