//! Run with:
//!   PORT=3000 RUST_LOG=info cargo run
//!
//! Try:
//!   curl http://localhost:3000/api/users?filter=username&value=anson
//!   curl -X POST http://localhost:3000/api/users \
//!        -H 'content-type: application/json' \
//!        -d '{"username":"alice","displayName":"Alice"}'
//!   curl -X PATCH http://localhost:3000/api/users/1 -d '{"displayName":"A."}'
//!   curl -X DELETE http://localhost:3000/api/users/1

use std::sync::Arc;

use clap::Parser;
use roster::{Config, Server, Store, api, telemetry};

#[tokio::main]
async fn main() -> Result<(), roster::Error> {
    telemetry::setup_tracing();
    let config = Config::parse();

    let app = api::router(Arc::new(Store::seeded()));

    Server::bind(config.addr()).serve(app).await
}
