//! Middleware layer.
//!
//! Middleware wraps the whole dispatch, route lookup and fallback included,
//! and is the place for cross-cutting concerns such as request logging. A
//! middleware is any `async fn(Request, Next) -> impl IntoResponse`; it
//! continues the chain by calling [`Next::run`].
//!
//! ```rust
//! use roster::middleware::Next;
//! use roster::{Request, Response};
//!
//! async fn stamp(req: Request, next: Next) -> Response {
//!     let res = next.run(req).await;
//!     tracing::debug!(status = res.status_code(), "request done");
//!     res
//! }
//! ```
//!
//! Layers run in the order they were added with
//! [`Router::layer`](crate::Router::layer).

mod log;

pub use log::{log_finished, log_request};
pub use crate::handler::BoxFuture;

use std::future::Future;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A pipeline stage that runs before the router.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// The innermost stage of the chain: route lookup and handler call.
pub(crate) trait Endpoint: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// The remainder of the middleware chain.
#[derive(Clone)]
pub struct Next {
    layers: Arc<[Arc<dyn Middleware>]>,
    endpoint: Arc<dyn Endpoint>,
    pos: usize,
}

impl Next {
    pub(crate) fn new(layers: Arc<[Arc<dyn Middleware>]>, endpoint: Arc<dyn Endpoint>) -> Self {
        Self { layers, endpoint, pos: 0 }
    }

    /// Passes the request to the next layer, or to the router once every
    /// layer has run.
    pub async fn run(self, req: Request) -> Response {
        match self.layers.get(self.pos).cloned() {
            Some(layer) => {
                let next = Self { pos: self.pos + 1, ..self };
                layer.handle(req, next).await
            }
            None => self.endpoint.call(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{Response, Status};

    struct Echo;

    impl Endpoint for Echo {
        fn call(&self, req: Request) -> BoxFuture {
            let path = req.path().to_owned();
            Box::pin(async move { Response::text(path) })
        }
    }

    static ORDER: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    async fn first(req: Request, next: Next) -> Response {
        ORDER.lock().unwrap().push("first");
        next.run(req).await
    }

    async fn second(req: Request, next: Next) -> Response {
        ORDER.lock().unwrap().push("second");
        next.run(req).await
    }

    async fn block(_req: Request, _next: Next) -> Status {
        Status::BadRequest
    }

    #[tokio::test]
    async fn layers_run_in_order_then_reach_the_endpoint() {
        let layers: Arc<[Arc<dyn Middleware>]> = Arc::from(vec![
            Arc::new(first) as Arc<dyn Middleware>,
            Arc::new(second) as Arc<dyn Middleware>,
        ]);
        let res = Next::new(layers, Arc::new(Echo)).run(Request::new("GET", "/x")).await;
        assert_eq!(res.body(), b"/x");
        assert_eq!(*ORDER.lock().unwrap(), ["first", "second"]);
    }

    #[tokio::test]
    async fn a_layer_can_answer_without_calling_next() {
        let layers: Arc<[Arc<dyn Middleware>]> = Arc::from(vec![Arc::new(block) as Arc<dyn Middleware>]);
        let res = Next::new(layers, Arc::new(Echo)).run(Request::new("GET", "/x")).await;
        assert_eq!(res.status_code(), 400);
        assert!(res.body().is_empty());
    }
}
