//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler; anything unregistered goes to the fallback.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Endpoint, Middleware, Next};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// The application router.
///
/// Build it once at startup with the shared state `S` every handler
/// receives; pass it to [`Server::serve`](crate::Server::serve). Each builder
/// call returns `self` so registrations chain naturally.
pub struct Router<S = ()> {
    routes: Routes<S>,
    layers: Vec<Arc<dyn Middleware>>,
}

struct Routes<S> {
    trees: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    fallback: Option<BoxedHandler<S>>,
    state: S,
}

impl Router<()> {
    pub fn new() -> Self {
        Self::with_state(())
    }
}

impl Default for Router<()> {
    fn default() -> Self { Self::new() }
}

impl<S: Clone + Send + Sync + 'static> Router<S> {
    pub fn with_state(state: S) -> Self {
        Self {
            routes: Routes { trees: HashMap::new(), fallback: None, state },
            layers: Vec::new(),
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use roster::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request, _: ()) -> Response { Response::text("") }
    /// # async fn create_user(_: Request, _: ()) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/users/{id}", get_user)
    ///     .on(Method::Post, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or conflicts with a route
    /// already registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes.trees
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));
        self
    }

    /// Handler for requests no route matches. Defaults to an empty `404`.
    pub fn fallback(mut self, handler: impl Handler<S>) -> Self {
        self.routes.fallback = Some(handler.into_boxed_handler());
        self
    }

    /// Appends a middleware. Layers run in the order they are added, before
    /// route lookup.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Freezes the router into a callable [`Service`].
    pub fn into_service(self) -> Service {
        Service {
            layers: Arc::from(self.layers),
            endpoint: Arc::new(self.routes),
        }
    }
}

impl<S> Routes<S> {
    /// Finds the handler for `method` and `path` along with its decoded path
    /// parameters. `HEAD` falls back to the `GET` route when no `HEAD` route
    /// is registered; hyper drops the body on the way out.
    fn lookup(&self, method: &str, path: &str) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let method: Method = method.parse().ok()?;
        // `/api/users/` is the same resource as `/api/users`.
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let matched = match self.at(method, path) {
            None if method == Method::Head => self.at(Method::Get, path)?,
            other => other?,
        };
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), percent_decode_str(v).decode_utf8_lossy().into_owned()))
            .collect();
        Some((handler, params))
    }

    fn at<'t, 'p>(&'t self, method: Method, path: &'p str) -> Option<matchit::Match<'t, 'p, &'t BoxedHandler<S>>> {
        self.trees.get(&method)?.at(path).ok()
    }
}

impl<S: Clone + Send + Sync + 'static> Endpoint for Routes<S> {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(req, self.state.clone())
            }
            None => {
                debug!(method = %req.method(), path = %req.path(), "no route matched");
                match &self.fallback {
                    Some(fallback) => fallback.call(req, self.state.clone()),
                    None => Box::pin(async { Response::status(Status::NotFound) }),
                }
            }
        }
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// A frozen router: middleware chain plus route table, cheap to clone.
///
/// [`Server`](crate::Server) drives one of these per connection; tests can
/// call it directly without a socket.
#[derive(Clone)]
pub struct Service {
    layers: Arc<[Arc<dyn Middleware>]>,
    endpoint: Arc<dyn Endpoint>,
}

impl Service {
    /// Runs one request through the middleware chain and the router.
    ///
    /// The chain runs as its own task, so a panic anywhere in it becomes a
    /// `500` for this request instead of tearing down the connection.
    pub async fn call(&self, req: Request) -> Response {
        let next = Next::new(Arc::clone(&self.layers), Arc::clone(&self.endpoint));
        match tokio::spawn(next.run(req)).await {
            Ok(res) => res,
            Err(e) => {
                error!("request task failed: {e}");
                ApiError::internal(e).into_response()
            }
        }
    }
}
