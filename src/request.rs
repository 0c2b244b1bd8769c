//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Largest request body the server buffers, in bytes.
pub const BODY_LIMIT: usize = 100 * 1024;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An incoming HTTP request with its body fully buffered.
///
/// Query parameters are decoded once, up front, into a JSON object so the
/// validation layer can treat query and body input the same way. A key that
/// appears more than once becomes an array of its values.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) path: String,
    pub(crate) query: Map<String, Value>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// Builds a request from a method and a request target such as
    /// `/api/users?filter=username&value=anson`.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path.to_owned(), parse_query(query)),
            None => (url.clone(), Map::new()),
        };
        Self {
            method: method.into(),
            url,
            path,
            query,
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Buffers a hyper request into a [`Request`].
    ///
    /// Bodies over [`BODY_LIMIT`] fail with
    /// [`LengthLimitError`](http_body_util::LengthLimitError) before they are
    /// fully read.
    pub(crate) async fn from_hyper<B>(req: hyper::Request<B>) -> Result<Self, BoxError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let url = parts.uri.path_and_query()
            .map_or_else(|| parts.uri.path().to_owned(), |pq| pq.as_str().to_owned());
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        let body = Limited::new(body, BODY_LIMIT).collect().await?.to_bytes();

        let mut req = Self::new(parts.method.as_str(), url).with_body(body);
        req.headers = headers;
        Ok(req)
    }

    pub fn method(&self) -> &str { &self.method }
    /// Path plus query string, as sent by the client.
    pub fn url(&self) -> &str { &self.url }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn query(&self) -> &Map<String, Value> { &self.query }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a query parameter when it was given exactly once.
    pub fn query_str(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(Value::as_str)
    }

    /// Decodes the body as a JSON object. An empty body reads as `{}`.
    ///
    /// Anything that is not a JSON object is an [`ApiError::Internal`].
    pub fn json_object(&self) -> Result<Map<String, Value>, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice::<Value>(&self.body)? {
            Value::Object(map) => Ok(map),
            other => Err(ApiError::internal(format_args!(
                "expected a JSON object body, got {}",
                json_kind(&other),
            ))),
        }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

fn parse_query(query: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match map.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(first) => {
                let prev = first.take();
                *first = Value::Array(vec![prev, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    map
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_path_and_decodes_query() {
        let req = Request::new("GET", "/api/users?filter=user%20name&value=a+b");
        assert_eq!(req.path(), "/api/users");
        assert_eq!(req.url(), "/api/users?filter=user%20name&value=a+b");
        assert_eq!(req.query_str("filter"), Some("user name"));
        assert_eq!(req.query_str("value"), Some("a b"));
    }

    #[test]
    fn repeated_query_keys_become_arrays() {
        let req = Request::new("GET", "/api/users?value=a&value=b&value=c");
        assert_eq!(req.query()["value"], json!(["a", "b", "c"]));
        assert_eq!(req.query_str("value"), None);
    }

    #[test]
    fn empty_body_is_an_empty_object() {
        let req = Request::new("POST", "/api/users");
        assert!(req.json_object().unwrap().is_empty());
    }

    #[test]
    fn object_body_is_decoded() {
        let req = Request::new("POST", "/api/users").with_body(r#"{"username":"alice"}"#);
        assert_eq!(req.json_object().unwrap()["username"], json!("alice"));
    }

    #[test]
    fn non_object_bodies_are_internal_errors() {
        for body in ["[1,2]", "42", "{not json"] {
            let req = Request::new("PUT", "/api/users/1").with_body(body);
            assert!(matches!(req.json_object(), Err(ApiError::Internal(_))), "{body}");
        }
    }

    fn hyper_request(body: Vec<u8>) -> hyper::Request<http_body_util::Full<Bytes>> {
        hyper::Request::builder()
            .method("PATCH")
            .uri("/api/users/1?x=1")
            .header("content-type", "application/json")
            .body(http_body_util::Full::new(Bytes::from(body)))
            .unwrap()
    }

    #[tokio::test]
    async fn buffers_a_body_up_to_the_limit() {
        let req = Request::from_hyper(hyper_request(vec![b' '; BODY_LIMIT])).await.unwrap();
        assert_eq!(req.url(), "/api/users/1?x=1");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body().len(), BODY_LIMIT);
    }

    #[tokio::test]
    async fn rejects_a_body_over_the_limit() {
        let err = Request::from_hyper(hyper_request(vec![b' '; BODY_LIMIT + 1])).await.unwrap_err();
        assert!(err.downcast_ref::<http_body_util::LengthLimitError>().is_some());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new("GET", "/").with_header("Content-Type", "application/json");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }
}
