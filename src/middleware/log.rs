//! Request logging.
//!
//! Two pass-through layers, registered in this order: the request line, then
//! a completion marker once logging is done. Neither ever short-circuits.

use tracing::{debug, info};

use super::Next;
use crate::request::Request;
use crate::response::Response;

/// Logs `METHOD URL` for every request, matched or not.
pub async fn log_request(req: Request, next: Next) -> Response {
    info!(method = %req.method(), url = %req.url(), "request");
    next.run(req).await
}

/// Marks the end of the logging stage.
pub async fn log_finished(req: Request, next: Next) -> Response {
    debug!("Finished Logging...");
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{Method, Router};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[tokio::test]
    async fn request_line_is_logged_once_as_fields() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let svc = Router::new()
            .layer(log_request)
            .on(Method::Get, "/api", |_req: Request, _state: ()| async { "ok" })
            .into_service();
        svc.call(Request::new("GET", "/api?x=1")).await;

        let out = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("request method=GET url=/api?x=1"), "{out}");
        assert_eq!(out.matches("/api?x=1").count(), 1, "{out}");
    }
}
