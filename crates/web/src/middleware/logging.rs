use super::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use std::time::Instant;
use tracing::info;

/// Logs every request on the way in and its status on the way out.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        let method = req.method();
        let uri = req.uri().to_string();
        let remote = req.remote_addr().map_or_else(|| String::from("unknown"), |addr| addr.ip().to_string());
        info!(%method, %uri, %remote, "Request: {method} {uri} from {remote}");

        let start = Instant::now();
        let response = next.run(req);
        info!(%method, %uri, status = response.status().as_u16(), elapsed = ?start.elapsed(), "Request processed");
        response
    }
}
