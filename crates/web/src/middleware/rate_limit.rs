//! A sliding-window rate limiter keyed by client address.
//!
//! The request log lives in process memory, so limits are per process and
//! reset on restart. Timestamps older than the window are pruned lazily, on
//! the next request of the same client. At most once per window the whole
//! log is swept and clients with no request left in it are forgotten.

use super::{Middleware, Next};
use crate::error::WebError;
use crate::request::Request;
use crate::responder::Responder;
use crate::response::Response;
use http::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    max_requests: usize,
    window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 100, window: Duration::from_secs(60) }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self { max_requests, window }
    }

    #[must_use]
    pub fn with_max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[derive(Debug, Default)]
pub struct RateLimitMiddleware {
    config: RateLimitConfig,
    requests: Mutex<RequestLog>,
}

#[derive(Debug, Default)]
struct RequestLog {
    clients: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl RequestLog {
    fn sweep(&mut self, now: Instant, window: Duration) {
        if self.last_sweep.is_some_and(|at| now.saturating_duration_since(at) < window) {
            return;
        }
        self.clients.retain(|_, log| log.back().is_some_and(|&at| now.saturating_duration_since(at) < window));
        self.last_sweep = Some(now);
    }
}

impl RateLimitMiddleware {
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config, requests: Mutex::new(RequestLog::default()) }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Records a request of `client` made at `now`.
    ///
    /// Returns `false`, without recording, once the client already made
    /// `max_requests` requests within the window ending at `now`.
    pub fn check(&self, client: &str, now: Instant) -> bool {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        requests.sweep(now, self.config.window);
        let log = requests.clients.entry(client.to_string()).or_default();

        while log.front().is_some_and(|&at| now.saturating_duration_since(at) >= self.config.window) {
            log.pop_front();
        }

        if log.len() >= self.config.max_requests {
            return false;
        }

        log.push_back(now);
        true
    }

    /// The number of clients currently held in the request log.
    pub fn tracked_clients(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clients.len()
    }
}

impl Middleware for RateLimitMiddleware {
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        let client = req.remote_addr().map_or_else(|| UNKNOWN_CLIENT.to_string(), |addr| addr.ip().to_string());

        if self.check(&client, Instant::now()) {
            next.run(req)
        } else {
            warn!(client = %client, "Rate limit exceeded");
            WebError::rejected(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response()
        }
    }
}
