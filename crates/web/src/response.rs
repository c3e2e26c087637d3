//! The response produced by handlers and middlewares.
//!
//! [`Response::error`] is the one place failures turn into output: every
//! error path of the router and the stock middlewares goes through it, so
//! they all log the same way and render the same `{"error": message}` body.

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use tracing::error;

const APPLICATION_JSON: &str = "application/json; charset=utf-8";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::empty()
    }
}

impl Response {
    /// A response with `body` and no headers.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    /// Serializes `data` as the json body.
    ///
    /// Data that cannot be serialized yields a 500 error response instead.
    pub fn json<T: Serialize + ?Sized>(data: &T, status: StatusCode) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::new(status, body).with_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)),
            Err(e) => Self::error(format!("failed to serialize response: {e}"), StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Logs `message` and renders it as `{"error": message}`.
    pub fn error(message: impl Into<String>, status: StatusCode) -> Self {
        let message = message.into();
        error!(status = status.as_u16(), "{message}");
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status, body).with_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body).with_header(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))
    }

    /// A 204 response with no body.
    pub fn empty() -> Self {
        Self::new(StatusCode::NO_CONTENT, String::new())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn into_http(self) -> http::Response<String> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl From<Response> for http::Response<String> {
    fn from(response: Response) -> Self {
        response.into_http()
    }
}
