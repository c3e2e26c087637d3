//! Request types handed to middlewares, handlers and controllers.
//!
//! This module contains:
//! - `Request`: an immutable snapshot of one inbound request
//! - `RequestBuilder`: assembles a `Request` from its parts
//! - `PathParams`: the positional capture groups of the matched route
//! - `UploadedFile`: the metadata of an uploaded file

use crate::error::WebError;
use crate::method::Method;
use http::HeaderMap;
use http::header::{AsHeaderName, CONTENT_TYPE, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;

/// An inbound request.
///
/// The request is a value: middlewares receive it by value and may hand a
/// modified copy further down the chain, but nothing mutates it in place.
/// Header lookup is case-insensitive.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    path: String,
    query_string: Option<String>,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Option<String>,
    form: HashMap<String, String>,
    files: Vec<UploadedFile>,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Builds a bodiless request for `uri`.
    pub fn new(method: Method, uri: &str) -> Result<Self, WebError> {
        Self::builder().method(method).uri(uri).build()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn is_method(&self, method: Method) -> bool {
        self.method == method
    }

    /// The raw request target, query string included.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The path component of the uri; this is what routes match against.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Returns a single query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Deserializes the whole query string, nested keys included.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, WebError> {
        serde_qs::from_str(self.query_string.as_deref().unwrap_or_default())
            .map_err(|e| WebError::invalid_request(format!("invalid query string: {e}")))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value, if present and valid visible ascii.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Deserializes the body as json.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, WebError> {
        let body = self.body.as_deref().ok_or_else(|| WebError::invalid_body("request has no body"))?;
        serde_json::from_str(body).map_err(|e| WebError::invalid_body(e.to_string()))
    }

    pub fn form(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    pub fn form_fields(&self) -> &HashMap<String, String> {
        &self.form
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns a copy of this request with `name` set to `value`.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl TryFrom<http::Request<String>> for Request {
    type Error = WebError;

    fn try_from(request: http::Request<String>) -> Result<Self, Self::Error> {
        let (parts, body) = request.into_parts();
        let mut builder = Request::builder().method(&parts.method).uri(parts.uri.to_string());
        builder.headers = parts.headers;
        if !body.is_empty() {
            builder = builder.body(body);
        }
        builder.build()
    }
}

/// A builder for [`Request`].
///
/// Like `http::request::Builder`, the first invalid part is remembered and
/// reported by [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Option<String>,
    form: HashMap<String, String>,
    files: Vec<UploadedFile>,
    remote_addr: Option<SocketAddr>,
    error: Option<WebError>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            uri: String::from("/"),
            headers: HeaderMap::new(),
            body: None,
            form: HashMap::new(),
            files: Vec::new(),
            remote_addr: None,
            error: None,
        }
    }

    pub fn method(mut self, method: impl Into<Method>) -> Self {
        self.method = method.into();
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => {
                self.error = Some(WebError::invalid_header(format!("invalid header name `{name}`: {e}")));
            }
            (_, Err(e)) => {
                self.error = Some(WebError::invalid_header(format!("invalid value for header `{name}`: {e}")));
            }
        }
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    pub fn file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Parses the uri and query string and finishes the request.
    ///
    /// An urlencoded body is decoded into form fields, fields set explicitly
    /// through [`RequestBuilder::form_field`] win over decoded ones.
    pub fn build(self) -> Result<Request, WebError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let parsed: http::Uri =
            self.uri.parse().map_err(|e| WebError::invalid_request(format!("invalid uri `{}`: {e}", self.uri)))?;
        let path = parsed.path().to_string();
        let query_string = parsed.query().map(str::to_string);
        let query = match &query_string {
            Some(query) => decode_pairs(query)?,
            None => HashMap::new(),
        };

        let mut form = match (&self.body, is_urlencoded(&self.headers)) {
            (Some(body), true) => decode_pairs(body)?,
            _ => HashMap::new(),
        };
        form.extend(self.form);

        Ok(Request {
            method: self.method,
            uri: self.uri,
            path,
            query_string,
            query,
            headers: self.headers,
            body: self.body,
            form,
            files: self.files,
            remote_addr: self.remote_addr,
        })
    }
}

fn decode_pairs(encoded: &str) -> Result<HashMap<String, String>, WebError> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(encoded)
        .map(|pairs| pairs.into_iter().collect())
        .map_err(|e| WebError::invalid_request(format!("invalid urlencoded data: {e}")))
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|media| media.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
}

/// An uploaded file, kept as metadata only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    field: String,
    file_name: String,
    content_type: Option<String>,
    size: u64,
}

impl UploadedFile {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        size: u64,
    ) -> Self {
        Self { field: field.into(), file_name: file_name.into(), content_type, size }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// The capture groups of a matched route, in pattern order.
///
/// A group that did not take part in the match is kept as an empty string so
/// positions stay stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<String>,
}

impl PathParams {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Gets the capture at `index`, zero based.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for PathParams {
    fn from(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl<const N: usize> From<[&str; N]> for PathParams {
    fn from(values: [&str; N]) -> Self {
        Self { values: values.iter().map(|value| (*value).to_string()).collect() }
    }
}
