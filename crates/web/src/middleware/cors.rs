use super::{Middleware, Next};
use crate::error::WebError;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, HeaderName, HeaderValue,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: String::from("*"),
            allow_methods: String::from("GET, POST, PUT, PATCH, DELETE, OPTIONS"),
            allow_headers: String::from("Content-Type, Authorization, X-Requested-With"),
            allow_credentials: true,
        }
    }
}

/// Answers `OPTIONS` preflights directly and adds the CORS headers to every
/// other response.
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self {
            headers: vec![
                (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
                (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS")),
                (
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type, Authorization, X-Requested-With"),
                ),
                (ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true")),
            ],
        }
    }
}

impl CorsMiddleware {
    pub fn new(config: &CorsConfig) -> Result<Self, WebError> {
        let value = |name: &HeaderName, value: &str| {
            HeaderValue::from_str(value).map_err(|e| WebError::invalid_header(format!("invalid value for {name}: {e}")))
        };

        let mut headers = vec![
            (ACCESS_CONTROL_ALLOW_ORIGIN, value(&ACCESS_CONTROL_ALLOW_ORIGIN, &config.allow_origin)?),
            (ACCESS_CONTROL_ALLOW_METHODS, value(&ACCESS_CONTROL_ALLOW_METHODS, &config.allow_methods)?),
            (ACCESS_CONTROL_ALLOW_HEADERS, value(&ACCESS_CONTROL_ALLOW_HEADERS, &config.allow_headers)?),
        ];
        if config.allow_credentials {
            headers.push((ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true")));
        }
        Ok(Self { headers })
    }

    fn apply(&self, mut response: Response) -> Response {
        for (name, value) in &self.headers {
            response.headers_mut().insert(name.clone(), value.clone());
        }
        response
    }
}

impl Middleware for CorsMiddleware {
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        if req.method() == Method::Options {
            return self.apply(Response::empty());
        }
        self.apply(next.run(req))
    }
}
