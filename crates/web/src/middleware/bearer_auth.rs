use super::{Middleware, Next};
use crate::error::WebError;
use crate::request::Request;
use crate::responder::Responder;
use crate::response::Response;
use http::StatusCode;
use http::header::AUTHORIZATION;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static BEARER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Bearer\s+(\S.*)$").expect("bearer pattern is valid"));

/// Decides whether a bearer token is accepted.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> bool;
}

impl<F> TokenValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn validate(&self, token: &str) -> bool {
        (self)(token)
    }
}

/// Requires an `Authorization: Bearer <token>` header accepted by the validator.
pub struct BearerAuthMiddleware {
    validator: Box<dyn TokenValidator>,
}

impl BearerAuthMiddleware {
    pub fn new<V: TokenValidator + 'static>(validator: V) -> Self {
        Self { validator: Box::new(validator) }
    }
}

impl fmt::Debug for BearerAuthMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthMiddleware").finish_non_exhaustive()
    }
}

fn unauthorized(message: &str) -> Response {
    WebError::rejected(StatusCode::UNAUTHORIZED, message).into_response()
}

impl Middleware for BearerAuthMiddleware {
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        let Some(header) = req.header(AUTHORIZATION).filter(|value| !value.is_empty()) else {
            return unauthorized("Authorization header required");
        };

        let Some(token) = BEARER.captures(header).and_then(|captures| captures.get(1)) else {
            return unauthorized("Invalid Authorization format");
        };

        if !self.validator.validate(token.as_str().trim_end()) {
            return unauthorized("Invalid token");
        }

        next.run(req)
    }
}
