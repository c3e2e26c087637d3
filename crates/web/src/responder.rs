//! Conversion of handler return values into responses.
//!
//! Handlers and controller methods may return anything implementing
//! [`Responder`]: a ready [`Response`], plain text, a [`Json`] payload, a
//! `Result` whose error side is a [`WebError`], and so on.

use crate::error::WebError;
use crate::response::Response;
use http::StatusCode;
use serde::Serialize;

/// A trait for types that can be converted into a [`Response`].
pub trait Responder {
    fn into_response(self) -> Response;
}

impl Responder for Response {
    fn into_response(self) -> Response {
        self
    }
}

/// Both the Ok and Err variants must implement Responder.
impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// `None` becomes an empty 204 response.
impl<T: Responder> Responder for Option<T> {
    fn into_response(self) -> Response {
        match self {
            Some(t) => t.into_response(),
            None => Response::empty(),
        }
    }
}

/// Overrides the status of the inner response.
impl<T: Responder> Responder for (StatusCode, T) {
    fn into_response(self) -> Response {
        let (status, responder) = self;
        responder.into_response().with_status(status)
    }
}

impl<T: Responder> Responder for Box<T> {
    fn into_response(self) -> Response {
        (*self).into_response()
    }
}

impl Responder for () {
    fn into_response(self) -> Response {
        Response::empty()
    }
}

impl Responder for String {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl Responder for &'static str {
    fn into_response(self) -> Response {
        Response::text(self)
    }
}

impl Responder for WebError {
    fn into_response(self) -> Response {
        Response::error(self.to_string(), self.status())
    }
}

/// A json payload answered with `200 OK`.
///
/// Pair it with a status to answer with another one: `(StatusCode::CREATED, Json(user))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize> Responder for Json<T> {
    fn into_response(self) -> Response {
        Response::json(&self.0, StatusCode::OK)
    }
}
