use super::{Middleware, Next};
use crate::error::WebError;
use crate::method::Method;
use crate::request::Request;
use crate::responder::Responder;
use crate::response::Response;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use mime::Mime;

/// Rejects `POST`, `PUT` and `PATCH` requests whose body is not declared as json.
///
/// Parameters such as `charset` are allowed, only the media type is compared.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonContentTypeMiddleware;

fn is_json(req: &Request) -> bool {
    req.header(CONTENT_TYPE)
        .and_then(|value| value.parse::<Mime>().ok())
        .is_some_and(|media| media.essence_str() == mime::APPLICATION_JSON.essence_str())
}

impl Middleware for JsonContentTypeMiddleware {
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        let has_body = matches!(req.method(), Method::Post | Method::Put | Method::Patch);
        if has_body && !is_json(&req) {
            return WebError::rejected(StatusCode::BAD_REQUEST, "Content-Type must be application/json")
                .into_response();
        }
        next.run(req)
    }
}
