use crate::method::Method;
use http::StatusCode;
use thiserror::Error;

/// Errors raised while building requests, registering routes or dispatching.
///
/// Each variant maps to a status through [`WebError::status`]; the
/// [`Responder`](crate::Responder) impl turns an error into the
/// `{"error": message}` json response.
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Route Not Found")]
    RouteNotFound { method: Method, path: String },

    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("handler expects path parameter #{index} but the route captured {captured}")]
    MissingPathParam { index: usize, captured: usize },

    #[error("invalid path parameter #{index}: `{value}`")]
    InvalidPathParam { index: usize, value: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    /// A middleware or handler refused the request.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl WebError {
    pub fn route_not_found(method: Method, path: impl Into<String>) -> Self {
        Self::RouteNotFound { method, path: path.into() }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern { pattern: pattern.into(), source }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_request<S: ToString>(str: S) -> Self {
        Self::InvalidRequest { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn rejected<S: ToString>(status: StatusCode, message: S) -> Self {
        Self::Rejected { status, message: message.to_string() }
    }

    /// The status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            WebError::InvalidPattern { .. } | WebError::MissingPathParam { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::InvalidPathParam { .. }
            | WebError::InvalidHeader { .. }
            | WebError::InvalidRequest { .. }
            | WebError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            WebError::Rejected { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found() {
        let error = WebError::route_not_found(Method::Post, "/users/1");
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "Route Not Found");
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = regex::Regex::new("/users/(").unwrap_err();
        let error = WebError::invalid_pattern("/users/(", source);
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("invalid route pattern `/users/(`"));
    }

    #[test]
    fn test_rejected_uses_its_status() {
        let error = WebError::rejected(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded");
        assert_eq!(error.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error.to_string(), "Rate limit exceeded");
    }
}
