//! The routing half of lightful.
//!
//! A [`Router`] maps a method and a regex path pattern to a handler. Routes are
//! declared directly with [`Router::add`], or through the scoped DSL of
//! [`Router::routes`], where [`Group`]s contribute a path prefix and
//! [`Middleware`]s to every route declared inside them.
//!
//! Everything here is synchronous: a dispatch runs the middleware chain and
//! the handler on the calling thread, and a built router can be shared
//! between threads.

mod error;
mod extract;
mod fn_trait;
mod handler;
mod method;
mod request;
mod responder;
mod response;

pub mod middleware;
pub mod router;

pub use error::WebError;
pub use extract::FromPathParam;
pub use fn_trait::{ControllerFn, FnTrait};
pub use handler::{Controller, ControllerHandler, FnHandler, RequestHandler, controller_fn, handler_fn};
pub use method::Method;
pub use middleware::{
    BearerAuthMiddleware, CorsConfig, CorsMiddleware, JsonContentTypeMiddleware, LoggingMiddleware, Middleware,
    MiddlewareChain, Next, RateLimitConfig, RateLimitMiddleware, SharedMiddleware, TokenValidator, middleware_fn,
};
pub use request::{PathParams, Request, RequestBuilder, UploadedFile};
pub use responder::{Json, Responder};
pub use response::Response;
pub use router::Router;
pub use router::route::{Group, Route, RouteScope};
