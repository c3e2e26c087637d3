//! Middlewares and the chain that wraps them around a handler.
//!
//! A chain is built once, when a route is registered: the middleware list is
//! folded from the back, each layer wrapping the handler built so far. The
//! first middleware of the list therefore runs first and sees the response
//! last. A middleware that returns without calling [`Next::run`] short-circuits
//! every layer after it and the handler itself.

mod bearer_auth;
mod cors;
mod json_content_type;
mod logging;
mod rate_limit;

pub use bearer_auth::{BearerAuthMiddleware, TokenValidator};
pub use cors::{CorsConfig, CorsMiddleware};
pub use json_content_type::JsonContentTypeMiddleware;
pub use logging::LoggingMiddleware;
pub use rate_limit::{RateLimitConfig, RateLimitMiddleware};

use crate::handler::RequestHandler;
use crate::request::{PathParams, Request};
use crate::response::Response;
use std::fmt;
use std::sync::Arc;

/// A pre/post processor around a route handler.
pub trait Middleware: Send + Sync {
    fn handle(&self, req: Request, next: Next<'_>) -> Response;
}

impl<T: Middleware + ?Sized> Middleware for Arc<T> {
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        (**self).handle(req, next)
    }
}

impl<T: Middleware + ?Sized> Middleware for Box<T> {
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        (**self).handle(req, next)
    }
}

/// A middleware shared between routes, stateful ones keep a single state.
pub type SharedMiddleware = Arc<dyn Middleware>;

/// The rest of the chain, as seen from one middleware.
pub struct Next<'a> {
    inner: &'a dyn RequestHandler,
    params: &'a PathParams,
}

impl<'a> Next<'a> {
    pub(crate) fn new(inner: &'a dyn RequestHandler, params: &'a PathParams) -> Self {
        Self { inner, params }
    }

    /// Passes `req` on to the next middleware, or to the handler.
    pub fn run(self, req: Request) -> Response {
        self.inner.invoke(req, self.params)
    }

    /// The capture groups of the matched route.
    pub fn params(&self) -> &PathParams {
        self.params
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("params", &self.params).finish_non_exhaustive()
    }
}

/// Adapts a closure into a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request, Next<'_>) -> Response + Send + Sync,
{
    FnMiddleware { f }
}

pub struct FnMiddleware<F> {
    f: F,
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware").field("f", &std::any::type_name::<F>()).finish()
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Next<'_>) -> Response + Send + Sync,
{
    fn handle(&self, req: Request, next: Next<'_>) -> Response {
        (self.f)(req, next)
    }
}

/// One layer of a chain.
struct MiddlewareHandler {
    middleware: SharedMiddleware,
    inner: Box<dyn RequestHandler>,
}

impl RequestHandler for MiddlewareHandler {
    fn invoke(&self, req: Request, params: &PathParams) -> Response {
        self.middleware.handle(req, Next::new(self.inner.as_ref(), params))
    }
}

/// An ordered middleware list, outermost first.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<SharedMiddleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `middleware`; it runs after every middleware already in the chain.
    pub fn push(&mut self, middleware: SharedMiddleware) {
        self.middlewares.push(middleware);
    }

    #[must_use]
    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedMiddleware> {
        self.middlewares.iter()
    }

    /// Wraps `handler` so the first middleware is the outermost layer.
    pub fn wrap(&self, handler: Box<dyn RequestHandler>) -> Box<dyn RequestHandler> {
        self.middlewares.iter().rev().fold(handler, |inner, middleware| {
            let layer: Box<dyn RequestHandler> =
                Box::new(MiddlewareHandler { middleware: Arc::clone(middleware), inner });
            layer
        })
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain").field("len", &self.middlewares.len()).finish()
    }
}

impl Extend<SharedMiddleware> for MiddlewareChain {
    fn extend<I: IntoIterator<Item = SharedMiddleware>>(&mut self, iter: I) {
        self.middlewares.extend(iter);
    }
}

impl FromIterator<SharedMiddleware> for MiddlewareChain {
    fn from_iter<I: IntoIterator<Item = SharedMiddleware>>(iter: I) -> Self {
        Self { middlewares: iter.into_iter().collect() }
    }
}
