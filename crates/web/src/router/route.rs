//! The route declaration DSL.
//!
//! A [`RouteScope`] carries the path prefix and middleware list accumulated
//! by the groups enclosing it. Declaring a route in a scope produces a
//! [`Route`] which reaches the router only once [`Route::register`] is called;
//! a route that is dropped unregistered is silently discarded.
//!
//! ```
//! use lightful_web::{Group, LoggingMiddleware, Method, Request, Router, handler_fn};
//!
//! let mut router = Router::new();
//! router.routes().group(Group::new().prefix("/api").middleware(LoggingMiddleware), |api| {
//!     api.get(r"/users/(\d+)", handler_fn(|_req: &Request, id: u32| format!("user {id}"))).register()
//! })?;
//!
//! assert_eq!(router.items()[0].source(), r"/api/users/(\d+)");
//! let response = router.dispatch(Request::new(Method::Get, "/api/users/12")?);
//! assert_eq!(response.body(), "user 12");
//! # Ok::<(), lightful_web::WebError>(())
//! ```

use super::Router;
use crate::error::WebError;
use crate::handler::RequestHandler;
use crate::method::Method;
use crate::middleware::{Middleware, MiddlewareChain, SharedMiddleware};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The prefix and middlewares a group adds to the routes declared in it.
#[derive(Clone, Default)]
pub struct Group {
    prefix: String,
    middlewares: Vec<SharedMiddleware>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appended to the prefix of the enclosing scope.
    ///
    /// Route patterns are joined to the prefix as plain text, so a top-level
    /// alternation in a route binds looser than the prefix: under `/api`,
    /// `/a|/b` becomes `/api/a|/b`. Write `/(?:a|b)` to keep both branches
    /// inside the group.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Appended after the middlewares of the enclosing scope.
    #[must_use]
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn middlewares<I>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.middlewares.extend(middlewares);
        self
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group").field("prefix", &self.prefix).field("middlewares", &self.middlewares.len()).finish()
    }
}

/// A place routes are declared in, the router root or the inside of a group.
pub struct RouteScope<'r> {
    router: &'r mut Router,
    prefix: String,
    middlewares: Vec<SharedMiddleware>,
}

macro_rules! route_method {
    ($($name:ident => $method:expr,)*) => {
        $(
            #[doc = concat!("Declares a `", stringify!($name), "` route in this scope.")]
            pub fn $name<H>(&mut self, pattern: &str, handler: H) -> Route<'_>
            where
                H: RequestHandler + 'static,
            {
                self.route($method, pattern, handler)
            }
        )*
    };
}

impl<'r> RouteScope<'r> {
    pub(crate) fn new(router: &'r mut Router) -> Self {
        Self { router, prefix: String::new(), middlewares: Vec::new() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Runs `f` in a nested scope.
    ///
    /// The nested scope sees this scope's prefix followed by the group's, and
    /// this scope's middlewares followed by the group's. Leaving `f` restores
    /// nothing: the outer scope was never changed.
    pub fn group<F, R>(&mut self, group: Group, f: F) -> R
    where
        F: FnOnce(&mut RouteScope<'_>) -> R,
    {
        let mut nested = RouteScope {
            router: &mut *self.router,
            prefix: format!("{}{}", self.prefix, group.prefix),
            middlewares: self.middlewares.iter().cloned().chain(group.middlewares).collect(),
        };
        f(&mut nested)
    }

    /// Declares a route for `method` in this scope.
    pub fn route<H>(&mut self, method: Method, pattern: &str, handler: H) -> Route<'_>
    where
        H: RequestHandler + 'static,
    {
        Route {
            router: &mut *self.router,
            method,
            pattern: format!("{}{pattern}", self.prefix),
            handler: Box::new(handler),
            middlewares: self.middlewares.clone(),
        }
    }

    route_method! {
        get => Method::Get,
        post => Method::Post,
        put => Method::Put,
        patch => Method::Patch,
        delete => Method::Delete,
        options => Method::Options,
    }
}

impl fmt::Debug for RouteScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteScope")
            .field("prefix", &self.prefix)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// A declared route, waiting for [`Route::register`].
#[must_use = "a route reaches the router only once `register` is called"]
pub struct Route<'s> {
    router: &'s mut Router,
    method: Method,
    pattern: String,
    handler: Box<dyn RequestHandler>,
    middlewares: Vec<SharedMiddleware>,
}

impl Route<'_> {
    pub fn method(&self) -> Method {
        self.method
    }

    /// The full pattern, scope prefix included.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Appends a middleware after those inherited from the enclosing groups.
    pub fn middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn middlewares<I>(mut self, middlewares: I) -> Self
    where
        I: IntoIterator<Item = SharedMiddleware>,
    {
        self.middlewares.extend(middlewares);
        self
    }

    /// Wraps the handler in the route's middlewares and adds it to the router.
    pub fn register(self) -> Result<(), WebError> {
        let Route { router, method, pattern, handler, middlewares } = self;

        debug!(%method, pattern = %pattern, middlewares = middlewares.len(), "registering route");
        let handler = if middlewares.is_empty() {
            handler
        } else {
            middlewares.into_iter().collect::<MiddlewareChain>().wrap(handler)
        };
        router.add_boxed(method, &pattern, handler)
    }
}

impl fmt::Debug for Route<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}
