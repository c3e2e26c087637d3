//! The route table and dispatcher.
//!
//! Routes are tried in registration order and the first one whose method and
//! pattern both match wins; later registrations never shadow earlier ones.
//! A pattern is a regular expression matched against the whole request path,
//! and its capture groups become the positional [`PathParams`] of the handler.

pub mod route;

use crate::error::WebError;
use crate::handler::RequestHandler;
use crate::method::Method;
use crate::request::{PathParams, Request};
use crate::responder::Responder;
use crate::response::Response;
use regex::Regex;
use route::RouteScope;
use std::fmt;
use tracing::{debug, warn};

/// Main router structure holding the routes in registration order.
#[derive(Default)]
pub struct Router {
    items: Vec<RouterItem>,
}

/// A registered route: its method, compiled pattern and handler.
pub struct RouterItem {
    method: Method,
    source: String,
    pattern: Regex,
    handler: Box<dyn RequestHandler>,
}

/// Result of matching a route, the matched item and its captures.
pub struct RouteMatch<'router> {
    item: &'router RouterItem,
    params: PathParams,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route.
    ///
    /// `pattern` must match the entire path: it is compiled as `^(?:pattern)$`,
    /// so alternations are anchored as a whole.
    pub fn add<H>(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), WebError>
    where
        H: RequestHandler + 'static,
    {
        self.add_boxed(method, pattern, Box::new(handler))
    }

    pub(crate) fn add_boxed(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Box<dyn RequestHandler>,
    ) -> Result<(), WebError> {
        let compiled =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|e| WebError::invalid_pattern(pattern, e))?;

        debug!(%method, pattern, index = self.items.len(), "route added");
        self.items.push(RouterItem { method, source: pattern.to_string(), pattern: compiled, handler });
        Ok(())
    }

    /// Starts a route scope with no prefix and no middlewares.
    pub fn routes(&mut self) -> RouteScope<'_> {
        RouteScope::new(self)
    }

    /// Finds the first route matching `method` and `path`.
    pub fn at(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        self.items.iter().filter(|item| item.method == method).find_map(|item| {
            let captures = item.pattern.captures(path)?;
            let params = captures
                .iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |group| group.as_str().to_string()))
                .collect::<Vec<_>>();
            Some(RouteMatch { item, params: params.into() })
        })
    }

    /// Dispatches `req` to the first matching route.
    ///
    /// Fails with [`WebError::RouteNotFound`] when no route matches; handler
    /// failures are already rendered into the returned response.
    pub fn try_dispatch(&self, req: Request) -> Result<Response, WebError> {
        let method = req.method();
        let Some(matched) = self.at(method, req.path()) else {
            warn!(%method, path = req.path(), "no route matched");
            return Err(WebError::route_not_found(method, req.path()));
        };

        debug!(%method, path = req.path(), pattern = matched.item.source(), "route matched");
        Ok(matched.item.handler().invoke(req, &matched.params))
    }

    /// Dispatches `req`, rendering a missing route as a 404 error response.
    pub fn dispatch(&self, req: Request) -> Response {
        self.try_dispatch(req).into_response()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[RouterItem] {
        &self.items
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl RouterItem {
    pub fn method(&self) -> Method {
        self.method
    }

    /// The pattern as registered, before anchoring.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for RouterItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterItem").field("method", &self.method).field("pattern", &self.source).finish()
    }
}

impl<'router> RouteMatch<'router> {
    pub fn item(&self) -> &'router RouterItem {
        self.item
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").field("item", self.item).field("params", &self.params).finish()
    }
}
