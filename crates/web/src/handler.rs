use crate::fn_trait::{ControllerFn, FnTrait};
use crate::request::{PathParams, Request};
use crate::responder::Responder;
use crate::response::Response;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Anything a route can dispatch to: a plain function, a controller method,
/// or a handler wrapped in middlewares.
///
/// Handlers never fail: errors are already rendered into the response.
pub trait RequestHandler: Send + Sync {
    fn invoke(&self, req: Request, params: &PathParams) -> Response;
}

impl<T: RequestHandler + ?Sized> RequestHandler for Box<T> {
    fn invoke(&self, req: Request, params: &PathParams) -> Response {
        (**self).invoke(req, params)
    }
}

impl<T: RequestHandler + ?Sized> RequestHandler for Arc<T> {
    fn invoke(&self, req: Request, params: &PathParams) -> Response {
        (**self).invoke(req, params)
    }
}

/// a `FnTrait` holder which represents any `Fn(&Request, captures..)`
pub struct FnHandler<F, Args> {
    f: F,
    _phantom: PhantomData<fn(Args)>,
}

impl<F, Args> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

pub fn handler_fn<F, Args>(f: F) -> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    FnHandler::new(f)
}

impl<F, Args> fmt::Debug for FnHandler<F, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("f", &std::any::type_name::<F>()).finish()
    }
}

impl<F, Args> RequestHandler for FnHandler<F, Args>
where
    F: FnTrait<Args>,
    F::Output: Responder,
{
    fn invoke(&self, req: Request, params: &PathParams) -> Response {
        self.f.call(&req, params).into_response()
    }
}

/// A type whose methods serve routes.
///
/// A fresh controller is built from the request for every dispatch, so a
/// controller may keep per-request state without synchronization.
pub trait Controller: Sized {
    fn new(request: Request) -> Self;
}

/// a `ControllerFn` holder, instantiating `C` on each dispatch
pub struct ControllerHandler<C, M, Args> {
    method: M,
    _phantom: PhantomData<fn(C, Args)>,
}

pub fn controller_fn<C, M, Args>(method: M) -> ControllerHandler<C, M, Args>
where
    C: Controller,
    M: ControllerFn<C, Args>,
{
    ControllerHandler { method, _phantom: PhantomData }
}

impl<C, M, Args> fmt::Debug for ControllerHandler<C, M, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHandler")
            .field("controller", &std::any::type_name::<C>())
            .field("method", &std::any::type_name::<M>())
            .finish()
    }
}

impl<C, M, Args> RequestHandler for ControllerHandler<C, M, Args>
where
    C: Controller,
    M: ControllerFn<C, Args>,
    M::Output: Responder,
{
    fn invoke(&self, req: Request, params: &PathParams) -> Response {
        let controller = C::new(req);
        self.method.call(&controller, params).into_response()
    }
}
