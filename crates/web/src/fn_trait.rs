use crate::error::WebError;
use crate::extract::{FromPathParam, path_param};
use crate::request::{PathParams, Request};

/// Represents a route handler function: the request followed by the
/// route's capture groups, each converted with [`FromPathParam`].
///
/// Captures beyond the function's arity are ignored.
pub trait FnTrait<Args>: Send + Sync {
    type Output;
    fn call(&self, req: &Request, params: &PathParams) -> Result<Self::Output, WebError>;
}

/// Represents a controller method: the controller followed by the route's
/// capture groups.
pub trait ControllerFn<C, Args>: Send + Sync {
    type Output;
    fn call(&self, controller: &C, params: &PathParams) -> Result<Self::Output, WebError>;
}

/// impl `Fn` for `FnTrait` and `ControllerFn`, From 0 captures to 8 captures
///
/// for example, it will impl Fn(&Request, A, B) like this:
///```text
/// impl<Func, Out, A, B> FnTrait<(A, B)> for Func
///    where
///        Func: Fn(&Request, A, B) -> Out + Send + Sync,
///        A: FromPathParam,
///        B: FromPathParam,
/// {
///    type Output = Out;
///
///    fn call(&self, req: &Request, params: &PathParams) -> Result<Out, WebError> {
///        let A = path_param::<A>(params, 0)?;
///        let B = path_param::<B>(params, 1)?;
///        Ok((self)(req, A, B))
///    }
/// }
///```
macro_rules! impl_fn_trait_for_fn ({ $($param:ident $index:tt)* } => {
    impl<Func, Out, $($param,)*> FnTrait<($($param,)*)> for Func
    where
        Func: Fn(&Request, $($param),*) -> Out + Send + Sync,
        $($param: FromPathParam,)*
    {
        type Output = Out;

        #[inline]
        #[allow(non_snake_case, unused_variables, reason = "captures are bound to their type parameter names")]
        fn call(&self, req: &Request, params: &PathParams) -> Result<Out, WebError> {
            $(let $param = path_param::<$param>(params, $index)?;)*
            Ok((self)(req, $($param),*))
        }
    }

    impl<Func, Ctl, Out, $($param,)*> ControllerFn<Ctl, ($($param,)*)> for Func
    where
        Func: Fn(&Ctl, $($param),*) -> Out + Send + Sync,
        $($param: FromPathParam,)*
    {
        type Output = Out;

        #[inline]
        #[allow(non_snake_case, unused_variables, reason = "captures are bound to their type parameter names")]
        fn call(&self, controller: &Ctl, params: &PathParams) -> Result<Out, WebError> {
            $(let $param = path_param::<$param>(params, $index)?;)*
            Ok((self)(controller, $($param),*))
        }
    }
});

impl_fn_trait_for_fn! {}
impl_fn_trait_for_fn! { A 0 }
impl_fn_trait_for_fn! { A 0 B 1 }
impl_fn_trait_for_fn! { A 0 B 1 C 2 }
impl_fn_trait_for_fn! { A 0 B 1 C 2 D 3 }
impl_fn_trait_for_fn! { A 0 B 1 C 2 D 3 E 4 }
impl_fn_trait_for_fn! { A 0 B 1 C 2 D 3 E 4 F 5 }
impl_fn_trait_for_fn! { A 0 B 1 C 2 D 3 E 4 F 5 G 6 }
impl_fn_trait_for_fn! { A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7 }
