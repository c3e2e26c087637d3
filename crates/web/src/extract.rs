//! Conversion of positional path captures into handler arguments.

use crate::error::WebError;
use crate::request::PathParams;

/// A type a single path capture can be converted into.
pub trait FromPathParam: Sized {
    fn from_path_param(index: usize, raw: &str) -> Result<Self, WebError>;
}

impl FromPathParam for String {
    fn from_path_param(_index: usize, raw: &str) -> Result<Self, WebError> {
        Ok(raw.to_string())
    }
}

/// An optional group that did not take part in the match captures `""`,
/// which converts to `None`.
impl<T: FromPathParam> FromPathParam for Option<T> {
    fn from_path_param(index: usize, raw: &str) -> Result<Self, WebError> {
        if raw.is_empty() { Ok(None) } else { T::from_path_param(index, raw).map(Some) }
    }
}

macro_rules! impl_from_path_param_for_parse {
    ($($ty:ty)*) => {
        $(
            impl FromPathParam for $ty {
                fn from_path_param(index: usize, raw: &str) -> Result<Self, WebError> {
                    raw.parse().map_err(|_| WebError::InvalidPathParam { index, value: raw.to_string() })
                }
            }
        )*
    };
}

impl_from_path_param_for_parse! { u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize bool }

/// Converts the capture at `index`, failing if the route captured fewer groups.
pub(crate) fn path_param<T: FromPathParam>(params: &PathParams, index: usize) -> Result<T, WebError> {
    let raw = params.get(index).ok_or(WebError::MissingPathParam { index, captured: params.len() })?;
    T::from_path_param(index, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_integers() {
        let params = PathParams::from(["12", "alice"]);
        assert_eq!(path_param::<u32>(&params, 0).unwrap(), 12);
        assert_eq!(path_param::<String>(&params, 1).unwrap(), "alice");
    }

    #[test]
    fn test_unparsable_capture() {
        let params = PathParams::from(["alice"]);
        let error = path_param::<u32>(&params, 0).unwrap_err();
        assert!(matches!(error, WebError::InvalidPathParam { index: 0, ref value } if value == "alice"));
    }

    #[test]
    fn test_missing_capture() {
        let params = PathParams::from(["12"]);
        let error = path_param::<String>(&params, 1).unwrap_err();
        assert!(matches!(error, WebError::MissingPathParam { index: 1, captured: 1 }));
    }

    #[test]
    fn test_optional_capture() {
        let params = PathParams::from(["", "7"]);
        assert_eq!(path_param::<Option<u32>>(&params, 0).unwrap(), None);
        assert_eq!(path_param::<Option<u32>>(&params, 1).unwrap(), Some(7));
    }
}
