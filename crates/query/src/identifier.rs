//! Validation of structural SQL tokens.
//!
//! Table, column and join identifiers cannot be bound as parameters, so they
//! are checked against a strict pattern before they reach the statement text.
//! Operators and directions are checked against fixed allow-lists.

use crate::error::QueryError;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern is valid"));

/// Comparison operators accepted by `where_`, in their canonical spelling.
const OPERATORS: [&str; 10] = ["=", "!=", "<>", "<", "<=", ">", ">=", "LIKE", "IN", "NOT IN"];

/// Checks that `identifier` is a plain SQL identifier.
///
/// # Errors
/// Returns [`QueryError::InvalidIdentifier`] for anything other than a letter
/// or underscore followed by letters, digits or underscores.
pub fn validate_identifier(identifier: &str) -> Result<&str, QueryError> {
    if IDENTIFIER.is_match(identifier) {
        Ok(identifier)
    } else {
        Err(QueryError::invalid_identifier(identifier))
    }
}

/// A comparison operator from the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Operator(&'static str);

impl Operator {
    /// Matches `raw` case-insensitively against the allow-list.
    pub(crate) fn parse(raw: &str) -> Result<Self, QueryError> {
        let upper = raw.to_ascii_uppercase();
        OPERATORS
            .iter()
            .find(|op| **op == upper)
            .map(|op| Operator(*op))
            .ok_or_else(|| QueryError::invalid_operator(raw))
    }

    #[inline]
    pub(crate) fn is_list(self) -> bool {
        matches!(self.0, "IN" | "NOT IN")
    }

    #[inline]
    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(QueryError::invalid_direction(s)),
        }
    }
}
