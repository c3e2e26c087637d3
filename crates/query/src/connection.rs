//! The relational connection the builder executes against.
//!
//! The builder never opens connections itself: callers hand it anything that
//! implements [`Connection`], typically a thin adapter over a driver or a pool
//! checkout. Values always travel separately from the SQL text as [`Bindings`].

use crate::value::{Bindings, Row};
use std::error::Error;

/// Error type surfaced by connection adapters.
pub type ConnectionError = Box<dyn Error + Send + Sync>;

/// A parameterized-query capable connection.
#[cfg_attr(test, mockall::automock)]
pub trait Connection {
    /// Runs a read statement and returns every result row in order.
    fn fetch_all(&self, sql: &str, bindings: &Bindings) -> Result<Vec<Row>, ConnectionError>;

    /// Runs a write statement and reports whether the driver accepted it.
    fn execute(&self, sql: &str, bindings: &Bindings) -> Result<bool, ConnectionError>;

    /// The identifier generated by the most recent insert on this connection.
    fn last_insert_id(&self) -> Result<String, ConnectionError>;
}
