//! A fluent builder for parameterized SQL statements.
//!
//! [`QueryBuilder`] accumulates the clauses of one `SELECT`, `INSERT`, `UPDATE`
//! or `DELETE` statement and renders SQL text plus a map of placeholder
//! bindings. Identifiers are validated against `^[a-zA-Z_][a-zA-Z0-9_]*$`;
//! values only ever travel as bindings. Statements run against any
//! [`Connection`] implementation.

mod builder;
mod config;
mod connection;
mod error;
mod identifier;
mod value;

pub use builder::{Operand, QueryBuilder, QueryMode, Statement};
pub use config::DatabaseConfig;
pub use connection::{Connection, ConnectionError};
pub use error::QueryError;
pub use identifier::{Direction, validate_identifier};
pub use value::{Bindings, NotScalar, Row, Value};
