//! Fluent builder for parameterized SQL statements.
//!
//! Structural tokens (tables, columns) are validated with
//! [`validate_identifier`]; values are never written into the statement text.
//! Each value receives a fresh `:pN` placeholder from a per-builder counter and
//! is recorded in the builder's [`Bindings`].
//!
//! # Example
//! ```
//! use lightful_query::{Bindings, Connection, ConnectionError, QueryBuilder, Row};
//!
//! struct NoopConnection;
//!
//! impl Connection for NoopConnection {
//!     fn fetch_all(&self, _sql: &str, _bindings: &Bindings) -> Result<Vec<Row>, ConnectionError> {
//!         Ok(vec![])
//!     }
//!     fn execute(&self, _sql: &str, _bindings: &Bindings) -> Result<bool, ConnectionError> {
//!         Ok(true)
//!     }
//!     fn last_insert_id(&self) -> Result<String, ConnectionError> {
//!         Ok("0".into())
//!     }
//! }
//!
//! # fn main() -> Result<(), lightful_query::QueryError> {
//! let connection = NoopConnection;
//! let query = QueryBuilder::new(&connection)
//!     .select(["id", "email"])?
//!     .table("users")?
//!     .where_("id", "=", 42)?
//!     .limit(1);
//!
//! assert_eq!(query.get_sql()?, "SELECT id, email FROM users WHERE id = :p0 LIMIT 1");
//! # Ok(())
//! # }
//! ```

use crate::connection::Connection;
use crate::error::QueryError;
use crate::identifier::{Direction, Operator, validate_identifier};
use crate::value::{Bindings, Row, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The statement kind a builder renders. The last mode-setting call wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryMode::Select => "SELECT",
            QueryMode::Insert => "INSERT",
            QueryMode::Update => "UPDATE",
            QueryMode::Delete => "DELETE",
        }
    }
}

impl FromStr for QueryMode {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Ok(QueryMode::Select),
            "INSERT" => Ok(QueryMode::Insert),
            "UPDATE" => Ok(QueryMode::Update),
            "DELETE" => Ok(QueryMode::Delete),
            _ => Err(QueryError::unsupported_query_mode(s)),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinKind {
    fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Outer => "OUTER",
        }
    }
}

/// The right-hand side of a `WHERE` comparison.
///
/// Scalars convert implicitly; vectors and arrays become lists, which only the
/// `IN` and `NOT IN` operators accept.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

macro_rules! operand_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                #[inline]
                fn from(value: $ty) -> Self {
                    Operand::Scalar(value.into())
                }
            }
        )*
    };
}

operand_from_scalar!(Value, bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, String, &str);

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(value: Option<T>) -> Self {
        Operand::Scalar(value.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(values: [T; N]) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

/// A rendered statement together with the values its placeholders refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    bindings: Bindings,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn into_parts(self) -> (String, Bindings) {
        (self.sql, self.bindings)
    }
}

/// Accumulates the clauses of one statement.
///
/// Methods that validate input take the builder by value and return it inside
/// a `Result`; a failed call drops the builder together with everything it
/// accumulated.
pub struct QueryBuilder<'c, C: ?Sized> {
    connection: &'c C,
    table: Option<String>,
    mode: QueryMode,
    columns: Vec<String>,
    joins: Vec<String>,
    wheres: Vec<String>,
    where_bindings: Bindings,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u64>,
    insert_data: Vec<(String, Value)>,
    update_set: Vec<String>,
    update_bindings: Bindings,
    next_param: usize,
}

impl<C: ?Sized> fmt::Debug for QueryBuilder<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("table", &self.table)
            .field("mode", &self.mode)
            .field("wheres", &self.wheres)
            .field("where_bindings", &self.where_bindings)
            .finish_non_exhaustive()
    }
}

impl<'c, C: Connection + ?Sized> QueryBuilder<'c, C> {
    /// Creates a `SELECT *` builder bound to `connection`.
    pub fn new(connection: &'c C) -> Self {
        Self {
            connection,
            table: None,
            mode: QueryMode::Select,
            columns: vec!["*".to_string()],
            joins: vec![],
            wheres: vec![],
            where_bindings: Bindings::new(),
            group_by: vec![],
            having: vec![],
            order_by: vec![],
            limit: None,
            insert_data: vec![],
            update_set: vec![],
            update_bindings: Bindings::new(),
            next_param: 0,
        }
    }

    /// Switches to `SELECT` with the given columns; an empty list selects `*`.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] if a column other than `*` is not a plain identifier.
    pub fn select<I, S>(mut self, columns: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut validated = vec![];
        for column in columns {
            let column = column.into();
            if column != "*" {
                validate_identifier(&column)?;
            }
            validated.push(column);
        }
        if validated.is_empty() {
            validated.push("*".to_string());
        }
        self.columns = validated;
        self.mode = QueryMode::Select;
        Ok(self)
    }

    /// Switches to `SELECT *`.
    pub fn select_all(mut self) -> Self {
        self.columns = vec!["*".to_string()];
        self.mode = QueryMode::Select;
        self
    }

    /// Switches to `INSERT` with the given column/value pairs, in order.
    ///
    /// Each column is bound to a placeholder named after it (`:column`).
    ///
    /// # Errors
    /// [`QueryError::EmptyPayload`] for no pairs, [`QueryError::InvalidIdentifier`]
    /// for a column that is not a plain identifier.
    pub fn insert<I, K, V>(mut self, data: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut insert_data = vec![];
        for (column, value) in data {
            let column = column.into();
            validate_identifier(&column)?;
            insert_data.push((column, value.into()));
        }
        if insert_data.is_empty() {
            return Err(QueryError::EmptyPayload { mode: "insert" });
        }
        self.insert_data = insert_data;
        self.mode = QueryMode::Insert;
        Ok(self)
    }

    /// Switches to `UPDATE` with the given column/value pairs, in order.
    ///
    /// Placeholders for the `SET` list are allocated here, so they precede the
    /// placeholders of any `WHERE` clause added afterwards.
    ///
    /// # Errors
    /// [`QueryError::EmptyPayload`] for no pairs, [`QueryError::InvalidIdentifier`]
    /// for a column that is not a plain identifier.
    pub fn update<I, K, V>(mut self, data: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut update_set = vec![];
        let mut update_bindings = Bindings::new();
        for (column, value) in data {
            let column = column.into();
            validate_identifier(&column)?;
            let param = self.next_placeholder();
            update_set.push(format!("{column} = {param}"));
            update_bindings.push(param, value.into());
        }
        if update_set.is_empty() {
            return Err(QueryError::EmptyPayload { mode: "update" });
        }
        self.update_set = update_set;
        self.update_bindings = update_bindings;
        self.mode = QueryMode::Update;
        Ok(self)
    }

    /// Switches to `DELETE`.
    pub fn delete(mut self) -> Self {
        self.mode = QueryMode::Delete;
        self
    }

    /// Sets the target table.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] if `table` is not a plain identifier.
    pub fn table(mut self, table: &str) -> Result<Self, QueryError> {
        validate_identifier(table)?;
        self.table = Some(table.to_string());
        Ok(self)
    }

    /// Adds `INNER JOIN table ON first op second`.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] for a bad table or column,
    /// [`QueryError::InvalidOperator`] for an operator outside the comparison allow-list.
    pub fn join(self, table: &str, first: &str, operator: &str, second: &str) -> Result<Self, QueryError> {
        self.add_join(JoinKind::Inner, table, first, operator, second)
    }

    /// Adds `LEFT JOIN table ON first op second`.
    ///
    /// # Errors
    /// See [`QueryBuilder::join`].
    pub fn left_join(self, table: &str, first: &str, operator: &str, second: &str) -> Result<Self, QueryError> {
        self.add_join(JoinKind::Left, table, first, operator, second)
    }

    /// Adds `RIGHT JOIN table ON first op second`.
    ///
    /// # Errors
    /// See [`QueryBuilder::join`].
    pub fn right_join(self, table: &str, first: &str, operator: &str, second: &str) -> Result<Self, QueryError> {
        self.add_join(JoinKind::Right, table, first, operator, second)
    }

    /// Adds `OUTER JOIN table ON first op second`.
    ///
    /// # Errors
    /// See [`QueryBuilder::join`].
    pub fn outer_join(self, table: &str, first: &str, operator: &str, second: &str) -> Result<Self, QueryError> {
        self.add_join(JoinKind::Outer, table, first, operator, second)
    }

    fn add_join(
        mut self,
        kind: JoinKind,
        table: &str,
        first: &str,
        operator: &str,
        second: &str,
    ) -> Result<Self, QueryError> {
        validate_identifier(table)?;
        validate_identifier(first)?;
        validate_identifier(second)?;
        let operator = Operator::parse(operator)?;
        if operator.is_list() {
            return Err(QueryError::invalid_operator(operator.as_str()));
        }
        self.joins.push(format!("{} JOIN {table} ON {first} {} {second}", kind.as_str(), operator.as_str()));
        Ok(self)
    }

    /// Adds `column op value` to the `AND`-joined where list.
    ///
    /// `IN`/`NOT IN` take a list operand and bind one placeholder per element:
    /// `column IN (:p0, :p1)`. Every other operator takes a scalar.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`], [`QueryError::InvalidOperator`], or
    /// [`QueryError::InvalidArity`] when the operand shape does not fit the operator.
    pub fn where_(mut self, column: &str, operator: &str, value: impl Into<Operand>) -> Result<Self, QueryError> {
        let clause = self.comparison(column, operator, value.into())?;
        self.wheres.push(clause);
        Ok(self)
    }

    /// Adds `column IS NOT NULL`.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] for a bad column.
    pub fn where_not_null(mut self, column: &str) -> Result<Self, QueryError> {
        validate_identifier(column)?;
        self.wheres.push(format!("{column} IS NOT NULL"));
        Ok(self)
    }

    /// Adds `column IS NULL`.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] for a bad column.
    pub fn where_null(mut self, column: &str) -> Result<Self, QueryError> {
        validate_identifier(column)?;
        self.wheres.push(format!("{column} IS NULL"));
        Ok(self)
    }

    /// Adds `column BETWEEN :lo AND :hi`.
    ///
    /// The bounds are bound in the order given; the range is not checked.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] for a bad column, [`QueryError::InvalidArity`]
    /// unless exactly two values are given.
    pub fn where_between<I, V>(mut self, column: &str, values: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        validate_identifier(column)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let [low, high]: [Value; 2] = values.try_into().map_err(|v: Vec<Value>| {
            QueryError::invalid_arity("BETWEEN", format!("expected 2 values, got {}", v.len()))
        })?;
        let low_param = self.bind_where(low);
        let high_param = self.bind_where(high);
        self.wheres.push(format!("{column} BETWEEN {low_param} AND {high_param}"));
        Ok(self)
    }

    /// Merges `column op value` with the most recently added where clause into
    /// `(previous OR new)`.
    ///
    /// Only the last clause is wrapped, so repeated calls nest to the left:
    /// `((a OR b) OR c)`. Without a previous clause the comparison is added
    /// as a plain clause.
    ///
    /// # Errors
    /// Same as [`QueryBuilder::where_`].
    pub fn or_where(mut self, column: &str, operator: &str, value: impl Into<Operand>) -> Result<Self, QueryError> {
        let clause = self.comparison(column, operator, value.into())?;
        self.append_or_clause(clause);
        Ok(self)
    }

    /// Merges `column IS NULL` with the most recently added where clause.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] for a bad column.
    pub fn or_where_null(mut self, column: &str) -> Result<Self, QueryError> {
        validate_identifier(column)?;
        self.append_or_clause(format!("{column} IS NULL"));
        Ok(self)
    }

    /// Appends columns to `GROUP BY`.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] for a bad column; columns before it are kept
    /// only in the dropped builder.
    pub fn group_by<I, S>(mut self, columns: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for column in columns {
            let column = validate_identifier(column.as_ref())?;
            self.group_by.push(column.to_string());
        }
        Ok(self)
    }

    /// Appends a raw `HAVING` condition, `AND`-joined with earlier ones.
    ///
    /// The condition is written into the statement as given and is not
    /// validated; it must never carry user input.
    pub fn having(mut self, condition: impl Into<String>) -> Self {
        self.having.push(condition.into());
        self
    }

    /// Appends `column ASC|DESC` to `ORDER BY`. The direction is case-insensitive.
    ///
    /// # Errors
    /// [`QueryError::InvalidIdentifier`] or [`QueryError::InvalidDirection`].
    pub fn order_by(mut self, column: &str, direction: &str) -> Result<Self, QueryError> {
        validate_identifier(column)?;
        let direction: Direction = direction.parse()?;
        self.order_by.push(format!("{column} {}", direction.as_str()));
        Ok(self)
    }

    /// Sets `LIMIT n`.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The statement kind that [`QueryBuilder::get_sql`] will render.
    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    /// Renders the statement text for the current mode.
    ///
    /// Rendering does not touch the builder: repeated calls return the same
    /// text and [`QueryBuilder::bindings`] returns the same map.
    ///
    /// # Errors
    /// [`QueryError::MissingTable`] if no table was set.
    pub fn get_sql(&self) -> Result<String, QueryError> {
        let table = self.table.as_deref().ok_or(QueryError::MissingTable { mode: self.mode.as_str() })?;

        let sql = match self.mode {
            QueryMode::Select => {
                let mut sql = format!("SELECT {} FROM {table}", self.columns.join(", "));
                if !self.joins.is_empty() {
                    sql.push(' ');
                    sql.push_str(&self.joins.join(" "));
                }
                self.push_where(&mut sql);
                if !self.group_by.is_empty() {
                    sql.push_str(" GROUP BY ");
                    sql.push_str(&self.group_by.join(", "));
                }
                if !self.having.is_empty() {
                    sql.push_str(" HAVING ");
                    sql.push_str(&self.having.join(" AND "));
                }
                if !self.order_by.is_empty() {
                    sql.push_str(" ORDER BY ");
                    sql.push_str(&self.order_by.join(", "));
                }
                if let Some(limit) = self.limit {
                    sql.push_str(&format!(" LIMIT {limit}"));
                }
                sql
            }
            QueryMode::Insert => {
                let columns = self.insert_data.iter().map(|(c, _)| c.as_str()).collect::<Vec<_>>().join(", ");
                let placeholders =
                    self.insert_data.iter().map(|(c, _)| format!(":{c}")).collect::<Vec<_>>().join(", ");
                format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})")
            }
            QueryMode::Update => {
                let mut sql = format!("UPDATE {table} SET {}", self.update_set.join(", "));
                self.push_where(&mut sql);
                sql
            }
            QueryMode::Delete => {
                let mut sql = format!("DELETE FROM {table}");
                self.push_where(&mut sql);
                sql
            }
        };

        Ok(sql)
    }

    /// The placeholder values referenced by the statement of the current mode.
    pub fn bindings(&self) -> Bindings {
        match self.mode {
            QueryMode::Insert => {
                let mut bindings = Bindings::new();
                for (column, value) in &self.insert_data {
                    bindings.insert(format!(":{column}"), value.clone());
                }
                bindings
            }
            QueryMode::Update => {
                let mut bindings = self.update_bindings.clone();
                bindings.extend_from(&self.where_bindings);
                bindings
            }
            QueryMode::Select | QueryMode::Delete => self.where_bindings.clone(),
        }
    }

    /// Renders the statement and collects its bindings.
    ///
    /// # Errors
    /// See [`QueryBuilder::get_sql`].
    pub fn statement(&self) -> Result<Statement, QueryError> {
        Ok(Statement { sql: self.get_sql()?, bindings: self.bindings() })
    }

    /// Executes the statement as a read and returns all rows.
    ///
    /// # Errors
    /// Rendering errors, or [`QueryError::Connection`] when the connection fails.
    pub fn get(&self) -> Result<Vec<Row>, QueryError> {
        let statement = self.statement()?;
        debug!(sql = %statement.sql, bindings = statement.bindings.len(), "fetching rows");
        self.connection.fetch_all(&statement.sql, &statement.bindings).map_err(QueryError::connection)
    }

    /// Executes the statement as a write.
    ///
    /// # Errors
    /// Rendering errors, or [`QueryError::Connection`] when the connection fails.
    pub fn execute(&self) -> Result<bool, QueryError> {
        let statement = self.statement()?;
        debug!(sql = %statement.sql, bindings = statement.bindings.len(), "executing statement");
        self.connection.execute(&statement.sql, &statement.bindings).map_err(QueryError::connection)
    }

    /// The identifier generated by the connection's most recent insert.
    ///
    /// # Errors
    /// [`QueryError::Connection`] when the connection fails.
    pub fn last_insert_id(&self) -> Result<String, QueryError> {
        self.connection.last_insert_id().map_err(QueryError::connection)
    }

    fn comparison(&mut self, column: &str, operator: &str, operand: Operand) -> Result<String, QueryError> {
        validate_identifier(column)?;
        let operator = Operator::parse(operator)?;

        match (operator.is_list(), operand) {
            (true, Operand::List(values)) => {
                if values.is_empty() {
                    return Err(QueryError::invalid_arity(operator.as_str(), "expected at least one value"));
                }
                let placeholders = values.into_iter().map(|value| self.bind_where(value)).collect::<Vec<_>>();
                Ok(format!("{column} {} ({})", operator.as_str(), placeholders.join(", ")))
            }
            (true, Operand::Scalar(_)) => {
                Err(QueryError::invalid_arity(operator.as_str(), "expected a list of values"))
            }
            (false, Operand::Scalar(value)) => {
                let param = self.bind_where(value);
                Ok(format!("{column} {} {param}", operator.as_str()))
            }
            (false, Operand::List(_)) => Err(QueryError::invalid_arity(operator.as_str(), "expected a single value")),
        }
    }

    fn append_or_clause(&mut self, clause: String) {
        let merged = match self.wheres.pop() {
            Some(last) => format!("({last} OR {clause})"),
            None => clause,
        };
        self.wheres.push(merged);
    }

    fn push_where(&self, sql: &mut String) {
        if !self.wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.wheres.join(" AND "));
        }
    }

    fn bind_where(&mut self, value: Value) -> String {
        let param = self.next_placeholder();
        self.where_bindings.push(param.clone(), value);
        param
    }

    fn next_placeholder(&mut self) -> String {
        let param = format!(":p{}", self.next_param);
        self.next_param += 1;
        param
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MockConnection;
    use mockall::predicate::{always, eq};

    fn values(bindings: &Bindings) -> Vec<Value> {
        bindings.values().cloned().collect()
    }

    #[test]
    fn test_simple_select() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn).select_all().table("Test").unwrap();

        assert_eq!(query.get_sql().unwrap(), "SELECT * FROM Test");
        assert!(query.bindings().is_empty());
    }

    #[test]
    fn test_select_rejects_bad_column() {
        let conn = MockConnection::new();
        let err = QueryBuilder::new(&conn).select(["id", "name; --"]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { identifier } if identifier == "name; --"));
    }

    #[test]
    fn test_full_select_clause_order() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .select(["users_id", "total"])
            .unwrap()
            .table("orders")
            .unwrap()
            .left_join("users", "users_id", "=", "id")
            .unwrap()
            .where_("status", "=", "paid")
            .unwrap()
            .where_not_null("shipped_at")
            .unwrap()
            .group_by(["users_id"])
            .unwrap()
            .having("COUNT(*) > 1")
            .order_by("total", "desc")
            .unwrap()
            .limit(10);

        assert_eq!(
            query.get_sql().unwrap(),
            "SELECT users_id, total FROM orders LEFT JOIN users ON users_id = id \
             WHERE status = :p0 AND shipped_at IS NOT NULL GROUP BY users_id \
             HAVING COUNT(*) > 1 ORDER BY total DESC LIMIT 10"
        );
        assert_eq!(values(&query.bindings()), vec![Value::from("paid")]);
    }

    #[test]
    fn test_join_kinds() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .table("a")
            .unwrap()
            .join("b", "a_id", "=", "b_id")
            .unwrap()
            .right_join("c", "c_id", "<>", "b_id")
            .unwrap()
            .outer_join("d", "d_id", ">=", "c_id")
            .unwrap();

        assert_eq!(
            query.get_sql().unwrap(),
            "SELECT * FROM a INNER JOIN b ON a_id = b_id RIGHT JOIN c ON c_id <> b_id OUTER JOIN d ON d_id >= c_id"
        );
    }

    #[test]
    fn test_join_rejects_bad_tokens() {
        let conn = MockConnection::new();
        let builder = || QueryBuilder::new(&conn).table("a").unwrap();

        assert!(matches!(builder().join("b;", "x", "=", "y"), Err(QueryError::InvalidIdentifier { .. })));
        assert!(matches!(builder().join("b", "x", "IN", "y"), Err(QueryError::InvalidOperator { .. })));
        assert!(matches!(builder().join("b", "x", "= 1 OR", "y"), Err(QueryError::InvalidOperator { .. })));
    }

    #[test]
    fn test_or_where_nests_left() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .table("t")
            .unwrap()
            .where_("a", "=", 1)
            .unwrap()
            .or_where("b", "=", 2)
            .unwrap()
            .or_where("c", "=", 3)
            .unwrap();

        assert_eq!(query.get_sql().unwrap(), "SELECT * FROM t WHERE ((a = :p0 OR b = :p1) OR c = :p2)");
        assert_eq!(values(&query.bindings()), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_or_where_merges_only_last_clause() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .table("t")
            .unwrap()
            .where_("a", "=", 1)
            .unwrap()
            .where_("b", "=", 2)
            .unwrap()
            .or_where_null("b")
            .unwrap();

        assert_eq!(query.get_sql().unwrap(), "SELECT * FROM t WHERE a = :p0 AND (b = :p1 OR b IS NULL)");
    }

    #[test]
    fn test_or_where_without_previous_clause() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn).table("t").unwrap().or_where("a", "LIKE", "x%").unwrap();

        assert_eq!(query.get_sql().unwrap(), "SELECT * FROM t WHERE a LIKE :p0");
    }

    #[test]
    fn test_where_in_binds_each_element() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .table("t")
            .unwrap()
            .where_("id", "in", vec![4, 5, 6])
            .unwrap()
            .where_("kind", "NOT IN", ["x"])
            .unwrap();

        assert_eq!(query.get_sql().unwrap(), "SELECT * FROM t WHERE id IN (:p0, :p1, :p2) AND kind NOT IN (:p3)");
        let bindings = query.bindings();
        assert_eq!(bindings.get(":p1"), Some(&Value::Int(5)));
        assert_eq!(bindings.get(":p3"), Some(&Value::from("x")));
    }

    #[test]
    fn test_long_in_list() {
        const N: usize = 50_000;
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .update([("archived", true)])
            .unwrap()
            .table("t")
            .unwrap()
            .where_("id", "IN", (0..N).map(|id| id.to_string()).collect::<Vec<_>>())
            .unwrap();

        let statement = query.statement().unwrap();
        assert!(statement.sql().ends_with(&format!(":p{N})")));
        let bindings = statement.bindings();
        assert_eq!(bindings.len(), N + 1);
        assert_eq!(bindings.get(":p0"), Some(&Value::Bool(true)));
        assert_eq!(bindings.get(&format!(":p{N}")), Some(&Value::from((N - 1).to_string())));
        assert!(bindings.values().skip(1).cloned().eq((0..N).map(|id| Value::from(id.to_string()))));
    }

    #[test]
    fn test_where_operand_shape_must_fit_operator() {
        let conn = MockConnection::new();
        let builder = || QueryBuilder::new(&conn).table("t").unwrap();

        assert!(matches!(builder().where_("id", "IN", 1), Err(QueryError::InvalidArity { operator: "IN", .. })));
        assert!(matches!(builder().where_("id", "=", vec![1, 2]), Err(QueryError::InvalidArity { .. })));
        assert!(matches!(builder().where_("id", "IN", Vec::<i64>::new()), Err(QueryError::InvalidArity { .. })));
        assert!(matches!(builder().where_("id", "===", 1), Err(QueryError::InvalidOperator { .. })));
        assert!(matches!(builder().where_("1id", "=", 1), Err(QueryError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_where_between_keeps_given_order() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn).table("t").unwrap().where_between("age", [65, 18]).unwrap();

        assert_eq!(query.get_sql().unwrap(), "SELECT * FROM t WHERE age BETWEEN :p0 AND :p1");
        assert_eq!(values(&query.bindings()), vec![Value::Int(65), Value::Int(18)]);
    }

    #[test]
    fn test_where_between_requires_two_values() {
        let conn = MockConnection::new();
        let builder = || QueryBuilder::new(&conn).table("t").unwrap();

        assert!(matches!(
            builder().where_between("age", [1]),
            Err(QueryError::InvalidArity { operator: "BETWEEN", .. })
        ));
        assert!(matches!(builder().where_between("age", [1, 2, 3]), Err(QueryError::InvalidArity { .. })));
    }

    #[test]
    fn test_simple_insert() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .insert([("name", "a"), ("key", "b")])
            .unwrap()
            .table("t")
            .unwrap();

        assert_eq!(query.get_sql().unwrap(), "INSERT INTO t (name, key) VALUES (:name, :key)");
        let bindings = query.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.get(":name"), Some(&Value::from("a")));
        assert_eq!(bindings.get(":key"), Some(&Value::from("b")));
    }

    #[test]
    fn test_insert_validation() {
        let conn = MockConnection::new();
        let empty: Vec<(&str, i64)> = vec![];
        assert!(matches!(QueryBuilder::new(&conn).insert(empty), Err(QueryError::EmptyPayload { mode: "insert" })));
        assert!(matches!(
            QueryBuilder::new(&conn).insert([("bad col", 1)]),
            Err(QueryError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_insert_ignores_where_bindings() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .table("t")
            .unwrap()
            .where_("id", "=", 1)
            .unwrap()
            .insert([("name", "a")])
            .unwrap();

        assert_eq!(query.get_sql().unwrap(), "INSERT INTO t (name) VALUES (:name)");
        assert_eq!(query.bindings().len(), 1);
    }

    #[test]
    fn test_update_placeholders_precede_where() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .update([("email", "jane.doe@example.com")])
            .unwrap()
            .table("users")
            .unwrap()
            .where_("username", "=", "jane")
            .unwrap();

        assert_eq!(query.get_sql().unwrap(), "UPDATE users SET email = :p0 WHERE username = :p1");
        assert_eq!(values(&query.bindings()), vec![Value::from("jane.doe@example.com"), Value::from("jane")]);
    }

    #[test]
    fn test_delete() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn).table("t").unwrap().delete().where_("username", "=", "temp").unwrap();

        assert_eq!(query.mode(), QueryMode::Delete);
        assert_eq!(query.get_sql().unwrap(), "DELETE FROM t WHERE username = :p0");
    }

    #[test]
    fn test_last_mode_wins() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn).table("t").unwrap().delete().select(["id"]).unwrap();

        assert_eq!(query.get_sql().unwrap(), "SELECT id FROM t");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let conn = MockConnection::new();
        let query = QueryBuilder::new(&conn)
            .update([("a", 1), ("b", 2)])
            .unwrap()
            .table("t")
            .unwrap()
            .where_("id", "=", 9)
            .unwrap();

        assert_eq!(query.get_sql().unwrap(), query.get_sql().unwrap());
        assert_eq!(query.bindings(), query.bindings());
    }

    #[test]
    fn test_missing_table() {
        let conn = MockConnection::new();
        let err = QueryBuilder::new(&conn).get_sql().unwrap_err();
        assert!(matches!(err, QueryError::MissingTable { mode: "SELECT" }));
    }

    #[test]
    fn test_invalid_table_and_direction() {
        let conn = MockConnection::new();
        assert!(matches!(QueryBuilder::new(&conn).table("invalid-table"), Err(QueryError::InvalidIdentifier { .. })));
        assert!(matches!(
            QueryBuilder::new(&conn).order_by("id", "sideways"),
            Err(QueryError::InvalidDirection { .. })
        ));
    }

    #[test]
    fn test_query_mode_from_str() {
        assert_eq!("delete".parse::<QueryMode>().unwrap(), QueryMode::Delete);
        assert!(matches!(
            "MERGE".parse::<QueryMode>(),
            Err(QueryError::UnsupportedQueryMode { mode }) if mode == "MERGE"
        ));
    }

    #[test]
    fn test_get_passes_statement_to_connection() {
        let mut conn = MockConnection::new();
        conn.expect_fetch_all()
            .with(eq("SELECT * FROM users WHERE username = :p0"), always())
            .times(1)
            .returning(|_, bindings| {
                assert_eq!(bindings.get(":p0"), Some(&Value::from("johndoe")));
                let row: Row = [("email".to_string(), Value::from("john@example.com"))].into_iter().collect();
                Ok(vec![row])
            });

        let rows = QueryBuilder::new(&conn)
            .table("users")
            .unwrap()
            .where_("username", "=", "johndoe")
            .unwrap()
            .get()
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["email"], Value::from("john@example.com"));
    }

    #[test]
    fn test_execute_and_last_insert_id() {
        let mut conn = MockConnection::new();
        conn.expect_execute()
            .with(eq("INSERT INTO users (username) VALUES (:username)"), always())
            .times(1)
            .returning(|_, _| Ok(true));
        conn.expect_last_insert_id().times(1).returning(|| Ok("17".to_string()));

        let query = QueryBuilder::new(&conn).table("users").unwrap().insert([("username", "johndoe")]).unwrap();

        assert!(query.execute().unwrap());
        assert_eq!(query.last_insert_id().unwrap(), "17");
    }

    #[test]
    fn test_connection_failure_is_surfaced() {
        let mut conn = MockConnection::new();
        conn.expect_execute().returning(|_, _| Err("deadlock detected".into()));

        let err = QueryBuilder::new(&conn).table("t").unwrap().delete().execute().unwrap_err();
        assert!(matches!(err, QueryError::Connection { .. }));
        assert_eq!(err.to_string(), "connection error: deadlock detected");
    }
}
