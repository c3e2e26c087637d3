use lightful_query::{Bindings, Connection, ConnectionError, QueryBuilder, QueryError, Row, Value};
use std::cell::{Cell, RefCell};

/// Records every statement it receives and answers reads with canned rows.
#[derive(Default)]
struct RecordingConnection {
    statements: RefCell<Vec<(String, Bindings)>>,
    rows: Vec<Row>,
    inserts: Cell<u64>,
}

impl RecordingConnection {
    fn with_rows(rows: Vec<Row>) -> Self {
        Self { rows, ..Self::default() }
    }

    fn statements(&self) -> Vec<(String, Bindings)> {
        self.statements.borrow().clone()
    }
}

impl Connection for RecordingConnection {
    fn fetch_all(&self, sql: &str, bindings: &Bindings) -> Result<Vec<Row>, ConnectionError> {
        self.statements.borrow_mut().push((sql.to_string(), bindings.clone()));
        Ok(self.rows.clone())
    }

    fn execute(&self, sql: &str, bindings: &Bindings) -> Result<bool, ConnectionError> {
        if sql.starts_with("INSERT") {
            self.inserts.set(self.inserts.get() + 1);
        }
        self.statements.borrow_mut().push((sql.to_string(), bindings.clone()));
        Ok(true)
    }

    fn last_insert_id(&self) -> Result<String, ConnectionError> {
        Ok(self.inserts.get().to_string())
    }
}

fn user_row(id: i64, username: &str, email: &str) -> Row {
    [
        ("id".to_string(), Value::Int(id)),
        ("username".to_string(), Value::from(username)),
        ("email".to_string(), Value::from(email)),
    ]
    .into_iter()
    .collect()
}

#[test]
fn insert_then_select() -> Result<(), QueryError> {
    let conn = RecordingConnection::with_rows(vec![user_row(1, "johndoe", "john@example.com")]);

    let insert = QueryBuilder::new(&conn)
        .table("test_users")?
        .insert([("username", "johndoe"), ("email", "john@example.com")])?;
    assert!(insert.execute()?);
    assert_eq!(insert.last_insert_id()?, "1");

    let rows = QueryBuilder::new(&conn).select_all().table("test_users")?.where_("username", "=", "johndoe")?.get()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], Value::from("john@example.com"));

    let statements = conn.statements();
    assert_eq!(statements[0].0, "INSERT INTO test_users (username, email) VALUES (:username, :email)");
    assert_eq!(statements[0].1.get(":email"), Some(&Value::from("john@example.com")));
    assert_eq!(statements[1].0, "SELECT * FROM test_users WHERE username = :p0");
    assert_eq!(statements[1].1.get(":p0"), Some(&Value::from("johndoe")));
    Ok(())
}

#[test]
fn update_binds_set_and_where_values() -> Result<(), QueryError> {
    let conn = RecordingConnection::default();

    QueryBuilder::new(&conn)
        .update([("password_hash", "$argon2id$v=19$...")])?
        .table("Users")?
        .where_("id", "=", 7)?
        .where_("email", "=", "jane@example.com")?
        .where_("username", "=", "jane")?
        .execute()?;

    let (sql, bindings) = conn.statements().remove(0);
    assert_eq!(sql, "UPDATE Users SET password_hash = :p0 WHERE id = :p1 AND email = :p2 AND username = :p3");
    assert_eq!(bindings.len(), 4);
    assert_eq!(bindings.get(":p1"), Some(&Value::Int(7)));
    Ok(())
}

#[test]
fn every_placeholder_has_exactly_one_binding() -> Result<(), QueryError> {
    let conn = RecordingConnection::default();
    let query = QueryBuilder::new(&conn)
        .table("events")?
        .where_("kind", "IN", ["login", "logout"])?
        .or_where_null("kind")?
        .where_between("created_at", ["2024-01-01", "2024-12-31"])?
        .or_where("severity", ">", 3)?;

    let sql = query.get_sql()?;
    let bindings = query.bindings();
    let placeholders: Vec<&str> =
        sql.split(|c: char| !(c.is_alphanumeric() || c == ':' || c == '_')).filter(|t| t.starts_with(':')).collect();

    assert_eq!(placeholders.len(), bindings.len());
    for placeholder in placeholders {
        assert!(bindings.get(placeholder).is_some(), "{placeholder} has no binding");
    }
    Ok(())
}

#[test]
fn values_never_reach_sql_text() -> Result<(), QueryError> {
    let conn = RecordingConnection::default();
    let hostile = "x'; DROP TABLE users; --";
    let query = QueryBuilder::new(&conn).table("users")?.where_("username", "=", hostile)?;

    assert!(!query.get_sql()?.contains(hostile));
    assert_eq!(query.bindings().get(":p0"), Some(&Value::from(hostile)));
    Ok(())
}
