//! A small user api: an `/api` group behind logging, rate limiting and a json
//! content type check, a login controller, and a CORS preflight catch-all.
//!
//! There is no listener here; a few requests are dispatched in-process against
//! an in-memory connection and their responses printed.

use http::StatusCode;
use lightful_query::{Bindings, Connection, ConnectionError, QueryBuilder, QueryError, Row, Value};
use lightful_web::{
    BearerAuthMiddleware, Controller, CorsMiddleware, Group, Json, JsonContentTypeMiddleware, LoggingMiddleware,
    Method, RateLimitMiddleware, Request, Response, Router, WebError, controller_fn, handler_fn,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const TOKEN: &str = "t0ken";

struct MemoryConnection {
    users: Vec<Row>,
}

impl MemoryConnection {
    fn with_users(users: &[(i64, &str)]) -> Self {
        let users = users
            .iter()
            .map(|(id, username)| {
                Row::from([(String::from("id"), Value::from(*id)), (String::from("username"), Value::from(*username))])
            })
            .collect();
        Self { users }
    }
}

impl Connection for MemoryConnection {
    fn fetch_all(&self, sql: &str, bindings: &Bindings) -> Result<Vec<Row>, ConnectionError> {
        info!(sql, "fetch");
        let id = bindings.values().next();
        Ok(self.users.iter().filter(|row| row.get("id") == id).cloned().collect())
    }

    fn execute(&self, sql: &str, _bindings: &Bindings) -> Result<bool, ConnectionError> {
        info!(sql, "execute");
        Ok(true)
    }

    fn last_insert_id(&self) -> Result<String, ConnectionError> {
        Ok(self.users.len().to_string())
    }
}

struct UserRepository {
    connection: MemoryConnection,
}

impl UserRepository {
    fn find_username(&self, id: i64) -> Result<Option<String>, QueryError> {
        let rows = QueryBuilder::new(&self.connection)
            .select(["id", "username"])?
            .table("users")?
            .where_("id", "=", id)?
            .limit(1)
            .get()?;

        Ok(rows.first().and_then(|row| row.get("username")).and_then(Value::as_str).map(str::to_string))
    }

    fn delete(&self, id: i64) -> Result<bool, QueryError> {
        QueryBuilder::new(&self.connection).delete().table("users")?.where_("id", "=", id)?.execute()
    }
}

fn show_user(users: &UserRepository, id: i64) -> Response {
    match users.find_username(id) {
        Ok(Some(username)) => {
            info!(id, "User found");
            Response::json(&username, StatusCode::OK)
        }
        Ok(None) => Response::error("User not found", StatusCode::NOT_FOUND),
        Err(e) => Response::error(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

struct LoginController {
    request: Request,
}

impl Controller for LoginController {
    fn new(request: Request) -> Self {
        Self { request }
    }
}

impl LoginController {
    fn login(&self) -> Result<Json<serde_json::Value>, WebError> {
        let credentials: Credentials = self.request.json()?;
        if credentials.username != "alice" || credentials.password != "secret" {
            return Err(WebError::rejected(StatusCode::UNAUTHORIZED, "Invalid credentials"));
        }
        Ok(Json(serde_json::json!({ "token": TOKEN })))
    }
}

fn routes(users: &Arc<UserRepository>) -> Result<Router, WebError> {
    let mut router = Router::new();
    let mut root = router.routes();

    let api = Group::new()
        .prefix("/api")
        .middleware(LoggingMiddleware)
        .middleware(RateLimitMiddleware::default())
        .middleware(JsonContentTypeMiddleware);

    root.group(api, |api| {
        let reader = Arc::clone(users);
        api.get(r"/users/(\d+)", handler_fn(move |_req: &Request, id: i64| show_user(&reader, id))).register()?;

        let writer = Arc::clone(users);
        api.delete(
            r"/users/(\d+)",
            handler_fn(move |_req: &Request, id: i64| match writer.delete(id) {
                Ok(_) => Response::empty(),
                Err(e) => Response::error(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
            }),
        )
        .middleware(BearerAuthMiddleware::new(|token: &str| token == TOKEN))
        .register()
    })?;

    root.post("/login", controller_fn(LoginController::login)).middleware(LoggingMiddleware).register()?;
    root.options("/(.*)", handler_fn(|_req: &Request, _path: String| ()))
        .middleware(CorsMiddleware::default())
        .register()?;

    Ok(router)
}

fn main() -> Result<(), WebError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let users = Arc::new(UserRepository { connection: MemoryConnection::with_users(&[(1, "alice"), (2, "bob")]) });
    let router = routes(&users)?;

    let requests = [
        Request::new(Method::Get, "/api/users/1")?,
        Request::new(Method::Get, "/api/users/9")?,
        Request::new(Method::Get, "/users/1")?,
        Request::builder().method(Method::Delete).uri("/api/users/2").build()?,
        Request::builder().method(Method::Delete).uri("/api/users/2").header("Authorization", "Bearer t0ken").build()?,
        Request::builder()
            .method(Method::Post)
            .uri("/login")
            .header("Content-Type", "application/json")
            .body(r#"{"username":"alice","password":"secret"}"#)
            .build()?,
        Request::new(Method::Options, "/api/users/1")?,
    ];

    for request in requests {
        let line = format!("{} {}", request.method(), request.uri());
        let response = router.dispatch(request);
        println!("{line} -> {} {}", response.status(), response.body());
    }

    Ok(())
}
