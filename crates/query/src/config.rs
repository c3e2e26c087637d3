//! Connection settings handed to whatever opens database connections.

use serde::Deserialize;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_NAME: &str = "mydatabase";
const DEFAULT_USER: &str = "root";

/// Where and as whom to connect.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            name: DEFAULT_NAME.to_string(),
            user: DEFAULT_USER.to_string(),
            password: String::new(),
        }
    }
}

// the password never reaches logs
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl DatabaseConfig {
    /// Reads `DB_HOST`, `DB_NAME`, `DB_USER` and `DB_PASSWORD`, falling back to
    /// the defaults for unset or empty variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DatabaseConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: String| lookup(key).filter(|v| !v.is_empty()).unwrap_or(default);
        Self {
            host: read("DB_HOST", defaults.host),
            name: read("DB_NAME", defaults.name),
            user: read("DB_USER", defaults.user),
            password: read("DB_PASSWORD", defaults.password),
        }
    }

    /// The driver data source name, `mysql:host=<host>;dbname=<name>`.
    pub fn dsn(&self) -> String {
        format!("mysql:host={};dbname={}", self.host, self.name)
    }
}
