//! Process settings, read once from the environment at start-up.
//! [`Settings::from_lookup`] takes any key lookup so tests need not touch the real environment.

use crate::error::ConfigError;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                key: "APP_ENV",
                value: s.to_string(),
                expected: "development, test or production",
            }),
        }
    }
}

/// Which [`crate::store::BookStore`] the server runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::InvalidValue {
                key: "STORE_BACKEND",
                value: s.to_string(),
                expected: "postgres or memory",
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    /// Takes precedence over the individual parts below when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: Option<String>,
    pub schema: String,
    pub max_connections: u32,
    pub ensure_database: bool,
}

impl DatabaseSettings {
    pub fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        self.url_with_password(self.password.as_deref())
    }

    /// Connection url safe to log.
    pub fn redacted_url(&self) -> String {
        match (&self.url, &self.password) {
            (Some(url), _) => redact_url(url),
            (None, Some(_)) => self.url_with_password(Some("***")),
            (None, None) => self.url_with_password(None),
        }
    }

    fn url_with_password(&self, password: Option<&str>) -> String {
        let credentials = match password {
            Some(p) => format!("{}:{}", self.user, p),
            None => self.user.clone(),
        };
        format!(
            "postgres://{}@{}:{}/{}",
            credentials, self.host, self.port, self.name
        )
    }
}

fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    let Some(at) = url[scheme_end..].find('@').map(|i| i + scheme_end) else {
        return url.to_string();
    };
    match url[scheme_end..at].find(':') {
        Some(colon) => format!("{}:***{}", &url[..scheme_end + colon], &url[at..]),
        None => url.to_string(),
    }
}

#[derive(Clone, Debug)]
pub struct LoggingSettings {
    /// Level or filter directive applied to this crate when `RUST_LOG` is unset.
    pub level: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub environment: Environment,
    pub server: ServerSettings,
    pub store: StoreBackend,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match var("APP_ENV") {
            Some(v) => v.parse()?,
            None => Environment::Development,
        };
        let store = match var("STORE_BACKEND") {
            Some(v) => v.parse()?,
            None => StoreBackend::Postgres,
        };

        let server = ServerSettings {
            host: var("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: normalize_port("SERVER_PORT", var("SERVER_PORT").as_deref().unwrap_or("3000"))?,
            body_limit: parse_number("REQUEST_BODY_LIMIT", var("REQUEST_BODY_LIMIT"), 1024 * 1024)?,
        };

        let base_name = var("DB_NAME").unwrap_or_else(|| "books".into());
        let name = match environment {
            Environment::Development => format!("{}_dev", base_name),
            Environment::Test => format!("{}_test", base_name),
            Environment::Production => base_name,
        };
        let database = DatabaseSettings {
            url: var("DATABASE_URL"),
            host: var("DB_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: normalize_port("DB_PORT", var("DB_PORT").as_deref().unwrap_or("5432"))?,
            name,
            user: var("DB_USER").unwrap_or_else(|| "postgres".into()),
            password: var("DB_PASSWORD"),
            schema: var("DB_SCHEMA").unwrap_or_else(|| "bookshelf".into()),
            max_connections: parse_number("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"), 5)?,
            ensure_database: parse_boolean(var("DB_ENSURE_DATABASE").as_deref(), true),
        };

        let level = match environment {
            Environment::Test => "off".to_string(),
            _ => var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
        };

        Ok(Settings {
            environment,
            server,
            store,
            database,
            logging: LoggingSettings { level },
        })
    }
}

/// Parse a listener port. Named pipes are not supported, so anything but an
/// integer in `0..=65535` is rejected.
pub fn normalize_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
        key,
        value: value.to_string(),
    })
}

/// `"true"` in any case is true, any other string is false; absent falls back to `default`.
pub fn parse_boolean(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => v.eq_ignore_ascii_case("true"),
        None => default,
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key,
            value: v,
            expected: "a non-negative integer",
        }),
        None => Ok(default),
    }
}
