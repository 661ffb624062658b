//! Application configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;

use quill_infra::database::DatabaseConfig;

/// Public path prefix uploaded files are served under.
pub const UPLOADS_PATH: &str = "/uploads";

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration, built once at startup and never mutated.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub database: Option<DatabaseConfig>,
    pub run_migrations: bool,
    pub cors_origin: String,
    pub upload_dir: PathBuf,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("database", &self.database.as_ref().map(|_| "<configured>"))
            .field("run_migrations", &self.run_migrations)
            .field("cors_origin", &self.cors_origin)
            .field("upload_dir", &self.upload_dir)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = match get("API_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "API_PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let run_migrations = get("RUN_MIGRATIONS")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            jwt_secret,
            database: Self::database_config(&get),
            run_migrations,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string()),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
        })
    }

    /// `DATABASE_URL` wins; otherwise a URL is composed from `DB_*` parts
    /// when `DB_HOST` is set.
    fn database_config(get: &impl Fn(&str) -> Option<String>) -> Option<DatabaseConfig> {
        let url = get("DATABASE_URL").or_else(|| {
            let host = get("DB_HOST")?;
            Some(format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                get("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                get("DB_PASSWORD").unwrap_or_default(),
                host,
                get("DB_PORT").unwrap_or_else(|| "5432".to_string()),
                get("DB_NAME").unwrap_or_else(|| "postgres".to_string()),
                get("DB_SSLMODE").unwrap_or_else(|| "disable".to_string()),
            ))
        })?;

        Some(DatabaseConfig {
            url,
            max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            min_connections: get("DB_MIN_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_secret_is_required() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
        assert!(config.database.is_none());
        assert!(config.run_migrations);
    }

    #[test]
    fn test_api_port_takes_precedence() {
        let config = load(&[("JWT_SECRET", "s"), ("API_PORT", "9000"), ("PORT", "7000")]).unwrap();
        assert_eq!(config.port, 9000);

        assert!(load(&[("JWT_SECRET", "s"), ("API_PORT", "http")]).is_err());
    }

    #[test]
    fn test_database_url_from_parts() {
        let config = load(&[
            ("JWT_SECRET", "s"),
            ("DB_HOST", "db"),
            ("DB_USER", "blog"),
            ("DB_PASSWORD", "pw"),
            ("DB_NAME", "blogdb"),
        ])
        .unwrap();

        let db = config.database.unwrap();
        assert_eq!(db.url, "postgres://blog:pw@db:5432/blogdb?sslmode=disable");
        assert_eq!(db.max_connections, 20);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&[("JWT_SECRET", "top-secret-value")]).unwrap();
        assert!(!format!("{config:?}").contains("top-secret-value"));
    }
}
