use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing database credentials: {0} must be set outside development")]
    MissingCredentials(&'static str),

    #[error("Invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("CORS_ORIGINS may not contain \"*\": credentials are allowed, so origins must be listed")]
    WildcardCorsOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string; takes precedence over the discrete settings below
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = lookup("APP_ENV").or_else(|| lookup("NODE_ENV"));
        let environment = match mode.as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides(&lookup);

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_env_overrides(mut self, lookup: &impl Fn(&str) -> Option<String>) -> Self {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("POSTGRES_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("POSTGRES_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Some(v) = lookup("POSTGRES_DB") {
            self.database.name = v;
        }
        if let Some(v) = lookup("POSTGRES_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("POSTGRES_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }
        if let Some(v) = lookup("DATABASE_SLOW_QUERY_THRESHOLD_MS") {
            self.database.slow_query_threshold_ms = v.parse().unwrap_or(self.database.slow_query_threshold_ms);
        }

        // API overrides
        if let Some(v) = lookup("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// No wildcard CORS origin; credentials may only be left empty for local development
    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.cors_origins.iter().any(|origin| origin == "*") {
            return Err(ConfigError::WildcardCorsOrigin);
        }

        if let Some(raw) = &self.database.url {
            let url = url::Url::parse(raw).map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;
            if self.environment != Environment::Development {
                if url.username().is_empty() {
                    return Err(ConfigError::MissingCredentials("DATABASE_URL user"));
                }
                if url.password().map_or(true, str::is_empty) {
                    return Err(ConfigError::MissingCredentials("DATABASE_URL password"));
                }
            }
            return Ok(());
        }

        if self.environment != Environment::Development {
            if self.database.user.is_empty() {
                return Err(ConfigError::MissingCredentials("POSTGRES_USER"));
            }
            if self.database.password.is_empty() {
                return Err(ConfigError::MissingCredentials("POSTGRES_PASSWORD"));
            }
        }
        Ok(())
    }

    /// Connection target with credentials stripped, for log lines
    pub fn database_target(&self) -> String {
        match &self.database.url {
            Some(raw) => match url::Url::parse(raw) {
                Ok(mut url) => {
                    let _ = url.set_password(None);
                    url.into()
                }
                Err(_) => "<invalid DATABASE_URL>".to_string(),
            },
            None => format!(
                "postgres://{}@{}:{}/{}",
                self.database.user, self.database.host, self.database.port, self.database.name
            ),
        }
    }

    fn base_database() -> DatabaseConfig {
        DatabaseConfig {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            name: "travel_log".to_string(),
            user: String::new(),
            password: String::new(),
            max_connections: 10,
            connection_timeout: 30,
            enable_query_logging: true,
            slow_query_threshold_ms: 100,
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: Self::base_database(),
            api: ApiConfig {
                port: 3005,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3001".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                slow_query_threshold_ms: 500,
                ..Self::base_database()
            },
            api: ApiConfig {
                port: 3005,
                max_request_size_bytes: 5 * 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec![],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
                slow_query_threshold_ms: 1000,
                ..Self::base_database()
            },
            api: ApiConfig {
                port: 3005,
                max_request_size_bytes: 2 * 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec![],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api.port, 3005);
        assert_eq!(config.database.port, 5432);
        assert!(config.database.user.is_empty());
        assert!(config.database.password.is_empty());
        assert_eq!(config.security.cors_origins, vec!["http://localhost:3001"]);
    }

    #[test]
    fn test_env_overrides_apply() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_DB", "mileage"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.name, "mileage");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.security.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_unparsable_override_keeps_default() {
        let config = AppConfig::from_lookup(lookup(&[("PORT", "not-a-port")])).unwrap();
        assert_eq!(config.api.port, 3005);
    }

    #[test]
    fn test_production_requires_credentials() {
        let err = AppConfig::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials("POSTGRES_USER")));

        let err = AppConfig::from_lookup(lookup(&[
            ("NODE_ENV", "production"),
            ("POSTGRES_USER", "app"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials("POSTGRES_PASSWORD")));

        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "prod"),
            ("POSTGRES_USER", "app"),
            ("POSTGRES_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert!(!config.database.enable_query_logging);
    }

    #[test]
    fn test_database_url_credentials_checked_outside_development() {
        let err = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "staging"),
            ("DATABASE_URL", "postgres://app@db:5432/travel_log"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials("DATABASE_URL password")));

        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ENV", "staging"),
            ("DATABASE_URL", "postgres://app:secret@db:5432/travel_log"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.database_target(), "postgres://app@db:5432/travel_log");
    }

    #[test]
    fn test_wildcard_cors_origin_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("CORS_ORIGINS", "*")])).unwrap_err();
        assert!(matches!(err, ConfigError::WildcardCorsOrigin));

        let err = AppConfig::from_lookup(lookup(&[("CORS_ORIGINS", "http://a.test, *")])).unwrap_err();
        assert!(matches!(err, ConfigError::WildcardCorsOrigin));
    }

    #[test]
    fn test_invalid_database_url_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "::nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDatabaseUrl(_)));
    }
}
