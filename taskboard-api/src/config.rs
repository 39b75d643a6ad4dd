/// Configuration management for the API server
///
/// Loaded from environment variables (and a `.env` file when present).
///
/// # Environment Variables
///
/// - `API_HOST` (default `0.0.0.0`), `API_PORT` (default `8080`)
/// - `API_PRODUCTION`: enables HSTS and strict headers (default `false`)
/// - `CORS_ORIGINS`: comma separated origins, `*` for any (default `*`)
/// - `STORAGE_BACKEND`: `postgres` (default) or `memory`
/// - `DATABASE_URL`: required for the postgres backend
/// - `DATABASE_MAX_CONNECTIONS` (default `10`)
/// - `JWT_SECRET`: required, at least 32 characters
/// - `JWT_EXPIRATION_HOURS` (default `24`)
/// - `FRONTEND_URL`: base of password reset links (default `http://localhost:5173`)
/// - `RESET_TOKEN_TTL_MINUTES` (default `60`)
/// - `SMTP_HOST`, `SMTP_PORT` (default `587`), `SMTP_USERNAME`,
///   `SMTP_PASSWORD`, `EMAIL_FROM`: outbound mail; without `SMTP_HOST`
///   emails are only logged
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Longest accepted session token lifetime (one year)
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Longest accepted reset token lifetime (one week)
pub const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 7;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub reset: ResetConfig,
    pub email: EmailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Production mode (HSTS, strict CSP)
    pub production: bool,

    /// Allowed CORS origins; `*` means any
    pub cors_origins: Vec<String>,
}

/// Where boards and users are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("Unknown STORAGE_BACKEND '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// PostgreSQL connection URL; required for the postgres backend
    pub database_url: Option<String>,

    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    pub expiration_hours: i64,
}

/// Password reset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Base URL of the web client that hosts `/reset-password/:token`
    pub frontend_url: String,
    pub token_ttl_minutes: i64,
}

/// Outbound email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay; `None` selects the log-only sender
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    #[serde(skip_serializing)]
    pub smtp_password: Option<String>,
    pub from: String,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 8080u16)?;
        let production = parse_or(&lookup, "API_PRODUCTION", false)?;
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::Postgres,
        };
        let database_url = lookup("DATABASE_URL");
        if backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable is required");
        }
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        let expiration_hours = parse_or(&lookup, "JWT_EXPIRATION_HOURS", 24i64)?;
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&expiration_hours) {
            anyhow::bail!(
                "JWT_EXPIRATION_HOURS must be between 1 and {}",
                MAX_JWT_EXPIRATION_HOURS
            );
        }

        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:5173".to_string());
        let token_ttl_minutes = parse_or(&lookup, "RESET_TOKEN_TTL_MINUTES", 60i64)?;
        if !(1..=MAX_RESET_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            anyhow::bail!(
                "RESET_TOKEN_TTL_MINUTES must be between 1 and {}",
                MAX_RESET_TOKEN_TTL_MINUTES
            );
        }

        let smtp_host = lookup("SMTP_HOST");
        let smtp_port = parse_or(&lookup, "SMTP_PORT", 587u16)?;
        let from = lookup("EMAIL_FROM")
            .or_else(|| lookup("SMTP_USERNAME"))
            .unwrap_or_else(|| "no-reply@localhost".to_string());

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                cors_origins,
            },
            storage: StorageConfig {
                backend,
                database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_hours,
            },
            reset: ResetConfig {
                frontend_url,
                token_ttl_minutes,
            },
            email: EmailConfig {
                smtp_host,
                smtp_port,
                smtp_username: lookup("SMTP_USERNAME"),
                smtp_password: lookup("SMTP_PASSWORD"),
                from,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_memory_backend() {
        let config = load(&[("STORAGE_BACKEND", "memory"), ("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(!config.api.production);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.reset.frontend_url, "http://localhost:5173");
        assert_eq!(config.reset.token_ttl_minutes, 60);
        assert_eq!(config.email.smtp_port, 587);
        assert!(config.email.smtp_host.is_none());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[("JWT_SECRET", SECRET)]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "postgresql://localhost/taskboard"),
        ])
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let err = load(&[("STORAGE_BACKEND", "memory"), ("JWT_SECRET", "short")]).unwrap_err();
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = load(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }

    #[test]
    fn test_token_lifetimes_are_bounded() {
        fn with(key: &str, value: &str) -> anyhow::Result<Config> {
            load(&[("STORAGE_BACKEND", "memory"), ("JWT_SECRET", SECRET), (key, value)])
        }

        let max_hours = MAX_JWT_EXPIRATION_HOURS.to_string();
        let over_hours = (MAX_JWT_EXPIRATION_HOURS + 1).to_string();
        assert!(with("JWT_EXPIRATION_HOURS", &max_hours).is_ok());
        for bad in ["0", "-1", over_hours.as_str(), "9223372036854775807"] {
            let err = with("JWT_EXPIRATION_HOURS", bad).unwrap_err();
            assert!(err.to_string().contains("JWT_EXPIRATION_HOURS"));
        }

        let max_ttl = MAX_RESET_TOKEN_TTL_MINUTES.to_string();
        let over_ttl = (MAX_RESET_TOKEN_TTL_MINUTES + 1).to_string();
        assert!(with("RESET_TOKEN_TTL_MINUTES", &max_ttl).is_ok());
        for bad in ["0", over_ttl.as_str(), "9223372036854775807"] {
            let err = with("RESET_TOKEN_TTL_MINUTES", bad).unwrap_err();
            assert!(err.to_string().contains("RESET_TOKEN_TTL_MINUTES"));
        }
    }

    #[test]
    fn test_cors_origins_split() {
        let config = load(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com"),
        ])
        .unwrap();
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!("redis".parse::<StorageBackend>().is_err());
        assert_eq!(
            "Postgres".parse::<StorageBackend>().unwrap(),
            StorageBackend::Postgres
        );
    }
}
