//! API configuration module.
//!
//! Configuration is read from environment variables once at startup and
//! passed down explicitly. Nothing below `main` reads the environment.

use chrono::Duration;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use tableside_db::Environment;

/// Upper bound for either token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `APP_ENV`: collection prefix, bind host, CORS policy
    pub environment: Environment,

    /// HTTP port
    pub port: u16,

    /// Secret for HS256 signing. May be empty; signing then fails.
    pub jwt_secret: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Allowed CORS origin in production
    pub frontend_url: Option<String>,

    /// Manager token lifetime in seconds (default: 7 days)
    pub manager_token_ttl_secs: i64,

    /// Session / QR token lifetime in seconds (default: 1 hour)
    pub session_token_ttl_secs: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            environment: Environment::Development,
            port: 8080,
            jwt_secret: String::new(),
            database_path: PathBuf::from("./tableside.db"),
            frontend_url: None,
            manager_token_ttl_secs: 7 * 24 * 60 * 60,
            session_token_ttl_secs: 60 * 60,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            environment: lookup("APP_ENV")
                .map(|v| Environment::from_name(&v))
                .unwrap_or_default(),

            port: parse_or(&lookup, "PORT", defaults.port)?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_default(),

            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            frontend_url: lookup("FRONTEND_URL").filter(|v| !v.trim().is_empty()),

            manager_token_ttl_secs: parse_or(
                &lookup,
                "MANAGER_TOKEN_TTL_SECS",
                defaults.manager_token_ttl_secs,
            )?,

            session_token_ttl_secs: parse_or(
                &lookup,
                "SESSION_TOKEN_TTL_SECS",
                defaults.session_token_ttl_secs,
            )?,
        };

        check_ttl("MANAGER_TOKEN_TTL_SECS", config.manager_token_ttl_secs)?;
        check_ttl("SESSION_TOKEN_TTL_SECS", config.session_token_ttl_secs)?;

        Ok(config)
    }

    /// Production listens on all interfaces, everything else on loopback.
    pub fn bind_addr(&self) -> SocketAddr {
        let host = if self.environment.is_production() {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        SocketAddr::new(host, self.port)
    }

    /// Default `RUST_LOG` filter when none is set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.environment.is_production() {
            "info"
        } else {
            "debug"
        }
    }

    /// Clamped to `1..=MAX_TOKEN_TTL_SECS` for hand-built configs.
    pub fn manager_token_ttl(&self) -> Duration {
        Duration::seconds(self.manager_token_ttl_secs.clamp(1, MAX_TOKEN_TTL_SECS))
    }

    pub fn session_token_ttl(&self) -> Duration {
        Duration::seconds(self.session_token_ttl_secs.clamp(1, MAX_TOKEN_TTL_SECS))
    }
}

/// A lifetime must be positive, representable, and at most
/// [`MAX_TOKEN_TTL_SECS`] so `now + ttl` cannot overflow.
fn check_ttl(key: &str, secs: i64) -> Result<(), ConfigError> {
    match Duration::try_seconds(secs) {
        Some(ttl) if ttl > Duration::zero() && secs <= MAX_TOKEN_TTL_SECS => Ok(()),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 8080);
        assert!(config.jwt_secret.is_empty());
        assert_eq!(config.manager_token_ttl_secs, 604_800);
        assert_eq!(config.session_token_ttl_secs, 3600);
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.default_log_filter(), "debug");
    }

    #[test]
    fn test_production() {
        let config = load(&[
            ("APP_ENV", "production"),
            ("PORT", "9000"),
            ("JWT_SECRET", "shh"),
            ("FRONTEND_URL", "https://order.example.com"),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.jwt_secret, "shh");
        assert_eq!(
            config.frontend_url.as_deref(),
            Some("https://order.example.com")
        );
        assert_eq!(config.default_log_filter(), "info");
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue(ref key)) if key == "PORT"
        ));
        assert!(load(&[("SESSION_TOKEN_TTL_SECS", "0")]).is_err());
    }

    #[test]
    fn test_ttl_out_of_range() {
        for raw in ["9223372036854775807", "-5", "315360001"] {
            assert!(
                matches!(
                    load(&[("MANAGER_TOKEN_TTL_SECS", raw)]),
                    Err(ConfigError::InvalidValue(ref key)) if key == "MANAGER_TOKEN_TTL_SECS"
                ),
                "{raw}"
            );
        }

        let longest = load(&[("SESSION_TOKEN_TTL_SECS", "315360000")]).unwrap();
        assert_eq!(longest.session_token_ttl(), Duration::days(3650));
    }

    #[test]
    fn test_hand_built_ttl_is_clamped() {
        let config = ApiConfig {
            manager_token_ttl_secs: i64::MAX,
            ..ApiConfig::default()
        };
        assert_eq!(config.manager_token_ttl(), Duration::seconds(MAX_TOKEN_TTL_SECS));
        let _ = chrono::Utc::now() + config.manager_token_ttl();
    }
}
