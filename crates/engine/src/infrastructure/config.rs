//! Engine configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `SERVER_HOST` | `0.0.0.0` |
//! | `SERVER_PORT` (or `PORT`) | `3000` |
//! | `CORS_ALLOWED_ORIGINS` | unset (no CORS layer) |
//! | `WRITE_COOLDOWN_MS` | `1000` |
//! | `WRITE_BACKOFF_BASE_MS` | `500` |
//! | `WRITE_BACKOFF_MAX_MS` | `30000` |
//! | `CASTING_MAX_ATTEMPTS` | `1000` |

use std::str::FromStr;
use std::time::Duration;

use realmforge_domain::CastingLimits;

use super::throttle::WriteThrottleConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origins: Option<String>,
    pub throttle: WriteThrottleConfig,
    pub casting: CastingLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            cors_allowed_origins: None,
            throttle: WriteThrottleConfig::default(),
            casting: CastingLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Unparseable values keep their
    /// defaults and are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = lookup("SERVER_PORT")
            .map(|value| ("SERVER_PORT", value))
            .or_else(|| lookup("PORT").map(|value| ("PORT", value)))
            .map_or(defaults.server_port, |(name, value)| {
                parse_or(name, &value, defaults.server_port)
            });

        let ms = |name: &str, fallback: Duration| -> Duration {
            lookup(name).map_or(fallback, |value| {
                Duration::from_millis(parse_or(name, &value, fallback.as_millis() as u64))
            })
        };

        let throttle = WriteThrottleConfig {
            cooldown: ms("WRITE_COOLDOWN_MS", defaults.throttle.cooldown),
            backoff_base: ms("WRITE_BACKOFF_BASE_MS", defaults.throttle.backoff_base),
            backoff_max: ms("WRITE_BACKOFF_MAX_MS", defaults.throttle.backoff_max),
        };

        let max_attempts = lookup("CASTING_MAX_ATTEMPTS").map_or(
            defaults.casting.max_attempts,
            |value| parse_or("CASTING_MAX_ATTEMPTS", &value, defaults.casting.max_attempts),
        );

        Self {
            server_host,
            server_port,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS"),
            throttle,
            casting: CastingLimits { max_attempts },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T>(name: &str, value: &str, fallback: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::warn!(
                variable = name,
                value = %value,
                fallback = %fallback,
                "Invalid configuration value, using default"
            );
            fallback
        }
    }
}
