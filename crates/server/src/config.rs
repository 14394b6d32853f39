use chrono::{Duration, FixedOffset};
use log::{info, warn};
use models::validation::DurationPolicy;
use std::{env, fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub duration_policy: DurationPolicy,
    /// Zone used for timestamps sent without an offset
    pub utc_offset: FixedOffset,
    pub default_space: String,
    pub run_migrations: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let offset_minutes: i32 = try_load(&lookup, "UTC_OFFSET_MINUTES", "-300")?;
        let utc_offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| ConfigError::Invalid {
                key: "UTC_OFFSET_MINUTES",
                message: format!("{offset_minutes} is out of range"),
            })?;

        let min_minutes: i64 = try_load(&lookup, "RESERVATION_MIN_DURATION_MINUTES", "30")?;
        let max_hours: i64 = try_load(&lookup, "RESERVATION_MAX_DURATION_HOURS", "4")?;
        if min_minutes <= 0 || max_hours * 60 < min_minutes {
            return Err(ConfigError::Invalid {
                key: "RESERVATION_MAX_DURATION_HOURS",
                message: format!("{max_hours}h does not fit a {min_minutes} minute minimum"),
            });
        }

        Ok(Self {
            database_url: require(&lookup, "DATABASE_URL")?,
            bind_address: try_load(&lookup, "BIND_ADDRESS", "0.0.0.0:8000")?,
            jwt_secret: require(&lookup, "JWT_SECRET")?,
            access_token_ttl: Duration::minutes(try_load(&lookup, "ACCESS_TOKEN_MINUTES", "60")?),
            refresh_token_ttl: Duration::days(try_load(&lookup, "REFRESH_TOKEN_DAYS", "1")?),
            duration_policy: DurationPolicy::new(min_minutes, max_hours * 60),
            utc_offset,
            default_space: try_load(&lookup, "DEFAULT_SPACE_NAME", "Módulo 3")?,
            run_migrations: try_load(&lookup, "RUN_MIGRATIONS", "true")?,
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            warn!("Environment variable {key} not found");
            ConfigError::Missing(key)
        })
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                message: e.to_string(),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/db"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.access_token_ttl, Duration::minutes(60));
        assert_eq!(config.refresh_token_ttl, Duration::days(1));
        assert_eq!(config.duration_policy, DurationPolicy::new(30, 240));
        assert_eq!(config.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(config.default_space, "Módulo 3");
        assert!(config.run_migrations);
    }

    #[test]
    fn test_required_values() {
        assert_eq!(
            load(&[("JWT_SECRET", "s")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        assert_eq!(
            load(&[("DATABASE_URL", "postgres://localhost/db"), ("JWT_SECRET", " ")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn test_invalid_values_fail() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("JWT_SECRET", "s"),
            ("RUN_MIGRATIONS", "maybe"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RUN_MIGRATIONS", .. }));

        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("JWT_SECRET", "s"),
            ("RESERVATION_MIN_DURATION_MINUTES", "300"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/db"),
            ("JWT_SECRET", "s"),
            ("UTC_OFFSET_MINUTES", "60"),
            ("RESERVATION_MAX_DURATION_HOURS", "2"),
        ])
        .unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), 3600);
        assert_eq!(config.duration_policy.max_minutes, 120);
    }
}
