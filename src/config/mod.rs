use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// Top-level settings container
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

// Without a database the service runs on the in-memory store
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout: Duration,
}

// Optional mirror of inventory events onto Redis pub/sub
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Upper bound for each store call and for waiting on the per-key lock.
    pub store_timeout: Duration,
    pub notify_timeout: Duration,
    /// Buffer of the in-process channel feeding the status listener.
    pub channel_capacity: usize,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(2000),
            notify_timeout: Duration::from_millis(500),
            channel_capacity: 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let log_format = match var("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "'pretty' or 'json'",
                    value: other.to_string(),
                })
            }
        };

        let database = match non_empty("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                pool_size: parse("DB_POOL_SIZE", &var("DB_POOL_SIZE", "20"), "a valid number")?,
                acquire_timeout: millis("DB_ACQUIRE_TIMEOUT_MS", &var("DB_ACQUIRE_TIMEOUT_MS", "5000"))?,
            }),
            None => None,
        };

        let channel_capacity: usize = parse(
            "BOOKING_CHANNEL_CAPACITY",
            &var("BOOKING_CHANNEL_CAPACITY", "1024"),
            "a valid number",
        )?;
        if channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "BOOKING_CHANNEL_CAPACITY",
                expected: "greater than zero",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            app: AppConfig {
                host: var("HOST", "0.0.0.0"),
                port: parse("PORT", &var("PORT", "8000"), "a valid port number")?,
                environment: var("ENVIRONMENT", "development"),
                rust_log: var("RUST_LOG", "movie_booking=debug,tower_http=debug"),
                log_format,
            },
            database,
            redis: non_empty("REDIS_URL").map(|url| RedisConfig { url }),
            booking: BookingConfig {
                store_timeout: millis("BOOKING_STORE_TIMEOUT_MS", &var("BOOKING_STORE_TIMEOUT_MS", "2000"))?,
                notify_timeout: millis("BOOKING_NOTIFY_TIMEOUT_MS", &var("BOOKING_NOTIFY_TIMEOUT_MS", "500"))?,
                channel_capacity,
            },
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: &str, expected: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value: value.to_string(),
    })
}

fn millis(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse::<u64>(name, value, "a duration in milliseconds").map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_run_without_external_services() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.app.port, 8000);
        assert_eq!(config.app.log_format, LogFormat::Pretty);
        assert!(config.database.is_none());
        assert!(config.redis.is_none());
        assert_eq!(config.booking.store_timeout, Duration::from_millis(2000));
        assert_eq!(config.booking.notify_timeout, Duration::from_millis(500));
        assert_eq!(config.booking.channel_capacity, 1024);
    }

    #[test]
    fn database_and_redis_are_picked_up() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/movies"),
            ("DB_POOL_SIZE", "5"),
            ("REDIS_URL", "redis://localhost"),
            ("LOG_FORMAT", "JSON"),
            ("BOOKING_STORE_TIMEOUT_MS", "150"),
        ])
        .unwrap();
        let database = config.database.unwrap();
        assert_eq!(database.pool_size, 5);
        assert_eq!(database.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.redis.unwrap().url, "redis://localhost");
        assert_eq!(config.app.log_format, LogFormat::Json);
        assert_eq!(config.booking.store_timeout, Duration::from_millis(150));
    }

    #[test]
    fn blank_database_url_means_memory_store() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a valid port number, got 'eighty'");

        assert!(config_from(&[("BOOKING_CHANNEL_CAPACITY", "0")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(config_from(&[("BOOKING_NOTIFY_TIMEOUT_MS", "-1")]).is_err());
    }
}
