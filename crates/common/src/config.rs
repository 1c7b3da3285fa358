use serde::Deserialize;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for cache durations (30 days)
pub const MAX_CACHE_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL, takes precedence over the individual parts
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Build database URL from configuration
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.username, self.password, self.host, self.port, self.database
            ),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            username: "order_user".to_string(),
            password: "order_pass".to_string(),
            database: "order_db".to_string(),
            max_connections: 10,
        }
    }
}

/// Kafka consumer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    /// Where a consumer group without committed offsets starts reading
    pub offset_reset: String,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "orders".to_string(),
            group_id: "order-demo-consumer".to_string(),
            offset_reset: "latest".to_string(),
        }
    }
}

/// In-memory cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub cleanup_interval_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            cleanup_interval_seconds: 600,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub kafka: KafkaConfig,
    pub cache: CacheConfig,
    pub port: u16,
    pub run_migrations: bool,
    pub log_level: String,
    pub enable_jaeger: bool,
    pub jaeger_endpoint: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            kafka: KafkaConfig::default(),
            cache: CacheConfig::default(),
            port: 8081,
            run_migrations: false,
            log_level: "info".to_string(),
            enable_jaeger: false,
            jaeger_endpoint: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);

        let database = DatabaseConfig {
            url: lookup("DATABASE_URL"),
            host: text("PG_HOST", defaults.database.host),
            port: parse(&lookup, "PG_PORT", defaults.database.port)?,
            username: text("PG_USER", defaults.database.username),
            password: text("PG_PASSWORD", defaults.database.password),
            database: text("PG_DB", defaults.database.database),
            max_connections: parse(&lookup, "PG_MAX_CONNECTIONS", defaults.database.max_connections)?,
        };

        let kafka = KafkaConfig {
            brokers: text("KAFKA_BROKERS", defaults.kafka.brokers),
            topic: text("KAFKA_TOPIC", defaults.kafka.topic),
            group_id: text("KAFKA_GROUP", defaults.kafka.group_id),
            offset_reset: text("KAFKA_OFFSET_RESET", defaults.kafka.offset_reset),
        };

        let cache = CacheConfig {
            ttl_seconds: parse_bounded(
                &lookup,
                "CACHE_TTL_SECONDS",
                defaults.cache.ttl_seconds,
                1..=MAX_CACHE_TTL_SECONDS,
            )?,
            cleanup_interval_seconds: parse_bounded(
                &lookup,
                "CACHE_CLEANUP_SECONDS",
                defaults.cache.cleanup_interval_seconds,
                1..=MAX_CACHE_TTL_SECONDS,
            )?,
        };

        Ok(Self {
            database,
            kafka,
            cache,
            port: parse(&lookup, "APP_PORT", defaults.port)?,
            run_migrations: parse(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?,
            log_level: text("RUST_LOG", defaults.log_level),
            enable_jaeger: parse(&lookup, "ENABLE_JAEGER", defaults.enable_jaeger)?,
            jaeger_endpoint: lookup("JAEGER_ENDPOINT"),
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn parse_bounded<F>(
    lookup: &F,
    key: &'static str,
    default: u64,
    bounds: RangeInclusive<u64>,
) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse(lookup, key, default)?;
    if bounds.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
    }
}
