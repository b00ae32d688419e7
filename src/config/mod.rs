use chrono::Weekday;
use std::{env, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub openai: OpenAiConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub admin: AdminConfig,
    pub reservations: ReservationConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

// Настройки базы данных. Без DATABASE_URL работаем на in-memory хранилище.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
    pub run_migrations: bool,
}

// Настройки API чат-комплишенов
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub max_history: usize,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Basic Auth для админского списка броней
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReservationConfig {
    pub enforce_party_bounds: bool,
    pub closed_weekdays: Vec<Weekday>,
    /// Offset of the restaurant's local time, used to decide what "today" is.
    pub utc_offset_hours: i32,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone)]
pub struct FeatureFlags {
    pub enable_chatbot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                environment: "development".to_string(),
                rust_log: "shokudo=debug,tower_http=debug".to_string(),
                log_format: LogFormat::Pretty,
            },
            database: DatabaseConfig {
                url: None,
                pool_size: 10,
                run_migrations: true,
            },
            openai: OpenAiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                max_tokens: 400,
                temperature: 0.7,
                timeout_seconds: 30,
                max_history: 20,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 5,
                timeout_seconds: 60,
            },
            admin: AdminConfig {
                username: "admin".to_string(),
                password: None,
            },
            reservations: ReservationConfig {
                enforce_party_bounds: true,
                closed_weekdays: vec![Weekday::Sun, Weekday::Mon],
                utc_offset_hours: 9,
            },
            features: FeatureFlags {
                enable_chatbot: true,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or(defaults.app.host),
                port: parsed("PORT", defaults.app.port)?,
                environment: env::var("ENVIRONMENT").unwrap_or(defaults.app.environment),
                rust_log: env::var("RUST_LOG").unwrap_or(defaults.app.rust_log),
                log_format: parsed("LOG_FORMAT", defaults.app.log_format)?,
            },
            database: DatabaseConfig {
                url: non_empty("DATABASE_URL"),
                pool_size: parsed("DB_POOL_SIZE", defaults.database.pool_size)?,
                run_migrations: parsed("RUN_MIGRATIONS", defaults.database.run_migrations)?,
            },
            openai: OpenAiConfig {
                api_key: non_empty("OPENAI_API_KEY"),
                base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai.base_url),
                model: env::var("OPENAI_MODEL").unwrap_or(defaults.openai.model),
                max_tokens: parsed("OPENAI_MAX_TOKENS", defaults.openai.max_tokens)?,
                temperature: parsed("OPENAI_TEMPERATURE", defaults.openai.temperature)?,
                timeout_seconds: parsed("OPENAI_TIMEOUT_SECONDS", defaults.openai.timeout_seconds)?,
                max_history: parsed("CHAT_MAX_HISTORY", defaults.openai.max_history)?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parsed(
                    "CIRCUIT_BREAKER_FAILURE_THRESHOLD",
                    defaults.circuit_breaker.failure_threshold,
                )?,
                timeout_seconds: parsed(
                    "CIRCUIT_BREAKER_TIMEOUT_SECONDS",
                    defaults.circuit_breaker.timeout_seconds,
                )?,
            },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin.username),
                password: non_empty("ADMIN_PASSWORD"),
            },
            reservations: ReservationConfig {
                enforce_party_bounds: parsed(
                    "ENFORCE_PARTY_BOUNDS",
                    defaults.reservations.enforce_party_bounds,
                )?,
                closed_weekdays: match env::var("CLOSED_WEEKDAYS") {
                    Ok(raw) => parse_weekdays(&raw).map_err(|reason| ConfigError::Invalid {
                        key: "CLOSED_WEEKDAYS",
                        value: raw.clone(),
                        reason,
                    })?,
                    Err(_) => defaults.reservations.closed_weekdays,
                },
                utc_offset_hours: {
                    let hours = parsed("RESTAURANT_UTC_OFFSET_HOURS", defaults.reservations.utc_offset_hours)?;
                    if !(-23..=23).contains(&hours) {
                        return Err(ConfigError::Invalid {
                            key: "RESTAURANT_UTC_OFFSET_HOURS",
                            value: hours.to_string(),
                            reason: "must be between -23 and 23".to_string(),
                        });
                    }
                    hours
                },
            },
            features: FeatureFlags {
                enable_chatbot: parsed("ENABLE_CHATBOT", defaults.features.enable_chatbot)?,
            },
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parses a comma separated weekday list such as `sun,mon`. An empty string
/// means the restaurant never closes.
pub fn parse_weekdays(raw: &str) -> Result<Vec<Weekday>, String> {
    let mut days = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day: Weekday = part
            .parse()
            .map_err(|_| format!("unknown weekday '{part}'"))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}
