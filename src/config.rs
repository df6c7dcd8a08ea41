//! Environment configuration
//!
//! Both binaries load an optional `.env` file with `dotenvy` and then read
//! [`AppConfig::from_env`]. Parsing goes through a lookup function so it can
//! be tested without touching the process environment.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::llm::{GenerationConfig, Model};

/// Origins allowed when `ALLOWED_ORIGINS` is unset
pub const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:19006",
    "exp://localhost:19000",
];

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Where messages are persisted
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseTarget {
    Postgres(String),
    /// `memory://`, non-durable
    Memory,
}

/// Chat-delivery credentials
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSettings {
    pub api_key: String,
    pub secret: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database: DatabaseTarget,
    pub pool_size: usize,
    pub bind_addr: SocketAddr,
    pub allowed_origins: AllowedOrigins,
    pub model: Model,
    /// Credential for the provider `model` selects
    pub completion_api_key: String,
    pub completion_timeout: Duration,
    pub generation: GenerationConfig,
    pub persona: Option<String>,
    /// `None` disables chat delivery
    pub stream: Option<StreamSettings>,
    pub assistant_id: String,
    pub amqp_url: String,
    pub queue_name: String,
    pub max_redeliveries: Option<u32>,
    pub seed_admin: bool,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration from a fixed set of variables
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database = match get("DATABASE_URL") {
            Some(url) if url.starts_with("memory://") => DatabaseTarget::Memory,
            Some(url) => DatabaseTarget::Postgres(url),
            None => return Err(ConfigError::Missing("DATABASE_URL")),
        };

        let pool_size = parse_or("DATABASE_POOL_SIZE", get("DATABASE_POOL_SIZE"), 16usize)?;
        let bind_addr = parse_or(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 8000)),
        )?;

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) if raw == "*" => AllowedOrigins::Any,
            Some(raw) => {
                let list: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect();
                if let Some(bad) = list.iter().find(|o| !o.contains("://")) {
                    return Err(ConfigError::Invalid {
                        name: "ALLOWED_ORIGINS",
                        reason: format!("{:?} is not a scheme://host origin", bad),
                    });
                }
                AllowedOrigins::List(list)
            }
            None => AllowedOrigins::List(DEV_ORIGINS.iter().map(|o| o.to_string()).collect()),
        };

        let model = match get("COMPLETION_MODEL") {
            Some(raw) => raw.parse::<Model>().map_err(|e| ConfigError::Invalid {
                name: "COMPLETION_MODEL",
                reason: e.to_string(),
            })?,
            None => Model::default(),
        };

        let key_var = match model {
            Model::OpenAi(_) => "OPENAI_API_KEY",
            Model::Anthropic(_) => "ANTHROPIC_API_KEY",
        };
        let completion_api_key = get(key_var).ok_or(ConfigError::Missing(key_var))?;

        let timeout_secs = parse_or("COMPLETION_TIMEOUT_SECS", get("COMPLETION_TIMEOUT_SECS"), 60u64)?;

        let max_tokens = parse_or(
            "COMPLETION_MAX_TOKENS",
            get("COMPLETION_MAX_TOKENS"),
            GenerationConfig::default().max_tokens,
        )?;
        if max_tokens == 0 {
            return Err(ConfigError::Invalid {
                name: "COMPLETION_MAX_TOKENS",
                reason: "must be at least 1".to_string(),
            });
        }
        let mut generation = GenerationConfig::new(max_tokens);
        if let Some(raw) = get("COMPLETION_TEMPERATURE") {
            let temperature: f32 = parse("COMPLETION_TEMPERATURE", &raw)?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid {
                    name: "COMPLETION_TEMPERATURE",
                    reason: format!("{} is outside 0.0..=2.0", temperature),
                });
            }
            generation = generation.with_temperature(temperature);
        }

        let stream = match (get("STREAM_API_KEY"), get("STREAM_SECRET")) {
            (Some(api_key), Some(secret)) => Some(StreamSettings {
                api_key,
                secret,
                location: get("STREAM_LOCATION"),
            }),
            _ => None,
        };

        let amqp_url = get("AMQP_URL")
            .or_else(|| get("RABBITMQ_HOST").map(|host| format!("amqp://{}:5672/%2f", host)))
            .unwrap_or_else(|| "amqp://localhost:5672/%2f".to_string());

        let max_redeliveries = match get("MAX_REDELIVERIES") {
            Some(raw) => Some(parse("MAX_REDELIVERIES", &raw)?),
            None => None,
        };

        let seed_admin = match get("SEED_ADMIN").as_deref() {
            None => true,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "SEED_ADMIN",
                    reason: format!("expected true or false, got {:?}", other),
                })
            }
        };

        Ok(Self {
            database,
            pool_size,
            bind_addr,
            allowed_origins,
            model,
            completion_api_key,
            completion_timeout: Duration::from_secs(timeout_secs),
            generation,
            persona: get("SYSTEM_PERSONA"),
            stream,
            assistant_id: get("ASSISTANT_USER_ID").unwrap_or_else(|| "ai_assistant".to_string()),
            amqp_url,
            queue_name: get("QUEUE_NAME").unwrap_or_else(|| "chat_queue".to_string()),
            max_redeliveries,
            seed_admin,
        })
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse(name, &raw),
        None => Ok(default),
    }
}
