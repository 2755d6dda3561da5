use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Which backend holds reports and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(anyhow!(
                "STORE_BACKEND must be one of memory, redis, postgres (got '{other}')"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Backend URLs are only required for the backend actually selected.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub redis_key_prefix: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            store_backend: std::env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "memory".to_string())
                .parse()?,
            database_url: std::env::var("DATABASE_URL").ok(),
            redis_url: std::env::var("REDIS_URL").ok(),
            redis_key_prefix: std::env::var("REDIS_KEY_PREFIX")
                .unwrap_or_else(|_| "memoria".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        require(&self.database_url, "DATABASE_URL")
    }

    pub fn require_redis_url(&self) -> Result<&str> {
        require(&self.redis_url, "REDIS_URL")
    }
}

fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    value.as_deref().with_context(|| {
        format!("Required environment variable '{key}' is not set for the selected STORE_BACKEND")
    })
}
