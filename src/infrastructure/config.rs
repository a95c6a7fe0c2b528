//! Application configuration

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Which record store backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Postgres,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            other => anyhow::bail!("Unknown STORE_BACKEND: {} (expected memory or postgres)", other),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// PostgreSQL connection URL, only read by the postgres backend
    pub database_url: String,
    pub max_connections: u32,
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,

    /// HTTP server port
    pub server_port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let kind: StoreKind = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        let database_url = match kind {
            StoreKind::Postgres => env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable is required for the postgres backend")?,
            StoreKind::Memory => env::var("DATABASE_URL").unwrap_or_default(),
        };

        Ok(Self {
            store: StoreConfig {
                kind,
                database_url,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            },

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_kind_parsing() {
        assert_eq!("memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert_eq!(" Postgres ".parse::<StoreKind>().unwrap(), StoreKind::Postgres);
        assert!("sqlite".parse::<StoreKind>().is_err());
    }
}
