use std::str::FromStr;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// StoreBackend
// ---------------------------------------------------------------------------

/// Where readings are kept, selected by `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// `sqlite:` URL, e.g. `sqlite://readings.db`.
    Sqlite(String),
    /// The literal `memory`: an in-process table, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "memory" => Ok(Self::Memory),
            url if url.starts_with("sqlite:") => Ok(Self::Sqlite(url.to_owned())),
            other => Err(anyhow::anyhow!(
                "unsupported DATABASE_URL {other:?}: expected a sqlite: URL or \"memory\""
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub server_host: String,
    pub server_port: u16,
    /// Upper bound on pooled SQLite connections.
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store: required("DATABASE_URL")?.parse()?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_memory() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
    }

    #[test]
    fn store_backend_sqlite_url_is_kept_verbatim() {
        assert_eq!(
            "sqlite://readings.db?mode=rwc".parse::<StoreBackend>().unwrap(),
            StoreBackend::Sqlite("sqlite://readings.db?mode=rwc".into())
        );
        assert_eq!(
            "sqlite::memory:".parse::<StoreBackend>().unwrap(),
            StoreBackend::Sqlite("sqlite::memory:".into())
        );
    }

    #[test]
    fn store_backend_rejects_other_databases() {
        let err = "postgres://localhost/readings".parse::<StoreBackend>().unwrap_err();
        assert!(err.to_string().contains("unsupported DATABASE_URL"));
    }
}
