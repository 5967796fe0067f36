use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Server settings, read from the environment after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub development: bool,
    pub session_ttl_hours: i64,
    pub seed_demo: bool,
    pub cookie_secure: bool,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn flag(name: &str) -> bool {
    matches!(
        std::env::var(name).map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Ok("1" | "true" | "yes" | "on")
    )
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let port: u16 = var_or("BARTER_PORT", "3000")
            .parse()
            .context("BARTER_PORT must be a port number")?;
        let session_ttl_hours: i64 = var_or("BARTER_SESSION_TTL_HOURS", "168")
            .parse()
            .context("BARTER_SESSION_TTL_HOURS must be a whole number of hours")?;
        if session_ttl_hours <= 0 {
            anyhow::bail!("BARTER_SESSION_TTL_HOURS must be positive");
        }

        Ok(Self {
            host: var_or("BARTER_HOST", "0.0.0.0"),
            port,
            db_path: var_or("BARTER_DB_PATH", "barter.db").into(),
            static_dir: var_or("BARTER_STATIC_DIR", "./static").into(),
            development: var_or("BARTER_ENV", "production").eq_ignore_ascii_case("development"),
            session_ttl_hours,
            seed_demo: flag("BARTER_SEED_DEMO"),
            cookie_secure: flag("BARTER_COOKIE_SECURE"),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
