use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_MODEL_PATH: &str = "assets/model.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite URL, e.g. `sqlite:employee_events.db`
    pub database_url: String,
    /// Serialized risk model, loaded once at startup
    pub model_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set to a SQLite database URL")?;
        let model_path = std::env::var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH));
        let bind_addr = env_parse("BIND_ADDR", DEFAULT_BIND_ADDR)?;

        Ok(Self {
            database_url,
            model_path,
            bind_addr,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={raw}: {e}"))
}
