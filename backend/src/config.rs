use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::snapshot::EmptyOutdoor;

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8081";
const DEFAULT_INGEST_ADDR: &str = "0.0.0.0:8989";
const DEFAULT_CORS_ORIGIN: &str = "http://127.0.0.1:8080"; // dashboard

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_addr: SocketAddr,
    pub ingest_addr: SocketAddr,
    pub cors_origin: String,
    pub empty_outdoor: EmptyOutdoor,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;
        let http_addr = get("WEATHER_HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse()
            .context("invalid WEATHER_HTTP_ADDR")?;
        let ingest_addr = get("WEATHER_INGEST_ADDR")
            .unwrap_or_else(|| DEFAULT_INGEST_ADDR.to_string())
            .parse()
            .context("invalid WEATHER_INGEST_ADDR")?;
        let cors_origin =
            get("WEATHER_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let empty_outdoor = match get("WEATHER_EMPTY_OUTDOOR") {
            Some(v) => v.parse().context("invalid WEATHER_EMPTY_OUTDOOR")?,
            None => EmptyOutdoor::default(),
        };

        Ok(Self {
            database_url,
            http_addr,
            ingest_addr,
            cors_origin,
            empty_outdoor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults() {
        let config = config(&[("DATABASE_URL", "weather.db")]).unwrap();
        assert_eq!(config.database_url, "weather.db");
        assert_eq!(config.http_addr, DEFAULT_HTTP_ADDR.parse().unwrap());
        assert_eq!(config.ingest_addr, DEFAULT_INGEST_ADDR.parse().unwrap());
        assert_eq!(config.cors_origin, DEFAULT_CORS_ORIGIN);
        assert_eq!(config.empty_outdoor, EmptyOutdoor::NullFields);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("DATABASE_URL", "/var/lib/weather.db"),
            ("WEATHER_HTTP_ADDR", "0.0.0.0:9000"),
            ("WEATHER_EMPTY_OUTDOOR", "suppress"),
        ])
        .unwrap();
        assert_eq!(config.http_addr.port(), 9000);
        assert_eq!(config.empty_outdoor, EmptyOutdoor::Suppress);
    }

    #[test]
    fn database_url_is_required() {
        assert!(config(&[]).is_err());
    }

    #[test]
    fn bad_policy_is_rejected() {
        assert!(config(&[("DATABASE_URL", "w.db"), ("WEATHER_EMPTY_OUTDOOR", "maybe")]).is_err());
    }
}
