//! Configuration module for the relief backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Default cap on the activity feed.
pub const DEFAULT_ACTIVITY_CAP: i64 = 50;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding admin writes (camps, alerts)
    pub admin_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Number of activity feed entries kept before the oldest are evicted
    pub activity_cap: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let admin_psk = env::var("RELIEF_ADMIN_PSK")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let db_path = env::var("RELIEF_DB_PATH")
            .unwrap_or_else(|_| "./data/relief.sqlite".to_string())
            .into();

        let bind_addr = parse_var("RELIEF_BIND_ADDR", "127.0.0.1:5001")?;

        let log_level = env::var("RELIEF_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("RELIEF_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => return Err(format!("Invalid RELIEF_LOG_FORMAT value: {other}")),
        };

        let activity_cap: i64 =
            parse_var("RELIEF_ACTIVITY_CAP", &DEFAULT_ACTIVITY_CAP.to_string())?;
        if activity_cap <= 0 {
            return Err("RELIEF_ACTIVITY_CAP must be positive".to_string());
        }

        Ok(Self {
            admin_psk,
            db_path,
            bind_addr,
            log_level,
            log_format,
            activity_cap,
        })
    }
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| format!("Invalid {key} value: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("RELIEF_ADMIN_PSK");
        env::remove_var("RELIEF_DB_PATH");
        env::remove_var("RELIEF_BIND_ADDR");
        env::remove_var("RELIEF_LOG_LEVEL");
        env::remove_var("RELIEF_LOG_FORMAT");
        env::remove_var("RELIEF_ACTIVITY_CAP");

        let config = Config::from_env().unwrap();

        assert!(config.admin_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/relief.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:5001");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.activity_cap, 50);
    }

    #[test]
    fn test_parse_var_reports_key() {
        let err = parse_var::<SocketAddr>("RELIEF_TEST_UNSET_ADDR", "not-an-addr").unwrap_err();
        assert!(err.contains("RELIEF_TEST_UNSET_ADDR"));
    }
}
