//! Configuration loading and representation.
//!
//! Everything comes from `GALLEY_*` environment variables with defaults.

use std::net::SocketAddr;

use thiserror::Error;

use galley_inventory::LOW_STOCK_THRESHOLD;

use crate::sessions::DEFAULT_SESSION_TTL_SECS;

pub const BIND_ADDR_VAR: &str = "GALLEY_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "GALLEY_DATABASE_URL";
pub const LOW_STOCK_THRESHOLD_VAR: &str = "GALLEY_LOW_STOCK_THRESHOLD";
pub const SESSION_TTL_VAR: &str = "GALLEY_SESSION_TTL_SECS";
pub const SEED_DEFAULT_USERS_VAR: &str = "GALLEY_SEED_DEFAULT_USERS";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for {var}: '{value}' ({reason})")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub low_stock_threshold: i64,
    pub session_ttl_secs: i64,
    pub seed_default_users: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            seed_default_users: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset and blank variables
    /// take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let bind_addr = match get(BIND_ADDR_VAR) {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| ConfigError {
                var: BIND_ADDR_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.bind_addr,
        };

        let low_stock_threshold = match get(LOW_STOCK_THRESHOLD_VAR) {
            Some(raw) => parse_int(LOW_STOCK_THRESHOLD_VAR, &raw, 0)?,
            None => defaults.low_stock_threshold,
        };

        let session_ttl_secs = match get(SESSION_TTL_VAR) {
            Some(raw) => parse_int(SESSION_TTL_VAR, &raw, 1)?,
            None => defaults.session_ttl_secs,
        };

        let seed_default_users = match get(SEED_DEFAULT_USERS_VAR) {
            Some(raw) => parse_bool(SEED_DEFAULT_USERS_VAR, &raw)?,
            None => defaults.seed_default_users,
        };

        Ok(Self {
            bind_addr,
            database_url: get(DATABASE_URL_VAR),
            low_stock_threshold,
            session_ttl_secs,
            seed_default_users,
        })
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs)
    }
}

fn parse_int(var: &'static str, raw: &str, min: i64) -> Result<i64, ConfigError> {
    let invalid = |reason: String| ConfigError {
        var,
        value: raw.to_string(),
        reason,
    };
    let value: i64 = raw.parse().map_err(|e: std::num::ParseIntError| invalid(e.to_string()))?;
    if value < min {
        return Err(invalid(format!("must be at least {min}")));
    }
    Ok(value)
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
