//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const BIND_ADDR_ENV: &str = "STALLBOOK_BIND_ADDR";
pub const DATA_FILE_ENV: &str = "STALLBOOK_DATA_FILE";
pub const ALLOW_SET_SOLD_ENV: &str = "STALLBOOK_ALLOW_SET_SOLD";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value:?}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must be true or false, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },

    #[error("{var} is set but empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// `None` keeps records in memory only.
    pub data_file: Option<PathBuf>,
    /// Expose the absolute `PUT /api/food_items/:id` overwrite.
    pub allow_set_sold: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_file: None,
            allow_set_sold: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                var: BIND_ADDR_ENV,
                value: raw_addr.clone(),
            })?;

        let data_file = match lookup(DATA_FILE_ENV) {
            None => None,
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Empty { var: DATA_FILE_ENV });
            }
            Some(raw) => Some(PathBuf::from(raw.trim())),
        };

        let allow_set_sold = match lookup(ALLOW_SET_SOLD_ENV) {
            None => false,
            Some(raw) => parse_flag(ALLOW_SET_SOLD_ENV, &raw)?,
        };

        Ok(Self {
            bind_addr,
            data_file,
            allow_set_sold,
        })
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: raw.to_string(),
        }),
    }
}
