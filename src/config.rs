//! Service configuration from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `PORT` | listening port | `8080` |
//! | `SBC_SOLVER_BIND_ADDR` | bind IP address | `0.0.0.0` |
//! | `SBC_SOLVER_WORKERS` | worker pool slots | `2` |
//! | `SBC_SOLVER_ALLOWED_ORIGINS` | comma-separated CORS origins | see [`DEFAULT_ALLOWED_ORIGINS`] |
//! | `SBC_SOLVER_SHUTDOWN_GRACE_SECS` | seconds open requests get to finish on shutdown | `10` |
//!
//! A variable that is set but cannot be parsed is an error: the service
//! refuses to start rather than silently running with a default.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::pool::{DEFAULT_WORKERS, MAX_WORKERS};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Origins allowed to call the service from a browser by default.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://www.ea.com",
    "https://ea.com",
    "http://localhost:8000",
];

/// Default time open requests get to finish once shutdown starts.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

const ENV_PORT: &str = "PORT";
const ENV_BIND_ADDR: &str = "SBC_SOLVER_BIND_ADDR";
const ENV_WORKERS: &str = "SBC_SOLVER_WORKERS";
const ENV_ALLOWED_ORIGINS: &str = "SBC_SOLVER_ALLOWED_ORIGINS";
const ENV_SHUTDOWN_GRACE: &str = "SBC_SOLVER_SHUTDOWN_GRACE_SECS";

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}: expected a port number")]
    InvalidPort(String),

    #[error("invalid SBC_SOLVER_BIND_ADDR value {0:?}: expected an IP address")]
    InvalidBindAddress(String),

    #[error("invalid SBC_SOLVER_WORKERS value {0:?}: expected an integer from 1 to {max}", max = MAX_WORKERS)]
    InvalidWorkerCount(String),

    #[error("invalid origin {0:?} in SBC_SOLVER_ALLOWED_ORIGINS")]
    InvalidOrigin(String),

    #[error("invalid SBC_SOLVER_SHUTDOWN_GRACE_SECS value {0:?}: expected whole seconds")]
    InvalidShutdownGrace(String),
}

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to bind the listener to.
    pub bind_addr: IpAddr,

    /// Port to listen on.
    pub port: u16,

    /// Number of worker pool slots.
    pub workers: NonZeroUsize,

    /// Origins allowed by the CORS policy.
    pub allowed_origins: Vec<HeaderValue>,

    /// How long open requests may keep the server alive after a shutdown
    /// signal.
    pub shutdown_grace: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            workers: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| HeaderValue::from_static(*o))
                .collect(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl ServiceConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its
    /// value if set. Unset variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let bind_addr = match lookup(ENV_BIND_ADDR) {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidBindAddress(raw))?,
            None => defaults.bind_addr,
        };

        let workers = match lookup(ENV_WORKERS) {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroUsize>()
                .ok()
                .filter(|n| n.get() <= MAX_WORKERS)
                .ok_or(ConfigError::InvalidWorkerCount(raw))?,
            None => defaults.workers,
        };

        let allowed_origins = match lookup(ENV_ALLOWED_ORIGINS) {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.allowed_origins,
        };

        let shutdown_grace = match lookup(ENV_SHUTDOWN_GRACE) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidShutdownGrace(raw))?,
            None => defaults.shutdown_grace,
        };

        Ok(ServiceConfig {
            bind_addr,
            port,
            workers,
            allowed_origins,
            shutdown_grace,
        })
    }

    /// Returns the socket address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Parses a comma-separated origin list, skipping empty entries.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            if !(o.starts_with("http://") || o.starts_with("https://")) {
                return Err(ConfigError::InvalidOrigin(o.to_string()));
            }
            HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.to_string()))
        })
        .collect()
}
