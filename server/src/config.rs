//! Configuration management.
//!
//! Loads configuration from environment variables with defaults. The binary
//! reads a `.env` file first (see `main.rs`).

use only4kiddos_ledger::OverReleasePolicy;
use only4kiddos_web::RateLimit;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be parsed.
    #[error("Invalid value {value:?} for {key}: expected {expected}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
        /// Expected format
        expected: &'static str,
    },
}

/// Inventory store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerStore {
    /// Per-event locks
    #[default]
    Memory,
    /// Lock-free compare-and-swap counters
    Atomic,
}

impl FromStr for LedgerStore {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "atomic" => Ok(Self::Atomic),
            _ => Err(()),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: IpAddr,
    /// Port to bind to
    pub port: u16,
    /// Grace period for in-flight requests on shutdown
    pub shutdown_timeout: Duration,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Per-client request limit on `/api`
    pub rate_limit: RateLimit,
}

impl ServerConfig {
    /// Listener address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Host to bind to
    pub host: IpAddr,
    /// Port to bind to
    pub port: u16,
}

impl MetricsConfig {
    /// Exporter address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Reservation ledger configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Inventory store backend
    pub store: LedgerStore,
    /// What a release past capacity does
    pub over_release: OverReleasePolicy,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server
    pub server: ServerConfig,
    /// Metrics exporter
    pub metrics: MetricsConfig,
    /// Reservation ledger
    pub ledger: LedgerConfig,
    /// Publish the sample catalog at startup
    pub seed_sample_data: bool,
    /// Development token table, `token=user_id:role:email;...`
    pub auth_dev_tokens: Option<String>,
}

/// Origins allowed when `ALLOWED_ORIGINS` is unset: the local web and Expo
/// dev servers.
const DEV_ORIGINS: [&str; 4] = [
    "http://localhost:5000",
    "http://127.0.0.1:5000",
    "http://localhost:8081",
    "http://127.0.0.1:8081",
];

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a variable that is set but
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a variable that is set but
    /// malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let allowed_origins = var("ALLOWED_ORIGINS").map_or_else(
            || DEV_ORIGINS.iter().map(ToString::to_string).collect(),
            |origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(ToString::to_string)
                    .collect()
            },
        );

        let over_release = match var("LEDGER_OVER_RELEASE") {
            Some(value) => {
                OverReleasePolicy::from_name(&value).ok_or(ConfigError::Invalid {
                    key: "LEDGER_OVER_RELEASE",
                    value,
                    expected: "reject or clamp",
                })?
            }
            None => OverReleasePolicy::default(),
        };

        Ok(Self {
            server: ServerConfig {
                host: parse(var("HOST"), "HOST", "an IP address", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
                port: parse(var("PORT"), "PORT", "a port number", 3001)?,
                shutdown_timeout: Duration::from_secs(parse(
                    var("SHUTDOWN_TIMEOUT"),
                    "SHUTDOWN_TIMEOUT",
                    "seconds",
                    30,
                )?),
                allowed_origins,
                rate_limit: RateLimit {
                    requests: parse(
                        var("RATE_LIMIT_REQUESTS"),
                        "RATE_LIMIT_REQUESTS",
                        "a request count",
                        60,
                    )?,
                    window: Duration::from_secs(parse(
                        var("RATE_LIMIT_WINDOW"),
                        "RATE_LIMIT_WINDOW",
                        "seconds",
                        60,
                    )?),
                },
            },
            metrics: MetricsConfig {
                host: parse(
                    var("METRICS_HOST"),
                    "METRICS_HOST",
                    "an IP address",
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                )?,
                port: parse(var("METRICS_PORT"), "METRICS_PORT", "a port number", 9090)?,
            },
            ledger: LedgerConfig {
                store: parse(var("LEDGER_STORE"), "LEDGER_STORE", "memory or atomic", LedgerStore::Memory)?,
                over_release,
            },
            seed_sample_data: parse_bool(var("SEED_SAMPLE_DATA"), "SEED_SAMPLE_DATA", false)?,
            auth_dev_tokens: var("AUTH_DEV_TOKENS"),
        })
    }
}

fn parse<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value,
            expected,
        }),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(_) => Err(ConfigError::Invalid {
            key,
            value: value.unwrap_or_default(),
            expected: "a boolean",
        }),
    }
}
