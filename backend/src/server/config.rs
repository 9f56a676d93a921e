//! Server configuration parsing and validation.
//!
//! Centralises the environment-driven settings so they are validated
//! consistently and can be tested in isolation against a mock environment.

use std::net::SocketAddr;
use std::time::Duration;

use mockable::Env;
use tracing::warn;

use crate::domain::CancellationPolicy;

const BIND_ADDR_ENV: &str = "BIND_ADDR";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const JWT_SECRET_ENV: &str = "JWT_SECRET";
const COOKIE_SECURE_ENV: &str = "COOKIE_SECURE";
const CANCEL_AFTER_START_ENV: &str = "CANCEL_AFTER_START";
const SEED_DEMO_COURSES_ENV: &str = "SEED_DEMO_COURSES";
const DB_POOL_SIZE_ENV: &str = "DB_POOL_SIZE";
const DB_CONNECT_TIMEOUT_ENV: &str = "DB_CONNECT_TIMEOUT_SECS";

const BIND_ADDR_DEFAULT: &str = "0.0.0.0:8080";
const JWT_SECRET_MIN_LEN: usize = 32;
const DB_POOL_SIZE_DEFAULT: u32 = 10;
const DB_CONNECT_TIMEOUT_DEFAULT: Duration = Duration::from_secs(30);
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for configuration validation.
///
/// Debug builds tolerate missing toggles with warnings; release builds
/// require explicit, valid values for the security-sensitive ones.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating server configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The JWT secret is too short for release builds.
    #[error("JWT_SECRET too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum number of pooled database connections.
    pub db_pool_size: u32,
    /// How long a request may wait for a pooled connection.
    pub db_connect_timeout: Duration,
    /// Shared secret signing the HS256 bearer tokens.
    pub jwt_secret: String,
    /// Whether the login cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// Whether users may cancel an enrollment after the course has started.
    pub cancellation: CancellationPolicy,
    /// Whether to seed the demo course catalogue at startup.
    pub seed_demo_courses: bool,
}

impl ServerConfig {
    /// Build server settings from environment variables and build mode.
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: bind_addr_from_env(env)?,
            database_url: required(env, DATABASE_URL_ENV)?,
            db_pool_size: pool_size_from_env(env)?,
            db_connect_timeout: connect_timeout_from_env(env)?,
            jwt_secret: jwt_secret_from_env(env, mode)?,
            cookie_secure: bool_from_env(env, COOKIE_SECURE_ENV, mode, !mode.is_debug())?,
            cancellation: if bool_from_env(env, CANCEL_AFTER_START_ENV, BuildMode::Debug, false)? {
                CancellationPolicy::AllowAfterStart
            } else {
                CancellationPolicy::BlockAfterStart
            },
            seed_demo_courses: bool_from_env(env, SEED_DEMO_COURSES_ENV, BuildMode::Debug, false)?,
        })
    }
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, ConfigError> {
    env.string(name).ok_or(ConfigError::MissingEnv { name })
}

fn bind_addr_from_env<E: Env>(env: &E) -> Result<SocketAddr, ConfigError> {
    let raw = env
        .string(BIND_ADDR_ENV)
        .unwrap_or_else(|| BIND_ADDR_DEFAULT.to_owned());
    raw.parse().map_err(|_| ConfigError::InvalidEnv {
        name: BIND_ADDR_ENV,
        value: raw,
        expected: "host:port",
    })
}

fn pool_size_from_env<E: Env>(env: &E) -> Result<u32, ConfigError> {
    let Some(raw) = env.string(DB_POOL_SIZE_ENV) else {
        return Ok(DB_POOL_SIZE_DEFAULT);
    };
    match raw.parse::<u32>() {
        Ok(size) if size >= 1 => Ok(size),
        _ => Err(ConfigError::InvalidEnv {
            name: DB_POOL_SIZE_ENV,
            value: raw,
            expected: "an integer >= 1",
        }),
    }
}

fn connect_timeout_from_env<E: Env>(env: &E) -> Result<Duration, ConfigError> {
    let Some(raw) = env.string(DB_CONNECT_TIMEOUT_ENV) else {
        return Ok(DB_CONNECT_TIMEOUT_DEFAULT);
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs >= 1 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidEnv {
            name: DB_CONNECT_TIMEOUT_ENV,
            value: raw,
            expected: "a number of seconds >= 1",
        }),
    }
}

fn jwt_secret_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<String, ConfigError> {
    match env.string(JWT_SECRET_ENV) {
        Some(secret) => {
            if !mode.is_debug() && secret.len() < JWT_SECRET_MIN_LEN {
                return Err(ConfigError::SecretTooShort {
                    length: secret.len(),
                    min_len: JWT_SECRET_MIN_LEN,
                });
            }
            Ok(secret)
        }
        None => {
            if mode.is_debug() {
                warn!("JWT_SECRET not set; using an insecure development secret");
                Ok("insecure-development-secret-do-not-deploy".to_owned())
            } else {
                Err(ConfigError::MissingEnv {
                    name: JWT_SECRET_ENV,
                })
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn bool_from_env<E: Env>(
    env: &E,
    name: &'static str,
    mode: BuildMode,
    default: bool,
) -> Result<bool, ConfigError> {
    match env.string(name) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None if mode.is_debug() => {
                warn!(name, value = %value, "invalid boolean toggle; using default");
                Ok(default)
            }
            None => Err(ConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            }),
        },
        None => Ok(default),
    }
}
