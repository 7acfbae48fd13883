//! Runtime configuration, read from the environment (and `.env` outside tests).

use std::net::SocketAddr;
use std::path::PathBuf;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me",
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "jwt-secret-key",
];

/// Ten years.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for the environment variable {0}: {1}")]
    Invalid(&'static str, String),
    #[error("{0} is still a placeholder; set a random secret")]
    Placeholder(&'static str),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Keep tests hermetic
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("WAYPOINT_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or("WAYPOINT_PORT", lookup("WAYPOINT_PORT"), 5000)?;
        let bind_address = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid("WAYPOINT_HOST", e.to_string()))?;

        let jwt_secret = lookup("WAYPOINT_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("WAYPOINT_JWT_SECRET"))?;
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::Placeholder("WAYPOINT_JWT_SECRET"));
        }

        let token_ttl_hours: i64 =
            parse_or("WAYPOINT_TOKEN_TTL_HOURS", lookup("WAYPOINT_TOKEN_TTL_HOURS"), 720)?;
        let token_ttl = (1..=MAX_TOKEN_TTL_HOURS)
            .contains(&token_ttl_hours)
            .then(|| chrono::Duration::try_hours(token_ttl_hours))
            .flatten()
            .ok_or_else(|| {
                ConfigError::Invalid(
                    "WAYPOINT_TOKEN_TTL_HOURS",
                    format!("must be between 1 and {}", MAX_TOKEN_TTL_HOURS),
                )
            })?;

        Ok(Self {
            bind_address,
            db_path: lookup("WAYPOINT_DB_PATH")
                .unwrap_or_else(|| "waypoint.db".into())
                .into(),
            upload_dir: lookup("WAYPOINT_UPLOAD_DIR")
                .unwrap_or_else(|| "./uploads".into())
                .into(),
            jwt_secret,
            token_ttl,
            max_upload_bytes: parse_or(
                "WAYPOINT_MAX_UPLOAD_BYTES",
                lookup("WAYPOINT_MAX_UPLOAD_BYTES"),
                16 * 1024 * 1024,
            )?,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(key, e.to_string())),
    }
}
