//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// How the binary hosts the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Widget HTTP API.
    Serve,
    /// Local stdin/stdout REPL.
    Cli,
}

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistConfig {
    /// Base URL of the chatbot backend, e.g. `https://host/api/chatbot`.
    pub api_base: String,
    /// Validity window of an issued OTP.
    pub otp_ttl: Duration,
    /// Failed attempts allowed for cédula and OTP entry before restarting.
    pub max_attempts: u32,
    /// Per-request timeout for backend calls.
    pub http_timeout: Duration,
    /// Widget sessions untouched for this long are dropped.
    pub session_idle: Duration,
    /// Port for the widget API.
    pub port: u16,
    /// Origins allowed to embed the widget. Empty means any origin.
    pub cors_origins: Vec<String>,
    pub mode: RunMode,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000/api/chatbot".to_string(),
            otp_ttl: Duration::from_secs(600), // 10 minutes
            max_attempts: 3,
            http_timeout: Duration::from_secs(10),
            session_idle: Duration::from_secs(1800), // 30 minutes
            port: 8080,
            cors_origins: Vec::new(),
            mode: RunMode::Serve,
        }
    }
}

impl AssistConfig {
    /// Load from `CAMPUS_ASSIST_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base = lookup("CAMPUS_ASSIST_API_BASE")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_base);

        let otp_ttl_secs = positive_secs(&lookup, "CAMPUS_ASSIST_OTP_TTL_SECS", defaults.otp_ttl)?;

        let max_attempts: u32 =
            parse_var(&lookup, "CAMPUS_ASSIST_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CAMPUS_ASSIST_MAX_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let http_timeout_secs =
            positive_secs(&lookup, "CAMPUS_ASSIST_HTTP_TIMEOUT_SECS", defaults.http_timeout)?;
        let session_idle_secs =
            positive_secs(&lookup, "CAMPUS_ASSIST_SESSION_IDLE_SECS", defaults.session_idle)?;

        let port: u16 = parse_var(&lookup, "CAMPUS_ASSIST_PORT")?.unwrap_or(defaults.port);

        let cors_origins: Vec<String> = lookup("CAMPUS_ASSIST_CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let mode = match lookup("CAMPUS_ASSIST_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("serve") => RunMode::Serve,
            Some("cli") => RunMode::Cli,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "CAMPUS_ASSIST_MODE".to_string(),
                    message: format!("expected 'serve' or 'cli', got '{other}'"),
                });
            }
        };

        Ok(Self {
            api_base,
            otp_ttl: Duration::from_secs(otp_ttl_secs),
            max_attempts,
            http_timeout: Duration::from_secs(http_timeout_secs),
            session_idle: Duration::from_secs(session_idle_secs),
            port,
            cors_origins,
            mode,
        })
    }
}

/// A whole number of seconds that must not be zero.
fn positive_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_var(lookup, key)?.unwrap_or(default.as_secs());
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(secs)
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{raw}': {e}"),
            }),
    }
}
