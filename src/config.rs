//! Configuration loading from environment variables.
//!
//! Process-wide settings read once at startup and treated as read-only for
//! the lifetime of the worker:
//!
//! - `BASE_URL` - base path prepended to every route pattern (no trailing
//!   slash)
//! - `APP_DEBUG` - include failure details in error output

use std::fmt;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Invalid value for environment variable.
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Framework configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Base path prepended to every route pattern.
    pub base_url: Option<String>,
    /// Whether failure reports include error details.
    pub debug: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("BASE_URL").ok().filter(|s| !s.is_empty());
        if let Some(ref base) = base_url {
            if base != "/" && base.ends_with('/') {
                return Err(ConfigError::Invalid {
                    key: "BASE_URL".to_string(),
                    message: "must not end with a trailing slash".to_string(),
                });
            }
        }

        let debug = match std::env::var("APP_DEBUG") {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Parse {
                key: "APP_DEBUG".to_string(),
                value: raw.clone(),
                error: "expected a boolean".to_string(),
            })?,
            Err(_) => false,
        };

        Ok(Self { base_url, debug })
    }
}

/// Parse common boolean spellings.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool(""), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_config_defaults() {
        std::env::remove_var("BASE_URL");
        std::env::remove_var("APP_DEBUG");

        let config = Config::from_env().expect("should load config");
        assert!(config.base_url.is_none());
        assert!(!config.debug);
    }
}
