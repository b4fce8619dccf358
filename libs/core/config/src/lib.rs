pub mod app;
pub mod server;
pub mod tracing;

pub use app::AppInfo;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },

    #[error("Invalid configuration for '{key}': {details}")]
    Invalid { key: String, details: String },
}

/// Application environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load a required environment variable.
///
/// Blank values count as missing so that `KEY=` in a compose file still fails fast.
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Helper to load an optional environment variable, treating blank values as unset
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an environment variable into `T`, falling back to `default` when unset
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::ParseError {
                key: key.to_string(),
                details: e.to_string(),
            }),
        None => Ok(default),
    }
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn env_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = env_optional(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });

        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_required_rejects_blank_values() {
        temp_env::with_var("NOTES_REQUIRED_BLANK", Some("   "), || {
            let err = env_required("NOTES_REQUIRED_BLANK").unwrap_err();
            assert!(err.to_string().contains("NOTES_REQUIRED_BLANK"));
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("NOTES_REQUIRED_MISSING", || {
            let err = env_required("NOTES_REQUIRED_MISSING").unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(_)));
        });
    }

    #[test]
    fn test_env_parse_default_and_value() {
        temp_env::with_var_unset("NOTES_PARSE_UNSET", || {
            assert_eq!(env_parse("NOTES_PARSE_UNSET", 7u32).unwrap(), 7);
        });

        temp_env::with_var("NOTES_PARSE_SET", Some(" 42 "), || {
            assert_eq!(env_parse("NOTES_PARSE_SET", 7u32).unwrap(), 42);
        });
    }

    #[test]
    fn test_env_parse_invalid() {
        temp_env::with_var("NOTES_PARSE_BAD", Some("forty"), || {
            let err = env_parse::<u32>("NOTES_PARSE_BAD", 1).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
        });
    }

    #[test]
    fn test_env_flag_variants() {
        temp_env::with_var("NOTES_FLAG", Some("off"), || {
            assert!(!env_flag("NOTES_FLAG", true).unwrap());
        });

        temp_env::with_var("NOTES_FLAG", Some("YES"), || {
            assert!(env_flag("NOTES_FLAG", false).unwrap());
        });

        temp_env::with_var_unset("NOTES_FLAG", || {
            assert!(env_flag("NOTES_FLAG", true).unwrap());
        });

        temp_env::with_var("NOTES_FLAG", Some("maybe"), || {
            assert!(env_flag("NOTES_FLAG", true).is_err());
        });
    }
}
