//! JWT verification settings loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_optional, env_required};

pub const MIN_SECRET_LEN: usize = 32;

/// JWT authentication configuration.
///
/// Environment variables:
/// - `JWT_SECRET` (required): shared HS256 secret, at least 32 characters
/// - `JWT_ISSUER` (optional): expected `iss` claim
/// - `JWT_AUDIENCE` (optional): expected `aud` claim
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl JwtConfig {
    /// Build a config with no issuer or audience checks.
    ///
    /// # Panics
    /// Panics if the secret is shorter than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            issuer: None,
            audience: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                    MIN_SECRET_LEN,
                    secret.len()
                ),
            });
        }

        Ok(Self {
            secret,
            issuer: env_optional("JWT_ISSUER"),
            audience: env_optional("JWT_AUDIENCE"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_ISSUER", Some("https://id.example.com")),
                ("JWT_AUDIENCE", None),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.issuer.as_deref(), Some("https://id.example.com"));
                assert!(config.audience.is_none());
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }
}
