use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default lifetime of tokens minted by [`JwtAuth::issue_token`].
pub const ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes

/// Claims read from a verified token.
///
/// `sub` is the opaque owner identity assigned by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// HS256 verifier shared by every request.
#[derive(Clone)]
pub struct JwtAuth {
    inner: Arc<JwtAuthInner>,
}

struct JwtAuthInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        tracing::info!(
            issuer = config.issuer.as_deref(),
            audience = config.audience.as_deref(),
            "JWT auth initialized"
        );

        Self {
            inner: Arc::new(JwtAuthInner {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
                validation,
                issuer: config.issuer.clone(),
                audience: config.audience.clone(),
            }),
        }
    }

    /// Verify the signature and registered claims, returning the decoded claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(token, &self.inner.decoding, &self.inner.validation)?;
        Ok(token_data.claims)
    }

    /// Mint a token for `subject`. Used by local tooling and tests; production
    /// tokens come from the identity provider.
    pub fn issue_token(&self, subject: &str, ttl_seconds: i64) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: subject.to_string(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            iss: self.inner.issuer.clone(),
            aud: self.inner.audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.inner.encoding,
        )?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters";

    #[test]
    fn test_issue_and_verify_round_trip() {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET));
        let token = auth.issue_token("user_2abc", ACCESS_TOKEN_TTL).unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user_2abc");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_rejects_token_signed_with_other_secret() {
        let issuer = JwtAuth::new(&JwtConfig::new("another-secret-that-is-at-least-32-chars"));
        let verifier = JwtAuth::new(&JwtConfig::new(SECRET));

        let token = issuer.issue_token("user_2abc", ACCESS_TOKEN_TTL).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET));
        let token = auth.issue_token("user_2abc", -3600).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_issuer_is_enforced() {
        let expected_config = JwtConfig::new(SECRET).with_issuer("https://id.example.com");
        let other_config = JwtConfig::new(SECRET).with_issuer("https://evil.example.com");
        let expected = JwtAuth::new(&expected_config);
        let other = JwtAuth::new(&other_config);

        let good = expected.issue_token("u1", ACCESS_TOKEN_TTL).unwrap();
        let bad = other.issue_token("u1", ACCESS_TOKEN_TTL).unwrap();

        assert!(expected.verify_token(&good).is_ok());
        assert!(expected.verify_token(&bad).is_err());
    }
}
