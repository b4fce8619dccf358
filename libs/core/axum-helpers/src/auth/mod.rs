//! Bearer-token authentication.
//!
//! Tokens are issued by an external identity provider and signed with a
//! shared HS256 secret. The middleware verifies them and stores the claims in
//! the request extensions; handlers read the caller through [`AuthUser`].
//!
//! ```ignore
//! use axum_helpers::auth::{AuthUser, JwtAuth, JwtConfig, jwt_auth_middleware};
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/me", get(|AuthUser(user): AuthUser| async move { user }))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use extractor::AuthUser;
pub use jwt::{ACCESS_TOKEN_TTL, JwtAuth, JwtClaims};
pub use middleware::jwt_auth_middleware;
