//! # Axum Helpers
//!
//! Shared HTTP plumbing for the notes service.
//!
//! - **[`auth`]**: bearer-token verification and the [`AuthUser`] extractor
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: validated JSON and UUID path extractors
//! - **[`audit`]**: audit logging

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{ACCESS_TOKEN_TTL, AuthUser, JwtAuth, JwtClaims, JwtConfig, jwt_auth_middleware};

pub use server::{
    HealthCheckFuture, HealthResponse, ReadyResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
