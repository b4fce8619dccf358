//! Audit logging for note mutations and denied access.
//!
//! Events go to the `audit` tracing target so they can be routed separately.
//!
//! ```ignore
//! AuditEvent::new(Some(user_id), "note.delete", Some(format!("note:{id}")), AuditOutcome::Denied)
//!     .with_ip(extract_ip_from_headers(&headers))
//!     .log();
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    /// Rejected by an ownership or authentication check
    Denied,
}

/// Structured audit event, built with the `with_*` methods and emitted with `log`.
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    pub user_id: Option<String>,
    /// Action identifier, e.g. `note.create`
    pub action: String,
    /// Resource identifier, e.g. `note:0190…`
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        user_id: Option<String>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Request metadata shortcut: client IP and user agent from headers.
    pub fn with_request(self, headers: &HeaderMap) -> Self {
        self.with_ip(extract_ip_from_headers(headers))
            .with_user_agent(extract_user_agent(headers))
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            user_id = self.user_id,
            action = %self.action,
            resource = self.resource,
            outcome = ?self.outcome,
            ip = self.ip_address,
            user_agent = self.user_agent,
            timestamp = %self.timestamp,
            details = ?self.details,
            "audit event"
        );
    }
}

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
