//! Operation-level audit logging.
//!
//! Emits structured events for data-modifying operations (creates,
//! deletes, bulk actions) to the `audit` tracing target. When the file
//! log layer is configured, these lines land in the append-only
//! diagnostic log together with the rest of the output; a failing log
//! sink never fails the triggering operation.
//!
//! # Example
//! ```ignore
//! AuditEvent::new("blog.create", Some(format!("blog:{}", blog.id)), AuditOutcome::Success)
//!     .with_ip(extract_ip_from_headers(&headers))
//!     .log();
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of an audited action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// Action completed successfully
    Success,
    /// Action failed or partially failed
    Failure,
}

/// Structured audit event.
///
/// There is no authenticated principal in this service, so events carry
/// the caller IP (when derivable from proxy headers) instead of a user
/// identity.
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// Action performed (e.g. "blog.create", "blog.delete_all")
    pub action: String,
    /// Resource affected (e.g. "blog:0195f7a8-...")
    pub resource: Option<String>,
    /// Outcome of the action
    pub outcome: AuditOutcome,
    /// Client IP address, from proxy headers when present
    pub ip_address: Option<String>,
    /// Timestamp when the event occurred
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    /// Additional details about the event (JSON)
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, resource: Option<String>, outcome: AuditOutcome) -> Self {
        Self {
            action: action.into(),
            resource,
            outcome,
            ip_address: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    /// Attach the caller IP.
    pub fn with_ip(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }

    /// Attach additional detail, serialized to JSON.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Emit the event to the `audit` tracing target.
    pub fn log(self) {
        tracing::info!(
            target: "audit",
            action = %self.action,
            resource = self.resource,
            outcome = ?self.outcome,
            ip = self.ip_address,
            details = ?self.details,
            "{}",
            serde_json::to_string(&self)
                .unwrap_or_else(|_| "Failed to serialize audit event".to_string())
        );
    }
}

/// Extract the client IP address from HTTP headers.
///
/// Checks X-Forwarded-For (first entry) and X-Real-IP, for deployments
/// behind a proxy or load balancer. Returns None when neither is set.
pub fn extract_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1, 10.0.0.2".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());

        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_extract_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());

        assert_eq!(extract_ip_from_headers(&headers).as_deref(), Some("10.0.0.9"));
    }

    #[test]
    fn test_extract_ip_absent() {
        assert_eq!(extract_ip_from_headers(&HeaderMap::new()), None);
    }
}
