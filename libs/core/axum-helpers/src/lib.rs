//! # Axum Helpers
//!
//! Shared HTTP plumbing for the blog platform services.
//!
//! ## Modules
//!
//! - **[`errors`]**: structured error envelope (`AppError`, `ErrorResponse`)
//! - **[`extractors`]**: custom extractors (UUID path, validated JSON)
//! - **[`server`]**: router assembly, health endpoint, graceful shutdown
//! - **[`audit`]**: operation-level audit events with caller IP capture

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod server;

// Re-export error types
pub use errors::{AppError, ErrorResponse};

// Re-export extractors
pub use extractors::{UuidPath, ValidatedJson};

// Re-export server helpers
pub use server::{create_app, create_router, health_router, shutdown_signal};

// Re-export audit types
pub use audit::{extract_ip_from_headers, AuditEvent, AuditOutcome};
