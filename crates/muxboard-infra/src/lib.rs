//! Muxboard Infrastructure Library
//!
//! This crate provides shared infrastructure components:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - Webhook signature verification

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "webhook")]
pub mod webhook;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};

#[cfg(feature = "webhook")]
pub use webhook::{SignatureError, SignatureHeader, SignatureVerifier};
