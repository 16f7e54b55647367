//! Tracing initialization
//!
//! Console logging through `tracing-subscriber`, compact or JSON.

mod init_basic;

pub use init_basic::{init_telemetry, shutdown_telemetry, LogFormat};
