//! Muxboard Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the API server, the provider client and the CLI.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    Asset, AssetStatus, AssetStatusRecord, CreateUploadRequest, EventData, InboundEvent,
    Passthrough, PlaybackId, TransitionOutcome, UploadTicket,
};
