//! Data models for the application
//!
//! Provider assets and uploads, inbound lifecycle events, and the normalized
//! status vocabulary shared by the receiver and the status store.

mod asset;
mod event;
mod status;

pub use asset::*;
pub use event::*;
pub use status::*;
