//! Muxboard API Library
//!
//! HTTP handlers for the Mux webhook receiver and the upload/list/delete routes,
//! plus application setup.

mod api_doc;
mod handlers;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
