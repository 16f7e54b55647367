pub mod assets;
pub mod mux_webhook;
pub mod uploads;
