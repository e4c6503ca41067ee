//! Voxrelay API Library
//!
//! HTTP handlers, application state, and setup for the transcription relay.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
