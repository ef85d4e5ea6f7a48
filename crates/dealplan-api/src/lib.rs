//! Dealplan API Library
//!
//! HTTP handlers, the DSP generation pipeline and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use error::ErrorResponse;
pub use setup::routes::setup_routes;
