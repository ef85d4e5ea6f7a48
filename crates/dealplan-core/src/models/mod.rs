//! Data models for the application
//!
//! Each sub-module holds the rows, request DTOs and response shapes of one
//! domain entity.

mod artifact;
mod client;
mod dsp;
mod input;
mod opportunity;
mod responsible;
mod webhook;

pub use artifact::*;
pub use client::*;
pub use dsp::*;
pub use input::*;
pub use opportunity::*;
pub use responsible::*;
pub use webhook::*;
