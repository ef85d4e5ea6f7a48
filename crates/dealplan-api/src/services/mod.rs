//! Business services used by the handlers

pub mod dsp;
pub mod webhook;

pub use dsp::{DspGenerator, GeneratedDsp, GenerationSettings};
pub use webhook::WebhookClient;
