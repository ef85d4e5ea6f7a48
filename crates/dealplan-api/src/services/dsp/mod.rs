//! Deal Strategy Plan generation
//!
//! `corpus` gathers input text, `prompt` and `attempts` drive the generation
//! service, `render` applies the document templates and `pipeline` ties them
//! to storage and the artifacts table.

pub mod attempts;
pub mod corpus;
pub mod pipeline;
pub mod prompt;
pub mod render;

#[cfg(test)]
pub(crate) mod test_support;

pub use attempts::{GenerationAttempts, RejectionReason, MAX_ATTEMPTS};
pub use pipeline::{DspGenerator, GeneratedDsp, GenerationSettings};
