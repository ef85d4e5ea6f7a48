//! Dealplan AI Library
//!
//! Clients for the external services the DSP pipeline depends on:
//!
//! - [`ChatGateway`]: an OpenAI-compatible `chat/completions` endpoint
//! - [`TextExtractor`]: plain-text extraction from uploaded PDF inputs
//!
//! Both are traits so the pipeline can run against scripted doubles in tests.

pub mod extract;
pub mod gateway;

pub use extract::{ExtractError, TextExtractor};
#[cfg(feature = "pdf")]
pub use extract::PdfTextExtractor;
pub use gateway::{strip_code_fences, ChatGateway, ChatMessage, ChatRole, GatewayError};
#[cfg(feature = "gateway-http")]
pub use gateway::{AiGatewayClient, AiGatewayConfig};
