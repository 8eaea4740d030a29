//! Requirements conversion for the Ralph loop dashboard.
//!
//! Turns a free-form requirements document into a [`ralph_models::Prd`],
//! either through the Anthropic Messages API ([`PrdConverter`]) or by decoding
//! a reply the user pasted from elsewhere ([`prd_from_response`]).

pub mod client;
pub mod converter;
pub mod error;

pub use client::AnthropicClient;
pub use converter::{
    manual_conversion_prompt, prd_from_response, strip_code_fence, PrdConverter,
    CONVERSION_INSTRUCTION,
};
pub use error::{AgentError, Result};
