//! All AI/LLM functionality

pub mod client;
pub mod responder;

// Re-export main types for convenience
pub use client::{BedrockClient, LlmBackend, ModelRequest};
pub use responder::{AI_ERROR_PREFIX, AiResponder, ModelSettings};
