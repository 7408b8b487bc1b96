//! Language model integration
//!
//! Provides traits and an OpenAI-compatible HTTP implementation for:
//! - Chat completions (classification, answering, analysis)
//! - Embedding generation for the vector store

mod client;
mod traits;

pub use client::{HttpLlmClient, MetricsSnapshot};
pub use traits::*;
