//! AI Service Module
//!
//! Best-effort text processing backed by a local language model:
//! - Wire and result models (`models`)
//! - Prompt construction and output parsing (`helpers`)
//! - The Ollama HTTP client (`client`)
//!
//! Handlers only see the `AiService` trait, so tests can swap in a stub.

pub mod client;
pub mod helpers;
pub mod models;

use async_trait::async_trait;
use thiserror::Error;

use crate::cart::models::{Cart, CartItem};

pub use client::{OllamaClient, OllamaConfig};
pub use models::InstructionAnalysis;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("request timed out")]
    Timeout,

    #[error("error connecting to the model service: {0}")]
    Transport(String),

    #[error("model service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not parse model output: {0}")]
    Parse(String),

    #[error("AI service is disabled")]
    Disabled,
}

/// Text-processing collaborator used to enrich cart responses
#[async_trait]
pub trait AiService: Send + Sync {
    /// Extracts structured hints from free-text order instructions
    async fn process_instructions(&self, instructions: &str)
        -> Result<InstructionAnalysis, AiError>;

    /// Writes a natural-language summary of the order
    async fn summarize_order(&self, cart: &Cart) -> Result<String, AiError>;

    /// Proposes item ids that would complement the current order
    async fn suggest_items(
        &self,
        items: &[CartItem],
        preferences: &[String],
    ) -> Result<Vec<String>, AiError>;
}
