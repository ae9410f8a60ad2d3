//! Conversation Cart Library
//!
//! Backend for a conversational food-ordering assistant: one cart per
//! conversation, CRUD over its items, and optional enrichment from a local
//! language model.

// Domain modules
pub mod ai;
pub mod cart;

// Infrastructure
pub mod config;
pub mod error;
pub mod router;
