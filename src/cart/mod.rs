//! Conversation Cart Domain Module
//!
//! This module contains all cart business logic, including:
//! - Domain models (Modifier, CartItem, Cart, responses) and their limits
//! - The in-memory store and its expiry sweeper
//! - Application state shared with handlers
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;
pub mod store;
pub mod sweeper;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use state::{AppState, SharedState};
pub use store::CartStore;
pub use sweeper::ExpirySweeper;
