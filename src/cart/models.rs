//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the conversation cart
//! business domain, along with the field invariants every item must satisfy
//! before the store accepts it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ai::models::InstructionAnalysis;
use crate::error::CartError;

// =============================================================================
// Limits
// =============================================================================

/// Bounds enforced on carts and their items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLimits {
    /// Maximum number of line items in one cart
    pub max_items: usize,
    /// Upper bound of `CartItem::quantity` (lower bound is always 1)
    pub max_item_quantity: u32,
    /// Upper bound of `Modifier::quantity` (lower bound is always 1)
    pub max_modifier_quantity: u32,
    /// Maximum number of modifiers on a single item
    pub max_modifiers: usize,
    /// Maximum length of `CartItem::instructions`, in characters
    pub max_instructions_len: usize,
}

impl Default for CartLimits {
    fn default() -> Self {
        Self {
            max_items: 50,
            max_item_quantity: 12,
            max_modifier_quantity: 10,
            max_modifiers: 10,
            max_instructions_len: 500,
        }
    }
}

// =============================================================================
// Cart Domain Models
// =============================================================================

/// An add-on or customization attached to a line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Modifier {
    pub id: String,
    pub quantity: u32,
}

/// One line item in a cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    /// Identifier of the menu item
    pub item_id: String,

    pub quantity: u32,

    /// Free-text instructions ("no onions, extra spicy")
    #[serde(default, alias = "special_instructions")]
    pub instructions: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub modifiers: Vec<Modifier>,
}

/// Treats an explicit `"modifiers": null` the same as a missing field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Modifier>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Modifier>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CartItem {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            instructions: None,
            modifiers: Vec::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_modifier(mut self, id: impl Into<String>, quantity: u32) -> Self {
        self.modifiers.push(Modifier {
            id: id.into(),
            quantity,
        });
        self
    }

    /// Checks every field invariant of the item against `limits`.
    pub fn validate(&self, limits: &CartLimits) -> Result<(), CartError> {
        if self.item_id.trim().is_empty() {
            return Err(CartError::Validation("item_id must not be empty".into()));
        }

        if !(1..=limits.max_item_quantity).contains(&self.quantity) {
            return Err(CartError::Validation(format!(
                "Item quantity must be between 1 and {}",
                limits.max_item_quantity
            )));
        }

        if let Some(instructions) = &self.instructions {
            if instructions.chars().count() > limits.max_instructions_len {
                return Err(CartError::Validation(format!(
                    "Instructions must be at most {} characters",
                    limits.max_instructions_len
                )));
            }
        }

        if self.modifiers.len() > limits.max_modifiers {
            return Err(CartError::Validation(format!(
                "Maximum {} modifiers allowed per item",
                limits.max_modifiers
            )));
        }

        for modifier in &self.modifiers {
            if modifier.id.trim().is_empty() {
                return Err(CartError::Validation("Modifier id must not be empty".into()));
            }
            if !(1..=limits.max_modifier_quantity).contains(&modifier.quantity) {
                return Err(CartError::Validation(format!(
                    "Modifier quantity must be between 1 and {}",
                    limits.max_modifier_quantity
                )));
            }
        }

        Ok(())
    }

    /// Non-empty instructions, if any.
    pub fn instructions_text(&self) -> Option<&str> {
        self.instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Per-conversation aggregate of ordered line items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    pub conversation_id: String,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: conversation_id.into(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn find_item(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }
}

// =============================================================================
// Request / Response Models
// =============================================================================

/// Successful response body for every cart endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    pub conversation_id: String,
    pub items: Vec<CartItem>,
    pub total_items: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Best-effort AI results merged into the response
    #[serde(flatten)]
    pub enrichment: Enrichment,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            success: true,
            conversation_id: cart.conversation_id,
            total_items: cart.items.len(),
            items: cart.items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
            enrichment: Enrichment::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Enrichment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_analysis: Option<InstructionAnalysis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_summary: Option<String>,

    /// Set when the AI call failed or ran out of time; cart state is unaffected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

/// Input for the suggestions endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsInput {
    #[serde(default)]
    pub preferences: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub success: bool,
    pub conversation_id: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
