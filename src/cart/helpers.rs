//! Shopping Cart Business Logic Helpers
//!
//! This module contains helper functions for cart formatting.

use super::models::CartItem;

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x burger (+1 cheese), 1x fries"`.
pub fn format_item_summary(items: &[CartItem]) -> String {
    if items.is_empty() {
        return "empty".to_string();
    }

    items
        .iter()
        .map(|i| {
            let modifiers = i
                .modifiers
                .iter()
                .map(|m| format!("+{} {}", m.quantity, m.id))
                .collect::<Vec<_>>();
            if modifiers.is_empty() {
                format!("{}x {}", i.quantity, i.item_id)
            } else {
                format!("{}x {} ({})", i.quantity, i.item_id, modifiers.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
