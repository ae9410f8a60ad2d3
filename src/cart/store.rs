//! In-memory cart store
//!
//! `CartStore` is the only owner of carts. It is backed by a `DashMap`, so
//! each operation holds the shard lock of its conversation for the whole
//! read-modify-write and operations on other conversations proceed in
//! parallel. Callers always receive a snapshot (`Cart` clone), never a guard,
//! so no lock outlives the call.

use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};

use super::models::{Cart, CartItem, CartLimits};
use crate::error::{CartError, Result};

#[derive(Debug, Default)]
pub struct CartStore {
    carts: DashMap<String, Cart>,
    limits: CartLimits,
}

impl CartStore {
    pub fn new(limits: CartLimits) -> Self {
        Self {
            carts: DashMap::new(),
            limits,
        }
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    pub fn get(&self, conversation_id: &str) -> Option<Cart> {
        self.carts.get(conversation_id).map(|c| c.value().clone())
    }

    /// Returns the cart only if it holds an item with `item_id`.
    pub fn get_with_item(&self, conversation_id: &str, item_id: &str) -> Result<Cart> {
        let cart = self
            .carts
            .get(conversation_id)
            .ok_or_else(|| CartError::cart_not_found(conversation_id))?;

        if cart.find_item(item_id).is_none() {
            return Err(CartError::item_not_found(item_id));
        }
        Ok(cart.value().clone())
    }

    pub fn create(&self, conversation_id: &str) -> Result<Cart> {
        match self.carts.entry(conversation_id.to_string()) {
            Entry::Occupied(_) => Err(CartError::AlreadyExists(
                "Cart already exists for this conversation".into(),
            )),
            Entry::Vacant(slot) => {
                let cart = Cart::new(conversation_id);
                slot.insert(cart.clone());
                tracing::debug!(conversation_id, "cart created");
                Ok(cart)
            }
        }
    }

    /// Appends `item`, creating the cart on first use. Items sharing an
    /// `item_id` are kept as separate entries.
    pub fn add_item(&self, conversation_id: &str, item: CartItem) -> Result<Cart> {
        item.validate(&self.limits)?;

        let mut cart = self
            .carts
            .entry(conversation_id.to_string())
            .or_insert_with(|| Cart::new(conversation_id));

        if cart.items.len() >= self.limits.max_items {
            return Err(CartError::Validation(format!(
                "Maximum {} items allowed in cart",
                self.limits.max_items
            )));
        }

        tracing::debug!(conversation_id, item_id = %item.item_id, "item added");
        cart.items.push(item);
        cart.touch();
        Ok(cart.value().clone())
    }

    /// Replaces the first item matching `item_id`, keeping its position.
    pub fn update_item(&self, conversation_id: &str, item_id: &str, item: CartItem) -> Result<Cart> {
        item.validate(&self.limits)?;

        let mut cart = self
            .carts
            .get_mut(conversation_id)
            .ok_or_else(|| CartError::cart_not_found(conversation_id))?;

        let slot = cart
            .items
            .iter_mut()
            .find(|i| i.item_id == item_id)
            .ok_or_else(|| CartError::item_not_found(item_id))?;
        *slot = item;
        cart.touch();

        tracing::debug!(conversation_id, item_id, "item updated");
        Ok(cart.value().clone())
    }

    /// Removes every item matching `item_id`. A cart without a match keeps
    /// its items but still counts as touched.
    pub fn remove_item(&self, conversation_id: &str, item_id: &str) -> Result<Cart> {
        let mut cart = self
            .carts
            .get_mut(conversation_id)
            .ok_or_else(|| CartError::cart_not_found(conversation_id))?;

        let before = cart.items.len();
        cart.items.retain(|i| i.item_id != item_id);
        let removed = before - cart.items.len();
        cart.touch();

        tracing::debug!(conversation_id, item_id, removed, "item removed");
        Ok(cart.value().clone())
    }

    pub fn clear(&self, conversation_id: &str) -> Result<Cart> {
        let mut cart = self
            .carts
            .get_mut(conversation_id)
            .ok_or_else(|| CartError::cart_not_found(conversation_id))?;

        cart.items.clear();
        cart.touch();

        tracing::debug!(conversation_id, "cart cleared");
        Ok(cart.value().clone())
    }

    pub fn delete(&self, conversation_id: &str) -> Result<Cart> {
        let (_, cart) = self
            .carts
            .remove(conversation_id)
            .ok_or_else(|| CartError::cart_not_found(conversation_id))?;

        tracing::debug!(conversation_id, "cart deleted");
        Ok(cart)
    }

    /// Drops every cart whose last update is at least `max_age` before `now`.
    /// Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let before = self.carts.len();
        self.carts
            .retain(|_, cart| now.signed_duration_since(cart.updated_at) < max_age);
        before.saturating_sub(self.carts.len())
    }

    /// Empties the store; used on shutdown.
    pub fn drain(&self) -> usize {
        let count = self.carts.len();
        self.carts.clear();
        count
    }
}
