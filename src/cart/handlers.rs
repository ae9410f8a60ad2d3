//! REST API handlers for cart operations
//!
//! Each mutating handler commits to the store first. AI enrichment, when it
//! applies, runs afterwards and can only add fields to the response.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};

use super::{helpers::format_item_summary, models::*, state::SharedState};
use crate::error::{CartError, Result};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/cart/:conversation_id",
            get(get_cart).post(create_cart).delete(delete_cart),
        )
        .route(
            "/cart/:conversation_id/items",
            post(add_item).delete(clear_cart),
        )
        .route(
            "/cart/:conversation_id/items/:item_id",
            get(get_item).put(update_item).delete(remove_item),
        )
        .route("/cart/:conversation_id/order", post(place_order))
        .route("/cart/:conversation_id/suggestions", post(suggest_items))
}

/// Endpoint: GET /cart/{conversation_id}
async fn get_cart(
    State(state): State<SharedState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .store
        .get(&conversation_id)
        .ok_or_else(|| CartError::cart_not_found(&conversation_id))?;
    Ok(Json(cart.into()))
}

/// Endpoint: POST /cart/{conversation_id}
async fn create_cart(
    State(state): State<SharedState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state.store.create(&conversation_id)?;
    Ok(Json(cart.into()))
}

/// Endpoint: DELETE /cart/{conversation_id}
async fn delete_cart(
    State(state): State<SharedState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state.store.delete(&conversation_id)?;
    Ok(Json(cart.into()))
}

/// Endpoint: POST /cart/{conversation_id}/items
/// Appends an item; instructions, if any, are analysed after the commit.
async fn add_item(
    State(state): State<SharedState>,
    Path(conversation_id): Path<String>,
    body: std::result::Result<Json<CartItem>, JsonRejection>,
) -> Result<Json<CartResponse>> {
    let Json(item) = body?;
    let instructions = item.instructions_text().map(str::to_string);

    let cart = state.store.add_item(&conversation_id, item)?;
    let mut response = CartResponse::from(cart);

    if let Some(text) = instructions {
        let outcome = state
            .enrich(move |ai| async move { ai.process_instructions(&text).await })
            .await;
        match outcome {
            Some(Ok(analysis)) => response.enrichment.instruction_analysis = Some(analysis),
            Some(Err(e)) => response.enrichment.ai_error = Some(e.to_string()),
            None => {}
        }
    }

    Ok(Json(response))
}

/// Endpoint: DELETE /cart/{conversation_id}/items
async fn clear_cart(
    State(state): State<SharedState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state.store.clear(&conversation_id)?;
    Ok(Json(cart.into()))
}

/// Endpoint: GET /cart/{conversation_id}/items/{item_id}
async fn get_item(
    State(state): State<SharedState>,
    Path((conversation_id, item_id)): Path<(String, String)>,
) -> Result<Json<CartResponse>> {
    let cart = state.store.get_with_item(&conversation_id, &item_id)?;
    Ok(Json(cart.into()))
}

/// Endpoint: PUT /cart/{conversation_id}/items/{item_id}
async fn update_item(
    State(state): State<SharedState>,
    Path((conversation_id, item_id)): Path<(String, String)>,
    body: std::result::Result<Json<CartItem>, JsonRejection>,
) -> Result<Json<CartResponse>> {
    let Json(item) = body?;
    let cart = state.store.update_item(&conversation_id, &item_id, item)?;
    Ok(Json(cart.into()))
}

/// Endpoint: DELETE /cart/{conversation_id}/items/{item_id}
async fn remove_item(
    State(state): State<SharedState>,
    Path((conversation_id, item_id)): Path<(String, String)>,
) -> Result<Json<CartResponse>> {
    let cart = state.store.remove_item(&conversation_id, &item_id)?;
    Ok(Json(cart.into()))
}

/// Endpoint: POST /cart/{conversation_id}/order
/// Places the order and attaches a best-effort summary. The cart is kept.
async fn place_order(
    State(state): State<SharedState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<CartResponse>> {
    let cart = state
        .store
        .get(&conversation_id)
        .ok_or_else(|| CartError::cart_not_found(&conversation_id))?;

    tracing::info!(
        conversation_id = %conversation_id,
        items = %format_item_summary(&cart.items),
        "order placed"
    );

    let snapshot = cart.clone();
    let outcome = state
        .enrich(move |ai| async move { ai.summarize_order(&snapshot).await })
        .await;

    let mut response = CartResponse::from(cart);
    match outcome {
        Some(Ok(summary)) => response.enrichment.order_summary = Some(summary),
        Some(Err(e)) => response.enrichment.ai_error = Some(e.to_string()),
        None => {}
    }
    Ok(Json(response))
}

/// Endpoint: POST /cart/{conversation_id}/suggestions
/// Read-only, so an AI failure is reported as the request's error.
async fn suggest_items(
    State(state): State<SharedState>,
    Path(conversation_id): Path<String>,
    body: std::result::Result<Json<SuggestionsInput>, JsonRejection>,
) -> Result<Json<SuggestionsResponse>> {
    let Json(input) = body?;
    let cart = state
        .store
        .get(&conversation_id)
        .ok_or_else(|| CartError::cart_not_found(&conversation_id))?;

    let items = cart.items;
    let preferences = input.preferences;
    let suggestions = state
        .enrich(move |ai| async move { ai.suggest_items(&items, &preferences).await })
        .await
        .ok_or_else(|| CartError::from(crate::ai::AiError::Disabled))??;

    Ok(Json(SuggestionsResponse {
        success: true,
        conversation_id,
        suggestions,
    }))
}
