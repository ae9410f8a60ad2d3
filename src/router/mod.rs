//! Routing module for the conversation cart service

use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::cart::{models::HealthResponse, state::SharedState};

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: one span per request, non-success statuses logged
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        let request_id = Uuid::new_v4().simple().to_string();
        let span = tracing::info_span!(
            "request",
            id = %request_id,
            method = %req.method(),
            uri = %req.uri()
        );

        async move {
            tracing::debug!("request received");
            let res = next.run(req).await;
            if res.status().is_success() {
                tracing::debug!(status = %res.status(), "request completed");
            } else {
                tracing::info!(status = %res.status(), "request completed with error");
            }
            res
        }
        .instrument(span)
        .await
    });

    let cors_layer = cors_layer(&state.settings.cors_origins);

    let base_path = state.settings.api_base_path();
    let api = if base_path.is_empty() {
        crate::cart::routes()
    } else {
        Router::new().nest(&base_path, crate::cart::routes())
    };

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(log_layer)
        .layer(cors_layer)
        .with_state(state)
}

/// Endpoint: GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
