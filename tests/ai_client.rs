//! Integration tests for the Ollama client
//!
//! A small axum server stands in for Ollama on an ephemeral port, so the
//! real HTTP path (request shape, status handling, timeouts) is exercised.

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::time::Duration;

use conversation_cart::ai::{AiError, AiService, OllamaClient, OllamaConfig};
use conversation_cart::cart::models::{Cart, CartItem};

/// Replies based on the prompt, mimicking `/api/generate` with `stream: false`
async fn fake_generate(Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
    assert_eq!(request["stream"], false);
    assert_eq!(request["model"], "test-model");
    assert_eq!(request["options"]["num_predict"], 64);

    let prompt = request["prompt"].as_str().unwrap_or_default();
    if prompt.contains("CRASH") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })));
    }
    if prompt.contains("SLOW") {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }

    let response = if prompt.contains("Analyze the following food order instructions") {
        assert_eq!(request["format"], "json");
        if prompt.contains("GARBAGE") {
            "I could not understand that".to_string()
        } else {
            json!({
                "spice_level": "mild",
                "allergies": ["peanuts"],
                "preferences": "vegetarian",
                "special_requests": []
            })
            .to_string()
        }
    } else if prompt.contains("Create a natural language summary") {
        assert!(request.get("format").is_none());
        "  Two burgers, no onions.  ".to_string()
    } else {
        json!({ "items": ["fries", "milkshake"] }).to_string()
    };

    (StatusCode::OK, Json(json!({ "response": response, "done": true })))
}

async fn spawn_fake_ollama() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/api/generate", post(fake_generate));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/", addr)
}

fn client_for(base_url: String, timeout: Duration) -> OllamaClient {
    OllamaClient::new(OllamaConfig {
        base_url,
        model: "test-model".to_string(),
        temperature: 0.2,
        max_tokens: 64,
        timeout,
    })
    .unwrap()
}

#[tokio::test]
async fn test_process_instructions() {
    let client = client_for(spawn_fake_ollama().await, Duration::from_secs(5));

    let analysis = client.process_instructions("mild please").await.unwrap();

    assert_eq!(analysis.spice_level.as_deref(), Some("mild"));
    assert_eq!(analysis.allergies, vec!["peanuts".to_string()]);
    assert_eq!(analysis.preferences, vec!["vegetarian".to_string()]);
    assert!(analysis.special_requests.is_empty());
}

#[tokio::test]
async fn test_unparsable_output_is_a_parse_error() {
    let client = client_for(spawn_fake_ollama().await, Duration::from_secs(5));

    let err = client.process_instructions("GARBAGE").await.unwrap_err();
    assert!(matches!(err, AiError::Parse(_)));
}

#[tokio::test]
async fn test_summarize_order_trims_text() {
    let client = client_for(spawn_fake_ollama().await, Duration::from_secs(5));

    let mut cart = Cart::new("c1");
    cart.items.push(CartItem::new("burger", 2).with_instructions("no onions"));

    let summary = client.summarize_order(&cart).await.unwrap();
    assert_eq!(summary, "Two burgers, no onions.");
}

#[tokio::test]
async fn test_suggest_items() {
    let client = client_for(spawn_fake_ollama().await, Duration::from_secs(5));

    let ids = client
        .suggest_items(&[CartItem::new("burger", 1)], &["sweet".to_string()])
        .await
        .unwrap();
    assert_eq!(ids, vec!["fries".to_string(), "milkshake".to_string()]);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let client = client_for(spawn_fake_ollama().await, Duration::from_secs(5));

    let err = client.process_instructions("CRASH").await.unwrap_err();
    assert!(matches!(err, AiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_request_timeout() {
    let client = client_for(spawn_fake_ollama().await, Duration::from_millis(200));

    let err = client.process_instructions("SLOW").await.unwrap_err();
    assert_eq!(err, AiError::Timeout);
}

#[tokio::test]
async fn test_unreachable_service() {
    // Port 9 (discard) is closed on test machines
    let client = client_for("http://127.0.0.1:9".to_string(), Duration::from_secs(2));

    let err = client.process_instructions("anything").await.unwrap_err();
    assert!(matches!(err, AiError::Transport(_) | AiError::Timeout));
}
