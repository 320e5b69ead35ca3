//! Provider clients against local stand-ins for the hosted APIs.

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

use folio::config::ProviderConfig;
use folio::provider::{
    create_provider, CompletionProvider, CompletionRequest, ProviderChain, ProviderError,
    ProviderSlot,
};

async fn chat_completions(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != "Bearer good-key" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "invalid api key" } })),
        );
    }
    let messages = body["messages"].as_array().cloned().unwrap_or_default();
    let roles: Vec<String> = messages
        .iter()
        .map(|m| m["role"].as_str().unwrap_or_default().to_string())
        .collect();
    let last = messages
        .last()
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    let model = body["model"].as_str().unwrap_or_default();
    let content = format!("{} via {} [{}]", last, model, roles.join(","));
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": content
                }
            }]
        })),
    )
}

async fn generate_content(
    Path(model_action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if query.get("key").map(String::as_str) != Some("gemini-key") {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "bad key" })));
    }
    let system = body["systemInstruction"]["parts"][0]["text"]
        .as_str()
        .unwrap_or("none")
        .to_string();
    let user = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": format!("{} | ", model_action) },
                        { "text": format!("{} | {}", system, user) }
                    ]
                }
            }]
        })),
    )
}

async fn no_choices() -> Json<Value> {
    Json(json!({ "choices": [] }))
}

async fn spawn_api() -> String {
    let app = Router::new()
        .route("/openai/v1/chat/completions", post(chat_completions))
        .route("/empty/chat/completions", post(no_choices))
        .route("/v1beta/models/{model_action}", post(generate_content));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn provider_config(kind: &str, model: &str, base_url: String) -> ProviderConfig {
    ProviderConfig {
        kind: kind.to_string(),
        model: model.to_string(),
        api_key_env: String::new(),
        base_url: Some(base_url),
    }
}

fn request(system: Option<&str>, user: &str) -> CompletionRequest {
    CompletionRequest {
        system: system.map(str::to_string),
        user: user.to_string(),
        temperature: 0.7,
        max_tokens: 128,
    }
}

#[tokio::test]
async fn test_openai_compatible_client() {
    let base = spawn_api().await;
    let groq = create_provider(
        &provider_config("groq", "llama-3.3-70b-versatile", format!("{}/openai/v1", base)),
        "good-key".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(groq.name(), "groq");

    let text = groq
        .complete(&request(Some("be brief"), "hello"))
        .await
        .unwrap();
    assert_eq!(text, "hello via llama-3.3-70b-versatile [system,user]");

    let text = groq.complete(&request(None, "hi")).await.unwrap();
    assert!(text.ends_with("[user]"));
}

#[tokio::test]
async fn test_openai_compatible_status_error() {
    let base = spawn_api().await;
    let openai = create_provider(
        &provider_config("openai", "gpt-4o-mini", format!("{}/openai/v1", base)),
        "bad-key".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    match openai.complete(&request(None, "hi")).await {
        Err(ProviderError::Status { status, body, .. }) => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("expected status error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_missing_choices_is_malformed() {
    let base = spawn_api().await;
    let openai = create_provider(
        &provider_config("openai", "gpt-4o-mini", format!("{}/empty", base)),
        "good-key".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    assert!(matches!(
        openai.complete(&request(None, "hi")).await,
        Err(ProviderError::Malformed { .. })
    ));
}

#[tokio::test]
async fn test_gemini_client() {
    let base = spawn_api().await;
    let gemini = create_provider(
        &provider_config("gemini", "gemini-1.5-flash", format!("{}/v1beta", base)),
        "gemini-key".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(gemini.name(), "gemini");

    let text = gemini
        .complete(&request(Some("persona"), "question"))
        .await
        .unwrap();
    assert_eq!(
        text,
        "gemini-1.5-flash:generateContent | persona | question"
    );
}

#[tokio::test]
async fn test_chain_falls_through_to_working_provider() {
    let base = spawn_api().await;
    let failing = create_provider(
        &provider_config("groq", "llama", format!("{}/openai/v1", base)),
        "revoked-key".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    let working = create_provider(
        &provider_config("gemini", "gemini-1.5-flash", format!("{}/v1beta", base)),
        "gemini-key".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    let chain = ProviderChain::new(
        vec![ProviderSlot::ready(failing), ProviderSlot::ready(working)],
        Duration::from_secs(5),
    );
    let completion = chain.complete(&request(None, "hello")).await.unwrap();
    assert_eq!(completion.provider, "gemini");
    assert!(completion.text.ends_with("none | hello"));
}

#[tokio::test]
async fn test_unreachable_provider_is_transport_error() {
    let groq = create_provider(
        &provider_config("groq", "llama", "http://127.0.0.1:1/openai/v1".to_string()),
        "good-key".to_string(),
        Duration::from_secs(2),
    )
    .unwrap();
    assert!(matches!(
        groq.complete(&request(None, "hi")).await,
        Err(ProviderError::Transport(_))
    ));
}

#[test]
fn test_unknown_kind_is_rejected() {
    let result = create_provider(
        &provider_config("cohere", "command", "http://localhost".to_string()),
        "key".to_string(),
        Duration::from_secs(2),
    );
    assert!(result.is_err());
}
