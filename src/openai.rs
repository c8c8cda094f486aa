//! Minimal chat-completions client for OpenAI-compatible endpoints (Groq by default).
//!
//! One request per call, bounded by a timeout; no retries. Callers decide whether a
//! failure is fatal (authoring) or degrades to a default (grading).
//!
//! NOTE: We never log the API key and only log sizes/latency, not prompt contents.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::CompletionSettings;
use crate::prompt::PromptPair;

#[derive(Debug, Error)]
pub enum CompletionError {
  #[error("completion API key not configured")]
  Config,
  #[error("network error: {0}")]
  Network(String),
  #[error("upstream HTTP {status}")]
  Upstream { status: u16, body: String },
  #[error("completion response missing choices[0].message.content")]
  MalformedResponse { body: String },
}

/// Per-call knobs; the two pipeline calls differ only here.
#[derive(Clone, Debug)]
pub struct CompletionParams {
  pub model: String,
  pub temperature: f32,
  pub max_tokens: u32,
  pub timeout: Duration,
}

/// "Send chat-style messages, get text back."
#[async_trait]
pub trait CompletionClient: Send + Sync {
  /// False when no credential is available; callers check this before building a request.
  fn is_configured(&self) -> bool;

  async fn complete(&self, prompt: &PromptPair, params: &CompletionParams) -> Result<String, CompletionError>;
}

#[derive(Clone)]
pub struct OpenAI {
  client: reqwest::Client,
  api_key: Option<String>,
  pub base_url: String,
}

impl OpenAI {
  pub fn new(settings: &CompletionSettings) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder()
      .timeout(settings.timeout)
      .build()?;
    Ok(Self { client, api_key: settings.api_key.clone(), base_url: settings.base_url.clone() })
  }
}

#[async_trait]
impl CompletionClient for OpenAI {
  fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }

  #[instrument(level = "info", skip(self, prompt), fields(model = %params.model, max_tokens = params.max_tokens))]
  async fn complete(&self, prompt: &PromptPair, params: &CompletionParams) -> Result<String, CompletionError> {
    let api_key = self.api_key.as_deref().ok_or(CompletionError::Config)?;

    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: params.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: prompt.system.clone() },
        ChatMessageReq { role: "user".into(), content: prompt.user.clone() },
      ],
      temperature: params.temperature,
      max_tokens: params.max_tokens,
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .timeout(params.timeout)
      .header(USER_AGENT, "brainbee-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", api_key))
      .json(&req).send().await
      .map_err(|e| CompletionError::Network(e.to_string()))?;

    let status = res.status();
    let body = res.text().await.map_err(|e| CompletionError::Network(e.to_string()))?;
    let elapsed = start.elapsed();

    if !status.is_success() {
      let msg = extract_openai_error(&body).unwrap_or_else(|| crate::util::trunc_for_log(&body, 200));
      warn!(?elapsed, status = status.as_u16(), error = %msg, "Completion call rejected upstream");
      return Err(CompletionError::Upstream { status: status.as_u16(), body });
    }

    let parsed: ChatCompletionResponse = match serde_json::from_str(&body) {
      Ok(p) => p,
      Err(_) => return Err(CompletionError::MalformedResponse { body }),
    };
    if let Some(usage) = &parsed.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Completion usage");
    }
    let text = parsed.choices.into_iter().next().and_then(|c| c.message.content);
    match text {
      Some(text) => {
        info!(?elapsed, response_len = text.len(), "Completion received");
        Ok(text)
      }
      None => Err(CompletionError::MalformedResponse { body }),
    }
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  max_tokens: u32,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{http::{HeaderMap, StatusCode}, routing::post, Json, Router};
  use serde_json::{json, Value};
  use tokio::net::TcpListener;

  fn settings(base_url: String, api_key: Option<&str>) -> CompletionSettings {
    CompletionSettings {
      api_key: api_key.map(str::to_string),
      base_url,
      author_model: "m".into(),
      grader_model: "m".into(),
      timeout: Duration::from_secs(5),
    }
  }

  fn params() -> CompletionParams {
    CompletionParams { model: "test-model".into(), temperature: 0.7, max_tokens: 400, timeout: Duration::from_secs(5) }
  }

  fn prompt() -> PromptPair {
    PromptPair { system: "sys".into(), user: "usr".into() }
  }

  async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{}", addr)
  }

  #[tokio::test]
  async fn missing_key_fails_before_any_request() {
    // Port 9 (discard) is never contacted because the key check comes first.
    let oa = OpenAI::new(&settings("http://127.0.0.1:9".into(), None)).unwrap();
    assert!(!oa.is_configured());
    let err = oa.complete(&prompt(), &params()).await.unwrap_err();
    assert!(matches!(err, CompletionError::Config));
  }

  #[tokio::test]
  async fn returns_first_choice_content_and_sends_request_shape() {
    let router = Router::new().route(
      "/chat/completions",
      post(|headers: HeaderMap, Json(body): Json<Value>| async move {
        assert_eq!(headers.get("authorization").unwrap(), "Bearer k");
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 400);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
        Json(json!({"choices": [{"message": {"content": "hello"}}], "usage": {"total_tokens": 3}}))
      }),
    );
    let base = serve(router).await;
    let oa = OpenAI::new(&settings(base, Some("k"))).unwrap();
    assert_eq!(oa.complete(&prompt(), &params()).await.unwrap(), "hello");
  }

  #[tokio::test]
  async fn non_success_status_is_upstream_error_with_body() {
    let router = Router::new().route(
      "/chat/completions",
      post(|| async { (StatusCode::TOO_MANY_REQUESTS, r#"{"error":{"message":"slow down"}}"#) }),
    );
    let base = serve(router).await;
    let oa = OpenAI::new(&settings(base, Some("k"))).unwrap();
    match oa.complete(&prompt(), &params()).await.unwrap_err() {
      CompletionError::Upstream { status, body } => {
        assert_eq!(status, 429);
        assert!(body.contains("slow down"));
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn success_without_content_is_malformed() {
    let router = Router::new().route("/chat/completions", post(|| async { Json(json!({"choices": []})) }));
    let base = serve(router).await;
    let oa = OpenAI::new(&settings(base, Some("k"))).unwrap();
    let err = oa.complete(&prompt(), &params()).await.unwrap_err();
    assert!(matches!(err, CompletionError::MalformedResponse { .. }));
  }

  #[tokio::test]
  async fn unreachable_host_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let oa = OpenAI::new(&settings(format!("http://{}", addr), Some("k"))).unwrap();
    let err = oa.complete(&prompt(), &params()).await.unwrap_err();
    assert!(matches!(err, CompletionError::Network(_)));
  }

  #[test]
  fn extracts_openai_error_message() {
    assert_eq!(extract_openai_error(r#"{"error":{"message":"bad key"}}"#).as_deref(), Some("bad key"));
    assert_eq!(extract_openai_error("plain text"), None);
  }
}
