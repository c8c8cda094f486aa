//! Service-level errors and their HTTP mapping.
//!
//! Authoring-path failures (sampling, completion, parsing, validation) end the cycle and are
//! reported with enough payload to debug (raw model text, decoded object). Grading and
//! persistence never produce a `PipelineError`.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::answer::AnswerError;
use crate::openai::CompletionError;
use crate::parser::ParseFailure;
use crate::passage::SampleError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("category required")]
  MissingCategory,
  #[error("category not found: {0}")]
  CategoryNotFound(String),
  #[error("failed to read corpus: {0}")]
  Corpus(#[source] SampleError),
  #[error(transparent)]
  Completion(#[from] CompletionError),
  #[error("{failure}")]
  ModelOutput { failure: ParseFailure, raw: String },
  #[error(transparent)]
  Answer(#[from] AnswerError),
  #[error("Failed to get stats: {0}")]
  Stats(#[source] StoreError),
  #[error("failed to list categories: {0}")]
  Categories(#[source] std::io::Error),
}

impl From<SampleError> for PipelineError {
  fn from(e: SampleError) -> Self {
    match e {
      SampleError::NotFound(path) => PipelineError::CategoryNotFound(path.display().to_string()),
      other => PipelineError::Corpus(other),
    }
  }
}

impl PipelineError {
  pub fn status(&self) -> StatusCode {
    match self {
      PipelineError::MissingCategory | PipelineError::Answer(_) => StatusCode::BAD_REQUEST,
      PipelineError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
      PipelineError::Completion(CompletionError::Config) => StatusCode::INTERNAL_SERVER_ERROR,
      PipelineError::Completion(CompletionError::Upstream { status, .. }) => {
        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
      }
      PipelineError::Completion(_) | PipelineError::ModelOutput { .. } => StatusCode::BAD_GATEWAY,
      PipelineError::Corpus(_) | PipelineError::Stats(_) | PipelineError::Categories(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  /// JSON body: always an `error` message, plus diagnostics where the caller can use them.
  pub fn body(&self) -> Value {
    match self {
      PipelineError::MissingCategory => json!({ "error": "category required" }),
      PipelineError::CategoryNotFound(_) => json!({ "error": "category not found" }),
      PipelineError::Completion(CompletionError::Config) => {
        json!({ "error": "GROQ_API_KEY not configured on server. Cannot call model." })
      }
      PipelineError::Completion(CompletionError::Network(e)) => json!({ "error": format!("Network error: {}", e) }),
      PipelineError::Completion(CompletionError::Upstream { status, body }) => {
        json!({ "error": format!("Upstream error {}", status), "detail": body })
      }
      PipelineError::Completion(CompletionError::MalformedResponse { body }) => {
        json!({ "error": "Bad response from model", "raw": body })
      }
      PipelineError::ModelOutput { failure: ParseFailure::NoJson, raw } => {
        json!({ "error": "Could not parse JSON from model output", "raw": raw })
      }
      PipelineError::ModelOutput { failure: ParseFailure::Invalid { field, reason, parsed }, raw } => json!({
        "error": "Model returned invalid structure",
        "field": field,
        "detail": reason,
        "parsed": parsed,
        "raw": raw,
      }),
      other => json!({ "error": other.to_string() }),
    }
  }
}

impl IntoResponse for PipelineError {
  fn into_response(self) -> Response {
    let status = self.status();
    warn!(target: "brainbee", %status, error = %self, "Request failed");
    (status, Json(self.body())).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  #[test]
  fn maps_statuses() {
    assert_eq!(PipelineError::MissingCategory.status(), StatusCode::BAD_REQUEST);
    assert_eq!(PipelineError::from(SampleError::NotFound(PathBuf::from("x.txt"))).status(), StatusCode::NOT_FOUND);
    assert_eq!(PipelineError::from(CompletionError::Config).status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(PipelineError::from(CompletionError::Network("reset".into())).status(), StatusCode::BAD_GATEWAY);
    assert_eq!(PipelineError::from(AnswerError::NotInteger).status(), StatusCode::BAD_REQUEST);
    let parse = PipelineError::ModelOutput { failure: ParseFailure::NoJson, raw: "nope".into() };
    assert_eq!(parse.status(), StatusCode::BAD_GATEWAY);
  }

  #[test]
  fn upstream_status_passes_through() {
    let e = PipelineError::from(CompletionError::Upstream { status: 429, body: "rate limited".into() });
    assert_eq!(e.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(e.body(), json!({ "error": "Upstream error 429", "detail": "rate limited" }));
  }

  #[test]
  fn validation_body_echoes_diagnostics() {
    let e = PipelineError::ModelOutput {
      failure: ParseFailure::Invalid { field: "answer", reason: "must be in 0..=3, got 7".into(), parsed: json!({"answer": 7}) },
      raw: "{\"answer\": 7}".into(),
    };
    let body = e.body();
    assert_eq!(body["error"], "Model returned invalid structure");
    assert_eq!(body["field"], "answer");
    assert_eq!(body["parsed"]["answer"], 7);
    assert_eq!(body["raw"], "{\"answer\": 7}");
  }
}
