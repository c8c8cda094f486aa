//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures render through `PipelineError`.

use std::sync::Arc;
use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::answer::check_answer;
use crate::error::PipelineError;
use crate::passage::list_categories;
use crate::pipeline::generate_question;
use crate::protocol::*;
use crate::state::AppState;
use crate::store::aggregate_stats;

#[instrument(level = "info")]
pub async fn http_health() -> Json<HealthOut> {
  Json(HealthOut { service: "Brain Bee", status: "ok" })
}

#[instrument(level = "info", skip(state))]
pub async fn http_categories(State(state): State<Arc<AppState>>) -> Result<Json<CategoriesOut>, PipelineError> {
  let categories = list_categories(&state.settings.data_dir).await.map_err(PipelineError::Categories)?;
  Ok(Json(CategoriesOut { categories }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_generate_question(
  State(state): State<Arc<AppState>>,
  body: Option<Json<GenerateIn>>,
) -> Result<Json<GenerateOut>, PipelineError> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let category = body.category.as_ref().and_then(|v| v.as_str());
  let difficulty = body.difficulty.as_ref().and_then(|v| v.as_str());
  let outcome = generate_question(&state, category, difficulty).await?;
  Ok(Json(outcome.into()))
}

#[instrument(level = "info", skip(body))]
pub async fn http_check_answer(body: Option<Json<CheckAnswerIn>>) -> Result<Json<CheckAnswerOut>, PipelineError> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let check = check_answer(body.answer.as_ref(), body.selected.as_ref())?;
  info!(target: "brainbee", expected = check.expected, selected = check.selected, is_correct = check.is_correct, "Answer checked");
  Ok(Json(CheckAnswerOut {
    is_correct: check.is_correct,
    expected: check.expected,
    selected: check.selected,
    rationale: body.rationale,
    source_span: body.source_span,
  }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_question_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsOut>, PipelineError> {
  let rows = state.store.summaries().await.map_err(PipelineError::Stats)?;
  info!(target: "store", rows = rows.len(), "Stats rows loaded");
  Ok(Json(aggregate_stats(&rows)))
}
