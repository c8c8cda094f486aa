//! Second-opinion grading of a finalized question against its source passage.
//!
//! Fail-open: every failure collapses to `QualityAssessment::fallback()`, so grading can
//! never block delivery of an otherwise valid question.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::Prompts;
use crate::domain::{FinalizedQuestion, PassageWindow, QualityAssessment};
use crate::openai::{CompletionClient, CompletionError, CompletionParams};
use crate::prompt::PromptPair;
use crate::util::{fill_template, take_chars};

/// Characters of passage context handed to the grader.
pub const GRADER_CONTEXT_CHARS: usize = 2000;

#[derive(Debug, Error)]
enum EvaluationError {
  #[error(transparent)]
  Completion(#[from] CompletionError),
  #[error("no JSON object in grader reply")]
  NoJson,
  #[error("grader reply missing or mistyped field `{0}`")]
  Field(&'static str),
}

pub fn build_grader_prompt(prompts: &Prompts, question: &FinalizedQuestion, window: &PassageWindow) -> PromptPair {
  let choices = question
    .choices
    .iter()
    .enumerate()
    .map(|(i, c)| format!("{}. {}", i + 1, c))
    .collect::<Vec<_>>()
    .join("\n");
  let correct = (question.answer + 1).to_string();
  let rationale = question.rationale.as_deref().unwrap_or("No rationale provided");

  let user = fill_template(
    &prompts.grader_user_template,
    &[
      ("question", &question.question),
      ("choices", &choices),
      ("correct", &correct),
      ("rationale", rationale),
      ("passage", take_chars(&window.text, GRADER_CONTEXT_CHARS)),
    ],
  );
  PromptPair { system: prompts.grader_system.clone(), user }
}

/// Grade `question`; never fails.
#[instrument(level = "info", skip_all, fields(model = %params.model))]
pub async fn evaluate(
  client: &dyn CompletionClient,
  prompts: &Prompts,
  params: &CompletionParams,
  question: &FinalizedQuestion,
  window: &PassageWindow,
) -> QualityAssessment {
  match try_evaluate(client, prompts, params, question, window).await {
    Ok(assessment) => {
      info!(target: "pipeline", score = assessment.score, "Quality evaluation succeeded");
      assessment
    }
    Err(e) => {
      warn!(target: "pipeline", error = %e, "Quality evaluation failed; using default assessment");
      QualityAssessment::fallback()
    }
  }
}

async fn try_evaluate(
  client: &dyn CompletionClient,
  prompts: &Prompts,
  params: &CompletionParams,
  question: &FinalizedQuestion,
  window: &PassageWindow,
) -> Result<QualityAssessment, EvaluationError> {
  if !client.is_configured() {
    return Err(CompletionError::Config.into());
  }
  let prompt = build_grader_prompt(prompts, question, window);
  let text = client.complete(&prompt, params).await?;
  parse_assessment(&text)
}

fn parse_assessment(text: &str) -> Result<QualityAssessment, EvaluationError> {
  #[derive(Deserialize)]
  struct Reply {
    quality_score: Option<Value>,
    quality_feedback: Option<Value>,
  }

  let start = text.find('{').ok_or(EvaluationError::NoJson)?;
  let end = text.rfind('}').filter(|e| *e > start).ok_or(EvaluationError::NoJson)?;
  let reply: Reply = serde_json::from_str(&text[start..=end]).map_err(|_| EvaluationError::NoJson)?;

  let score = reply
    .quality_score
    .as_ref()
    .and_then(score_from_value)
    .ok_or(EvaluationError::Field("quality_score"))?;
  let feedback = match reply.quality_feedback {
    Some(Value::String(s)) => s,
    _ => return Err(EvaluationError::Field("quality_feedback")),
  };
  Ok(QualityAssessment { score, feedback })
}

/// Integral scores (including "7" and 7.0), clamped into 1..=10.
fn score_from_value(v: &Value) -> Option<u8> {
  let n = match v {
    Value::Number(n) => match n.as_i64() {
      Some(i) => i,
      None => {
        let f = n.as_f64()?;
        if f.fract() != 0.0 {
          return None;
        }
        f as i64
      }
    },
    Value::String(s) => s.trim().parse::<i64>().ok()?,
    _ => return None,
  };
  Some(n.clamp(1, 10) as u8)
}
