//! One generation cycle: sample → prompt → author → parse/validate → shuffle → grade → store.
//!
//! Everything up to and including validation is strict and ends the cycle on failure.
//! Grading and storage are fail-open and only shape the response.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Difficulty, FinalizedQuestion, GenerationRequest, QualityAssessment};
use crate::error::PipelineError;
use crate::evaluator;
use crate::openai::{CompletionError, CompletionParams};
use crate::parser::parse_question;
use crate::passage::{self, category_path};
use crate::prompt::build_author_prompt;
use crate::shuffle;
use crate::state::AppState;
use crate::store;
use crate::util::trunc_for_log;

const AUTHOR_TEMPERATURE: f32 = 0.7;
const AUTHOR_MAX_TOKENS: u32 = 400;
const GRADER_TEMPERATURE: f32 = 0.1;
const GRADER_MAX_TOKENS: u32 = 200;

#[derive(Debug)]
pub struct GenerationOutcome {
  pub question: FinalizedQuestion,
  pub assessment: QualityAssessment,
  pub stored: bool,
  pub raw_model: String,
}

#[instrument(level = "info", skip(state), fields(generation_id = %Uuid::new_v4()))]
pub async fn generate_question(
  state: &AppState,
  category: Option<&str>,
  difficulty: Option<&str>,
) -> Result<GenerationOutcome, PipelineError> {
  let category = category.filter(|c| !c.is_empty()).ok_or(PipelineError::MissingCategory)?;
  let request = GenerationRequest {
    category: category.to_string(),
    difficulty: Difficulty::normalize(difficulty),
    model: state.settings.completion.author_model.clone(),
  };

  let path = category_path(&state.settings.data_dir, &request.category)
    .ok_or_else(|| PipelineError::CategoryNotFound(request.category.clone()))?;
  let window = passage::sample(&path, state.settings.window_chars).await?;

  if !state.completion.is_configured() {
    return Err(CompletionError::Config.into());
  }

  let prompt = build_author_prompt(&state.prompts, &window, request.difficulty);
  let author = CompletionParams {
    model: request.model.clone(),
    temperature: AUTHOR_TEMPERATURE,
    max_tokens: AUTHOR_MAX_TOKENS,
    timeout: state.settings.completion.timeout,
  };
  let raw = state.completion.complete(&prompt, &author).await?;

  let parsed = match parse_question(&raw) {
    Ok(q) => q,
    Err(failure) => {
      warn!(target: "pipeline", error = %failure, raw = %trunc_for_log(&raw, 300), "Model output rejected");
      return Err(PipelineError::ModelOutput { failure, raw });
    }
  };

  let question = {
    let mut rng = rand::thread_rng();
    shuffle::finalize(parsed, &mut rng)
  };

  let grader = CompletionParams {
    model: state.settings.completion.grader_model.clone(),
    temperature: GRADER_TEMPERATURE,
    max_tokens: GRADER_MAX_TOKENS,
    timeout: state.settings.completion.timeout,
  };
  let assessment = evaluator::evaluate(state.completion.as_ref(), &state.prompts, &grader, &question, &window).await;

  let stored = store::record_question(
    state.store.as_ref(),
    &question,
    &request.category,
    request.difficulty,
    &assessment,
  )
  .await;

  info!(
    target: "pipeline",
    category = %request.category,
    difficulty = %request.difficulty,
    answer = question.answer,
    quality_score = assessment.score,
    stored,
    "Question generated"
  );

  Ok(GenerationOutcome { question, assessment, stored, raw_model: raw })
}
