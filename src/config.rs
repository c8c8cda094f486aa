//! Runtime configuration: environment settings and prompt texts.
//!
//! Prompts default to the wording the question writer was tuned with; a TOML file at
//! AGENT_CONFIG_PATH may override any of them under a `[prompts]` table.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::Difficulty;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_WINDOW_CHARS: usize = 10_000;
pub const DEFAULT_PORT: u16 = 5000;
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct CompletionSettings {
  pub api_key: Option<String>,
  pub base_url: String,
  pub author_model: String,
  pub grader_model: String,
  pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct SupabaseSettings {
  pub url: String,
  pub service_key: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
  pub port: u16,
  pub data_dir: PathBuf,
  pub window_chars: usize,
  pub completion: CompletionSettings,
  pub supabase: Option<SupabaseSettings>,
}

impl Settings {
  /// Read settings from the process environment.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Same as `from_env` but over an arbitrary lookup, so tests don't touch process env.
  pub fn from_lookup<F>(get: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let port = non_empty("PORT").and_then(|p| p.parse::<u16>().ok()).unwrap_or(DEFAULT_PORT);
    let window_chars = non_empty("PASSAGE_WINDOW_CHARS")
      .and_then(|v| v.parse::<usize>().ok())
      .filter(|v| *v > 0)
      .unwrap_or(DEFAULT_WINDOW_CHARS);

    let supabase = match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_SERVICE_ROLE_KEY")) {
      (Some(url), Some(service_key)) => Some(SupabaseSettings { url: url.trim_end_matches('/').to_string(), service_key }),
      (Some(_), None) | (None, Some(_)) => {
        warn!(target: "brainbee", "Only one of SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY is set; ignoring both");
        None
      }
      (None, None) => None,
    };

    Self {
      port,
      data_dir: non_empty("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./data")),
      window_chars,
      completion: CompletionSettings {
        api_key: non_empty("GROQ_API_KEY"),
        base_url: non_empty("GROQ_BASE_URL")
          .map(|u| u.trim_end_matches('/').to_string())
          .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
        author_model: non_empty("GROQ_DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
        grader_model: non_empty("GROQ_GRADER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
        timeout: UPSTREAM_TIMEOUT,
      },
      supabase,
    }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompt texts for authoring and grading.
/// Templates use `{placeholder}` substitution (see `util::fill_template`).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  // Authoring
  pub author_system: String,
  /// Placeholders: {passage}, {difficulty_hint}
  pub author_user_template: String,
  pub hint_easy: String,
  pub hint_medium: String,
  pub hint_hard: String,
  // Grading
  pub grader_system: String,
  /// Placeholders: {passage}, {question}, {choices}, {correct}, {rationale}
  pub grader_user_template: String,
}

impl Prompts {
  pub fn difficulty_hint(&self, difficulty: Difficulty) -> &str {
    match difficulty {
      Difficulty::Easy => &self.hint_easy,
      Difficulty::Medium => &self.hint_medium,
      Difficulty::Hard => &self.hint_hard,
    }
  }
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      author_system: concat!(
        "You are an expert children's science educator and question-writer. Your job is to read a provided passage and create ONE detailed, scenario-based multiple-choice question (Brain Bee style) that tests comprehension and reasoning about the passage.",
        " Use clear, kid-appropriate language, include a short context sentence that sets up a hypothetical scenario based on the passage, and then ask the question.",
        " Provide exactly FOUR plausible answer choices where distractors are believable but only one choice is supported by the passage.",
        " STRICTLY reply with a single JSON object and nothing else. The JSON must include these keys:",
        " question: string (the full question including the scenario sentence),",
        " choices: array of 4 strings,",
        " answer: integer index (0-3) indicating the correct choice,",
        " rationale: a short plain-language sentence (1-2 sentences) explaining why the correct answer is correct and why the others are not,",
        " source_span: optional short excerpt (up to 200 chars) copied verbatim from the provided passage that supports the correct answer."
      ).into(),
      author_user_template: concat!(
        "You will be given a passage delimited by triple backticks. BASE YOUR QUESTION ONLY ON THE INFORMATION IN THE PASSAGE. Do not add facts beyond it.\n\n",
        "```\n{passage}\n```\n\n",
        "Respond with the JSON object described above. Do not include commentary, prefaces, or markdown. Only the JSON object.",
        "\n\nDifficulty guidance: {difficulty_hint}"
      ).into(),
      hint_easy: "Use simpler vocabulary, shorter sentences, and include an obvious clue in the passage-based question. Focus on basic comprehension and recognition.".into(),
      hint_medium: "Use age-appropriate vocabulary, modest multi-step reasoning, and plausible distractors.".into(),
      hint_hard: "Use more challenging reasoning, multi-step inference, and slightly denser language appropriate for upper-grade students.".into(),
      grader_system: "You are an expert educational content evaluator. Be strict but fair in your assessments.".into(),
      grader_user_template: concat!(
        "Evaluate this multiple-choice question for quality and educational value. Rate it on a scale of 1-10.\n\n",
        "ORIGINAL PASSAGE CONTEXT:\n{passage}\n\n",
        "GENERATED QUESTION:\n{question}\n\n",
        "ANSWER CHOICES:\n{choices}\n\n",
        "CORRECT ANSWER: Choice {correct}\n",
        "RATIONALE: {rationale}\n\n",
        "Evaluation Criteria:\n",
        "1. Relevance to passage (1-3 points)\n",
        "2. Clarity and specificity (1-3 points)\n",
        "3. Quality of distractors (1-2 points)\n",
        "4. Appropriate difficulty (1-2 points)\n\n",
        "Respond with ONLY a JSON object in this format:\n",
        "{\"quality_score\": <number 1-10>, \"quality_feedback\": \"<brief explanation of rating>\"}"
      ).into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "brainbee", %path, "Loaded prompt config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "brainbee", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "brainbee", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
