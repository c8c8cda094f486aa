//! Domain models: difficulty, passage windows, model-proposed and finalized questions,
//! quality assessments and the record written to storage.

use serde::{Deserialize, Serialize};

/// Difficulty requested by the caller. Anything unrecognized collapses to `Medium`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Difficulty {
  /// Exact, case-sensitive match on "easy" / "medium" / "hard"; otherwise medium.
  pub fn normalize(raw: Option<&str>) -> Self {
    match raw {
      Some("easy") => Difficulty::Easy,
      Some("hard") => Difficulty::Hard,
      _ => Difficulty::Medium,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

impl std::fmt::Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A bounded slice of a category's corpus, drawn once per generation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassageWindow {
  pub text: String,
  /// Start offset in characters within the source passage.
  pub offset: usize,
  /// Total source length in characters.
  pub source_len: usize,
}

#[derive(Clone, Debug)]
pub struct GenerationRequest {
  pub category: String,
  pub difficulty: Difficulty,
  pub model: String,
}

/// The model's proposal after schema validation and label stripping.
/// Choices are still in the order the model wrote them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawModelQuestion {
  pub question: String,
  pub choices: [String; 4],
  pub answer: usize,
  pub rationale: Option<String>,
  pub source_span: Option<String>,
}

/// Post-shuffle question; the only shape returned to callers or persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinalizedQuestion {
  pub question: String,
  pub choices: [String; 4],
  pub answer: usize,
  pub rationale: Option<String>,
  pub source_span: Option<String>,
}

pub const DEFAULT_QUALITY_SCORE: u8 = 5;
pub const DEFAULT_QUALITY_FEEDBACK: &str = "Automatic evaluation failed";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QualityAssessment {
  pub score: u8,
  pub feedback: String,
}

impl QualityAssessment {
  /// Neutral assessment used whenever grading cannot produce a result.
  pub fn fallback() -> Self {
    Self { score: DEFAULT_QUALITY_SCORE, feedback: DEFAULT_QUALITY_FEEDBACK.to_string() }
  }
}

/// Row shape of the `questions` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestionRecord {
  pub category: String,
  pub question_text: String,
  pub choices: Vec<String>,
  pub correct_answer: usize,
  pub difficulty: String,
  pub quality_score: u8,
  pub quality_feedback: String,
  pub rationale: Option<String>,
  pub source_span: Option<String>,
}

impl StoredQuestionRecord {
  pub fn new(q: &FinalizedQuestion, category: &str, difficulty: Difficulty, assessment: &QualityAssessment) -> Self {
    Self {
      category: category.to_string(),
      question_text: q.question.clone(),
      choices: q.choices.to_vec(),
      correct_answer: q.answer,
      difficulty: difficulty.as_str().to_string(),
      quality_score: assessment.score,
      quality_feedback: assessment.feedback.clone(),
      rationale: q.rationale.clone(),
      source_span: q.source_span.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_defaults_to_medium() {
    assert_eq!(Difficulty::normalize(None), Difficulty::Medium);
    assert_eq!(Difficulty::normalize(Some("extreme")), Difficulty::Medium);
    assert_eq!(Difficulty::normalize(Some("Hard")), Difficulty::Medium);
    assert_eq!(Difficulty::normalize(Some("easy")), Difficulty::Easy);
    assert_eq!(Difficulty::normalize(Some("hard")), Difficulty::Hard);
  }

  #[test]
  fn record_copies_finalized_fields() {
    let q = FinalizedQuestion {
      question: "Q?".into(),
      choices: ["a".into(), "b".into(), "c".into(), "d".into()],
      answer: 2,
      rationale: Some("because".into()),
      source_span: None,
    };
    let rec = StoredQuestionRecord::new(&q, "geography", Difficulty::Hard, &QualityAssessment::fallback());
    assert_eq!(rec.question_text, "Q?");
    assert_eq!(rec.choices, vec!["a", "b", "c", "d"]);
    assert_eq!(rec.correct_answer, 2);
    assert_eq!(rec.difficulty, "hard");
    assert_eq!(rec.quality_score, 5);
    assert_eq!(rec.quality_feedback, "Automatic evaluation failed");
  }
}
