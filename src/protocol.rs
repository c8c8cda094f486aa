//! Public request/response structs for the HTTP API (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::GenerationOutcome;
use crate::store::CategoryStats;

/// Loose on purpose: a non-string category counts as missing, a non-string difficulty as default.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateIn {
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub difficulty: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOut {
    pub question: String,
    pub choices: [String; 4],
    pub answer: usize,
    pub rationale: Option<String>,
    pub source_span: Option<String>,
    pub quality_score: u8,
    pub quality_feedback: String,
    pub stored_in_db: bool,
    pub raw_model: String,
}

impl From<GenerationOutcome> for GenerateOut {
    fn from(o: GenerationOutcome) -> Self {
        Self {
            question: o.question.question,
            choices: o.question.choices,
            answer: o.question.answer,
            rationale: o.question.rationale,
            source_span: o.question.source_span,
            quality_score: o.assessment.score,
            quality_feedback: o.assessment.feedback,
            stored_in_db: o.stored,
            raw_model: o.raw_model,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckAnswerIn {
    #[serde(default)]
    pub answer: Option<Value>,
    #[serde(default)]
    pub selected: Option<Value>,
    #[serde(default)]
    pub rationale: Option<Value>,
    #[serde(default)]
    pub source_span: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CheckAnswerOut {
    pub is_correct: bool,
    pub expected: i64,
    pub selected: i64,
    pub rationale: Option<Value>,
    pub source_span: Option<Value>,
}

pub type StatsOut = BTreeMap<String, CategoryStats>;

#[derive(Serialize)]
pub struct CategoriesOut {
    pub categories: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub service: &'static str,
    pub status: &'static str,
}
