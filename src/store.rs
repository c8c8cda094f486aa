//! Question persistence: the `questions` table and the statistics read over it.
//!
//! Backed by Supabase (PostgREST over HTTPS) when configured, otherwise by an in-process
//! store so the service still runs locally. Writes are fail-open: `record_question` reports
//! success as a bool and never propagates storage errors.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::SupabaseSettings;
use crate::domain::{Difficulty, FinalizedQuestion, QualityAssessment, StoredQuestionRecord};

const TABLE: &str = "questions";

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("storage request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("storage returned HTTP {status}: {body}")]
  Status { status: u16, body: String },
}

/// Projection of a stored row used for statistics.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct QuestionSummary {
  pub category: String,
  #[serde(default)]
  pub difficulty: Option<String>,
  #[serde(default)]
  pub quality_score: Option<f64>,
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
  async fn insert(&self, record: &StoredQuestionRecord) -> Result<(), StoreError>;
  async fn summaries(&self) -> Result<Vec<QuestionSummary>, StoreError>;
}

/// Write one finalized question; false on any storage failure.
#[instrument(level = "info", skip_all, fields(%category, %difficulty))]
pub async fn record_question(
  store: &dyn QuestionStore,
  question: &FinalizedQuestion,
  category: &str,
  difficulty: Difficulty,
  assessment: &QualityAssessment,
) -> bool {
  let record = StoredQuestionRecord::new(question, category, difficulty, assessment);
  match store.insert(&record).await {
    Ok(()) => {
      info!(target: "store", "Question stored");
      true
    }
    Err(e) => {
      error!(target: "store", error = %e, "Failed to store question");
      false
    }
  }
}

pub struct SupabaseStore {
  client: reqwest::Client,
  url: String,
  service_key: String,
}

impl SupabaseStore {
  pub fn new(client: reqwest::Client, settings: &SupabaseSettings) -> Self {
    Self { client, url: settings.url.clone(), service_key: settings.service_key.clone() }
  }

  fn table_url(&self) -> String {
    format!("{}/rest/v1/{}", self.url, TABLE)
  }

  fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req
      .header("apikey", &self.service_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
  }
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, StoreError> {
  if res.status().is_success() {
    return Ok(res);
  }
  let status = res.status().as_u16();
  let body = res.text().await.unwrap_or_default();
  Err(StoreError::Status { status, body })
}

#[async_trait]
impl QuestionStore for SupabaseStore {
  async fn insert(&self, record: &StoredQuestionRecord) -> Result<(), StoreError> {
    let req = self.client.post(self.table_url())
      .header(CONTENT_TYPE, "application/json")
      .header("Prefer", "return=minimal")
      .json(record);
    check_status(self.authed(req).send().await?).await?;
    Ok(())
  }

  async fn summaries(&self) -> Result<Vec<QuestionSummary>, StoreError> {
    let req = self.client.get(self.table_url()).query(&[("select", "category,difficulty,quality_score")]);
    let res = check_status(self.authed(req).send().await?).await?;
    Ok(res.json::<Vec<QuestionSummary>>().await?)
  }
}

/// Process-local store; contents vanish on restart. Rows are never evicted, so memory
/// grows with every generated question. Meant for local runs without Supabase.
#[derive(Default)]
pub struct MemoryStore {
  rows: RwLock<Vec<StoredQuestionRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub async fn rows(&self) -> Vec<StoredQuestionRecord> {
    self.rows.read().await.clone()
  }
}

#[async_trait]
impl QuestionStore for MemoryStore {
  async fn insert(&self, record: &StoredQuestionRecord) -> Result<(), StoreError> {
    self.rows.write().await.push(record.clone());
    Ok(())
  }

  async fn summaries(&self) -> Result<Vec<QuestionSummary>, StoreError> {
    let rows = self.rows.read().await;
    Ok(rows
      .iter()
      .map(|r| QuestionSummary {
        category: r.category.clone(),
        difficulty: Some(r.difficulty.clone()),
        quality_score: Some(f64::from(r.quality_score)),
      })
      .collect())
  }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategoryStats {
  pub total: u64,
  pub by_difficulty: BTreeMap<String, u64>,
  pub avg_quality: f64,
}

/// Per-category totals and average quality. Rows without a score (or a zero score)
/// count toward totals but not the average.
pub fn aggregate_stats(rows: &[QuestionSummary]) -> BTreeMap<String, CategoryStats> {
  let mut stats: BTreeMap<String, CategoryStats> = BTreeMap::new();
  let mut quality: BTreeMap<&str, (f64, u64)> = BTreeMap::new();

  for row in rows {
    let entry = stats.entry(row.category.clone()).or_default();
    entry.total += 1;
    let diff = row.difficulty.clone().unwrap_or_else(|| "unknown".into());
    *entry.by_difficulty.entry(diff).or_insert(0) += 1;

    if let Some(score) = row.quality_score.filter(|s| *s != 0.0) {
      let q = quality.entry(row.category.as_str()).or_insert((0.0, 0));
      q.0 += score;
      q.1 += 1;
    }
  }

  for (cat, (sum, n)) in quality {
    if let Some(entry) = stats.get_mut(cat) {
      entry.avg_quality = sum / n as f64;
    }
  }
  stats
}
