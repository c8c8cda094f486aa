//! Test doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::StoredQuestionRecord;
use crate::openai::{CompletionClient, CompletionError, CompletionParams};
use crate::prompt::PromptPair;
use crate::store::{QuestionStore, QuestionSummary, StoreError};

/// Completion client that replays canned replies in order and counts calls.
pub struct ScriptedCompletion {
  configured: bool,
  replies: Mutex<VecDeque<Result<String, CompletionError>>>,
  seen: Mutex<Vec<(PromptPair, CompletionParams)>>,
  calls: AtomicUsize,
}

impl ScriptedCompletion {
  pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
    Self {
      configured: true,
      replies: Mutex::new(replies.into()),
      seen: Mutex::new(Vec::new()),
      calls: AtomicUsize::new(0),
    }
  }

  pub fn unconfigured() -> Self {
    Self { configured: false, ..Self::new(Vec::new()) }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn seen(&self) -> Vec<(PromptPair, CompletionParams)> {
    self.seen.lock().unwrap().clone()
  }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
  fn is_configured(&self) -> bool {
    self.configured
  }

  async fn complete(&self, prompt: &PromptPair, params: &CompletionParams) -> Result<String, CompletionError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.seen.lock().unwrap().push((prompt.clone(), params.clone()));
    if !self.configured {
      return Err(CompletionError::Config);
    }
    self
      .replies
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(CompletionError::Network("no scripted reply left".into())))
  }
}

/// Store whose every operation fails, as an unreachable database would.
pub struct FailingStore;

#[async_trait]
impl QuestionStore for FailingStore {
  async fn insert(&self, _record: &StoredQuestionRecord) -> Result<(), StoreError> {
    Err(StoreError::Status { status: 503, body: "database unavailable".into() })
  }

  async fn summaries(&self) -> Result<Vec<QuestionSummary>, StoreError> {
    Err(StoreError::Status { status: 503, body: "database unavailable".into() })
  }
}
