//! Application state: settings, prompts, and the long-lived external clients.
//!
//! Built once at startup and shared as `Arc<AppState>`. The completion client and the
//! question store are trait objects so tests can swap in fakes; both are safe to use
//! from concurrent requests without extra locking.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{load_agent_config_from_env, Prompts, Settings};
use crate::openai::{CompletionClient, OpenAI};
use crate::store::{MemoryStore, QuestionStore, SupabaseStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub prompts: Prompts,
    pub completion: Arc<dyn CompletionClient>,
    pub store: Arc<dyn QuestionStore>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        prompts: Prompts,
        completion: Arc<dyn CompletionClient>,
        store: Arc<dyn QuestionStore>,
    ) -> Self {
        Self { settings, prompts, completion, store }
    }

    /// Build state from env: settings, optional TOML prompts, completion client, store.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let settings = Settings::from_env();
        let prompts = load_agent_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let openai = OpenAI::new(&settings.completion)?;
        if openai.is_configured() {
            info!(target: "brainbee", base_url = %openai.base_url, author_model = %settings.completion.author_model, grader_model = %settings.completion.grader_model, "Completion service enabled.");
        } else {
            warn!(target: "brainbee", "GROQ_API_KEY not set; question generation will fail until it is configured.");
        }

        let store: Arc<dyn QuestionStore> = match &settings.supabase {
            Some(sb) => {
                let client = reqwest::Client::builder()
                    .timeout(settings.completion.timeout)
                    .build()?;
                info!(target: "brainbee", url = %sb.url, "Supabase question store enabled.");
                Arc::new(SupabaseStore::new(client, sb))
            }
            None => {
                warn!(target: "brainbee", "Supabase not configured; questions are kept in memory only.");
                Arc::new(MemoryStore::new())
            }
        };

        info!(target: "brainbee", data_dir = %settings.data_dir.display(), window_chars = settings.window_chars, "Corpus settings");
        Ok(Self::new(settings, prompts, Arc::new(openai), store))
    }
}
