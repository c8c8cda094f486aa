//! Brain Bee · Question Generation Backend
//!
//! - Axum HTTP API that turns corpus passages into validated multiple-choice questions
//! - Groq (OpenAI-compatible) chat completions for authoring and grading
//! - Optional Supabase persistence, in-memory otherwise
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables (a `.env` file is loaded first if present):
//!   PORT                      : u16 (default 5000)
//!   DATA_DIR                  : corpus directory of `<category>.txt` files (default "./data")
//!   PASSAGE_WINDOW_CHARS      : passage window length in characters (default 10000)
//!   GROQ_API_KEY              : required for generation
//!   GROQ_BASE_URL             : default "https://api.groq.com/openai/v1"
//!   GROQ_DEFAULT_MODEL        : authoring model (default "llama-3.1-8b-instant")
//!   GROQ_GRADER_MODEL         : grading model (default "llama-3.1-8b-instant")
//!   SUPABASE_URL              : enables persistence together with the key below
//!   SUPABASE_SERVICE_ROLE_KEY : service key sent as `apikey` and bearer token
//!   AGENT_CONFIG_PATH         : path to TOML prompt overrides
//!   LOG_LEVEL                 : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT                : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod error;
mod openai;
mod prompt;
mod passage;
mod parser;
mod shuffle;
mod evaluator;
mod store;
mod answer;
mod pipeline;
mod state;
mod protocol;
mod routes;
#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  // Missing .env is fine; real env vars win either way.
  dotenv::dotenv().ok();
  telemetry::init_tracing();

  let state = Arc::new(AppState::from_env()?);
  let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));

  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "brainbee", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "brainbee", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(target: "brainbee", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "brainbee", "Shutdown signal received");
}
