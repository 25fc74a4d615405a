use std::sync::Arc;

use sqlx::PgPool;

use crate::ai_client::AiClient;
use crate::config::Config;
use crate::pipeline::ats::AtsScorer;
use crate::workflow::registry::{RunContext, RunRegistry};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub ai: AiClient,
    pub config: Config,
    /// Pluggable ATS scorer. Default: KeywordAtsScorer.
    pub ats_scorer: Arc<dyn AtsScorer>,
    /// In-process run registry; one active generation run per client session.
    pub runs: RunRegistry,
}

impl AppState {
    /// Everything a run driver needs, cloned out for the spawned task.
    pub fn run_context(&self) -> RunContext {
        RunContext {
            db: self.db.clone(),
            ai: self.ai.clone(),
            scorer: self.ats_scorer.clone(),
            run_timeout: self.config.run_timeout,
        }
    }
}
