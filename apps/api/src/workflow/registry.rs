//! Run registry and driver.
//!
//! Each run is one spawned driver task. The registry hands out watch
//! receivers for progress streaming, owns the cancellation token for each
//! run, and enforces the single-active-run rule per client session by
//! rejecting a second start rather than queueing it. Terminal snapshots stay
//! resident so a completed preview can be re-fetched without mutation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::activity;
use crate::ai_client::AiClient;
use crate::errors::AppError;
use crate::intake::document::UploadedDocument;
use crate::intake::job_description::JobDescriptionInput;
use crate::intake::tone::ToneSelection;
use crate::models::resume::GeneratedResume;
use crate::pipeline::ats::AtsScorer;
use crate::pipeline::{assemble, extract, optimizer, structure, text_cleaner};
use crate::workflow::run::{RunSnapshot, Stage};

/// Everything the driver task needs, cloned out of `AppState` at start time.
#[derive(Clone)]
pub struct RunContext {
    pub db: PgPool,
    pub ai: AiClient,
    pub scorer: Arc<dyn AtsScorer>,
    pub run_timeout: Duration,
}

/// A validated request to start a generation run.
pub struct StartRun {
    pub document: UploadedDocument,
    pub job_description: JobDescriptionInput,
    pub tone: ToneSelection,
    /// One page instance = one session. When present, at most one run may be
    /// active for it at a time.
    pub session: Option<Uuid>,
    pub user_email: Option<String>,
}

struct RunEntry {
    snapshot: watch::Receiver<RunSnapshot>,
    cancel: CancellationToken,
}

#[derive(Default)]
struct RegistryInner {
    runs: HashMap<Uuid, RunEntry>,
    active_sessions: HashMap<Uuid, Uuid>, // session -> run
}

#[derive(Clone, Default)]
pub struct RunRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run and spawns its driver. Rejects the start when the JD is
    /// empty or the session already has an active run; no state changes on
    /// rejection.
    pub fn start(&self, ctx: RunContext, input: StartRun) -> Result<RunSnapshot, AppError> {
        if input.job_description.is_empty() {
            return Err(AppError::Validation(
                "Please provide both a resume file and a job description".to_string(),
            ));
        }

        let run_id = Uuid::new_v4();
        let snapshot = RunSnapshot::started(run_id);
        let (tx, rx) = watch::channel(snapshot.clone());
        let cancel = CancellationToken::new();

        {
            let mut inner = lock(&self.inner);
            if let Some(session) = input.session {
                if inner.active_sessions.contains_key(&session) {
                    return Err(AppError::Validation(
                        "A generation run is already in progress for this session".to_string(),
                    ));
                }
                inner.active_sessions.insert(session, run_id);
            }
            inner.runs.insert(
                run_id,
                RunEntry {
                    snapshot: rx,
                    cancel: cancel.clone(),
                },
            );
        }

        info!(
            "Run {run_id}: started (document: {}, {} bytes, tone: {})",
            input.document.name,
            input.document.size(),
            input.tone.as_str()
        );
        spawn_driver(self.clone(), ctx, input, tx, cancel, run_id);

        Ok(snapshot)
    }

    pub fn snapshot(&self, run_id: Uuid) -> Option<RunSnapshot> {
        lock(&self.inner)
            .runs
            .get(&run_id)
            .map(|entry| entry.snapshot.borrow().clone())
    }

    /// Receiver for the run's progress events; the current snapshot is the
    /// initial value.
    pub fn subscribe(&self, run_id: Uuid) -> Option<watch::Receiver<RunSnapshot>> {
        lock(&self.inner)
            .runs
            .get(&run_id)
            .map(|entry| entry.snapshot.clone())
    }

    /// Requests cancellation. Returns false for unknown runs; cancelling a
    /// terminal run is a no-op.
    pub fn cancel(&self, run_id: Uuid) -> bool {
        match lock(&self.inner).runs.get(&run_id) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Releases the session slot once a run reaches a terminal state. The
    /// run entry itself stays resident for preview re-fetch.
    fn finish(&self, run_id: Uuid, session: Option<Uuid>) {
        if let Some(session) = session {
            let mut inner = lock(&self.inner);
            if inner.active_sessions.get(&session) == Some(&run_id) {
                inner.active_sessions.remove(&session);
            }
        }
    }
}

fn lock(inner: &Mutex<RegistryInner>) -> std::sync::MutexGuard<'_, RegistryInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// Driver
// ────────────────────────────────────────────────────────────────────────────

fn spawn_driver(
    registry: RunRegistry,
    ctx: RunContext,
    input: StartRun,
    tx: watch::Sender<RunSnapshot>,
    cancel: CancellationToken,
    run_id: Uuid,
) {
    tokio::spawn(async move {
        let session = input.session;

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err("generation canceled".to_string()),
            driven = tokio::time::timeout(ctx.run_timeout, drive(&ctx, input, &tx)) => {
                match driven {
                    Err(_) => Err(format!(
                        "generation timed out after {}s",
                        ctx.run_timeout.as_secs()
                    )),
                    Ok(Ok(resume)) => Ok(resume),
                    Ok(Err(e)) => Err(e.to_string()),
                }
            }
        };

        let current = tx.borrow().clone();
        match outcome {
            Ok(resume) => {
                info!(
                    "Run {run_id}: complete (ATS score {})",
                    resume.ats_score
                );
                tx.send_replace(current.completed(resume));
            }
            Err(reason) => {
                warn!("Run {run_id}: failed: {reason}");
                tx.send_replace(current.failed(reason));
            }
        }

        registry.finish(run_id, session);
    });
}

/// Runs the four pipeline stages, banking each checkpoint as the stage's
/// real work completes. No invented timers anywhere.
async fn drive(
    ctx: &RunContext,
    input: StartRun,
    tx: &watch::Sender<RunSnapshot>,
) -> Result<GeneratedResume, AppError> {
    let run_id = tx.borrow().run_id;

    // parsing
    let document = input.document.clone();
    let raw = tokio::task::spawn_blocking(move || extract::extract_text(&document))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;
    let resume_text = text_cleaner::clean_resume_text(&raw);
    if resume_text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the uploaded document".to_string(),
        ));
    }
    let outline = structure::outline_resume(&resume_text);
    info!("Run {run_id}: parsed {} chars", resume_text.len());
    advance(tx, Stage::Analyzing);

    // analyzing
    let jd_text = text_cleaner::clean_job_description(input.job_description.text());
    let job = structure::outline_job(&jd_text);
    let baseline = ctx.scorer.score(&resume_text, &jd_text).await?;
    info!(
        "Run {run_id}: baseline ATS score {}",
        baseline.overall_score
    );
    advance(tx, Stage::Optimizing);

    // optimizing
    let outcome = optimizer::optimize_resume(&ctx.ai, &resume_text, &jd_text, input.tone).await?;
    advance(tx, Stage::Generating);

    // generating
    let report = ctx.scorer.score(&outcome.optimized_text, &jd_text).await?;
    let resume = assemble::build_resume(&outline, &job, &outcome, &report, input.tone);

    if let Err(e) = record_success(
        &ctx.db,
        input.user_email.as_deref(),
        &resume,
        &resume_text,
        &jd_text,
    )
    .await
    {
        // Activity logging is cosmetic; never fail a finished run over it.
        warn!("Run {run_id}: failed to record generation: {e}");
    }

    Ok(resume)
}

fn advance(tx: &watch::Sender<RunSnapshot>, stage: Stage) {
    let next = tx.borrow().advanced(stage);
    tx.send_replace(next);
}

async fn record_success(
    db: &PgPool,
    user_email: Option<&str>,
    resume: &GeneratedResume,
    original_text: &str,
    jd_text: &str,
) -> anyhow::Result<()> {
    activity::insert_resume_cache(
        db,
        user_email,
        original_text,
        &resume.optimized_text,
        jd_text,
        resume.tone_applied.as_str(),
        resume.ats_score as i32,
    )
    .await?;

    if let Some(email) = user_email {
        activity::insert_activity(
            db,
            email,
            &resume.headline,
            Some(resume.ats_score as i32),
            "resume_generated",
        )
        .await?;
    }
    Ok(())
}
