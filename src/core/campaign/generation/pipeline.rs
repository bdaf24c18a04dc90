//! Generation Pipeline
//!
//! Sequential asynchronous stage executor. Stages run strictly in ordinal
//! order even though they carry no data dependency on each other; the fixed
//! order exists to produce deterministic, monotonic progress reporting.
//!
//! State machine: `Idle → Running(stage) → Complete`, with a `Failed` terminal
//! reachable from `Running` after a stage exhausts its retries. A failed
//! pipeline can be reset back to `Idle` and restarted.
//!
//! After each stage completes, the accumulated [`GeneratedContent`] is merged
//! into the store, so stage *k*'s output is visible before stage *k+1* begins.
//! On completion the pipeline waits a brief fixed settle delay, then signals
//! the controller to auto-advance. Teardown while running cancels the task and
//! suppresses the in-flight stage's write-back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::core::campaign::draft::DraftPatch;
use crate::core::campaign::generation::copywriter::ContentGenerator;
use crate::core::campaign::store::CampaignStateStore;

// ============================================================================
// Stages
// ============================================================================

/// One unit of generation work. Fixed ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    AnalyzeInput,
    ProcessMedia,
    DraftCopyVariants,
    BuildVisualMockups,
    Finalize,
}

impl PipelineStage {
    /// The stage sequence, in execution order.
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::AnalyzeInput,
        PipelineStage::ProcessMedia,
        PipelineStage::DraftCopyVariants,
        PipelineStage::BuildVisualMockups,
        PipelineStage::Finalize,
    ];

    /// Stable stage name
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::AnalyzeInput => "analyze-input",
            PipelineStage::ProcessMedia => "process-media",
            PipelineStage::DraftCopyVariants => "draft-copy-variants",
            PipelineStage::BuildVisualMockups => "build-visual-mockups",
            PipelineStage::Finalize => "finalize",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::AnalyzeInput => "Analyzing listing input",
            PipelineStage::ProcessMedia => "Processing media",
            PipelineStage::DraftCopyVariants => "Drafting copy variants",
            PipelineStage::BuildVisualMockups => "Building visual mockups",
            PipelineStage::Finalize => "Finalizing campaign content",
        }
    }

    /// Zero-based position in the execution order
    pub fn ordinal(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .expect("stage present in ALL")
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-stage execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

/// A stage attempt failed. Retried up to the configured bound before the
/// pipeline surfaces `Failed`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StageError {
    #[error("stage failed: {0}")]
    Failed(String),

    #[error("stage exceeded its maximum wait bound")]
    TimedOut,
}

// ============================================================================
// Pipeline State
// ============================================================================

/// Overall pipeline state. Failure is a value the caller consumes, never a
/// panic or an exception-style propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Running { stage: PipelineStage },
    Complete,
    Failed { stage: PipelineStage, message: String },
}

impl PipelineState {
    pub fn is_running(&self) -> bool {
        matches!(self, PipelineState::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed { .. })
    }
}

/// Point-in-time view of pipeline progress, published on a watch channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub state: PipelineState,
    pub completed_stages: usize,
    pub total_stages: usize,
    pub stage_statuses: Vec<StageStatus>,
}

impl PipelineSnapshot {
    fn idle() -> Self {
        Self {
            state: PipelineState::Idle,
            completed_stages: 0,
            total_stages: PipelineStage::ALL.len(),
            stage_statuses: vec![StageStatus::Pending; PipelineStage::ALL.len()],
        }
    }

    /// Completed-stage fraction as a percentage. Monotonic over a run.
    pub fn progress(&self) -> f32 {
        if self.total_stages == 0 {
            return 100.0;
        }
        (self.completed_stages as f32 / self.total_stages as f32) * 100.0
    }

    /// Label of the stage at the running index, if any
    pub fn current_stage_label(&self) -> Option<&'static str> {
        match &self.state {
            PipelineState::Running { stage } => Some(stage.label()),
            _ => None,
        }
    }
}

/// Terminal notification delivered to the pipeline owner.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// All stages complete, content merged, settle delay elapsed.
    GenerationComplete,
    /// A stage exhausted its retries.
    GenerationFailed {
        stage: PipelineStage,
        message: String,
    },
}

// ============================================================================
// Configuration
// ============================================================================

/// Pipeline tunables. Defaults mirror `AppConfig`'s generation section.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Attempts per stage before the pipeline fails
    pub max_stage_attempts: u32,
    /// Maximum wait bound per stage attempt
    pub stage_timeout: Duration,
    /// Pause between completion and the auto-advance signal
    pub settle_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_stage_attempts: 3,
            stage_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(400),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Cancellable sequential stage executor for one wizard instance.
pub struct GenerationPipeline {
    generator: Arc<dyn ContentGenerator>,
    config: PipelineConfig,
    progress_tx: watch::Sender<PipelineSnapshot>,
    cancelled: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl GenerationPipeline {
    pub fn new(generator: Arc<dyn ContentGenerator>, config: PipelineConfig) -> Self {
        let (progress_tx, _) = watch::channel(PipelineSnapshot::idle());
        Self {
            generator,
            config,
            progress_tx,
            cancelled: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    /// Current progress snapshot
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.progress_tx.borrow().clone()
    }

    /// Subscribe to progress updates
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.progress_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.snapshot().state.is_running()
    }

    /// Reset a `Failed` pipeline back to `Idle` so it can be restarted.
    /// No-op in any other state.
    pub fn reset(&self) -> bool {
        let snapshot = self.snapshot();
        if matches!(snapshot.state, PipelineState::Failed { .. }) {
            self.progress_tx.send_replace(PipelineSnapshot::idle());
            true
        } else {
            false
        }
    }

    /// Start the stage sequence against `store`. Terminal events are sent on
    /// `events`. Returns false (and does nothing) unless the pipeline is
    /// `Idle`.
    pub fn start(
        &self,
        store: CampaignStateStore,
        events: mpsc::UnboundedSender<PipelineEvent>,
    ) -> bool {
        if self.snapshot().state != PipelineState::Idle {
            tracing::warn!("pipeline start refused: not idle");
            return false;
        }

        self.cancelled.store(false, Ordering::SeqCst);
        let generator = Arc::clone(&self.generator);
        let config = self.config.clone();
        let progress = self.progress_tx.clone();
        let cancelled = Arc::clone(&self.cancelled);

        let handle = tokio::spawn(async move {
            run_stages(generator, config, store, progress, cancelled, events).await;
        });
        *self.task.lock().expect("pipeline task lock poisoned") = Some(handle);
        true
    }

    /// Tear down a running pipeline. The in-flight stage's completion is
    /// suppressed: nothing further is written to the store and no terminal
    /// event is delivered.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self
            .task
            .lock()
            .expect("pipeline task lock poisoned")
            .take()
        {
            handle.abort();
            tracing::debug!("generation pipeline cancelled");
        }
    }
}

async fn run_stages(
    generator: Arc<dyn ContentGenerator>,
    config: PipelineConfig,
    store: CampaignStateStore,
    progress: watch::Sender<PipelineSnapshot>,
    cancelled: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<PipelineEvent>,
) {
    let mut snapshot = PipelineSnapshot::idle();
    let mut content = crate::core::campaign::draft::GeneratedContent::default();

    for (index, stage) in PipelineStage::ALL.into_iter().enumerate() {
        if cancelled.load(Ordering::SeqCst) {
            return;
        }

        snapshot.state = PipelineState::Running { stage };
        snapshot.stage_statuses[index] = StageStatus::Running;
        progress.send_replace(snapshot.clone());
        tracing::info!(stage = %stage, "pipeline stage started");

        let mut outcome: Result<_, StageError> = Err(StageError::Failed("not attempted".into()));
        for attempt in 1..=config.max_stage_attempts {
            if cancelled.load(Ordering::SeqCst) {
                return;
            }

            // Each stage sees the draft as left by every earlier stage merge
            let draft = store.get();
            let attempt_result = tokio::time::timeout(
                config.stage_timeout,
                generator.run_stage(stage, &draft, content.clone()),
            )
            .await;

            outcome = match attempt_result {
                Ok(Ok(updated)) => Ok(updated),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(StageError::TimedOut),
            };

            match &outcome {
                Ok(_) => break,
                Err(e) => {
                    tracing::warn!(
                        stage = %stage,
                        attempt,
                        max = config.max_stage_attempts,
                        error = %e,
                        "pipeline stage attempt failed"
                    );
                }
            }
        }

        match outcome {
            Ok(updated) => {
                content = updated;
                if cancelled.load(Ordering::SeqCst) {
                    // Teardown raced the stage: suppress the write-back
                    return;
                }
                // Stage output must be visible in the store before the next
                // stage starts
                store.merge(DraftPatch {
                    generated_copy: Some(content.clone()),
                    ..Default::default()
                });

                snapshot.stage_statuses[index] = StageStatus::Complete;
                snapshot.completed_stages = index + 1;
                progress.send_replace(snapshot.clone());
                tracing::info!(stage = %stage, progress = snapshot.progress(), "pipeline stage complete");
            }
            Err(e) => {
                snapshot.stage_statuses[index] = StageStatus::Failed;
                snapshot.state = PipelineState::Failed {
                    stage,
                    message: e.to_string(),
                };
                progress.send_replace(snapshot.clone());
                tracing::error!(stage = %stage, error = %e, "pipeline failed after retries");

                let _ = events.send(PipelineEvent::GenerationFailed {
                    stage,
                    message: e.to_string(),
                });
                return;
            }
        }
    }

    snapshot.state = PipelineState::Complete;
    progress.send_replace(snapshot.clone());

    // Brief settle before asking the controller to move on
    tokio::time::sleep(config.settle_delay).await;
    if !cancelled.load(Ordering::SeqCst) {
        let _ = events.send(PipelineEvent::GenerationComplete);
    }
}

// ============================================================================
// Tests
// ============================================================================
