//! Wizard Controller
//!
//! Drives step/phase navigation for one wizard instance: consults the
//! validation gate before advancing, derives progress and phase display data,
//! triggers the generation pipeline on entering the Generate step, and hands
//! the finished draft to the persistence collaborator at the Launch step.
//!
//! Navigation is disabled while the pipeline is running so user-driven merges
//! cannot race pipeline-driven merges. Gate failure is not an error: a refused
//! `advance()` simply returns false and the wizard stays put.

use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::core::campaign::draft::{CampaignDraft, CampaignRecord, CampaignStatus, DraftPatch};
use crate::core::campaign::gate::ValidationGate;
use crate::core::campaign::generation::pipeline::{
    GenerationPipeline, PipelineEvent, PipelineSnapshot, PipelineState,
};
use crate::core::campaign::store::CampaignStateStore;
use crate::core::campaign::submission::{
    CampaignRepository, IdentityProvider, MediaError, MediaTransport,
};
use crate::core::campaign::wizard::types::{SubmitError, WizardPhase, WizardStep, WizardSummary};

/// Orchestrates one wizard run from first step to submission.
pub struct WizardController {
    id: String,
    index: usize,
    store: CampaignStateStore,
    gate: ValidationGate,
    pipeline: GenerationPipeline,
    events_tx: mpsc::UnboundedSender<PipelineEvent>,
    events_rx: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl WizardController {
    pub fn new(
        store: CampaignStateStore,
        gate: ValidationGate,
        pipeline: GenerationPipeline,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            id: Uuid::new_v4().to_string(),
            index: 0,
            store,
            gate,
            pipeline,
            events_tx,
            events_rx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    // ------------------------------------------------------------------
    // Display data
    // ------------------------------------------------------------------

    /// The step at the current index
    pub fn current_step(&self) -> WizardStep {
        WizardStep::ALL[self.index]
    }

    /// Zero-based current step index
    pub fn step_index(&self) -> usize {
        self.index
    }

    pub fn total_steps(&self) -> usize {
        WizardStep::ALL.len()
    }

    /// `(index+1)/total × 100`. Non-decreasing with index, 100 at the last step.
    pub fn progress(&self) -> f32 {
        ((self.index + 1) as f32 / self.total_steps() as f32) * 100.0
    }

    /// Phase of the current step
    pub fn current_phase(&self) -> WizardPhase {
        self.current_step().phase()
    }

    /// 1-based position of the current step within its phase
    pub fn phase_local_position(&self) -> usize {
        let phase = self.current_phase();
        WizardStep::ALL
            .iter()
            .take(self.index + 1)
            .filter(|s| s.phase() == phase)
            .count()
    }

    /// Gate rules currently blocking the active step (display hint)
    pub fn blocking_requirements(&self) -> Vec<&'static str> {
        self.gate
            .failing_rules(self.current_step(), &self.store.get())
    }

    /// Lightweight snapshot for listing/resume surfaces
    pub fn summary(&self) -> WizardSummary {
        let draft = self.store.get();
        WizardSummary {
            id: self.id.clone(),
            address: draft.address.clone(),
            current_step: self.current_step(),
            progress_percent: self.progress(),
            created_at: draft.created_at.to_rfc3339(),
            updated_at: draft.updated_at.to_rfc3339(),
        }
    }

    // ------------------------------------------------------------------
    // Draft access
    // ------------------------------------------------------------------

    /// Snapshot of the accumulated draft
    pub fn draft(&self) -> CampaignDraft {
        self.store.get()
    }

    /// Merge a partial update from the active step into the draft.
    pub fn merge(&self, patch: DraftPatch) -> CampaignDraft {
        self.store.merge(patch)
    }

    /// Upload raw media through the transport collaborator and append the
    /// returned URL to the draft. The draft only ever stores URLs.
    pub async fn attach_media(
        &self,
        transport: &dyn MediaTransport,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<CampaignDraft, MediaError> {
        let url = transport.upload(filename, bytes).await?;
        let mut media_urls = self.store.get().media_urls;
        media_urls.push(url);
        Ok(self.store.merge(DraftPatch {
            media_urls: Some(media_urls),
            ..Default::default()
        }))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Whether `advance()` would currently succeed
    pub fn can_advance(&self) -> bool {
        !self.pipeline.is_running()
            && self.index + 1 < self.total_steps()
            && self.gate.is_satisfied(self.current_step(), &self.store.get())
    }

    /// Move to the next step if the gate holds and this is not the last step.
    /// Never errors; returns whether the index moved. Entering the Generate
    /// step starts the pipeline if content has not been generated yet.
    pub fn advance(&mut self) -> bool {
        if self.pipeline.is_running() {
            tracing::debug!("advance refused: pipeline running");
            return false;
        }
        if self.index + 1 >= self.total_steps() {
            return false;
        }
        let step = self.current_step();
        if !self.gate.is_satisfied(step, &self.store.get()) {
            tracing::debug!(step = %step, "advance refused: gate not satisfied");
            return false;
        }

        self.index += 1;
        tracing::info!(step = %self.current_step(), index = self.index, "advanced");

        if self.current_step() == WizardStep::Generate {
            self.maybe_start_generation();
        }
        true
    }

    /// Move to the previous step unless already first or the pipeline runs.
    pub fn retreat(&mut self) -> bool {
        if self.pipeline.is_running() {
            tracing::debug!("retreat refused: pipeline running");
            return false;
        }
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        tracing::info!(step = %self.current_step(), index = self.index, "retreated");
        true
    }

    /// Tear the wizard down, cancelling any in-flight generation. The draft
    /// is discarded with the controller.
    pub fn close(self) {
        self.pipeline.cancel();
    }

    // ------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------

    fn maybe_start_generation(&self) {
        if self.store.get().has_generated_copy() {
            // Re-entering the step after a completed run keeps the content
            return;
        }
        if self.pipeline.snapshot().state == PipelineState::Idle {
            self.pipeline
                .start(self.store.clone(), self.events_tx.clone());
        }
    }

    /// Restart a failed pipeline from Idle. Returns false unless the pipeline
    /// was in the Failed state.
    pub fn restart_generation(&self) -> bool {
        if !self.pipeline.reset() {
            return false;
        }
        self.pipeline
            .start(self.store.clone(), self.events_tx.clone())
    }

    /// Current pipeline progress
    pub fn generation(&self) -> PipelineSnapshot {
        self.pipeline.snapshot()
    }

    /// Subscribe to pipeline progress updates
    pub fn subscribe_generation(&self) -> watch::Receiver<PipelineSnapshot> {
        self.pipeline.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.pipeline.is_running()
    }

    /// Wait for the pipeline's terminal event. On success the controller
    /// auto-advances to the review step; on failure it stays on Generate so
    /// the caller can offer a restart. Only meaningful while on the Generate
    /// step with a started pipeline.
    pub async fn await_generation(&mut self) -> PipelineEvent {
        let event = self
            .events_rx
            .recv()
            .await
            .expect("controller holds a sender; channel cannot close");
        match &event {
            PipelineEvent::GenerationComplete => {
                if self.current_step() == WizardStep::Generate {
                    self.advance();
                }
            }
            PipelineEvent::GenerationFailed { stage, message } => {
                tracing::warn!(stage = %stage, message, "generation failed");
            }
        }
        event
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Hand the final draft to the persistence collaborator.
    ///
    /// Missing identity aborts the submission, returns control to the Review
    /// step, and leaves the draft untouched for a later retry. Persistence
    /// failure keeps the wizard at Launch so submission can be retried as-is.
    pub async fn submit(
        &mut self,
        identity: &dyn IdentityProvider,
        repository: &dyn CampaignRepository,
    ) -> Result<String, SubmitError> {
        let step = self.current_step();
        if step != WizardStep::Launch {
            return Err(SubmitError::WrongStep(step));
        }

        let record = CampaignRecord::from_draft(&self.store.get(), CampaignStatus::Completed)?;

        let user = match identity.current_user().await {
            Some(user) => user,
            None => {
                self.index = WizardStep::Review.ordinal();
                tracing::warn!("submission aborted: no authenticated user");
                return Err(SubmitError::AuthenticationRequired);
            }
        };

        match repository.create_campaign(&user, &record).await {
            Ok(id) => {
                tracing::info!(campaign_id = %id, "campaign launched");
                Ok(id)
            }
            Err(e) => {
                tracing::error!(error = %e, "campaign persistence failed");
                Err(SubmitError::Persistence(e.to_string()))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::draft::{GeneratedContent, MarketingMaterial};
    use crate::core::campaign::generation::copywriter::{ContentGenerator, Copywriter};
    use crate::core::campaign::generation::pipeline::{PipelineConfig, StageError, PipelineStage};
    use crate::core::campaign::submission::{
        MemoryCampaignRepository, RejectingRepository, StaticIdentity,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    fn fast_pipeline() -> GenerationPipeline {
        GenerationPipeline::new(
            Arc::new(Copywriter::new()),
            PipelineConfig {
                settle_delay: Duration::from_millis(1),
                ..Default::default()
            },
        )
    }

    fn controller() -> WizardController {
        WizardController::new(
            CampaignStateStore::new(),
            ValidationGate::standard(),
            fast_pipeline(),
        )
    }

    fn fill_property(ctrl: &WizardController) {
        ctrl.merge(DraftPatch {
            address: Some("123 Main St".to_string()),
            property_type: Some("Single-Family".to_string()),
            price: Some(500_000.0),
            bedrooms: Some(3),
            bathrooms: Some(2.0),
            square_feet: Some(1800),
            ..Default::default()
        });
    }

    #[tokio::test]
    async fn test_advance_gated_by_validation() {
        let mut ctrl = controller();
        assert_eq!(ctrl.current_step(), WizardStep::Basics);

        // Scenario A: nothing filled in, gate blocks
        assert!(!ctrl.advance());
        assert_eq!(ctrl.step_index(), 0);
        assert!(!ctrl.blocking_requirements().is_empty());

        // Scenario B: filled property fields unlock Basics and PropertyInfo
        fill_property(&ctrl);
        assert!(ctrl.advance());
        assert_eq!(ctrl.current_step(), WizardStep::PropertyInfo);
        assert!(ctrl.advance());
        assert_eq!(ctrl.current_step(), WizardStep::Features);
    }

    #[tokio::test]
    async fn test_retreat_boundaries() {
        let mut ctrl = controller();
        assert!(!ctrl.retreat());

        fill_property(&ctrl);
        assert!(ctrl.advance());
        assert!(ctrl.retreat());
        assert_eq!(ctrl.step_index(), 0);
        assert!(!ctrl.retreat());
    }

    #[tokio::test]
    async fn test_progress_monotone_and_complete() {
        let mut ctrl = WizardController::new(
            CampaignStateStore::new(),
            ValidationGate::permissive(),
            fast_pipeline(),
        );
        // Seed generated copy so entering Generate does not start a run
        ctrl.merge(DraftPatch {
            generated_copy: Some(GeneratedContent {
                headlines: vec!["x".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        });

        let mut last = ctrl.progress();
        while ctrl.advance() {
            let now = ctrl.progress();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(ctrl.current_step(), WizardStep::Launch);
        assert!((ctrl.progress() - 100.0).abs() < f32::EPSILON);

        // advance() at the last index is a no-op
        assert!(!ctrl.advance());
        assert_eq!(ctrl.current_step(), WizardStep::Launch);
    }

    #[tokio::test]
    async fn test_phase_display_data() {
        let mut ctrl = WizardController::new(
            CampaignStateStore::new(),
            ValidationGate::permissive(),
            fast_pipeline(),
        );
        assert_eq!(ctrl.current_phase(), WizardPhase::Property);
        assert_eq!(ctrl.phase_local_position(), 1);

        ctrl.advance(); // PropertyInfo
        assert_eq!(ctrl.phase_local_position(), 2);
        ctrl.advance(); // Features
        assert_eq!(ctrl.phase_local_position(), 3);
        ctrl.advance(); // Media: new phase resets local position
        assert_eq!(ctrl.current_phase(), WizardPhase::Presentation);
        assert_eq!(ctrl.phase_local_position(), 1);
    }

    #[tokio::test]
    async fn test_generation_runs_and_auto_advances() {
        let mut ctrl = controller();
        fill_property(&ctrl);
        ctrl.merge(DraftPatch {
            features: Some(vec!["pool".to_string()]),
            selected_materials: Some(vec![MarketingMaterial::SocialPosts]),
            ..Default::default()
        });

        // Walk to Generate; entering it starts the pipeline
        while ctrl.current_step() != WizardStep::Generate {
            assert!(ctrl.advance(), "stuck at {}", ctrl.current_step());
        }

        let event = ctrl.await_generation().await;
        assert_eq!(event, PipelineEvent::GenerationComplete);
        assert_eq!(ctrl.current_step(), WizardStep::Review);
        assert!(ctrl.draft().has_generated_copy());
    }

    #[tokio::test]
    async fn test_navigation_locked_while_generating() {
        struct Slow;

        #[async_trait]
        impl ContentGenerator for Slow {
            async fn run_stage(
                &self,
                _stage: PipelineStage,
                _draft: &CampaignDraft,
                content: GeneratedContent,
            ) -> Result<GeneratedContent, StageError> {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(content)
            }
        }

        let mut ctrl = WizardController::new(
            CampaignStateStore::new(),
            ValidationGate::permissive(),
            GenerationPipeline::new(
                Arc::new(Slow),
                PipelineConfig {
                    settle_delay: Duration::from_millis(1),
                    ..Default::default()
                },
            ),
        );

        while ctrl.current_step() != WizardStep::Generate {
            ctrl.advance();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(ctrl.is_generating());

        let index = ctrl.step_index();
        assert!(!ctrl.advance());
        assert!(!ctrl.retreat());
        assert_eq!(ctrl.step_index(), index);

        ctrl.close();
    }

    #[tokio::test]
    async fn test_review_edit_flows_back_into_store() {
        let mut ctrl = controller();
        fill_property(&ctrl);
        ctrl.merge(DraftPatch {
            selected_materials: Some(vec![MarketingMaterial::EmailBlast]),
            ..Default::default()
        });
        while ctrl.current_step() != WizardStep::Generate {
            ctrl.advance();
        }
        ctrl.await_generation().await;
        assert_eq!(ctrl.current_step(), WizardStep::Review);

        // User edits the generated copy during review
        let mut copy = ctrl.draft().generated_copy.unwrap();
        copy.headlines[0] = "Hand-polished headline".to_string();
        ctrl.merge(DraftPatch {
            generated_copy: Some(copy),
            ..Default::default()
        });

        let stored = ctrl.draft().generated_copy.unwrap();
        assert_eq!(stored.headlines[0], "Hand-polished headline");
    }

    async fn controller_at_launch() -> WizardController {
        let mut ctrl = controller();
        fill_property(&ctrl);
        ctrl.merge(DraftPatch {
            selected_materials: Some(vec![MarketingMaterial::LandingPage]),
            ..Default::default()
        });
        while ctrl.current_step() != WizardStep::Generate {
            ctrl.advance();
        }
        ctrl.await_generation().await;
        assert!(ctrl.advance()); // Review -> Launch
        ctrl
    }

    #[tokio::test]
    async fn test_submit_requires_identity_and_preserves_draft() {
        let mut ctrl = controller_at_launch().await;
        let draft_before = ctrl.draft();

        let err = ctrl
            .submit(&StaticIdentity::signed_out(), &MemoryCampaignRepository::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::AuthenticationRequired));

        // Control returns to Review; the draft survives for retry
        assert_eq!(ctrl.current_step(), WizardStep::Review);
        assert_eq!(ctrl.draft().address, draft_before.address);
        assert_eq!(ctrl.draft().generated_copy, draft_before.generated_copy);
    }

    #[tokio::test]
    async fn test_submit_persists_record() {
        let mut ctrl = controller_at_launch().await;
        let repo = MemoryCampaignRepository::new();

        let id = ctrl
            .submit(&StaticIdentity::signed_in("Jamie Agent"), &repo)
            .await
            .unwrap();

        let created = repo.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, id);
        assert_eq!(created[0].2.address, "123 Main St");
        assert_eq!(created[0].2.status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn test_submit_persistence_failure_is_retryable() {
        let mut ctrl = controller_at_launch().await;

        let err = ctrl
            .submit(&StaticIdentity::signed_in("Jamie Agent"), &RejectingRepository)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Persistence(_)));

        // Still at Launch: the same submission can simply be retried
        assert_eq!(ctrl.current_step(), WizardStep::Launch);
        let id = ctrl
            .submit(
                &StaticIdentity::signed_in("Jamie Agent"),
                &MemoryCampaignRepository::new(),
            )
            .await
            .unwrap();
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn test_submit_from_wrong_step() {
        let mut ctrl = controller();
        let err = ctrl
            .submit(
                &StaticIdentity::signed_in("Jamie Agent"),
                &MemoryCampaignRepository::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::WrongStep(WizardStep::Basics)));
    }

    #[tokio::test]
    async fn test_restart_after_failure() {
        struct FailsFirstRun {
            failures: std::sync::atomic::AtomicU32,
        }

        #[async_trait]
        impl ContentGenerator for FailsFirstRun {
            async fn run_stage(
                &self,
                _stage: PipelineStage,
                _draft: &CampaignDraft,
                content: GeneratedContent,
            ) -> Result<GeneratedContent, StageError> {
                use std::sync::atomic::Ordering;
                // First run: every attempt of the first stage fails
                if self.failures.fetch_add(1, Ordering::SeqCst) < 3 {
                    Err(StageError::Failed("cold start".to_string()))
                } else {
                    Ok(content)
                }
            }
        }

        let mut ctrl = WizardController::new(
            CampaignStateStore::new(),
            ValidationGate::permissive(),
            GenerationPipeline::new(
                Arc::new(FailsFirstRun {
                    failures: std::sync::atomic::AtomicU32::new(0),
                }),
                PipelineConfig {
                    settle_delay: Duration::from_millis(1),
                    ..Default::default()
                },
            ),
        );

        while ctrl.current_step() != WizardStep::Generate {
            ctrl.advance();
        }
        assert!(matches!(
            ctrl.await_generation().await,
            PipelineEvent::GenerationFailed { .. }
        ));
        assert_eq!(ctrl.current_step(), WizardStep::Generate);

        // Full pipeline restart from Idle succeeds
        assert!(ctrl.restart_generation());
        assert_eq!(
            ctrl.await_generation().await,
            PipelineEvent::GenerationComplete
        );
    }
}
