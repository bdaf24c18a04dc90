//! Campaign Module
//!
//! The wizard orchestration engine: draft accumulation, step validation,
//! preference persistence, content generation, and the controller that ties
//! them together.

pub mod draft;
pub mod gate;
pub mod generation;
pub mod preferences;
pub mod store;
pub mod submission;
pub mod wizard;

// Re-exports for convenience
pub use draft::{
    CampaignDraft, CampaignRecord, CampaignStatus, DraftPatch, GeneratedContent, MarketingMaterial,
};
pub use gate::{GateRule, ValidationGate};
pub use generation::{
    ContentGenerator, Copywriter, GenerationPipeline, PipelineConfig, PipelineEvent,
    PipelineSnapshot, PipelineStage, PipelineState,
};
pub use preferences::{PreferenceCache, PreferenceProfile, PREFERENCES_KEY};
pub use store::CampaignStateStore;
pub use submission::{
    CampaignRepository, FakeMediaTransport, IdentityProvider, MediaError, MediaTransport,
    MemoryCampaignRepository, RepositoryError, StaticIdentity, UserIdentity,
};
pub use wizard::{
    SubmitError, WizardController, WizardPhase, WizardStep, WizardSummary,
};
