//! Content Generation
//!
//! The sequential generation pipeline and the stock template copywriter it
//! drives. The [`copywriter::ContentGenerator`] trait is the seam for
//! swapping in a model-backed generator.

pub mod copywriter;
pub mod pipeline;

pub use copywriter::{ContentGenerator, Copywriter};
pub use pipeline::{
    GenerationPipeline, PipelineConfig, PipelineEvent, PipelineSnapshot, PipelineStage,
    PipelineState, StageError, StageStatus,
};
