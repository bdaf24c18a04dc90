//! Wizard Domain Types
//!
//! The fixed step sequence for campaign creation, its phase grouping, and the
//! wizard error taxonomy.
//!
//! # Steps and Phases
//!
//! Steps run in a fixed order with strictly increasing ordinals. Phases are a
//! display-level grouping of consecutive steps only — they never gate
//! navigation:
//!
//! 1. Property — Basics, PropertyInfo, Features
//! 2. Presentation — Media, Style, Materials
//! 3. Campaign — Generate, Review, Launch

use serde::{Deserialize, Serialize};

// ============================================================================
// Steps
// ============================================================================

/// One discrete unit of input collection or review within the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Address and property type
    Basics,
    /// Price, bedrooms, bathrooms, square footage, year built, lot size
    PropertyInfo,
    /// Feature and keyword collection
    Features,
    /// Listing media URLs
    Media,
    /// Creative style, tone, and save opt-ins
    Style,
    /// Marketing material selection
    Materials,
    /// Content generation (pipeline runs here)
    Generate,
    /// Review and edit generated content
    Review,
    /// Final submission
    Launch,
}

impl WizardStep {
    /// The full step sequence, in ordinal order.
    pub const ALL: [WizardStep; 9] = [
        WizardStep::Basics,
        WizardStep::PropertyInfo,
        WizardStep::Features,
        WizardStep::Media,
        WizardStep::Style,
        WizardStep::Materials,
        WizardStep::Generate,
        WizardStep::Review,
        WizardStep::Launch,
    ];

    /// Stable string identifier
    pub fn id(&self) -> &'static str {
        match self {
            WizardStep::Basics => "basics",
            WizardStep::PropertyInfo => "property_info",
            WizardStep::Features => "features",
            WizardStep::Media => "media",
            WizardStep::Style => "style",
            WizardStep::Materials => "materials",
            WizardStep::Generate => "generate",
            WizardStep::Review => "review",
            WizardStep::Launch => "launch",
        }
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Basics => "Property Basics",
            WizardStep::PropertyInfo => "Property Details",
            WizardStep::Features => "Features & Keywords",
            WizardStep::Media => "Listing Media",
            WizardStep::Style => "Style & Tone",
            WizardStep::Materials => "Marketing Materials",
            WizardStep::Generate => "Generate Content",
            WizardStep::Review => "Review & Edit",
            WizardStep::Launch => "Launch Campaign",
        }
    }

    /// Display phase this step belongs to
    pub fn phase(&self) -> WizardPhase {
        match self {
            WizardStep::Basics | WizardStep::PropertyInfo | WizardStep::Features => {
                WizardPhase::Property
            }
            WizardStep::Media | WizardStep::Style | WizardStep::Materials => {
                WizardPhase::Presentation
            }
            WizardStep::Generate | WizardStep::Review | WizardStep::Launch => WizardPhase::Campaign,
        }
    }

    /// Zero-based position in the full step sequence. Strictly increasing.
    pub fn ordinal(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .expect("step present in ALL")
    }

    /// The following step, if any
    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.ordinal() + 1).copied()
    }

    /// The preceding step, if any
    pub fn previous(&self) -> Option<WizardStep> {
        self.ordinal().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// Phases
// ============================================================================

/// Display-level grouping of consecutive steps. Not a control boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Property,
    Presentation,
    Campaign,
}

impl WizardPhase {
    /// 1-based phase number for display
    pub fn number(&self) -> u8 {
        match self {
            WizardPhase::Property => 1,
            WizardPhase::Presentation => 2,
            WizardPhase::Campaign => 3,
        }
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            WizardPhase::Property => "Property",
            WizardPhase::Presentation => "Presentation",
            WizardPhase::Campaign => "Campaign",
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Lightweight wizard snapshot for listing/resume surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSummary {
    pub id: String,
    pub address: Option<String>,
    pub current_step: WizardStep,
    pub progress_percent: f32,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors from the submission boundary. Everything earlier in the flow is
/// represented as state (gate booleans, pipeline status), not errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    /// No authenticated identity at the submission boundary. The draft is
    /// preserved and control returns to the review step.
    #[error("authentication required to launch a campaign")]
    AuthenticationRequired,

    /// The persistence collaborator rejected the record. Retryable.
    #[error("campaign persistence failed: {0}")]
    Persistence(String),

    /// The draft is missing a field the record contract requires.
    #[error("draft incomplete: {0}")]
    Incomplete(#[from] crate::core::campaign::draft::MissingField),

    /// Submission is only valid from the final step.
    #[error("submission attempted from step {0}, not the launch step")]
    WrongStep(WizardStep),
}

// ============================================================================
// Tests
// ============================================================================
