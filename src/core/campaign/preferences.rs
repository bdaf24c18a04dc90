//! Preference Cache
//!
//! Opt-in persistence of a whitelisted subset of draft fields across sessions.
//! Backed by the generic [`KvStore`] port under a fixed namespace key; a dead
//! backend degrades to in-memory defaults and is never fatal.
//!
//! Whitelist (field ⇐ opt-in flag):
//! - `creative_style` ⇐ `save_style`
//! - `tone` ⇐ `save_tone`
//! - `selected_materials` ⇐ `save_materials`
//!
//! Each save overwrites the entire cached profile: a field whose flag is false
//! at save time reads back as absent on the next load, even if an earlier save
//! had stored it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::campaign::draft::{CampaignDraft, DraftPatch, MarketingMaterial};
use crate::core::storage::KvStore;

/// Namespace key the profile lives under in the key-value store
pub const PREFERENCES_KEY: &str = "listingpress.preferences";

/// The persisted subset of draft fields. Absent fields were not opted in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceProfile {
    pub creative_style: Option<String>,
    pub tone: Option<String>,
    pub selected_materials: Option<Vec<MarketingMaterial>>,
}

impl PreferenceProfile {
    /// Capture the persistable fields from a draft, honoring the opt-in flags
    /// as they stand at this moment.
    pub fn capture(draft: &CampaignDraft) -> Self {
        Self {
            creative_style: draft.save_style.then(|| draft.creative_style.clone()),
            tone: draft.save_tone.then(|| draft.tone.clone()),
            selected_materials: draft
                .save_materials
                .then(|| draft.selected_materials.clone()),
        }
    }

    /// Patch that seeds a fresh draft from this profile. Present fields also
    /// re-assert their opt-in flag so a hydrated wizard keeps persisting them.
    pub fn hydration_patch(&self) -> DraftPatch {
        DraftPatch {
            creative_style: self.creative_style.clone(),
            save_style: self.creative_style.is_some().then_some(true),
            tone: self.tone.clone(),
            save_tone: self.tone.is_some().then_some(true),
            selected_materials: self.selected_materials.clone(),
            save_materials: self.selected_materials.is_some().then_some(true),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.creative_style.is_none() && self.tone.is_none() && self.selected_materials.is_none()
    }
}

/// Durable, opt-in preference persistence over a key-value backend.
#[derive(Clone)]
pub struct PreferenceCache {
    kv: Arc<dyn KvStore>,
}

impl PreferenceCache {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Load the cached profile. Missing key, parse failure, and backend
    /// unavailability all yield an empty profile.
    pub async fn load(&self) -> PreferenceProfile {
        match self.kv.get(PREFERENCES_KEY).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(error = %e, "unreadable preference profile, using defaults");
                    PreferenceProfile::default()
                }
            },
            Ok(None) => PreferenceProfile::default(),
            Err(e) => {
                tracing::warn!(error = %e, "preference backend unavailable on load");
                PreferenceProfile::default()
            }
        }
    }

    /// Overwrite the entire stored profile. Backend failure is logged and
    /// swallowed; the wizard keeps running on in-memory state.
    pub async fn save(&self, profile: &PreferenceProfile) {
        let value = match serde_json::to_value(profile) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize preference profile");
                return;
            }
        };
        if let Err(e) = self.kv.set(PREFERENCES_KEY, value).await {
            tracing::warn!(error = %e, "preference backend unavailable on save");
        }
    }

    /// Capture-and-save from the current draft state.
    pub async fn sync_from_draft(&self, draft: &CampaignDraft) {
        self.save(&PreferenceProfile::capture(draft)).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
