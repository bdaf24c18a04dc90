//! Campaign Draft Types
//!
//! Defines the accumulating draft record built up across wizard steps:
//! - [`CampaignDraft`]: the canonical draft schema (single schema for every
//!   wizard entry point)
//! - [`DraftPatch`]: partial update applied through shallow last-write-wins merge
//! - [`GeneratedContent`]: generated marketing copy deposited by the pipeline
//! - [`CampaignRecord`]: the field contract handed to the persistence collaborator
//!
//! # Merge Semantics
//!
//! A patch only carries the fields the active step touched. Merging is shallow
//! and key-wise: a `Some` field replaces the draft's value wholesale (including
//! collection-valued and object-valued fields), a `None` field leaves the draft
//! untouched. A merge can never delete a previously set field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Marketing Materials
// ============================================================================

/// A marketing deliverable the user can select for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketingMaterial {
    /// Short-form posts for social channels
    SocialPosts,
    /// Email blast to a contact list
    EmailBlast,
    /// Single-property landing page
    LandingPage,
    /// Printable flyer / one-pager
    PrintFlyer,
    /// Script for a walkthrough video
    VideoScript,
}

impl MarketingMaterial {
    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            MarketingMaterial::SocialPosts => "Social Posts",
            MarketingMaterial::EmailBlast => "Email Blast",
            MarketingMaterial::LandingPage => "Landing Page",
            MarketingMaterial::PrintFlyer => "Print Flyer",
            MarketingMaterial::VideoScript => "Video Script",
        }
    }
}

// ============================================================================
// Generated Content
// ============================================================================

/// Generated marketing copy accumulated by the pipeline stages.
///
/// Variant lists hold alternative renditions the user picks from during review.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedContent {
    /// Headline variants
    pub headlines: Vec<String>,
    /// Sub-copy (subheadline) variants
    pub subheadlines: Vec<String>,
    /// Full-body copy variants
    pub body_variants: Vec<String>,
    /// Amenity-list variants (each entry is one ordered list)
    pub amenity_lists: Vec<Vec<String>>,
    /// Call-to-action variants
    pub calls_to_action: Vec<String>,
    /// Ready-to-post social copy
    pub social_posts: Vec<String>,
    /// Email subject line
    pub email_subject: String,
    /// Email body copy
    pub email_body: String,
    /// Landing page headline
    pub landing_headline: String,
    /// Landing page subheading
    pub landing_subheading: String,
    /// Long-form property description
    pub property_description: String,
    /// Mockup image URLs produced by the visual stage
    pub mockup_urls: Vec<String>,
}

impl GeneratedContent {
    /// Whether any stage has contributed content yet
    pub fn is_empty(&self) -> bool {
        self.headlines.is_empty()
            && self.subheadlines.is_empty()
            && self.body_variants.is_empty()
            && self.amenity_lists.is_empty()
            && self.calls_to_action.is_empty()
            && self.social_posts.is_empty()
            && self.email_subject.is_empty()
            && self.email_body.is_empty()
            && self.landing_headline.is_empty()
            && self.landing_subheading.is_empty()
            && self.property_description.is_empty()
            && self.mockup_urls.is_empty()
    }
}

// ============================================================================
// Campaign Draft
// ============================================================================

/// The accumulating draft record for one campaign.
///
/// `address` is the authoritative location field; earlier iterations carried a
/// parallel `property_address` shape which this schema deliberately collapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignDraft {
    // Identity / contact
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,

    // Property / location
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub property_type: Option<String>,

    // Numeric attributes
    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub year_built: Option<u32>,
    pub lot_size: Option<f64>,

    // Collections (replaced wholesale on merge)
    pub features: Vec<String>,
    pub keywords: Vec<String>,
    pub media_urls: Vec<String>,
    pub selected_materials: Vec<MarketingMaterial>,

    // Preference fields
    pub creative_style: String,
    pub tone: String,
    pub save_style: bool,
    pub save_tone: bool,
    pub save_materials: bool,

    // Pipeline output
    pub generated_copy: Option<GeneratedContent>,

    // Lifecycle timestamps (maintained by the store)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for CampaignDraft {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            agent_name: None,
            agent_email: None,
            agent_phone: None,
            address: None,
            city: None,
            state: None,
            zip: None,
            property_type: None,
            price: None,
            bedrooms: None,
            bathrooms: None,
            square_feet: None,
            year_built: None,
            lot_size: None,
            features: Vec::new(),
            keywords: Vec::new(),
            media_urls: Vec::new(),
            selected_materials: Vec::new(),
            creative_style: String::new(),
            tone: String::new(),
            save_style: false,
            save_tone: false,
            save_materials: false,
            generated_copy: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl CampaignDraft {
    /// Create a new empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a partial update in place. Shallow, key-wise, last-write-wins;
    /// a `None` patch field never clears a previously set value.
    pub fn apply(&mut self, patch: &DraftPatch) {
        macro_rules! set_if_some {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = &patch.$field {
                    self.$field = Some(v.clone());
                })*
            };
        }
        macro_rules! replace_if_some {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = &patch.$field {
                    self.$field = v.clone();
                })*
            };
        }

        set_if_some!(
            agent_name, agent_email, agent_phone, address, city, state, zip,
            property_type, price, bedrooms, bathrooms, square_feet, year_built,
            lot_size,
        );
        replace_if_some!(
            features, keywords, media_urls, selected_materials, creative_style,
            tone, save_style, save_tone, save_materials,
        );
        if let Some(copy) = &patch.generated_copy {
            self.generated_copy = Some(copy.clone());
        }
        self.updated_at = Utc::now();
    }

    /// Whether the draft has generated copy with at least one contribution
    pub fn has_generated_copy(&self) -> bool {
        self.generated_copy
            .as_ref()
            .map(|c| !c.is_empty())
            .unwrap_or(false)
    }
}

// ============================================================================
// Draft Patch
// ============================================================================

/// Partial update to a [`CampaignDraft`]. Every field is optional; only the
/// fields the active step touched are carried.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftPatch {
    pub agent_name: Option<String>,
    pub agent_email: Option<String>,
    pub agent_phone: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub property_type: Option<String>,

    pub price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub year_built: Option<u32>,
    pub lot_size: Option<f64>,

    pub features: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub media_urls: Option<Vec<String>>,
    pub selected_materials: Option<Vec<MarketingMaterial>>,

    pub creative_style: Option<String>,
    pub tone: Option<String>,
    pub save_style: Option<bool>,
    pub save_tone: Option<bool>,
    pub save_materials: Option<bool>,

    pub generated_copy: Option<GeneratedContent>,
}

impl DraftPatch {
    /// Whether the patch touches any preference field or opt-in flag.
    /// Used by the store to decide when a preference cache sync is due.
    pub fn touches_preferences(&self) -> bool {
        self.creative_style.is_some()
            || self.tone.is_some()
            || self.selected_materials.is_some()
            || self.save_style.is_some()
            || self.save_tone.is_some()
            || self.save_materials.is_some()
    }
}

// ============================================================================
// Campaign Record (submission contract)
// ============================================================================

/// Lifecycle status of a campaign record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Generating,
    Completed,
}

/// The record handed to the persistence collaborator on final submission.
/// Field set is the explicit external contract; missing required fields fail
/// record construction rather than submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub address: String,
    pub bedrooms: u32,
    pub bathrooms: f32,
    pub square_feet: u32,
    pub price: f64,
    pub property_type: String,
    pub year_built: Option<u32>,
    pub lot_size: Option<f64>,
    pub features: Vec<String>,
    pub keywords: Vec<String>,
    pub media_urls: Vec<String>,
    pub generated_copy: GeneratedContent,
    pub status: CampaignStatus,
}

/// A required record field was absent from the draft
#[derive(Debug, Clone, thiserror::Error)]
#[error("missing required field: {0}")]
pub struct MissingField(pub &'static str);

impl CampaignRecord {
    /// Build the submission record from a draft.
    pub fn from_draft(draft: &CampaignDraft, status: CampaignStatus) -> Result<Self, MissingField> {
        Ok(Self {
            address: draft.address.clone().ok_or(MissingField("address"))?,
            bedrooms: draft.bedrooms.ok_or(MissingField("bedrooms"))?,
            bathrooms: draft.bathrooms.ok_or(MissingField("bathrooms"))?,
            square_feet: draft.square_feet.ok_or(MissingField("square_feet"))?,
            price: draft.price.ok_or(MissingField("price"))?,
            property_type: draft
                .property_type
                .clone()
                .ok_or(MissingField("property_type"))?,
            year_built: draft.year_built,
            lot_size: draft.lot_size,
            features: draft.features.clone(),
            keywords: draft.keywords.clone(),
            media_urls: draft.media_urls.clone(),
            generated_copy: draft
                .generated_copy
                .clone()
                .ok_or(MissingField("generated_copy"))?,
            status,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_last_write_wins() {
        let mut draft = CampaignDraft::new();
        draft.apply(&DraftPatch {
            address: Some("123 Main St".to_string()),
            ..Default::default()
        });
        draft.apply(&DraftPatch {
            price: Some(500_000.0),
            ..Default::default()
        });

        // Both fields survive independent patches
        assert_eq!(draft.address.as_deref(), Some("123 Main St"));
        assert_eq!(draft.price, Some(500_000.0));

        // A later write replaces the earlier one
        draft.apply(&DraftPatch {
            address: Some("456 Oak Ave".to_string()),
            ..Default::default()
        });
        assert_eq!(draft.address.as_deref(), Some("456 Oak Ave"));
        assert_eq!(draft.price, Some(500_000.0));
    }

    #[test]
    fn test_apply_replaces_collections_wholesale() {
        let mut draft = CampaignDraft::new();
        draft.apply(&DraftPatch {
            features: Some(vec!["pool".to_string(), "garage".to_string()]),
            ..Default::default()
        });
        draft.apply(&DraftPatch {
            features: Some(vec!["solar".to_string()]),
            ..Default::default()
        });

        // No element-wise merging
        assert_eq!(draft.features, vec!["solar".to_string()]);
    }

    #[test]
    fn test_empty_patch_is_a_noop_on_values() {
        let mut draft = CampaignDraft::new();
        draft.apply(&DraftPatch {
            address: Some("123 Main St".to_string()),
            keywords: Some(vec!["cozy".to_string()]),
            ..Default::default()
        });
        let before = draft.clone();

        draft.apply(&DraftPatch::default());
        assert_eq!(draft.address, before.address);
        assert_eq!(draft.keywords, before.keywords);
    }

    #[test]
    fn test_touches_preferences() {
        assert!(!DraftPatch::default().touches_preferences());
        assert!(DraftPatch {
            save_style: Some(true),
            ..Default::default()
        }
        .touches_preferences());
        assert!(DraftPatch {
            tone: Some("warm".to_string()),
            ..Default::default()
        }
        .touches_preferences());
    }

    #[test]
    fn test_generated_content_is_empty() {
        let mut copy = GeneratedContent::default();
        assert!(copy.is_empty());
        copy.headlines.push("Stunning Craftsman".to_string());
        assert!(!copy.is_empty());
    }

    #[test]
    fn test_record_from_incomplete_draft() {
        let draft = CampaignDraft::new();
        let err = CampaignRecord::from_draft(&draft, CampaignStatus::Draft).unwrap_err();
        assert_eq!(err.0, "address");
    }

    #[test]
    fn test_record_from_complete_draft() {
        let mut draft = CampaignDraft::new();
        draft.apply(&DraftPatch {
            address: Some("123 Main St".to_string()),
            property_type: Some("Single-Family".to_string()),
            price: Some(500_000.0),
            bedrooms: Some(3),
            bathrooms: Some(2.0),
            square_feet: Some(1800),
            generated_copy: Some(GeneratedContent {
                headlines: vec!["Charming 3BR".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        });

        let record = CampaignRecord::from_draft(&draft, CampaignStatus::Completed).unwrap();
        assert_eq!(record.address, "123 Main St");
        assert_eq!(record.bedrooms, 3);
        assert_eq!(record.status, CampaignStatus::Completed);
        assert_eq!(record.generated_copy.headlines.len(), 1);
    }
}
