//! Template Copywriter
//!
//! The stock [`ContentGenerator`] implementation: deterministic template-based
//! copy assembled from draft fields. Each pipeline stage contributes a named
//! slice of [`GeneratedContent`]; the port leaves room for a model-backed
//! generator with the same stage contract.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::core::campaign::draft::{CampaignDraft, GeneratedContent, MarketingMaterial};
use crate::core::campaign::generation::pipeline::{PipelineStage, StageError};

/// Produces one stage's contribution to the generated content.
///
/// Receives the accumulated content so far and returns it with this stage's
/// contribution added. Implementations must be side-effect free with respect
/// to the store; the pipeline owns all write-back.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn run_stage(
        &self,
        stage: PipelineStage,
        draft: &CampaignDraft,
        content: GeneratedContent,
    ) -> Result<GeneratedContent, StageError>;
}

/// Deterministic template-based generator.
#[derive(Debug, Clone, Default)]
pub struct Copywriter;

impl Copywriter {
    pub fn new() -> Self {
        Self
    }

    fn descriptor(draft: &CampaignDraft) -> String {
        let beds = draft.bedrooms.unwrap_or(0);
        let baths = draft.bathrooms.unwrap_or(0.0);
        let kind = draft.property_type.as_deref().unwrap_or("home");
        format!("{beds}-bed, {baths}-bath {kind}")
    }

    fn location(draft: &CampaignDraft) -> String {
        match (&draft.address, &draft.city) {
            (Some(address), Some(city)) => format!("{address}, {city}"),
            (Some(address), None) => address.clone(),
            (None, Some(city)) => city.clone(),
            (None, None) => "a sought-after location".to_string(),
        }
    }

    fn style_word(draft: &CampaignDraft) -> &str {
        if draft.creative_style.is_empty() {
            "inviting"
        } else {
            &draft.creative_style
        }
    }

    fn analyze_input(draft: &CampaignDraft, mut content: GeneratedContent) -> GeneratedContent {
        let descriptor = Self::descriptor(draft);
        let location = Self::location(draft);
        let mut description = format!(
            "Welcome to this {} {descriptor} at {location}.",
            Self::style_word(draft)
        );
        if let Some(sqft) = draft.square_feet {
            description.push_str(&format!(" Offering {sqft} square feet of living space"));
            if let Some(year) = draft.year_built {
                description.push_str(&format!(", built in {year}"));
            }
            description.push('.');
        }
        if !draft.features.is_empty() {
            description.push_str(&format!(" Highlights include {}.", draft.features.join(", ")));
        }
        content.property_description = description;
        content
    }

    fn process_media(draft: &CampaignDraft, mut content: GeneratedContent) -> GeneratedContent {
        // Amenity-list variants: full listing order, then a lead-with-best cut
        let full: Vec<String> = draft.features.clone();
        let mut prioritized = full.clone();
        prioritized.sort_by_key(|f| std::cmp::Reverse(f.len()));
        prioritized.truncate(5);

        let fallback = || vec![format!("{} living", Self::style_word(draft))];
        content.amenity_lists = vec![
            if full.is_empty() { fallback() } else { full },
            if prioritized.is_empty() {
                fallback()
            } else {
                prioritized
            },
        ];
        content
    }

    fn draft_copy(draft: &CampaignDraft, mut content: GeneratedContent) -> GeneratedContent {
        let descriptor = Self::descriptor(draft);
        let location = Self::location(draft);
        let style = Self::style_word(draft).to_string();

        content.headlines = vec![
            format!("Your Next Chapter Starts at {location}"),
            format!("A {style} {descriptor} You Have to See"),
            format!("Just Listed: {descriptor} in {location}"),
        ];
        content.subheadlines = vec![
            format!("Every detail of this {descriptor} was made to impress."),
            format!("Space, comfort, and character in {location}."),
            format!("The {style} lifestyle you have been waiting for."),
        ];
        content.body_variants = vec![
            format!(
                "{} Schedule a private tour and see why this one will not last.",
                content.property_description
            ),
            format!(
                "Set in {location}, this {descriptor} blends everyday comfort with \
                 standout features. {}",
                if draft.keywords.is_empty() {
                    "Come experience it in person.".to_string()
                } else {
                    format!("Buyers searching for {} will feel at home.", draft.keywords.join(", "))
                }
            ),
        ];
        content.calls_to_action = vec![
            "Book your private showing today".to_string(),
            "Ask for the full feature sheet".to_string(),
            format!("See {location} in person this weekend"),
        ];
        content
    }

    fn build_mockups(draft: &CampaignDraft, mut content: GeneratedContent) -> GeneratedContent {
        let descriptor = Self::descriptor(draft);
        let location = Self::location(draft);

        // One mockup URL per listing photo, per selected visual material
        let mut mockups = Vec::new();
        for url in &draft.media_urls {
            for material in &draft.selected_materials {
                if matches!(
                    material,
                    MarketingMaterial::SocialPosts
                        | MarketingMaterial::LandingPage
                        | MarketingMaterial::PrintFlyer
                ) {
                    mockups.push(format!("{url}#mockup-{}", material.label().to_lowercase().replace(' ', "-")));
                }
            }
        }
        content.mockup_urls = mockups;

        content.social_posts = vec![
            format!("Just listed! {descriptor} in {location}. DM for a tour. #justlisted"),
            format!(
                "Open house alert: come see this {} {descriptor} at {location}. #realestate",
                Self::style_word(draft)
            ),
        ];
        content.landing_headline = format!("{descriptor} in {location}");
        content.landing_subheading = content
            .subheadlines
            .first()
            .cloned()
            .unwrap_or_else(|| format!("A {} place to call home.", Self::style_word(draft)));
        content
    }

    fn finalize(draft: &CampaignDraft, mut content: GeneratedContent) -> GeneratedContent {
        let descriptor = Self::descriptor(draft);
        let location = Self::location(draft);

        content.email_subject = format!("New on the market: {descriptor} in {location}");
        content.email_body = format!(
            "Hi there,\n\nI wanted you to be among the first to see this listing. \
             {}\n\n{}\n\nReply to this email to arrange a showing.",
            content.property_description,
            content
                .calls_to_action
                .choose(&mut rand::thread_rng())
                .cloned()
                .unwrap_or_else(|| "Book your private showing today".to_string()),
        );

        // No empty variant lists leave the pipeline
        if content.headlines.is_empty() {
            content.headlines.push(format!("Just Listed in {location}"));
        }
        content
    }
}

#[async_trait]
impl ContentGenerator for Copywriter {
    async fn run_stage(
        &self,
        stage: PipelineStage,
        draft: &CampaignDraft,
        content: GeneratedContent,
    ) -> Result<GeneratedContent, StageError> {
        Ok(match stage {
            PipelineStage::AnalyzeInput => Self::analyze_input(draft, content),
            PipelineStage::ProcessMedia => Self::process_media(draft, content),
            PipelineStage::DraftCopyVariants => Self::draft_copy(draft, content),
            PipelineStage::BuildVisualMockups => Self::build_mockups(draft, content),
            PipelineStage::Finalize => Self::finalize(draft, content),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
