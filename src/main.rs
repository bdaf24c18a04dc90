use std::sync::Arc;

use anyhow::Result;

use listingpress::config::AppConfig;
use listingpress::core::campaign::{
    CampaignStateStore, Copywriter, DraftPatch, FakeMediaTransport, GenerationPipeline,
    MarketingMaterial, MemoryCampaignRepository, PipelineEvent, PreferenceCache, StaticIdentity,
    ValidationGate, WizardController,
};
use listingpress::core::storage::JsonFileKv;

/// Scripted end-to-end wizard run: fills a sample listing, generates the
/// campaign content, and submits it through the in-memory collaborators.
#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = listingpress::core::logging::init();
    log::info!("{} v{} starting", listingpress::NAME, listingpress::VERSION);

    let config = AppConfig::load();

    let prefs = PreferenceCache::new(Arc::new(JsonFileKv::new(config.preferences_path())));
    let store = CampaignStateStore::with_preferences(prefs);
    store.hydrate().await;

    let pipeline = GenerationPipeline::new(Arc::new(Copywriter::new()), config.pipeline_config());
    let mut wizard = WizardController::new(store, ValidationGate::standard(), pipeline);

    // Phase 1: Property
    wizard.merge(DraftPatch {
        address: Some("123 Main St".to_string()),
        city: Some("Springfield".to_string()),
        property_type: Some("Single-Family".to_string()),
        ..Default::default()
    });
    step_forward(&mut wizard)?;

    wizard.merge(DraftPatch {
        price: Some(500_000.0),
        bedrooms: Some(3),
        bathrooms: Some(2.0),
        square_feet: Some(1800),
        year_built: Some(1995),
        lot_size: Some(0.25),
        ..Default::default()
    });
    step_forward(&mut wizard)?;

    wizard.merge(DraftPatch {
        features: Some(vec![
            "heated pool".to_string(),
            "chef's kitchen".to_string(),
            "two-car garage".to_string(),
        ]),
        keywords: Some(vec!["move-in ready".to_string(), "quiet street".to_string()]),
        ..Default::default()
    });
    step_forward(&mut wizard)?;

    // Phase 2: Presentation
    let transport = FakeMediaTransport;
    wizard
        .attach_media(&transport, "front-elevation.jpg", vec![0xFF, 0xD8])
        .await?;
    wizard
        .attach_media(&transport, "kitchen.jpg", vec![0xFF, 0xD8])
        .await?;
    step_forward(&mut wizard)?;

    wizard.merge(DraftPatch {
        creative_style: Some("modern".to_string()),
        tone: Some("warm".to_string()),
        save_style: Some(true),
        ..Default::default()
    });
    step_forward(&mut wizard)?;

    wizard.merge(DraftPatch {
        selected_materials: Some(vec![
            MarketingMaterial::SocialPosts,
            MarketingMaterial::EmailBlast,
            MarketingMaterial::LandingPage,
        ]),
        ..Default::default()
    });

    // Phase 3: entering Generate starts the pipeline
    step_forward(&mut wizard)?;

    let mut progress = wizard.subscribe_generation();
    let watcher = tokio::spawn(async move {
        loop {
            let snapshot = progress.borrow_and_update().clone();
            if let Some(label) = snapshot.current_stage_label() {
                println!("  [{:>3.0}%] {label}", snapshot.progress());
            }
            if snapshot.state.is_terminal() {
                println!("  [{:>3.0}%] done", snapshot.progress());
                break;
            }
            if progress.changed().await.is_err() {
                break;
            }
        }
    });

    match wizard.await_generation().await {
        PipelineEvent::GenerationComplete => {}
        PipelineEvent::GenerationFailed { stage, message } => {
            anyhow::bail!("generation failed at {stage}: {message}");
        }
    }
    let _ = watcher.await;

    // Review: keep the first headline, tweak the email subject
    let mut copy = wizard
        .draft()
        .generated_copy
        .expect("generation completed");
    copy.email_subject = format!("{} — open house Saturday", copy.email_subject);
    wizard.merge(DraftPatch {
        generated_copy: Some(copy),
        ..Default::default()
    });
    step_forward(&mut wizard)?;

    // Launch
    let identity = StaticIdentity::signed_in("Jamie Agent");
    let repository = MemoryCampaignRepository::new();
    let campaign_id = wizard.submit(&identity, &repository).await?;

    println!("Campaign created: {campaign_id}");
    Ok(())
}

fn step_forward(wizard: &mut WizardController) -> Result<()> {
    let from = wizard.current_step();
    if !wizard.advance() {
        anyhow::bail!(
            "blocked at {from}: {}",
            wizard.blocking_requirements().join(", ")
        );
    }
    println!(
        "phase {} step {} — {} ({:.0}%)",
        wizard.current_phase().number(),
        wizard.phase_local_position(),
        wizard.current_step().title(),
        wizard.progress()
    );
    Ok(())
}
