//! Submission Collaborator Ports
//!
//! Trait seams for the collaborators the wizard core is decoupled from:
//! the persistent campaign store, the identity/session provider, and the
//! media transport. Each port ships an in-memory double used by tests and
//! the demo binary; production backends live outside this crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::campaign::draft::CampaignRecord;

// ============================================================================
// Identity
// ============================================================================

/// The acting user at the submission boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

/// Supplies the acting user's identity. Absence of an identity is only an
/// error at final submission, never earlier in the flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Option<UserIdentity>;
}

/// Fixed-identity double.
pub struct StaticIdentity(Option<UserIdentity>);

impl StaticIdentity {
    pub fn signed_in(display_name: &str) -> Self {
        Self(Some(UserIdentity {
            id: Uuid::new_v4().to_string(),
            display_name: display_name.to_string(),
            email: format!(
                "{}@example.com",
                display_name.to_lowercase().replace(' ', ".")
            ),
        }))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.0.clone()
    }
}

// ============================================================================
// Campaign Repository
// ============================================================================

/// The persistence collaborator rejected or could not take the record.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("record rejected: {0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Receives the final campaign record and returns a created-record id.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn create_campaign(
        &self,
        user: &UserIdentity,
        record: &CampaignRecord,
    ) -> Result<String, RepositoryError>;
}

/// In-memory repository double.
#[derive(Default, Clone)]
pub struct MemoryCampaignRepository {
    created: Arc<Mutex<Vec<(String, UserIdentity, CampaignRecord)>>>,
}

impl MemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records created so far, newest last.
    pub fn created(&self) -> Vec<(String, UserIdentity, CampaignRecord)> {
        self.created.lock().expect("repository lock poisoned").clone()
    }
}

#[async_trait]
impl CampaignRepository for MemoryCampaignRepository {
    async fn create_campaign(
        &self,
        user: &UserIdentity,
        record: &CampaignRecord,
    ) -> Result<String, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        self.created
            .lock()
            .expect("repository lock poisoned")
            .push((id.clone(), user.clone(), record.clone()));
        Ok(id)
    }
}

/// Repository double that refuses every record, for retry-path tests.
pub struct RejectingRepository;

#[async_trait]
impl CampaignRepository for RejectingRepository {
    async fn create_campaign(
        &self,
        _user: &UserIdentity,
        _record: &CampaignRecord,
    ) -> Result<String, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

// ============================================================================
// Media Transport
// ============================================================================

/// Media upload failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("media upload failed: {0}")]
pub struct MediaError(pub String);

/// Accepts raw media and returns a stable URL. The wizard core only ever
/// handles the returned URLs, never raw bytes.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, MediaError>;
}

/// Transport double that mints stable fake URLs.
#[derive(Default)]
pub struct FakeMediaTransport;

#[async_trait]
impl MediaTransport for FakeMediaTransport {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError("empty upload".to_string()));
        }
        Ok(format!("https://media.invalid/{}/{filename}", Uuid::new_v4()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::draft::{CampaignDraft, CampaignStatus, DraftPatch, GeneratedContent};

    fn sample_record() -> CampaignRecord {
        let mut draft = CampaignDraft::new();
        draft.apply(&DraftPatch {
            address: Some("123 Main St".to_string()),
            property_type: Some("Condo".to_string()),
            price: Some(350_000.0),
            bedrooms: Some(2),
            bathrooms: Some(1.0),
            square_feet: Some(950),
            generated_copy: Some(GeneratedContent::default()),
            ..Default::default()
        });
        CampaignRecord::from_draft(&draft, CampaignStatus::Completed).unwrap()
    }

    #[tokio::test]
    async fn test_memory_repository_returns_ids() {
        let repo = MemoryCampaignRepository::new();
        let user = StaticIdentity::signed_in("Jamie Agent")
            .current_user()
            .await
            .unwrap();

        let id = repo.create_campaign(&user, &sample_record()).await.unwrap();
        assert!(!id.is_empty());

        let created = repo.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, id);
        assert_eq!(created[0].2.address, "123 Main St");
    }

    #[tokio::test]
    async fn test_signed_out_identity() {
        assert!(StaticIdentity::signed_out().current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_fake_media_transport_urls() {
        let transport = FakeMediaTransport;
        let url = transport
            .upload("front.jpg", vec![0xFF, 0xD8])
            .await
            .unwrap();
        assert!(url.starts_with("https://media.invalid/"));
        assert!(url.ends_with("/front.jpg"));

        assert!(transport.upload("empty.jpg", Vec::new()).await.is_err());
    }
}
