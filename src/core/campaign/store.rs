//! Campaign State Store
//!
//! Holds the accumulating [`CampaignDraft`] for one wizard instance and is the
//! only mutation path for it. Reads hand out immutable snapshots; writes are
//! shallow partial merges.
//!
//! Single-writer discipline: the store is shared (cheaply clonable handle) so
//! the pipeline can write results back, but only the currently active step —
//! as determined by the controller — may call [`CampaignStateStore::merge`]
//! during interactive use. Navigation is locked while the pipeline runs, which
//! keeps user-driven and pipeline-driven merges from racing.
//!
//! When a merge touches a preference field or opt-in flag, the store kicks off
//! a fire-and-forget preference cache sync. Cache latency or failure never
//! blocks the merge or subsequent navigation.

use std::sync::{Arc, RwLock};

use crate::core::campaign::draft::{CampaignDraft, DraftPatch};
use crate::core::campaign::preferences::PreferenceCache;

/// Shared handle to the draft state for one wizard instance.
#[derive(Clone)]
pub struct CampaignStateStore {
    draft: Arc<RwLock<CampaignDraft>>,
    prefs: Option<PreferenceCache>,
}

impl CampaignStateStore {
    /// Store with no preference persistence.
    pub fn new() -> Self {
        Self {
            draft: Arc::new(RwLock::new(CampaignDraft::new())),
            prefs: None,
        }
    }

    /// Store that syncs whitelisted fields to `cache` on relevant merges.
    pub fn with_preferences(cache: PreferenceCache) -> Self {
        Self {
            draft: Arc::new(RwLock::new(CampaignDraft::new())),
            prefs: Some(cache),
        }
    }

    /// Seed a fresh draft from the cached preference profile, if the store
    /// carries a cache. Called once at wizard start.
    pub async fn hydrate(&self) {
        if let Some(cache) = &self.prefs {
            let profile = cache.load().await;
            if !profile.is_empty() {
                tracing::debug!("hydrating draft from cached preferences");
                self.draft
                    .write()
                    .expect("draft lock poisoned")
                    .apply(&profile.hydration_patch());
            }
        }
    }

    /// Immutable snapshot of the current draft.
    pub fn get(&self) -> CampaignDraft {
        self.draft.read().expect("draft lock poisoned").clone()
    }

    /// Shallow-merge `patch` into the draft and return the new snapshot.
    ///
    /// If the patch touches the preference whitelist or its opt-in flags, a
    /// cache sync is spawned in the background. Outside a tokio runtime the
    /// sync is skipped; persistence of preferences is best-effort by contract.
    pub fn merge(&self, patch: DraftPatch) -> CampaignDraft {
        let snapshot = {
            let mut draft = self.draft.write().expect("draft lock poisoned");
            draft.apply(&patch);
            draft.clone()
        };

        if patch.touches_preferences() {
            if let Some(cache) = self.prefs.clone() {
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        let draft = snapshot.clone();
                        handle.spawn(async move {
                            cache.sync_from_draft(&draft).await;
                        });
                    }
                    Err(_) => {
                        tracing::debug!("no async runtime, skipping preference sync");
                    }
                }
            }
        }

        snapshot
    }
}

impl Default for CampaignStateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryKv;
    use proptest::prelude::*;

    #[test]
    fn test_merge_accumulates_across_calls() {
        let store = CampaignStateStore::new();
        store.merge(DraftPatch {
            address: Some("123 Main St".to_string()),
            ..Default::default()
        });
        let snapshot = store.merge(DraftPatch {
            price: Some(500_000.0),
            ..Default::default()
        });

        assert_eq!(snapshot.address.as_deref(), Some("123 Main St"));
        assert_eq!(snapshot.price, Some(500_000.0));
    }

    #[test]
    fn test_get_returns_detached_snapshot() {
        let store = CampaignStateStore::new();
        let before = store.get();
        store.merge(DraftPatch {
            address: Some("123 Main St".to_string()),
            ..Default::default()
        });

        // The earlier snapshot is unaffected
        assert!(before.address.is_none());
        assert_eq!(store.get().address.as_deref(), Some("123 Main St"));
    }

    #[tokio::test]
    async fn test_preference_sync_on_flagged_merge() {
        let kv = Arc::new(MemoryKv::new());
        let cache = PreferenceCache::new(kv);
        let store = CampaignStateStore::with_preferences(cache.clone());

        store.merge(DraftPatch {
            creative_style: Some("modern".to_string()),
            save_style: Some(true),
            ..Default::default()
        });

        // Sync is fire-and-forget; let the spawned task run
        tokio::task::yield_now().await;
        let profile = cache.load().await;
        assert_eq!(profile.creative_style.as_deref(), Some("modern"));
    }

    #[tokio::test]
    async fn test_hydrate_seeds_fresh_draft() {
        // Scenario D: persist with the flag on, then start a fresh wizard
        let kv = Arc::new(MemoryKv::new());
        let cache = PreferenceCache::new(kv.clone());

        let first = CampaignStateStore::with_preferences(cache.clone());
        first.merge(DraftPatch {
            creative_style: Some("modern".to_string()),
            save_style: Some(true),
            ..Default::default()
        });
        tokio::task::yield_now().await;

        let fresh = CampaignStateStore::with_preferences(cache.clone());
        fresh.hydrate().await;
        assert_eq!(fresh.get().creative_style, "modern");

        // Repeat with the flag off: the next fresh draft gets the default
        first.merge(DraftPatch {
            save_style: Some(false),
            ..Default::default()
        });
        tokio::task::yield_now().await;

        let third = CampaignStateStore::with_preferences(cache);
        third.hydrate().await;
        assert_eq!(third.get().creative_style, "");
    }

    #[tokio::test]
    async fn test_dead_backend_never_blocks_merge() {
        let cache = PreferenceCache::new(Arc::new(MemoryKv::unavailable()));
        let store = CampaignStateStore::with_preferences(cache);
        store.hydrate().await;

        let snapshot = store.merge(DraftPatch {
            creative_style: Some("modern".to_string()),
            save_style: Some(true),
            ..Default::default()
        });
        assert_eq!(snapshot.creative_style, "modern");
    }

    proptest! {
        /// A merge never removes a previously set unrelated key, and the last
        /// write to any one key wins.
        #[test]
        fn prop_merge_never_deletes(
            addresses in proptest::collection::vec(
                proptest::option::of("[a-z]{1,8}"), 1..8),
            prices in proptest::collection::vec(
                proptest::option::of(1.0f64..1e7), 1..8),
        ) {
            let store = CampaignStateStore::new();
            let mut last_address = None;
            let mut last_price = None;

            for (address, price) in addresses.into_iter().zip(prices) {
                if address.is_some() {
                    last_address = address.clone();
                }
                if price.is_some() {
                    last_price = price;
                }
                store.merge(DraftPatch {
                    address,
                    price,
                    ..Default::default()
                });
            }

            let snapshot = store.get();
            prop_assert_eq!(snapshot.address, last_address);
            prop_assert_eq!(snapshot.price, last_price);
        }
    }
}
