//! Synchronous read façade over a store, plus background refresh.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use inventory_cache_sdk::{EntityId, InventoryError};

use crate::domain::entity::CacheEntity;
use crate::domain::repo::EntityRepository;
use crate::domain::store::EntityStore;

/// Allocation-light read service for one entity type. All lookups are
/// synchronous and served entirely from the in-memory store.
pub struct ReadService<E: CacheEntity> {
    store: Arc<EntityStore<E>>,
    repo: Arc<dyn EntityRepository<E>>,
}

impl<E: CacheEntity> ReadService<E> {
    #[must_use]
    pub fn new(repo: Arc<dyn EntityRepository<E>>, store: Arc<EntityStore<E>>) -> Self {
        Self { store, repo }
    }

    /// The underlying store, for typed per-entity lookups and event
    /// subscriptions.
    #[must_use]
    pub fn store(&self) -> &EntityStore<E> {
        &self.store
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<E> {
        self.store.get_active(id)
    }

    #[must_use]
    pub fn get_by_unique(&self, index: &'static str, value: &str) -> Option<E> {
        self.store.get_by_unique(index, value)
    }

    #[must_use]
    pub fn all_active(&self) -> Vec<E> {
        self.store.all_active()
    }

    #[must_use]
    pub fn all_deleted(&self) -> Vec<E> {
        self.store.all_deleted()
    }

    #[must_use]
    pub fn search(&self, term: &str) -> Vec<E> {
        self.store.search(term)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }

    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.store.deleted_count()
    }

    /// Warm or refresh the store from persistence, synchronously from the
    /// caller's perspective.
    ///
    /// # Errors
    /// The gateway error, if the active set could not be fetched.
    pub async fn load_store_cache(&self) -> Result<usize, InventoryError> {
        let entities = self.repo.get_all_active().await?;
        let count = entities.len();
        self.store.initialize(entities);
        info!(entity = E::KIND, count, "store cache initialized");
        Ok(count)
    }

    /// Fire-and-forget background refresh: re-fetch the active set and
    /// rebuild the store. Errors are logged, never surfaced — refresh is a
    /// consistency chore, not a user-facing action. The returned handle may
    /// be dropped.
    pub fn refresh_store_cache(&self) -> JoinHandle<()> {
        let repo = Arc::clone(&self.repo);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match repo.get_all_active().await {
                Ok(entities) => {
                    let count = entities.len();
                    store.initialize(entities);
                    info!(entity = E::KIND, count, "store cache refreshed");
                }
                Err(e) => {
                    error!(entity = E::KIND, error = %e, "store cache refresh failed");
                }
            }
        })
    }
}
