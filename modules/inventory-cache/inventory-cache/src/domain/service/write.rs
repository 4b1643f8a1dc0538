//! Write orchestration: the only component permitted to both write
//! persistence and mutate a store.
//!
//! Every operation follows the same protocol: structural input validation,
//! business validation against persistence, the persistence write, then the
//! store mutation — in that order, serialized per store by an exclusive
//! async gate so two racing writers can never interleave their
//! validate-then-mutate sequences.
//!
//! A store rejection *after* a successful persistence write does not fail
//! the operation: persistence is the source of truth and the store self-heals
//! on the next full refresh. The rejection is logged as a cache-consistency
//! warning, bounding the staleness window at "until the next explicit
//! refresh".

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use inventory_cache_sdk::{EntityId, InventoryError};

use crate::domain::entity::CacheEntity;
use crate::domain::repo::EntityRepository;
use crate::domain::service::validate::Validator;
use crate::domain::store::EntityStore;

/// Write service for one entity type.
pub struct WriteService<E: CacheEntity> {
    repo: Arc<dyn EntityRepository<E>>,
    store: Arc<EntityStore<E>>,
    validator: Validator<E>,
    /// Serializes every validate → persist → mutate sequence for this store.
    /// Held across awaits, so it must be the async mutex.
    write_gate: Mutex<()>,
}

impl<E: CacheEntity> WriteService<E> {
    #[must_use]
    pub fn new(repo: Arc<dyn EntityRepository<E>>, store: Arc<EntityStore<E>>) -> Self {
        let validator = Validator::new(Arc::clone(&repo));
        Self {
            repo,
            store,
            validator,
            write_gate: Mutex::new(()),
        }
    }

    /// Create a new entity: validate input, check uniqueness against
    /// persistence, persist (persistence assigns the id), then mirror into
    /// the store.
    ///
    /// # Errors
    /// `InvalidInput`/`ValidationFailure` from input validation,
    /// `DuplicateKey` from the uniqueness check, or a gateway error. A store
    /// rejection after a successful persist is *not* an error.
    #[instrument(skip_all, fields(entity = E::KIND))]
    pub async fn create(&self, create: E::Create) -> Result<E, InventoryError> {
        let _gate = self.write_gate.lock().await;

        E::validate_create(&create)?;
        self.validator
            .ensure_unique(&E::create_unique_values(&create), None)
            .await?;

        let entity = self.repo.create(create).await?;

        if self.store.insert(entity.clone()).is_none() {
            warn!(
                entity = E::KIND,
                id = entity.id(),
                "store rejected freshly persisted record; cache will self-heal on next refresh"
            );
        }
        info!(entity = E::KIND, id = entity.id(), "created");
        Ok(entity)
    }

    /// Update an active entity: fetch persisted state, merge the patch,
    /// persist, then mirror into the store.
    ///
    /// # Errors
    /// `NotFound` if absent, `ConstraintViolation` if the target is
    /// soft-deleted (restore it first), `InvalidInput`/`ValidationFailure`
    /// from patch validation, `DuplicateKey` from the uniqueness check.
    #[instrument(skip_all, fields(entity = E::KIND, id))]
    pub async fn update(&self, id: EntityId, patch: E::Patch) -> Result<E, InventoryError> {
        let _gate = self.write_gate.lock().await;

        let current = self.validator.ensure_active(id).await?;
        E::validate_patch(&patch)?;
        self.validator
            .ensure_unique(&E::patch_unique_values(&patch), Some(id))
            .await?;

        let merged = current.apply_patch(&patch, OffsetDateTime::now_utc());
        merged.validate_record()?;
        let persisted = self.repo.update(merged).await?;

        if self.store.update(persisted.clone()).is_none() {
            warn!(
                entity = E::KIND,
                id,
                "store rejected persisted update; cache will self-heal on next refresh"
            );
        }
        info!(entity = E::KIND, id, "updated");
        Ok(persisted)
    }

    /// Soft-delete an active entity, releasing its unique keys.
    ///
    /// # Errors
    /// `NotFound` if absent, `ConstraintViolation` if already deleted.
    #[instrument(skip_all, fields(entity = E::KIND, id))]
    pub async fn soft_delete(&self, id: EntityId) -> Result<(), InventoryError> {
        let _gate = self.write_gate.lock().await;
        self.soft_delete_locked(id).await
    }

    /// Restore a soft-deleted entity. Persistence rules on conflicts first,
    /// so the store is never asked to restore into a known collision.
    ///
    /// # Errors
    /// `NotFound` if absent, `ConstraintViolation` if not deleted,
    /// `DuplicateKey` if an active record claimed one of its unique values.
    #[instrument(skip_all, fields(entity = E::KIND, id))]
    pub async fn restore(&self, id: EntityId) -> Result<E, InventoryError> {
        let _gate = self.write_gate.lock().await;
        self.restore_locked(id).await
    }

    /// Permanently delete an entity from persistence and both cache
    /// partitions.
    ///
    /// # Errors
    /// `NotFound` if absent.
    #[instrument(skip_all, fields(entity = E::KIND, id))]
    pub async fn hard_delete(&self, id: EntityId) -> Result<(), InventoryError> {
        let _gate = self.write_gate.lock().await;

        self.validator.ensure_exists(id).await?;
        self.repo.hard_delete(id).await?;

        if !self.store.remove(id) {
            warn!(
                entity = E::KIND,
                id,
                "hard-deleted record was not cached; cache will self-heal on next refresh"
            );
        }
        info!(entity = E::KIND, id, "hard-deleted");
        Ok(())
    }

    /// Soft-delete a batch, best effort in input order. Individual failures
    /// do not stop the batch and successful items are not rolled back.
    ///
    /// # Errors
    /// `PartialFailure` aggregating every per-id failure message, if any.
    #[instrument(skip_all, fields(entity = E::KIND, count = ids.len()))]
    pub async fn bulk_soft_delete(&self, ids: &[EntityId]) -> Result<(), InventoryError> {
        let _gate = self.write_gate.lock().await;

        let mut failures = Vec::new();
        for &id in ids {
            if let Err(e) = self.soft_delete_locked(id).await {
                failures.push(format!("id {id}: {e}"));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(InventoryError::partial_failure(failures))
        }
    }

    /// Restore a batch, best effort in input order.
    ///
    /// # Errors
    /// `PartialFailure` aggregating every per-id failure message, if any.
    #[instrument(skip_all, fields(entity = E::KIND, count = ids.len()))]
    pub async fn bulk_restore(&self, ids: &[EntityId]) -> Result<(), InventoryError> {
        let _gate = self.write_gate.lock().await;

        let mut failures = Vec::new();
        for &id in ids {
            if let Err(e) = self.restore_locked(id).await {
                failures.push(format!("id {id}: {e}"));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(InventoryError::partial_failure(failures))
        }
    }

    async fn soft_delete_locked(&self, id: EntityId) -> Result<(), InventoryError> {
        self.validator.ensure_active(id).await?;
        self.repo.soft_delete(id).await?;

        if !self.store.soft_delete(id, OffsetDateTime::now_utc()) {
            warn!(
                entity = E::KIND,
                id,
                "store could not soft-delete record; cache will self-heal on next refresh"
            );
        }
        info!(entity = E::KIND, id, "soft-deleted");
        Ok(())
    }

    async fn restore_locked(&self, id: EntityId) -> Result<E, InventoryError> {
        let deleted = self.validator.ensure_deleted(id).await?;
        self.repo.restore(id).await?;

        match self.store.restore(id, OffsetDateTime::now_utc()) {
            Some(entity) => {
                info!(entity = E::KIND, id, "restored");
                Ok(entity)
            }
            None => {
                // Persistence accepted the restore, so this is purely a cache
                // divergence; report success and let the next refresh heal it.
                warn!(
                    entity = E::KIND,
                    id,
                    "store could not restore record; cache will self-heal on next refresh"
                );
                let mut restored = deleted;
                restored.mark_restored(OffsetDateTime::now_utc());
                Ok(restored)
            }
        }
    }
}
