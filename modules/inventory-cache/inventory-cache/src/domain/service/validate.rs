//! Business-rule checks delegated to persistence.
//!
//! Existence, soft-delete state, and uniqueness are always verified against
//! the gateway rather than the cache: persistence is authoritative and the
//! cache may be stale or not yet warmed, so checking it would race with the
//! caller's own writes.

use std::sync::Arc;

use inventory_cache_sdk::{EntityId, InventoryError};

use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::repo::EntityRepository;

/// Persistence-backed validation for one entity type.
pub struct Validator<E: CacheEntity> {
    repo: Arc<dyn EntityRepository<E>>,
}

impl<E: CacheEntity> Validator<E> {
    #[must_use]
    pub fn new(repo: Arc<dyn EntityRepository<E>>) -> Self {
        Self { repo }
    }

    /// Fetch the record, failing with `NotFound` if absent from both
    /// partitions.
    ///
    /// # Errors
    /// `NotFound`, or a gateway error.
    pub async fn ensure_exists(&self, id: EntityId) -> Result<E, InventoryError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| InventoryError::not_found(E::KIND, id))
    }

    /// Fetch the record and require it to be active.
    ///
    /// # Errors
    /// `NotFound` if absent, `ConstraintViolation` if soft-deleted.
    pub async fn ensure_active(&self, id: EntityId) -> Result<E, InventoryError> {
        let entity = self.ensure_exists(id).await?;
        if entity.is_deleted() {
            return Err(InventoryError::constraint(format!(
                "{} {id} is soft-deleted; restore it first",
                E::KIND
            )));
        }
        Ok(entity)
    }

    /// Fetch the record and require it to be soft-deleted.
    ///
    /// # Errors
    /// `NotFound` if absent, `ConstraintViolation` if active.
    pub async fn ensure_deleted(&self, id: EntityId) -> Result<E, InventoryError> {
        let entity = self.ensure_exists(id).await?;
        if !entity.is_deleted() {
            return Err(InventoryError::constraint(format!(
                "{} {id} is not soft-deleted",
                E::KIND
            )));
        }
        Ok(entity)
    }

    /// Require every given unique value to be unclaimed within the active
    /// partition, ignoring `exclude`.
    ///
    /// # Errors
    /// `DuplicateKey` naming the first colliding field.
    pub async fn ensure_unique(
        &self,
        values: &[UniqueValue],
        exclude: Option<EntityId>,
    ) -> Result<(), InventoryError> {
        for (field, value) in values {
            if self.repo.unique_exists(field, value, exclude).await? {
                return Err(InventoryError::duplicate_key(E::KIND, field, value.clone()));
            }
        }
        Ok(())
    }
}
