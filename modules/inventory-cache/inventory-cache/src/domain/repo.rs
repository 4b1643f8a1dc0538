//! Persistence gateway port.
//!
//! Persistence is the single source of truth; the stores are read-optimized
//! mirrors. All methods are async — repository calls are the only suspension
//! points in the subsystem — and report expected business conditions as
//! [`InventoryError`] values, never as panics.

use async_trait::async_trait;

use inventory_cache_sdk::{EntityId, InventoryError};

use crate::domain::entity::CacheEntity;

/// Async repository interface for one entity type.
#[async_trait]
pub trait EntityRepository<E: CacheEntity>: Send + Sync {
    /// Fetch a record from either partition.
    ///
    /// # Errors
    /// `UnexpectedError` on gateway failure.
    async fn get_by_id(&self, id: EntityId) -> Result<Option<E>, InventoryError>;

    /// Fetch the complete active partition. Used by cache warm-up and
    /// refresh.
    ///
    /// # Errors
    /// `UnexpectedError` on gateway failure.
    async fn get_all_active(&self) -> Result<Vec<E>, InventoryError>;

    /// Whether a record with this id exists in either partition.
    ///
    /// # Errors
    /// `UnexpectedError` on gateway failure.
    async fn exists(&self, id: EntityId) -> Result<bool, InventoryError>;

    /// Whether `value` is claimed for `field` by an active record other than
    /// `exclude`. Soft-deleted records never block a uniqueness check.
    ///
    /// # Errors
    /// `UnexpectedError` on gateway failure.
    async fn unique_exists(
        &self,
        field: &'static str,
        value: &str,
        exclude: Option<EntityId>,
    ) -> Result<bool, InventoryError>;

    /// Persist a new record, assigning its id.
    ///
    /// # Errors
    /// `DuplicateKey` on a unique collision, `UnexpectedError` otherwise.
    async fn create(&self, create: E::Create) -> Result<E, InventoryError>;

    /// Persist a full replacement revision of an existing record.
    ///
    /// # Errors
    /// `NotFound` if absent, `DuplicateKey` on a unique collision.
    async fn update(&self, entity: E) -> Result<E, InventoryError>;

    /// Mark a record soft-deleted.
    ///
    /// # Errors
    /// `NotFound` if absent, `ConstraintViolation` if already deleted.
    async fn soft_delete(&self, id: EntityId) -> Result<(), InventoryError>;

    /// Clear a record's soft-delete mark. Must reject the restore with
    /// `DuplicateKey` if an active record has since claimed one of its
    /// unique values — the store is never asked to restore into a conflict
    /// persistence already rejected.
    ///
    /// # Errors
    /// `NotFound`, `ConstraintViolation` if not deleted, `DuplicateKey` on
    /// conflict.
    async fn restore(&self, id: EntityId) -> Result<(), InventoryError>;

    /// Remove a record permanently.
    ///
    /// # Errors
    /// `NotFound` if absent.
    async fn hard_delete(&self, id: EntityId) -> Result<(), InventoryError>;
}
