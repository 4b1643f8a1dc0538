use inventory_cache_sdk::{EntityId, InventoryError};
use time::OffsetDateTime;

use crate::domain::store::StoreLayout;

/// A value the store keeps normalized for a unique-field check: the index
/// name paired with the raw field value.
pub type UniqueValue = (&'static str, String);

/// Contract every cached entity type implements once; the generic store,
/// write service, and in-memory gateway are driven entirely by it.
///
/// Identity is assigned by persistence and handed to the cache — nothing in
/// this module ever mints an id.
pub trait CacheEntity: Clone + Send + Sync + 'static {
    /// Creation payload, without an id.
    type Create: Clone + Send + Sync + 'static;
    /// Partial-update payload; unset fields are left unchanged.
    type Patch: Clone + Send + Sync + 'static;

    /// Lowercase singular kind name used in logs and error messages.
    const KIND: &'static str;

    fn id(&self) -> EntityId;

    fn is_deleted(&self) -> bool;

    /// Stamp the record soft-deleted. Moves it to the deleted partition.
    fn mark_deleted(&mut self, at: OffsetDateTime);

    /// Clear the soft-delete stamp. Moves the record back to the active
    /// partition; the caller is responsible for re-checking uniqueness.
    fn mark_restored(&mut self, at: OffsetDateTime);

    /// Key the search results are ordered by (typically the display name).
    fn sort_key(&self) -> String;

    /// Fields `search` matches against, OR-combined.
    fn search_text(&self) -> Vec<&str>;

    /// Declarative index configuration for this entity's store.
    fn layout() -> StoreLayout<Self>;

    /// Structural validation of a creation payload.
    ///
    /// # Errors
    /// `InvalidInput` for missing required fields, `ValidationFailure` for
    /// out-of-range values.
    fn validate_create(create: &Self::Create) -> Result<(), InventoryError>;

    /// Structural validation of a patch.
    ///
    /// # Errors
    /// Same taxonomy as [`CacheEntity::validate_create`].
    fn validate_patch(patch: &Self::Patch) -> Result<(), InventoryError>;

    /// Cross-field validation of a fully merged record, run after a patch is
    /// applied and before it is persisted. Catches invariants a per-field
    /// patch check cannot see, such as a new maximum dropping below an
    /// unpatched minimum.
    ///
    /// # Errors
    /// `ValidationFailure` when the merged record breaks a cross-field rule.
    fn validate_record(&self) -> Result<(), InventoryError> {
        Ok(())
    }

    /// Unique-field values a creation payload will claim.
    fn create_unique_values(create: &Self::Create) -> Vec<UniqueValue>;

    /// Unique-field values a patch changes. Unchanged fields are omitted so
    /// a record never collides with itself.
    fn patch_unique_values(patch: &Self::Patch) -> Vec<UniqueValue>;

    /// Merge a patch into the current record, stamping `updated_at`.
    #[must_use]
    fn apply_patch(&self, patch: &Self::Patch, now: OffsetDateTime) -> Self;

    /// Hydrate a full record from a creation payload and the id assigned by
    /// persistence.
    fn from_create(id: EntityId, create: &Self::Create, now: OffsetDateTime) -> Self;
}
