//! In-memory persistence gateway.
//!
//! Reference implementation of [`EntityRepository`] and the test double the
//! module's own tests run against. Enforces the same rules a database
//! gateway must: it assigns identities, scopes uniqueness to the active
//! partition, and rejects a restore that would collide with a newer active
//! record — persistence rules on conflicts before the store is ever asked.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use time::OffsetDateTime;

use inventory_cache_sdk::{EntityId, InventoryError};

use crate::domain::entity::CacheEntity;
use crate::domain::repo::EntityRepository;
use crate::domain::store::{fold_key, StoreLayout};

/// Map-backed gateway for one entity type.
pub struct InMemoryRepository<E: CacheEntity> {
    records: RwLock<BTreeMap<EntityId, E>>,
    next_id: AtomicI64,
    layout: StoreLayout<E>,
}

impl<E: CacheEntity> InMemoryRepository<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            layout: E::layout(),
        }
    }

    /// Seed the gateway with existing records, advancing the id sequence
    /// past the highest seeded id.
    pub fn seed(&self, entities: Vec<E>) {
        let mut records = self.records.write();
        for entity in entities {
            let id = entity.id();
            self.next_id.fetch_max(id + 1, Ordering::SeqCst);
            records.insert(id, entity);
        }
    }

    /// First unique collision `entity`'s values would cause against the
    /// active records, ignoring `exclude`.
    fn conflict(
        &self,
        records: &BTreeMap<EntityId, E>,
        entity: &E,
        exclude: Option<EntityId>,
    ) -> Option<(&'static str, String)> {
        for def in &self.layout.unique {
            let Some(raw) = (def.key)(entity) else {
                continue;
            };
            let folded = fold_key(&raw);
            let taken = records.values().any(|other| {
                Some(other.id()) != exclude
                    && !other.is_deleted()
                    && (def.key)(other).is_some_and(|v| fold_key(&v) == folded)
            });
            if taken {
                return Some((def.name, raw));
            }
        }
        None
    }
}

impl<E: CacheEntity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: CacheEntity> EntityRepository<E> for InMemoryRepository<E> {
    async fn get_by_id(&self, id: EntityId) -> Result<Option<E>, InventoryError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn get_all_active(&self) -> Result<Vec<E>, InventoryError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|e| !e.is_deleted())
            .cloned()
            .collect())
    }

    async fn exists(&self, id: EntityId) -> Result<bool, InventoryError> {
        Ok(self.records.read().contains_key(&id))
    }

    async fn unique_exists(
        &self,
        field: &'static str,
        value: &str,
        exclude: Option<EntityId>,
    ) -> Result<bool, InventoryError> {
        let Some(def) = self.layout.unique.iter().find(|def| def.name == field) else {
            return Err(InventoryError::unexpected(format!(
                "unknown unique field '{field}' for {}",
                E::KIND
            )));
        };
        let folded = fold_key(value);
        Ok(self.records.read().values().any(|other| {
            Some(other.id()) != exclude
                && !other.is_deleted()
                && (def.key)(other).is_some_and(|v| fold_key(&v) == folded)
        }))
    }

    async fn create(&self, create: E::Create) -> Result<E, InventoryError> {
        let mut records = self.records.write();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let entity = E::from_create(id, &create, OffsetDateTime::now_utc());
        if let Some((field, value)) = self.conflict(&records, &entity, None) {
            return Err(InventoryError::duplicate_key(E::KIND, field, value));
        }
        records.insert(id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, InventoryError> {
        let mut records = self.records.write();
        let id = entity.id();
        if !records.contains_key(&id) {
            return Err(InventoryError::not_found(E::KIND, id));
        }
        if !entity.is_deleted() {
            if let Some((field, value)) = self.conflict(&records, &entity, Some(id)) {
                return Err(InventoryError::duplicate_key(E::KIND, field, value));
            }
        }
        records.insert(id, entity.clone());
        Ok(entity)
    }

    async fn soft_delete(&self, id: EntityId) -> Result<(), InventoryError> {
        let mut records = self.records.write();
        let Some(entity) = records.get_mut(&id) else {
            return Err(InventoryError::not_found(E::KIND, id));
        };
        if entity.is_deleted() {
            return Err(InventoryError::constraint(format!(
                "{} {id} is already soft-deleted",
                E::KIND
            )));
        }
        entity.mark_deleted(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn restore(&self, id: EntityId) -> Result<(), InventoryError> {
        let mut records = self.records.write();
        let Some(entity) = records.get(&id) else {
            return Err(InventoryError::not_found(E::KIND, id));
        };
        if !entity.is_deleted() {
            return Err(InventoryError::constraint(format!(
                "{} {id} is not soft-deleted",
                E::KIND
            )));
        }
        let mut restored = entity.clone();
        restored.mark_restored(OffsetDateTime::now_utc());
        if let Some((field, value)) = self.conflict(&records, &restored, Some(id)) {
            return Err(InventoryError::duplicate_key(E::KIND, field, value));
        }
        records.insert(id, restored);
        Ok(())
    }

    async fn hard_delete(&self, id: EntityId) -> Result<(), InventoryError> {
        let mut records = self.records.write();
        if records.remove(&id).is_none() {
            return Err(InventoryError::not_found(E::KIND, id));
        }
        Ok(())
    }
}
