//! The generic indexed store: an authoritative in-memory mirror of one
//! entity type, partitioned by soft-delete state.
//!
//! One primary map holds both partitions; the record's `is_deleted` tag is
//! the partition. Uniqueness and group indexes cover the active partition
//! only, which is what lets a soft-deleted record release its SKU/email/name
//! for new active records.
//!
//! Business conflicts (duplicate key, not found) are signalled by
//! `None`/`false` returns, never by panicking — the write service has already
//! validated against persistence and treats a store rejection as a
//! cache-consistency warning. The store only panics on true referential
//! corruption: an index entry pointing at a record the primary map does not
//! hold.
//!
//! All state sits behind a single `parking_lot::RwLock`, so every mutation is
//! atomic from a reader's perspective and events are published in mutation
//! order (the lock is held across the publish). Store operations never block
//! on I/O and never suspend.

mod index;

use std::collections::HashMap;

use parking_lot::RwLock;
use time::OffsetDateTime;
use tokio::sync::broadcast;

use inventory_cache_sdk::EntityId;

pub use index::{fold_key, GroupIndexDef, StoreLayout, UniqueIndexDef};

use crate::domain::entity::CacheEntity;
use crate::domain::events::{EventBus, StoreEvent};
use index::IndexSet;

struct StoreState<E: CacheEntity> {
    records: HashMap<EntityId, E>,
    indexes: IndexSet<E>,
    layout: StoreLayout<E>,
}

/// In-memory indexed store for one entity type.
pub struct EntityStore<E: CacheEntity> {
    state: RwLock<StoreState<E>>,
    events: EventBus<E>,
}

impl<E: CacheEntity> EntityStore<E> {
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        let layout = E::layout();
        Self {
            state: RwLock::new(StoreState {
                records: HashMap::new(),
                indexes: IndexSet::new(&layout),
                layout,
            }),
            events: EventBus::new(event_capacity),
        }
    }

    /// Subscribe to this store's change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent<E>> {
        self.events.subscribe()
    }

    /// Replace the entire store content, rebuilding every index from
    /// scratch. Not incremental; used at startup and on forced refresh.
    /// Emits no events — subscribers resynchronize by re-reading.
    pub fn initialize(&self, entities: Vec<E>) {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.records.clear();
        state.indexes.clear();
        for entity in entities {
            if !entity.is_deleted() {
                if let Some((field, value)) =
                    state.indexes.unique_conflict(&state.layout, &entity, None)
                {
                    tracing::warn!(
                        entity = E::KIND,
                        id = entity.id(),
                        field,
                        value,
                        "skipping record with duplicate unique key during initialize"
                    );
                    continue;
                }
                state.indexes.add(&state.layout, &entity);
            }
            state.records.insert(entity.id(), entity);
        }
    }

    /// Insert a freshly created active entity. The id was assigned by
    /// persistence. Returns `None` on an id or unique-key conflict with the
    /// active partition — a defensive second check, not the authority.
    pub fn insert(&self, entity: E) -> Option<E> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let id = entity.id();
        if state.records.contains_key(&id) {
            return None;
        }
        if state
            .indexes
            .unique_conflict(&state.layout, &entity, None)
            .is_some()
        {
            return None;
        }
        state.indexes.add(&state.layout, &entity);
        state.records.insert(id, entity.clone());
        self.events.publish(StoreEvent::Added(entity.clone()));
        Some(entity)
    }

    /// Replace a record with a newer revision, migrating index entries for
    /// changed unique fields. Looks the record up in whichever partition
    /// currently holds it; returns `None` if absent or if a changed unique
    /// field collides with another active record.
    pub fn update(&self, entity: E) -> Option<E> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let id = entity.id();
        let old = state.records.get(&id)?.clone();
        if !entity.is_deleted()
            && state
                .indexes
                .unique_conflict(&state.layout, &entity, Some(id))
                .is_some()
        {
            return None;
        }
        // Remove by the previous values before adding the new ones; removing
        // by the new values would orphan the old index entries.
        if !old.is_deleted() {
            state.indexes.remove(&state.layout, &old);
        }
        if !entity.is_deleted() {
            state.indexes.add(&state.layout, &entity);
        }
        state.records.insert(id, entity.clone());
        self.events.publish(StoreEvent::Updated(entity.clone()));
        Some(entity)
    }

    /// Move an active record to the deleted partition, stamping the
    /// soft-delete marker and releasing its unique keys. Returns `false` if
    /// the record is absent or already deleted.
    pub fn soft_delete(&self, id: EntityId, at: OffsetDateTime) -> bool {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let Some(old) = state.records.get(&id) else {
            return false;
        };
        if old.is_deleted() {
            return false;
        }
        let old = old.clone();
        state.indexes.remove(&state.layout, &old);
        let mut deleted = old;
        deleted.mark_deleted(at);
        state.records.insert(id, deleted);
        self.events.publish(StoreEvent::Deleted(id));
        true
    }

    /// Move a soft-deleted record back to the active partition. Fails
    /// (returning `None`, record stays deleted) if another active record has
    /// claimed one of its unique keys since the deletion.
    pub fn restore(&self, id: EntityId, at: OffsetDateTime) -> Option<E> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let old = state.records.get(&id)?;
        if !old.is_deleted() {
            return None;
        }
        let mut restored = old.clone();
        restored.mark_restored(at);
        if state
            .indexes
            .unique_conflict(&state.layout, &restored, Some(id))
            .is_some()
        {
            return None;
        }
        state.indexes.add(&state.layout, &restored);
        state.records.insert(id, restored.clone());
        self.events.publish(StoreEvent::Added(restored.clone()));
        Some(restored)
    }

    /// Permanently drop a record from whichever partition holds it.
    pub fn remove(&self, id: EntityId) -> bool {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let Some(old) = state.records.remove(&id) else {
            return false;
        };
        if !old.is_deleted() {
            state.indexes.remove(&state.layout, &old);
        }
        self.events.publish(StoreEvent::Deleted(id));
        true
    }

    /// Look up by id in either partition.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<E> {
        self.state.read().records.get(&id).cloned()
    }

    /// Look up by id in the active partition only.
    #[must_use]
    pub fn get_active(&self, id: EntityId) -> Option<E> {
        self.state
            .read()
            .records
            .get(&id)
            .filter(|e| !e.is_deleted())
            .cloned()
    }

    /// Exact-match lookup through a uniqueness index. The probe value goes
    /// through the same collation as the index keys.
    ///
    /// # Panics
    /// If the index entry references an id the primary map does not hold, or
    /// holds as deleted — a referential-integrity violation, never a normal
    /// miss.
    #[must_use]
    pub fn get_by_unique(&self, index: &'static str, value: &str) -> Option<E> {
        let state = self.state.read();
        let id = state.indexes.unique_holder(index, value)?;
        let Some(entity) = state.records.get(&id) else {
            panic!("{} index '{index}' references missing id {id}", E::KIND);
        };
        assert!(
            !entity.is_deleted(),
            "{} index '{index}' references soft-deleted id {id}",
            E::KIND
        );
        Some(entity.clone())
    }

    /// Whether a unique value is claimed by an active record other than
    /// `exclude`.
    #[must_use]
    pub fn unique_exists(
        &self,
        index: &'static str,
        value: &str,
        exclude: Option<EntityId>,
    ) -> bool {
        let state = self.state.read();
        match state.indexes.unique_holder(index, value) {
            Some(holder) => Some(holder) != exclude,
            None => false,
        }
    }

    /// Active records in one group bucket, ascending by id.
    #[must_use]
    pub fn in_group(&self, index: &'static str, key: i64) -> Vec<E> {
        let state = self.state.read();
        state
            .indexes
            .group_members(index, key)
            .into_iter()
            .filter_map(|id| state.records.get(&id).cloned())
            .collect()
    }

    /// All active records, ascending by id.
    #[must_use]
    pub fn all_active(&self) -> Vec<E> {
        let state = self.state.read();
        let mut out: Vec<E> = state
            .records
            .values()
            .filter(|e| !e.is_deleted())
            .cloned()
            .collect();
        out.sort_by_key(CacheEntity::id);
        out
    }

    /// All soft-deleted records, ascending by id.
    #[must_use]
    pub fn all_deleted(&self) -> Vec<E> {
        let state = self.state.read();
        let mut out: Vec<E> = state
            .records
            .values()
            .filter(|e| e.is_deleted())
            .cloned()
            .collect();
        out.sort_by_key(CacheEntity::id);
        out
    }

    /// Both partitions, ascending by id.
    #[must_use]
    pub fn all(&self) -> Vec<E> {
        let state = self.state.read();
        let mut out: Vec<E> = state.records.values().cloned().collect();
        out.sort_by_key(CacheEntity::id);
        out
    }

    /// Case-insensitive substring search over the entity's searchable
    /// fields, OR-combined, active partition only, ordered by sort key then
    /// id. Stateless: every call recomputes from current state.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<E> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let state = self.state.read();
        let mut out: Vec<E> = state
            .records
            .values()
            .filter(|e| !e.is_deleted())
            .filter(|e| {
                e.search_text()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()).then(a.id().cmp(&b.id())));
        out
    }

    /// Whether a record with this id exists in either partition.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.state.read().records.contains_key(&id)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state
            .read()
            .records
            .values()
            .filter(|e| !e.is_deleted())
            .count()
    }

    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.state
            .read()
            .records
            .values()
            .filter(|e| e.is_deleted())
            .count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.state.read().records.len()
    }

    /// Number of active records in one group bucket.
    #[must_use]
    pub fn group_count(&self, index: &'static str, key: i64) -> usize {
        self.state.read().indexes.group_len(index, key)
    }
}
