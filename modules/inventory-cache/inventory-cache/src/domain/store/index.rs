//! Secondary index bookkeeping for [`EntityStore`](super::EntityStore).
//!
//! Two index families exist: uniqueness indexes (normalized field value →
//! id, scoped to the active partition) and group indexes (numeric group key →
//! id set, also active-scoped). Every index entry must reference a key
//! present in the primary map; the store treats a dangling entry as a
//! data-integrity violation, not a lookup miss.

use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;

use inventory_cache_sdk::EntityId;

use crate::domain::entity::CacheEntity;

/// One uniqueness index: `key` extracts the raw field value, `None` meaning
/// the field is unset and therefore not indexed.
pub struct UniqueIndexDef<E> {
    pub name: &'static str,
    pub key: fn(&E) -> Option<String>,
}

/// One group index over a numeric foreign key or discriminant.
pub struct GroupIndexDef<E> {
    pub name: &'static str,
    pub key: fn(&E) -> Option<i64>,
}

/// Declarative index configuration for one entity type.
pub struct StoreLayout<E> {
    pub unique: Vec<UniqueIndexDef<E>>,
    pub groups: Vec<GroupIndexDef<E>>,
}

/// The single collation applied to every unique-index key and every
/// comparison against one: trim, then Unicode lowercase. Applied here and
/// nowhere else, so an index write and a later probe can never disagree on
/// case.
#[must_use]
pub fn fold_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// All secondary indexes of one store, active-partition scoped.
pub(crate) struct IndexSet<E: CacheEntity> {
    unique: HashMap<&'static str, HashMap<String, EntityId>>,
    groups: HashMap<&'static str, HashMap<i64, BTreeSet<EntityId>>>,
    _entity: PhantomData<fn(&E)>,
}

impl<E: CacheEntity> IndexSet<E> {
    pub(crate) fn new(layout: &StoreLayout<E>) -> Self {
        let unique = layout
            .unique
            .iter()
            .map(|def| (def.name, HashMap::new()))
            .collect();
        let groups = layout
            .groups
            .iter()
            .map(|def| (def.name, HashMap::new()))
            .collect();
        Self {
            unique,
            groups,
            _entity: PhantomData,
        }
    }

    pub(crate) fn clear(&mut self) {
        for map in self.unique.values_mut() {
            map.clear();
        }
        for map in self.groups.values_mut() {
            map.clear();
        }
    }

    /// First unique-index conflict the entity's values would cause, ignoring
    /// entries owned by `exclude`. Conflicts are only possible against the
    /// active partition — deleted records are never indexed here.
    pub(crate) fn unique_conflict(
        &self,
        layout: &StoreLayout<E>,
        entity: &E,
        exclude: Option<EntityId>,
    ) -> Option<(&'static str, String)> {
        for def in &layout.unique {
            let Some(raw) = (def.key)(entity) else {
                continue;
            };
            let folded = fold_key(&raw);
            if let Some(&holder) = self.unique.get(def.name).and_then(|m| m.get(&folded)) {
                if Some(holder) != exclude {
                    return Some((def.name, raw));
                }
            }
        }
        None
    }

    /// Probe one uniqueness index.
    pub(crate) fn unique_holder(&self, index: &str, value: &str) -> Option<EntityId> {
        self.unique.get(index)?.get(&fold_key(value)).copied()
    }

    /// Ids in one group bucket, ascending.
    pub(crate) fn group_members(&self, index: &str, key: i64) -> Vec<EntityId> {
        self.groups
            .get(index)
            .and_then(|m| m.get(&key))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn group_len(&self, index: &str, key: i64) -> usize {
        self.groups
            .get(index)
            .and_then(|m| m.get(&key))
            .map_or(0, BTreeSet::len)
    }

    /// Index an entity entering the active partition. The caller must have
    /// ruled out conflicts first.
    pub(crate) fn add(&mut self, layout: &StoreLayout<E>, entity: &E) {
        let id = entity.id();
        for def in &layout.unique {
            if let Some(raw) = (def.key)(entity) {
                if let Some(map) = self.unique.get_mut(def.name) {
                    map.insert(fold_key(&raw), id);
                }
            }
        }
        for def in &layout.groups {
            if let Some(key) = (def.key)(entity) {
                if let Some(map) = self.groups.get_mut(def.name) {
                    map.entry(key).or_default().insert(id);
                }
            }
        }
    }

    /// Drop every index entry owned by an entity leaving the active
    /// partition. Must be called with the entity's *previous* field values —
    /// removing by the new values after an update would orphan the old
    /// entries.
    pub(crate) fn remove(&mut self, layout: &StoreLayout<E>, entity: &E) {
        let id = entity.id();
        for def in &layout.unique {
            if let Some(raw) = (def.key)(entity) {
                let folded = fold_key(&raw);
                if let Some(map) = self.unique.get_mut(def.name) {
                    // Only drop the entry if this record still owns it.
                    if map.get(&folded) == Some(&id) {
                        map.remove(&folded);
                    }
                }
            }
        }
        for def in &layout.groups {
            if let Some(key) = (def.key)(entity) {
                if let Some(map) = self.groups.get_mut(def.name) {
                    if let Some(set) = map.get_mut(&key) {
                        set.remove(&id);
                        if set.is_empty() {
                            map.remove(&key);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fold_key;

    #[test]
    fn fold_key_is_idempotent() {
        let once = fold_key("  WH-Öst 01 ");
        assert_eq!(fold_key(&once), once);
    }

    #[test]
    fn fold_key_ignores_case_and_padding() {
        assert_eq!(fold_key("ABC-1"), fold_key(" abc-1 "));
    }
}
