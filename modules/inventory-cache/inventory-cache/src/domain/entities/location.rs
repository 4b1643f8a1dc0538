use time::OffsetDateTime;

use inventory_cache_sdk::{EntityId, InventoryError, Location, LocationPatch, LocationType, NewLocation};

use crate::domain::entities::require;
use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::store::{EntityStore, GroupIndexDef, StoreLayout, UniqueIndexDef};

/// Uniqueness index: location names are unique within the active partition.
pub const NAME: &str = "name";
/// Group index over the location type discriminant.
pub const BY_TYPE: &str = "type";

impl CacheEntity for Location {
    type Create = NewLocation;
    type Patch = LocationPatch;

    const KIND: &'static str = "location";

    fn id(&self) -> EntityId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn mark_deleted(&mut self, at: OffsetDateTime) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self.updated_at = at;
    }

    fn mark_restored(&mut self, at: OffsetDateTime) {
        self.is_deleted = false;
        self.deleted_at = None;
        self.updated_at = at;
    }

    fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        if let Some(description) = &self.description {
            out.push(description);
        }
        out
    }

    fn layout() -> StoreLayout<Self> {
        StoreLayout {
            unique: vec![UniqueIndexDef {
                name: NAME,
                key: |l: &Self| Some(l.name.clone()),
            }],
            groups: vec![GroupIndexDef {
                name: BY_TYPE,
                key: |l: &Self| Some(l.location_type.group_key()),
            }],
        }
    }

    fn validate_create(create: &NewLocation) -> Result<(), InventoryError> {
        require("name", &create.name)
    }

    fn validate_patch(patch: &LocationPatch) -> Result<(), InventoryError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        Ok(())
    }

    fn create_unique_values(create: &NewLocation) -> Vec<UniqueValue> {
        vec![(NAME, create.name.clone())]
    }

    fn patch_unique_values(patch: &LocationPatch) -> Vec<UniqueValue> {
        patch
            .name
            .as_ref()
            .map(|name| vec![(NAME, name.clone())])
            .unwrap_or_default()
    }

    fn apply_patch(&self, patch: &LocationPatch, now: OffsetDateTime) -> Self {
        let mut out = self.clone();
        if let Some(name) = &patch.name {
            out.name = name.clone();
        }
        if let Some(location_type) = patch.location_type {
            out.location_type = location_type;
        }
        if let Some(description) = &patch.description {
            out.description = description.clone();
        }
        out.updated_at = now;
        out
    }

    fn from_create(id: EntityId, create: &NewLocation, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: create.name.clone(),
            location_type: create.location_type,
            description: create.description.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl EntityStore<Location> {
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Location> {
        self.get_by_unique(NAME, name)
    }

    #[must_use]
    pub fn name_exists(&self, name: &str, exclude: Option<EntityId>) -> bool {
        self.unique_exists(NAME, name, exclude)
    }

    #[must_use]
    pub fn by_type(&self, location_type: LocationType) -> Vec<Location> {
        self.in_group(BY_TYPE, location_type.group_key())
    }
}
