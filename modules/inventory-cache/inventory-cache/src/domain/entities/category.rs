use time::OffsetDateTime;

use inventory_cache_sdk::{Category, CategoryPatch, EntityId, InventoryError, NewCategory};

use crate::domain::entities::require;
use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::store::{EntityStore, StoreLayout, UniqueIndexDef};

/// Uniqueness index: category names are unique within the active partition.
pub const NAME: &str = "name";

impl CacheEntity for Category {
    type Create = NewCategory;
    type Patch = CategoryPatch;

    const KIND: &'static str = "category";

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
                key: |c: &Self| Some(c.name.clone()),
            }],
            groups: Vec::new(),
        }
    }

    fn validate_create(create: &NewCategory) -> Result<(), InventoryError> {
        require("name", &create.name)
    }

    fn validate_patch(patch: &CategoryPatch) -> Result<(), InventoryError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        Ok(())
    }

    fn create_unique_values(create: &NewCategory) -> Vec<UniqueValue> {
        vec![(NAME, create.name.clone())]
    }

    fn patch_unique_values(patch: &CategoryPatch) -> Vec<UniqueValue> {
        patch
            .name
            .as_ref()
            .map(|name| vec![(NAME, name.clone())])
            .unwrap_or_default()
    }

    fn apply_patch(&self, patch: &CategoryPatch, now: OffsetDateTime) -> Self {
        let mut out = self.clone();
        if let Some(name) = &patch.name {
            out.name = name.clone();
        }
        if let Some(description) = &patch.description {
            out.description = description.clone();
        }
        out.updated_at = now;
        out
    }

    fn from_create(id: EntityId, create: &NewCategory, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: create.name.clone(),
            description: create.description.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl EntityStore<Category> {
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Category> {
        self.get_by_unique(NAME, name)
    }

    #[must_use]
    pub fn name_exists(&self, name: &str, exclude: Option<EntityId>) -> bool {
        self.unique_exists(NAME, name, exclude)
    }
}
