use time::OffsetDateTime;

use inventory_cache_sdk::{EntityId, Inventory, InventoryError, InventoryPatch, NewInventory};

use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::store::{EntityStore, GroupIndexDef, StoreLayout, UniqueIndexDef};

/// Composite uniqueness index: one active record per (product, location)
/// pair.
pub const PRODUCT_LOCATION: &str = "product_location";
/// Group indexes.
pub const BY_PRODUCT: &str = "product";
pub const BY_LOCATION: &str = "location";

fn pair_key(product_id: EntityId, location_id: EntityId) -> String {
    format!("{product_id}:{location_id}")
}

impl CacheEntity for Inventory {
    type Create = NewInventory;
    type Patch = InventoryPatch;

    const KIND: &'static str = "inventory record";

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
        format!("{:020}:{:020}", self.product_id, self.location_id)
    }

    fn search_text(&self) -> Vec<&str> {
        Vec::new()
    }

    fn layout() -> StoreLayout<Self> {
        StoreLayout {
            unique: vec![UniqueIndexDef {
                name: PRODUCT_LOCATION,
                key: |i: &Self| Some(pair_key(i.product_id, i.location_id)),
            }],
            groups: vec![
                GroupIndexDef {
                    name: BY_PRODUCT,
                    key: |i: &Self| Some(i.product_id),
                },
                GroupIndexDef {
                    name: BY_LOCATION,
                    key: |i: &Self| Some(i.location_id),
                },
            ],
        }
    }

    fn validate_create(create: &NewInventory) -> Result<(), InventoryError> {
        if create.product_id <= 0 {
            return Err(InventoryError::invalid_input("product id is required"));
        }
        if create.location_id <= 0 {
            return Err(InventoryError::invalid_input("location id is required"));
        }
        validate_quantities(create.quantity, create.reserved)
    }

    fn validate_patch(patch: &InventoryPatch) -> Result<(), InventoryError> {
        if let Some(quantity) = patch.quantity {
            if quantity < 0 {
                return Err(InventoryError::validation("quantity must not be negative"));
            }
        }
        if let Some(reserved) = patch.reserved {
            if reserved < 0 {
                return Err(InventoryError::validation("reserved must not be negative"));
            }
        }
        Ok(())
    }

    fn validate_record(&self) -> Result<(), InventoryError> {
        validate_quantities(self.quantity, self.reserved)
    }

    fn create_unique_values(create: &NewInventory) -> Vec<UniqueValue> {
        vec![(
            PRODUCT_LOCATION,
            pair_key(create.product_id, create.location_id),
        )]
    }

    fn patch_unique_values(_patch: &InventoryPatch) -> Vec<UniqueValue> {
        // The (product, location) pair is fixed at creation.
        Vec::new()
    }

    fn apply_patch(&self, patch: &InventoryPatch, now: OffsetDateTime) -> Self {
        let mut out = self.clone();
        if let Some(quantity) = patch.quantity {
            out.quantity = quantity;
        }
        if let Some(reserved) = patch.reserved {
            out.reserved = reserved;
        }
        out.updated_at = now;
        out
    }

    fn from_create(id: EntityId, create: &NewInventory, now: OffsetDateTime) -> Self {
        Self {
            id,
            product_id: create.product_id,
            location_id: create.location_id,
            quantity: create.quantity,
            reserved: create.reserved,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_quantities(quantity: i32, reserved: i32) -> Result<(), InventoryError> {
    if quantity < 0 {
        return Err(InventoryError::validation("quantity must not be negative"));
    }
    if reserved < 0 {
        return Err(InventoryError::validation("reserved must not be negative"));
    }
    if reserved > quantity {
        return Err(InventoryError::validation(
            "reserved must not exceed quantity",
        ));
    }
    Ok(())
}

impl EntityStore<Inventory> {
    #[must_use]
    pub fn get_by_product_and_location(
        &self,
        product_id: EntityId,
        location_id: EntityId,
    ) -> Option<Inventory> {
        self.get_by_unique(PRODUCT_LOCATION, &pair_key(product_id, location_id))
    }

    #[must_use]
    pub fn by_product(&self, product_id: EntityId) -> Vec<Inventory> {
        self.in_group(BY_PRODUCT, product_id)
    }

    #[must_use]
    pub fn by_location(&self, location_id: EntityId) -> Vec<Inventory> {
        self.in_group(BY_LOCATION, location_id)
    }
}
