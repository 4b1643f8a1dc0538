use rust_decimal::Decimal;
use time::OffsetDateTime;

use inventory_cache_sdk::{EntityId, InventoryError, NewProduct, Product, ProductPatch};

use crate::domain::entities::{require, require_if_set};
use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::store::{EntityStore, GroupIndexDef, StoreLayout, UniqueIndexDef};

/// Uniqueness indexes.
pub const SKU: &str = "sku";
pub const BARCODE: &str = "barcode";
/// Group indexes.
pub const BY_SUPPLIER: &str = "supplier";
pub const BY_CATEGORY: &str = "category";

impl CacheEntity for Product {
    type Create = NewProduct;
    type Patch = ProductPatch;

    const KIND: &'static str = "product";

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
        let mut out = vec![self.name.as_str(), self.sku.as_str()];
        if let Some(barcode) = &self.barcode {
            out.push(barcode);
        }
        if let Some(description) = &self.description {
            out.push(description);
        }
        out
    }

    fn layout() -> StoreLayout<Self> {
        StoreLayout {
            unique: vec![
                UniqueIndexDef {
                    name: SKU,
                    key: |p: &Self| Some(p.sku.clone()),
                },
                UniqueIndexDef {
                    name: BARCODE,
                    key: |p: &Self| p.barcode.clone(),
                },
            ],
            groups: vec![
                GroupIndexDef {
                    name: BY_SUPPLIER,
                    key: |p: &Self| p.supplier_id,
                },
                GroupIndexDef {
                    name: BY_CATEGORY,
                    key: |p: &Self| p.category_id,
                },
            ],
        }
    }

    fn validate_create(create: &NewProduct) -> Result<(), InventoryError> {
        require("name", &create.name)?;
        require("sku", &create.sku)?;
        require_if_set("barcode", create.barcode.as_ref())?;
        validate_pricing(create.price, create.cost)?;
        validate_stock_levels(create.min_stock_level, create.max_stock_level)
    }

    fn validate_patch(patch: &ProductPatch) -> Result<(), InventoryError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        if let Some(sku) = &patch.sku {
            require("sku", sku)?;
        }
        if let Some(barcode) = &patch.barcode {
            require_if_set("barcode", barcode.as_ref())?;
        }
        if let Some(price) = patch.price {
            if price < Decimal::ZERO {
                return Err(InventoryError::validation("price must not be negative"));
            }
        }
        if let Some(cost) = patch.cost {
            if cost < Decimal::ZERO {
                return Err(InventoryError::validation("cost must not be negative"));
            }
        }
        if let Some(min) = patch.min_stock_level {
            if min < 0 {
                return Err(InventoryError::validation(
                    "min stock level must not be negative",
                ));
            }
        }
        Ok(())
    }

    fn validate_record(&self) -> Result<(), InventoryError> {
        validate_pricing(self.price, self.cost)?;
        validate_stock_levels(self.min_stock_level, self.max_stock_level)
    }

    fn create_unique_values(create: &NewProduct) -> Vec<UniqueValue> {
        let mut out = vec![(SKU, create.sku.clone())];
        if let Some(barcode) = &create.barcode {
            out.push((BARCODE, barcode.clone()));
        }
        out
    }

    fn patch_unique_values(patch: &ProductPatch) -> Vec<UniqueValue> {
        let mut out = Vec::new();
        if let Some(sku) = &patch.sku {
            out.push((SKU, sku.clone()));
        }
        if let Some(Some(barcode)) = &patch.barcode {
            out.push((BARCODE, barcode.clone()));
        }
        out
    }

    fn apply_patch(&self, patch: &ProductPatch, now: OffsetDateTime) -> Self {
        let mut out = self.clone();
        if let Some(name) = &patch.name {
            out.name = name.clone();
        }
        if let Some(sku) = &patch.sku {
            out.sku = sku.clone();
        }
        if let Some(barcode) = &patch.barcode {
            out.barcode = barcode.clone();
        }
        if let Some(description) = &patch.description {
            out.description = description.clone();
        }
        if let Some(price) = patch.price {
            out.price = price;
        }
        if let Some(cost) = patch.cost {
            out.cost = cost;
        }
        if let Some(min) = patch.min_stock_level {
            out.min_stock_level = min;
        }
        if let Some(max) = patch.max_stock_level {
            out.max_stock_level = max;
        }
        if let Some(supplier_id) = patch.supplier_id {
            out.supplier_id = supplier_id;
        }
        if let Some(category_id) = patch.category_id {
            out.category_id = category_id;
        }
        out.updated_at = now;
        out
    }

    fn from_create(id: EntityId, create: &NewProduct, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: create.name.clone(),
            sku: create.sku.clone(),
            barcode: create.barcode.clone(),
            description: create.description.clone(),
            price: create.price,
            cost: create.cost,
            min_stock_level: create.min_stock_level,
            max_stock_level: create.max_stock_level,
            supplier_id: create.supplier_id,
            category_id: create.category_id,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_pricing(price: Decimal, cost: Decimal) -> Result<(), InventoryError> {
    if price < Decimal::ZERO {
        return Err(InventoryError::validation("price must not be negative"));
    }
    if cost < Decimal::ZERO {
        return Err(InventoryError::validation("cost must not be negative"));
    }
    Ok(())
}

fn validate_stock_levels(min: i32, max: i32) -> Result<(), InventoryError> {
    if min < 0 {
        return Err(InventoryError::validation(
            "min stock level must not be negative",
        ));
    }
    if max < min {
        return Err(InventoryError::validation(
            "max stock level must not be below min stock level",
        ));
    }
    Ok(())
}

impl EntityStore<Product> {
    #[must_use]
    pub fn get_by_sku(&self, sku: &str) -> Option<Product> {
        self.get_by_unique(SKU, sku)
    }

    #[must_use]
    pub fn get_by_barcode(&self, barcode: &str) -> Option<Product> {
        self.get_by_unique(BARCODE, barcode)
    }

    #[must_use]
    pub fn sku_exists(&self, sku: &str, exclude: Option<EntityId>) -> bool {
        self.unique_exists(SKU, sku, exclude)
    }

    #[must_use]
    pub fn barcode_exists(&self, barcode: &str, exclude: Option<EntityId>) -> bool {
        self.unique_exists(BARCODE, barcode, exclude)
    }

    #[must_use]
    pub fn by_supplier(&self, supplier_id: EntityId) -> Vec<Product> {
        self.in_group(BY_SUPPLIER, supplier_id)
    }

    #[must_use]
    pub fn by_category(&self, category_id: EntityId) -> Vec<Product> {
        self.in_group(BY_CATEGORY, category_id)
    }
}
