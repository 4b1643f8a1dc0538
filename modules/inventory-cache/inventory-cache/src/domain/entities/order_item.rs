use rust_decimal::Decimal;
use time::OffsetDateTime;

use inventory_cache_sdk::{EntityId, InventoryError, NewOrderItem, OrderItem, OrderItemPatch};

use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::store::{EntityStore, GroupIndexDef, StoreLayout, UniqueIndexDef};

/// Composite uniqueness index: one active line per (order, product) pair.
pub const ORDER_PRODUCT: &str = "order_product";
/// Group indexes.
pub const BY_ORDER: &str = "order";
pub const BY_PRODUCT: &str = "product";

fn pair_key(order_id: EntityId, product_id: EntityId) -> String {
    format!("{order_id}:{product_id}")
}

impl CacheEntity for OrderItem {
    type Create = NewOrderItem;
    type Patch = OrderItemPatch;

    const KIND: &'static str = "order item";

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
        // Lines sort by order, then product.
        format!("{:020}:{:020}", self.order_id, self.product_id)
    }

    fn search_text(&self) -> Vec<&str> {
        Vec::new()
    }

    fn layout() -> StoreLayout<Self> {
        StoreLayout {
            unique: vec![UniqueIndexDef {
                name: ORDER_PRODUCT,
                key: |o: &Self| Some(pair_key(o.order_id, o.product_id)),
            }],
            groups: vec![
                GroupIndexDef {
                    name: BY_ORDER,
                    key: |o: &Self| Some(o.order_id),
                },
                GroupIndexDef {
                    name: BY_PRODUCT,
                    key: |o: &Self| Some(o.product_id),
                },
            ],
        }
    }

    fn validate_create(create: &NewOrderItem) -> Result<(), InventoryError> {
        if create.order_id <= 0 {
            return Err(InventoryError::invalid_input("order id is required"));
        }
        if create.product_id <= 0 {
            return Err(InventoryError::invalid_input("product id is required"));
        }
        if create.quantity <= 0 {
            return Err(InventoryError::validation("quantity must be positive"));
        }
        validate_pricing(create.unit_price, create.discount)
    }

    fn validate_patch(patch: &OrderItemPatch) -> Result<(), InventoryError> {
        if let Some(quantity) = patch.quantity {
            if quantity <= 0 {
                return Err(InventoryError::validation("quantity must be positive"));
            }
        }
        if let Some(unit_price) = patch.unit_price {
            if unit_price < Decimal::ZERO {
                return Err(InventoryError::validation(
                    "unit price must not be negative",
                ));
            }
        }
        if let Some(discount) = patch.discount {
            if discount < Decimal::ZERO {
                return Err(InventoryError::validation("discount must not be negative"));
            }
        }
        Ok(())
    }

    fn create_unique_values(create: &NewOrderItem) -> Vec<UniqueValue> {
        vec![(ORDER_PRODUCT, pair_key(create.order_id, create.product_id))]
    }

    fn patch_unique_values(_patch: &OrderItemPatch) -> Vec<UniqueValue> {
        // The (order, product) pair is fixed at creation and never patched.
        Vec::new()
    }

    fn apply_patch(&self, patch: &OrderItemPatch, now: OffsetDateTime) -> Self {
        let mut out = self.clone();
        if let Some(quantity) = patch.quantity {
            out.quantity = quantity;
        }
        if let Some(unit_price) = patch.unit_price {
            out.unit_price = unit_price;
        }
        if let Some(discount) = patch.discount {
            out.discount = discount;
        }
        out.updated_at = now;
        out
    }

    fn from_create(id: EntityId, create: &NewOrderItem, now: OffsetDateTime) -> Self {
        Self {
            id,
            order_id: create.order_id,
            product_id: create.product_id,
            quantity: create.quantity,
            unit_price: create.unit_price,
            discount: create.discount,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_pricing(unit_price: Decimal, discount: Decimal) -> Result<(), InventoryError> {
    if unit_price < Decimal::ZERO {
        return Err(InventoryError::validation(
            "unit price must not be negative",
        ));
    }
    if discount < Decimal::ZERO {
        return Err(InventoryError::validation("discount must not be negative"));
    }
    Ok(())
}

impl EntityStore<OrderItem> {
    #[must_use]
    pub fn get_by_order_and_product(
        &self,
        order_id: EntityId,
        product_id: EntityId,
    ) -> Option<OrderItem> {
        self.get_by_unique(ORDER_PRODUCT, &pair_key(order_id, product_id))
    }

    #[must_use]
    pub fn by_order(&self, order_id: EntityId) -> Vec<OrderItem> {
        self.in_group(BY_ORDER, order_id)
    }

    #[must_use]
    pub fn by_product(&self, product_id: EntityId) -> Vec<OrderItem> {
        self.in_group(BY_PRODUCT, product_id)
    }
}
