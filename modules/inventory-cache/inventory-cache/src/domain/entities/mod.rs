//! Per-entity store configuration: index layouts, input validation, patch
//! merging, and typed lookup helpers. Everything algorithmic lives in the
//! generic store; these modules only declare what differs per entity.

pub mod category;
pub mod customer;
pub mod inventory;
pub mod location;
pub mod order_item;
pub mod product;
pub mod supplier;

use inventory_cache_sdk::InventoryError;

/// A required string field must carry at least one non-whitespace character.
pub(crate) fn require(field: &str, value: &str) -> Result<(), InventoryError> {
    if value.trim().is_empty() {
        return Err(InventoryError::invalid_input(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

/// An optional string field, when present, must not be blank — a blank
/// `Some` would silently occupy a uniqueness slot.
pub(crate) fn require_if_set(field: &str, value: Option<&String>) -> Result<(), InventoryError> {
    match value {
        Some(v) => require(field, v),
        None => Ok(()),
    }
}
