#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod error;
pub mod models;

pub use error::{ErrorCode, InventoryError};
pub use models::{
    Category, CategoryPatch, Customer, CustomerPatch, EntityId, Inventory, InventoryPatch,
    Location, LocationPatch, LocationType, NewCategory, NewCustomer, NewInventory, NewLocation,
    NewOrderItem, NewProduct, NewSupplier, OrderItem, OrderItemPatch, Product, ProductPatch,
    Supplier, SupplierPatch,
};
