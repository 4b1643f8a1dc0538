#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! In-memory indexed entity stores and write orchestration for StockPilot.
//!
//! Each entity type (product, supplier, customer, location, category, order
//! item, inventory) is mirrored by a process-wide [`EntityStore`]: a primary
//! id map plus active-scoped uniqueness indexes and group indexes, partitioned
//! by soft-delete state. Write services are the only components that touch
//! both the persistence gateway and a store, keeping the two from diverging;
//! read services expose the synchronous fast path consumed by UI layers.
//!
//! [`EntityStore`]: domain::store::EntityStore

pub mod config;
pub mod domain;
pub mod infra;

pub use config::InventoryCacheConfig;
pub use domain::entity::CacheEntity;
pub use domain::events::StoreEvent;
pub use domain::registry::{EntityContext, InventoryCache, Repositories};
pub use domain::repo::EntityRepository;
pub use domain::store::EntityStore;
