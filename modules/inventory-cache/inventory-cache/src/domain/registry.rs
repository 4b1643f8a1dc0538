//! Process-wide wiring: one store/read/write bundle per entity type, plus
//! the startup cache warm-up.

use std::sync::Arc;

use tracing::{error, instrument};

use inventory_cache_sdk::{
    Category, Customer, Inventory, InventoryError, Location, OrderItem, Product, Supplier,
};

use crate::config::InventoryCacheConfig;
use crate::domain::entity::CacheEntity;
use crate::domain::repo::EntityRepository;
use crate::domain::service::{ReadService, WriteService};
use crate::domain::store::EntityStore;

/// Store, read service, and write service for one entity type. The store is
/// a process-wide singleton shared by both services; write services mutate
/// it, read services and UI only read.
pub struct EntityContext<E: CacheEntity> {
    pub store: Arc<EntityStore<E>>,
    pub reader: ReadService<E>,
    pub writer: WriteService<E>,
}

impl<E: CacheEntity> EntityContext<E> {
    #[must_use]
    pub fn new(repo: Arc<dyn EntityRepository<E>>, config: &InventoryCacheConfig) -> Self {
        let store = Arc::new(EntityStore::new(config.event_channel_capacity));
        let reader = ReadService::new(Arc::clone(&repo), Arc::clone(&store));
        let writer = WriteService::new(repo, Arc::clone(&store));
        Self {
            store,
            reader,
            writer,
        }
    }

    async fn warm(&self) -> Result<usize, String> {
        self.reader.load_store_cache().await.map_err(|e| {
            error!(entity = E::KIND, error = %e, "store cache warm-up failed");
            format!("{}: {e}", E::KIND)
        })
    }
}

/// Persistence gateways for every entity type, injected at construction.
pub struct Repositories {
    pub products: Arc<dyn EntityRepository<Product>>,
    pub suppliers: Arc<dyn EntityRepository<Supplier>>,
    pub customers: Arc<dyn EntityRepository<Customer>>,
    pub locations: Arc<dyn EntityRepository<Location>>,
    pub categories: Arc<dyn EntityRepository<Category>>,
    pub order_items: Arc<dyn EntityRepository<OrderItem>>,
    pub inventory: Arc<dyn EntityRepository<Inventory>>,
}

/// The complete cache subsystem: every entity store with its services.
pub struct InventoryCache {
    pub products: EntityContext<Product>,
    pub suppliers: EntityContext<Supplier>,
    pub customers: EntityContext<Customer>,
    pub locations: EntityContext<Location>,
    pub categories: EntityContext<Category>,
    pub order_items: EntityContext<OrderItem>,
    pub inventory: EntityContext<Inventory>,
}

impl InventoryCache {
    #[must_use]
    pub fn new(repos: Repositories, config: &InventoryCacheConfig) -> Self {
        Self {
            products: EntityContext::new(repos.products, config),
            suppliers: EntityContext::new(repos.suppliers, config),
            customers: EntityContext::new(repos.customers, config),
            locations: EntityContext::new(repos.locations, config),
            categories: EntityContext::new(repos.categories, config),
            order_items: EntityContext::new(repos.order_items, config),
            inventory: EntityContext::new(repos.inventory, config),
        }
    }

    /// Warm every entity store concurrently at process startup. Each load
    /// logs its own outcome, so one failure never masks the others; the
    /// overall result aggregates whatever failed.
    ///
    /// # Errors
    /// `PartialFailure` listing each entity type whose load failed.
    #[instrument(skip_all)]
    pub async fn initialize_cache(&self) -> Result<(), InventoryError> {
        let (products, suppliers, customers, locations, categories, order_items, inventory) = tokio::join!(
            self.products.warm(),
            self.suppliers.warm(),
            self.customers.warm(),
            self.locations.warm(),
            self.categories.warm(),
            self.order_items.warm(),
            self.inventory.warm(),
        );

        let failures: Vec<String> = [
            products, suppliers, customers, locations, categories, order_items, inventory,
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(InventoryError::partial_failure(failures))
        }
    }
}
