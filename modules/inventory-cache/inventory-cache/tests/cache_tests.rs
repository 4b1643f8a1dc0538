#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use inventory_cache::domain::service::ReadService;
use inventory_cache::infra::storage::InMemoryRepository;
use inventory_cache::{
    CacheEntity, EntityRepository, EntityStore, InventoryCache, InventoryCacheConfig,
    Repositories,
};
use inventory_cache_sdk::{EntityId, ErrorCode, InventoryError, Product};

fn ts() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

fn product(id: EntityId, name: &str, sku: &str) -> Product {
    Product {
        id,
        name: name.to_owned(),
        sku: sku.to_owned(),
        barcode: None,
        description: None,
        price: Decimal::new(1999, 2),
        cost: Decimal::new(1200, 2),
        min_stock_level: 5,
        max_stock_level: 100,
        supplier_id: None,
        category_id: None,
        is_deleted: false,
        deleted_at: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

/// Gateway double whose every call fails, for exercising warm-up and refresh
/// error paths.
struct UnavailableRepository;

#[async_trait]
impl<E: CacheEntity> EntityRepository<E> for UnavailableRepository {
    async fn get_by_id(&self, _id: EntityId) -> Result<Option<E>, InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn get_all_active(&self) -> Result<Vec<E>, InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn exists(&self, _id: EntityId) -> Result<bool, InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn unique_exists(
        &self,
        _field: &'static str,
        _value: &str,
        _exclude: Option<EntityId>,
    ) -> Result<bool, InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn create(&self, _create: E::Create) -> Result<E, InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn update(&self, _entity: E) -> Result<E, InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn soft_delete(&self, _id: EntityId) -> Result<(), InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn restore(&self, _id: EntityId) -> Result<(), InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }

    async fn hard_delete(&self, _id: EntityId) -> Result<(), InventoryError> {
        Err(InventoryError::unexpected("backend unavailable"))
    }
}

fn healthy_repositories() -> Repositories {
    Repositories {
        products: Arc::new(InMemoryRepository::new()),
        suppliers: Arc::new(InMemoryRepository::new()),
        customers: Arc::new(InMemoryRepository::new()),
        locations: Arc::new(InMemoryRepository::new()),
        categories: Arc::new(InMemoryRepository::new()),
        order_items: Arc::new(InMemoryRepository::new()),
        inventory: Arc::new(InMemoryRepository::new()),
    }
}

#[tokio::test]
async fn initialize_cache_warms_every_store() {
    let products = Arc::new(InMemoryRepository::new());
    products.seed(vec![
        product(1, "Widget", "W-1"),
        product(2, "Gadget", "G-1"),
        {
            let mut gone = product(3, "Gone", "X-1");
            gone.is_deleted = true;
            gone.deleted_at = Some(ts());
            gone
        },
    ]);

    let cache = InventoryCache::new(
        Repositories {
            products,
            ..healthy_repositories()
        },
        &InventoryCacheConfig::default(),
    );
    cache.initialize_cache().await.unwrap();

    // Warm-up loads the active set only; the deleted record is not mirrored.
    assert_eq!(cache.products.store.active_count(), 2);
    assert_eq!(cache.products.store.deleted_count(), 0);
    assert_eq!(cache.products.store.get_by_sku("w-1").unwrap().id, 1);
    assert_eq!(cache.suppliers.store.active_count(), 0);
}

#[tokio::test]
async fn initialize_cache_reports_each_failed_store_without_masking_others() {
    let cache = InventoryCache::new(
        Repositories {
            products: Arc::new(UnavailableRepository),
            inventory: Arc::new(UnavailableRepository),
            ..healthy_repositories()
        },
        &InventoryCacheConfig::default(),
    );

    let err = cache.initialize_cache().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::PartialFailure);
    let rendered = err.to_string();
    assert!(rendered.contains("product:"));
    assert!(rendered.contains("inventory record:"));
    assert!(!rendered.contains("supplier:"));

    // The healthy stores warmed despite the failures.
    assert_eq!(cache.suppliers.store.active_count(), 0);
}

#[tokio::test]
async fn writes_flow_through_the_wired_context() {
    let cache = InventoryCache::new(healthy_repositories(), &InventoryCacheConfig::default());
    cache.initialize_cache().await.unwrap();

    let created = cache
        .products
        .writer
        .create(inventory_cache_sdk::NewProduct {
            name: "Widget".to_owned(),
            sku: "W-1".to_owned(),
            barcode: None,
            description: None,
            price: Decimal::new(1999, 2),
            cost: Decimal::new(1200, 2),
            min_stock_level: 5,
            max_stock_level: 100,
            supplier_id: None,
            category_id: None,
        })
        .await
        .unwrap();

    assert_eq!(cache.products.reader.get(created.id).unwrap().sku, "W-1");
    assert_eq!(cache.products.reader.active_count(), 1);
}

#[tokio::test]
async fn load_store_cache_replaces_previous_content() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.seed(vec![product(1, "Widget", "W-1")]);
    let store = Arc::new(EntityStore::new(16));
    let reader = ReadService::new(Arc::clone(&repo) as Arc<dyn EntityRepository<Product>>, Arc::clone(&store));

    assert_eq!(reader.load_store_cache().await.unwrap(), 1);

    repo.seed(vec![product(2, "Gadget", "G-1")]);
    assert_eq!(reader.load_store_cache().await.unwrap(), 2);
    assert_eq!(store.active_count(), 2);
}

#[tokio::test]
async fn load_store_cache_surfaces_gateway_errors_and_leaves_store_untouched() {
    let store = Arc::new(EntityStore::<Product>::new(16));
    store.insert(product(1, "Widget", "W-1"));
    let reader = ReadService::new(Arc::new(UnavailableRepository), Arc::clone(&store));

    let err = reader.load_store_cache().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnexpectedError);
    assert_eq!(store.active_count(), 1);
}

#[tokio::test]
async fn refresh_store_cache_swallows_gateway_errors() {
    let store = Arc::new(EntityStore::<Product>::new(16));
    store.insert(product(1, "Widget", "W-1"));
    let reader = ReadService::new(Arc::new(UnavailableRepository), Arc::clone(&store));

    reader.refresh_store_cache().await.unwrap();

    // The failed refresh left the previous content in place.
    assert_eq!(store.active_count(), 1);
}

#[tokio::test]
async fn refresh_store_cache_rebuilds_in_the_background() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.seed(vec![product(1, "Widget", "W-1")]);
    let store = Arc::new(EntityStore::new(16));
    let reader = ReadService::new(
        Arc::clone(&repo) as Arc<dyn EntityRepository<Product>>,
        Arc::clone(&store),
    );

    reader.refresh_store_cache().await.unwrap();
    assert_eq!(store.get_by_sku("w-1").unwrap().id, 1);
}

#[tokio::test]
async fn reader_serves_lookups_from_the_store_only() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.seed(vec![product(1, "Zinc bolts", "Z-1"), product(2, "Washer", "W-2")]);
    let store = Arc::new(EntityStore::new(16));
    let reader = ReadService::new(
        Arc::clone(&repo) as Arc<dyn EntityRepository<Product>>,
        Arc::clone(&store),
    );

    // Nothing is visible before the warm-up.
    assert!(reader.get(1).is_none());
    reader.load_store_cache().await.unwrap();

    assert_eq!(reader.get(1).unwrap().name, "Zinc bolts");
    assert_eq!(reader.all_active().len(), 2);
    assert_eq!(reader.search("bolt").len(), 1);
    assert_eq!(reader.store().get_by_sku("z-1").unwrap().id, 1);

    store.soft_delete(1, ts());
    assert!(reader.get(1).is_none());
    assert_eq!(reader.deleted_count(), 1);
    assert_eq!(reader.all_deleted().len(), 1);
}
