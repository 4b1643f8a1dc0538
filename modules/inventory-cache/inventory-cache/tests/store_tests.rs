#![allow(clippy::unwrap_used, clippy::expect_used)]

use rust_decimal::Decimal;
use time::OffsetDateTime;

use inventory_cache::domain::entities::product;
use inventory_cache::{EntityStore, StoreEvent};
use inventory_cache_sdk::{
    EntityId, Inventory, Location, LocationType, OrderItem, Product, Supplier,
};

const EVENT_CAPACITY: usize = 64;

fn ts() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

fn product(id: EntityId, name: &str, sku: &str, barcode: Option<&str>) -> Product {
    Product {
        id,
        name: name.to_owned(),
        sku: sku.to_owned(),
        barcode: barcode.map(str::to_owned),
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

fn supplier(id: EntityId, name: &str, email: Option<&str>) -> Supplier {
    Supplier {
        id,
        name: name.to_owned(),
        email: email.map(str::to_owned),
        phone: None,
        address: None,
        contact_person: None,
        is_deleted: false,
        deleted_at: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

fn location(id: EntityId, name: &str, location_type: LocationType) -> Location {
    Location {
        id,
        name: name.to_owned(),
        location_type,
        description: None,
        is_deleted: false,
        deleted_at: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

fn order_item(id: EntityId, order_id: EntityId, product_id: EntityId) -> OrderItem {
    OrderItem {
        id,
        order_id,
        product_id,
        quantity: 2,
        unit_price: Decimal::new(500, 2),
        discount: Decimal::ZERO,
        is_deleted: false,
        deleted_at: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

fn inventory(id: EntityId, product_id: EntityId, location_id: EntityId) -> Inventory {
    Inventory {
        id,
        product_id,
        location_id,
        quantity: 10,
        reserved: 2,
        is_deleted: false,
        deleted_at: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

#[test]
fn unique_lookup_is_case_and_whitespace_insensitive() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "ABC-1", None)).unwrap();

    assert_eq!(store.get_by_sku("abc-1").unwrap().id, 1);
    assert_eq!(store.get_by_sku("  ABC-1  ").unwrap().id, 1);
    assert!(store.get_by_sku("abc-2").is_none());
}

#[test]
fn insert_rejects_duplicate_unique_key_regardless_of_case() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "ABC-1", None)).unwrap();

    assert!(store.insert(product(2, "Gadget", "abc-1", None)).is_none());
    assert_eq!(store.active_count(), 1);
    assert!(!store.contains(2));
}

#[test]
fn insert_rejects_duplicate_id() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "W-1", None)).unwrap();

    assert!(store.insert(product(1, "Other", "W-2", None)).is_none());
    assert_eq!(store.get(1).unwrap().sku, "W-1");
}

#[test]
fn absent_optional_unique_field_never_collides() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "A", "A-1", None)).unwrap();
    store.insert(product(2, "B", "B-1", None)).unwrap();

    assert_eq!(store.active_count(), 2);
    store.insert(product(3, "C", "C-1", Some("999"))).unwrap();
    assert!(store.insert(product(4, "D", "D-1", Some("999"))).is_none());
}

#[test]
fn soft_delete_releases_unique_keys_and_moves_partitions() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "ABC-1", None)).unwrap();

    assert!(store.soft_delete(1, ts()));
    assert_eq!(store.active_count(), 0);
    assert_eq!(store.deleted_count(), 1);
    assert!(store.get_active(1).is_none());
    assert!(store.get(1).unwrap().is_deleted);
    assert!(store.get_by_sku("ABC-1").is_none());

    // The released key is free for a new active record.
    store.insert(product(2, "Widget v2", "ABC-1", None)).unwrap();
    assert_eq!(store.get_by_sku("abc-1").unwrap().id, 2);
}

#[test]
fn soft_delete_rejects_missing_or_already_deleted() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "W-1", None)).unwrap();

    assert!(!store.soft_delete(99, ts()));
    assert!(store.soft_delete(1, ts()));
    assert!(!store.soft_delete(1, ts()));
}

#[test]
fn restore_fails_when_unique_key_was_claimed_and_record_stays_deleted() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "ABC-1", None)).unwrap();
    assert!(store.soft_delete(1, ts()));
    store.insert(product(2, "Widget v2", "ABC-1", None)).unwrap();

    assert!(store.restore(1, ts()).is_none());
    assert!(store.get(1).unwrap().is_deleted);
    assert_eq!(store.get_by_sku("ABC-1").unwrap().id, 2);
}

#[test]
fn restore_reinstates_indexes() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "ABC-1", None)).unwrap();
    assert!(store.soft_delete(1, ts()));

    let restored = store.restore(1, ts()).unwrap();
    assert!(!restored.is_deleted);
    assert!(restored.deleted_at.is_none());
    assert_eq!(store.get_by_sku("abc-1").unwrap().id, 1);
    assert_eq!(store.active_count(), 1);
}

#[test]
fn update_migrates_unique_index_entries() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "SKU-V1", None)).unwrap();

    let mut revised = store.get(1).unwrap();
    revised.sku = "SKU-V2".to_owned();
    store.update(revised).unwrap();

    assert!(store.get_by_sku("SKU-V1").is_none());
    assert_eq!(store.get_by_sku("sku-v2").unwrap().id, 1);
}

#[test]
fn update_conflict_leaves_both_records_intact() {
    let store = EntityStore::<Supplier>::new(EVENT_CAPACITY);
    store.insert(supplier(1, "Acme", Some("a@acme.test"))).unwrap();
    store.insert(supplier(2, "Bolt", Some("b@bolt.test"))).unwrap();

    let mut revised = store.get(2).unwrap();
    revised.email = Some("A@ACME.TEST".to_owned());
    assert!(store.update(revised).is_none());

    assert_eq!(store.get_by_email("a@acme.test").unwrap().id, 1);
    assert_eq!(store.get_by_email("b@bolt.test").unwrap().id, 2);
}

#[test]
fn update_reindexes_changed_supplier_email() {
    let store = EntityStore::<Supplier>::new(EVENT_CAPACITY);
    store.insert(supplier(1, "Acme", Some("old@acme.test"))).unwrap();

    let mut revised = store.get(1).unwrap();
    revised.email = Some("new@acme.test".to_owned());
    store.update(revised).unwrap();

    assert!(store.get_by_email("old@acme.test").is_none());
    assert_eq!(store.get_by_email("new@acme.test").unwrap().id, 1);

    // Clearing the optional field removes the index entry entirely.
    let mut cleared = store.get(1).unwrap();
    cleared.email = None;
    store.update(cleared).unwrap();
    assert!(store.get_by_email("new@acme.test").is_none());
}

#[test]
fn group_index_follows_membership_changes() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    let mut p = product(1, "Widget", "W-1", None);
    p.supplier_id = Some(10);
    store.insert(p).unwrap();

    assert_eq!(store.by_supplier(10).len(), 1);
    assert_eq!(store.group_count(product::BY_SUPPLIER, 10), 1);

    let mut moved = store.get(1).unwrap();
    moved.supplier_id = Some(20);
    store.update(moved).unwrap();

    assert!(store.by_supplier(10).is_empty());
    assert_eq!(store.by_supplier(20).len(), 1);

    assert!(store.soft_delete(1, ts()));
    assert!(store.by_supplier(20).is_empty());
}

#[test]
fn group_members_are_ordered_by_id() {
    let store = EntityStore::<OrderItem>::new(EVENT_CAPACITY);
    store.insert(order_item(3, 100, 7)).unwrap();
    store.insert(order_item(1, 100, 8)).unwrap();
    store.insert(order_item(2, 100, 9)).unwrap();

    let ids: Vec<EntityId> = store.by_order(100).iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn composite_pair_index_allows_one_active_record_per_pair() {
    let store = EntityStore::<Inventory>::new(EVENT_CAPACITY);
    store.insert(inventory(1, 7, 3)).unwrap();

    assert!(store.insert(inventory(2, 7, 3)).is_none());
    store.insert(inventory(3, 7, 4)).unwrap();

    assert_eq!(store.get_by_product_and_location(7, 3).unwrap().id, 1);
    assert_eq!(store.by_product(7).len(), 2);
    assert_eq!(store.by_location(3).len(), 1);

    assert!(store.soft_delete(1, ts()));
    store.insert(inventory(5, 7, 3)).unwrap();
    assert_eq!(store.get_by_product_and_location(7, 3).unwrap().id, 5);
}

#[test]
fn location_type_group_index() {
    let store = EntityStore::<Location>::new(EVENT_CAPACITY);
    store
        .insert(location(1, "Main warehouse", LocationType::Warehouse))
        .unwrap();
    store
        .insert(location(2, "Downtown store", LocationType::Store))
        .unwrap();
    store
        .insert(location(3, "North warehouse", LocationType::Warehouse))
        .unwrap();

    assert_eq!(store.by_type(LocationType::Warehouse).len(), 2);
    assert_eq!(store.by_type(LocationType::Store).len(), 1);
    assert_eq!(store.by_type(LocationType::TransitHub).len(), 0);
    assert_eq!(store.get_by_name("  main WAREHOUSE ").unwrap().id, 1);
    assert!(store.name_exists("downtown store", None));
    assert!(!store.name_exists("downtown store", Some(2)));
}

#[test]
fn initialize_rebuilds_and_is_idempotent() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(99, "Stale", "STALE-1", None)).unwrap();

    let mut deleted = product(2, "Gone", "GONE-1", None);
    deleted.is_deleted = true;
    deleted.deleted_at = Some(ts());

    let snapshot = vec![product(1, "Widget", "W-1", None), deleted];
    store.initialize(snapshot.clone());
    store.initialize(snapshot);

    assert_eq!(store.active_count(), 1);
    assert_eq!(store.deleted_count(), 1);
    assert!(!store.contains(99));
    assert_eq!(store.get_by_sku("w-1").unwrap().id, 1);
    // Deleted records are held but never indexed.
    assert!(store.get_by_sku("gone-1").is_none());
}

#[test]
fn initialize_skips_records_with_colliding_unique_keys() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.initialize(vec![
        product(1, "First", "DUP-1", None),
        product(2, "Second", "dup-1", None),
        product(3, "Third", "OK-1", None),
    ]);

    assert_eq!(store.active_count(), 2);
    assert_eq!(store.get_by_sku("dup-1").unwrap().id, 1);
    assert!(!store.contains(2));
}

#[test]
fn search_matches_any_field_case_insensitively_and_sorts_by_name() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store
        .insert(product(1, "Zinc bolts", "BOLT-Z", Some("12345")))
        .unwrap();
    store
        .insert(product(2, "Aluminum bolts", "BOLT-A", None))
        .unwrap();
    store.insert(product(3, "Copper wire", "WIRE-C", None)).unwrap();

    let hits = store.search("BOLT");
    let names: Vec<&str> = hits.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Aluminum bolts", "Zinc bolts"]);

    assert_eq!(store.search("12345").len(), 1);
    assert!(store.search("   ").is_empty());

    assert!(store.soft_delete(1, ts()));
    assert_eq!(store.search("bolt").len(), 1);
}

#[test]
fn all_listings_are_ordered_by_id() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(3, "C", "C-1", None)).unwrap();
    store.insert(product(1, "A", "A-1", None)).unwrap();
    store.insert(product(2, "B", "B-1", None)).unwrap();
    assert!(store.soft_delete(2, ts()));

    let active: Vec<EntityId> = store.all_active().iter().map(|p| p.id).collect();
    assert_eq!(active, vec![1, 3]);
    let deleted: Vec<EntityId> = store.all_deleted().iter().map(|p| p.id).collect();
    assert_eq!(deleted, vec![2]);
    let all: Vec<EntityId> = store.all().iter().map(|p| p.id).collect();
    assert_eq!(all, vec![1, 2, 3]);
    assert_eq!(store.total_count(), 3);
}

#[test]
fn unique_exists_honors_exclusion() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "W-1", None)).unwrap();

    assert!(store.sku_exists("w-1", None));
    assert!(!store.sku_exists("w-1", Some(1)));
    assert!(store.sku_exists("w-1", Some(2)));
    assert!(!store.sku_exists("other", None));
}

#[test]
fn events_are_delivered_in_mutation_order() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    let mut rx = store.subscribe();

    store.insert(product(1, "Widget", "W-1", None)).unwrap();
    let mut revised = store.get(1).unwrap();
    revised.name = "Widget mk2".to_owned();
    store.update(revised).unwrap();
    assert!(store.soft_delete(1, ts()));
    store.restore(1, ts()).unwrap();
    assert!(store.remove(1));

    assert!(matches!(rx.try_recv().unwrap(), StoreEvent::Added(p) if p.id == 1));
    assert!(
        matches!(rx.try_recv().unwrap(), StoreEvent::Updated(p) if p.name == "Widget mk2")
    );
    assert!(matches!(rx.try_recv().unwrap(), StoreEvent::Deleted(1)));
    assert!(matches!(rx.try_recv().unwrap(), StoreEvent::Added(p) if p.id == 1));
    assert!(matches!(rx.try_recv().unwrap(), StoreEvent::Deleted(1)));
    assert!(rx.try_recv().is_err());
}

#[test]
fn rejected_mutations_emit_no_events() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "Widget", "W-1", None)).unwrap();
    let mut rx = store.subscribe();

    assert!(store.insert(product(2, "Copy", "w-1", None)).is_none());
    assert!(!store.soft_delete(99, ts()));
    assert!(store.restore(1, ts()).is_none());
    assert!(!store.remove(99));

    assert!(rx.try_recv().is_err());
}

#[test]
fn initialize_emits_no_events() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    let mut rx = store.subscribe();

    store.initialize(vec![product(1, "Widget", "W-1", None)]);

    assert!(rx.try_recv().is_err());
}

#[test]
fn remove_drops_record_from_either_partition() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    store.insert(product(1, "A", "A-1", None)).unwrap();
    store.insert(product(2, "B", "B-1", None)).unwrap();
    assert!(store.soft_delete(2, ts()));

    assert!(store.remove(1));
    assert!(store.remove(2));
    assert!(store.get_by_sku("a-1").is_none());
    assert_eq!(store.total_count(), 0);
}

#[test]
fn typed_product_lookups() {
    let store = EntityStore::<Product>::new(EVENT_CAPACITY);
    let mut p = product(1, "Widget", "W-1", Some("5901234123457"));
    p.category_id = Some(4);
    store.insert(p).unwrap();

    assert_eq!(store.get_by_barcode("5901234123457").unwrap().id, 1);
    assert!(store.barcode_exists("5901234123457", None));
    assert_eq!(store.by_category(4).len(), 1);
    assert_eq!(store.group_count(product::BY_CATEGORY, 4), 1);
    assert_eq!(store.group_count(product::BY_SUPPLIER, 4), 0);
}
