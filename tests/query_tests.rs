//! Query integration tests
//!
//! Queries over the sample families, issued through the store the way the
//! walkthrough issues them.

use getstarted::fixtures::sample_families;
use getstarted::{
    ConnectionPolicy, ConsistencyLevel, ContainerProperties, DatabaseProperties, DocumentStore,
    FeedOptions, LocalStore, ResourceLink, RequestOptions,
};

fn populated() -> (LocalStore, ResourceLink) {
    let store = LocalStore::in_memory("k", ConnectionPolicy::default(), ConsistencyLevel::Session);
    store.create_database(DatabaseProperties::new("FamilyDB")).unwrap();
    store
        .create_container(
            &ResourceLink::database("FamilyDB"),
            ContainerProperties::new("FamilyContainer"),
            &RequestOptions::default(),
        )
        .unwrap();

    let coll = ResourceLink::container("FamilyDB", "FamilyContainer");
    for family in sample_families() {
        store
            .create_item(&coll, serde_json::to_value(&family).unwrap(), true)
            .unwrap();
    }
    (store, coll)
}

fn ids(store: &LocalStore, coll: &ResourceLink, query: &str) -> Vec<String> {
    let options = FeedOptions::new().page_size(-1).enable_cross_partition_query(true);
    store
        .query_items(coll, query, &options)
        .unwrap()
        .map(|doc| doc["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_filter_by_nested_field() {
    let (store, coll) = populated();
    assert_eq!(
        ids(&store, &coll, "SELECT * FROM Family WHERE Family.address.state = 'WA'"),
        ["Andersen.1"]
    );
    assert_eq!(
        ids(&store, &coll, "SELECT * FROM Family WHERE Family.address.city = 'NY'"),
        ["Wakefield.7"]
    );
}

#[test]
fn test_boolean_combinations() {
    let (store, coll) = populated();
    assert_eq!(
        ids(
            &store,
            &coll,
            "SELECT * FROM f WHERE f.registered = true AND (f.district = 'WA5' OR f.district = 'NY23')"
        ),
        ["Andersen.1", "Wakefield.7"]
    );
    assert_eq!(
        ids(&store, &coll, "SELECT * FROM f WHERE NOT f.lastName = 'Andersen'"),
        ["Wakefield.7"]
    );
    assert_eq!(
        ids(&store, &coll, "SELECT * FROM f WHERE f.lastName IN ('Andersen', 'Smith')"),
        ["Andersen.1"]
    );
}

#[test]
fn test_missing_and_mismatched_fields() {
    let (store, coll) = populated();
    assert!(ids(&store, &coll, "SELECT * FROM f WHERE f.nickname = 'x'").is_empty());
    assert!(ids(&store, &coll, "SELECT * FROM f WHERE f.district > 5").is_empty());
}

#[test]
fn test_range_over_strings() {
    let (store, coll) = populated();
    assert_eq!(
        ids(&store, &coll, "SELECT * FROM f WHERE f.lastName >= 'B'"),
        ["Wakefield.7"]
    );
}

#[test]
fn test_system_properties_queryable() {
    let (store, coll) = populated();
    assert_eq!(
        ids(&store, &coll, "SELECT * FROM f WHERE f._ts > 0").len(),
        2
    );
}
