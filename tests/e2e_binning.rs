//! End-to-end tests for pass 1: attribute binning and relationship load.
//!
//! Fits bins through `FeatureExtractor::fit` against a MemoryStore, and
//! checks the numeric bin invariants with proptest.

use pgwalk::{
    AttributeBinner, Bin, BinStrategy, BinningThresholds, FeatureConfig, FeatureExtractor,
    MemoryStore, Node, NodeId, Value,
};
use proptest::prelude::*;

// ============================================================================
// Helper: cities with a numeric, a categorical and a unique attribute.
// ============================================================================

fn cities() -> MemoryStore {
    let store = MemoryStore::new();
    let rows = [
        ("Berlin", 3_600_000, "DE", "berlin-de"),
        ("Hamburg", 1_800_000, "DE", "hamburg-de"),
        ("Munich", 1_500_000, "DE", "munich-de"),
        ("Paris", 2_100_000, "FR", "paris-fr"),
        ("Lyon", 500_000, "FR", "lyon-fr"),
        ("Rome", 2_800_000, "IT", "rome-it"),
        ("Milan", 1_400_000, "IT", "milan-it"),
        ("Turin", 870_000, "IT", "turin-it"),
        ("Madrid", 3_200_000, "ES", "madrid-es"),
        ("Seville", 690_000, "ES", "seville-es"),
    ];
    for (name, population, country, slug) in rows {
        store.insert_node(
            Node::new(name)
                .with_property("population", population)
                .with_property("country", country)
                .with_property("slug", slug),
        );
        store.insert_edge(name, "locatedIn", country);
        store.insert_edge(name, "sameAs", slug);
    }
    store
}

fn seeds(store: &MemoryStore) -> Vec<NodeId> {
    store.node_ids()
}

// ============================================================================
// 1. Strategy per attribute
// ============================================================================

#[tokio::test]
async fn test_fit_picks_strategy_per_attribute() {
    let store = cities();
    let ids = seeds(&store);
    let extractor = FeatureExtractor::with_store(store);
    let bins = extractor.fit(ids).await.unwrap();

    assert!(matches!(bins.attributes.strategy("population"), Some(BinStrategy::Numeric(_))));
    assert_eq!(bins.attributes.strategy("country"), Some(&BinStrategy::Categorical));
    // 10 distinct out of 10: load 1.0
    assert_eq!(bins.attributes.strategy("slug"), Some(&BinStrategy::Skip));
    assert_eq!(
        bins.attributes.get_bin("country", &Value::from(" DE ")),
        Some(Bin::Category("DE".into()))
    );
    assert_eq!(bins.attributes.get_bin("slug", &Value::from("rome-it")), None);
}

// ============================================================================
// 2. Relationship load decides which types can be walked
// ============================================================================

#[tokio::test]
async fn test_fit_relationship_loads() {
    let store = cities();
    let ids = seeds(&store);
    let extractor = FeatureExtractor::with_store(store);
    let bins = extractor.fit(ids).await.unwrap();

    // 4 countries over 10 edges, 0.4 >= 0.2
    assert_eq!(bins.relationships.load("locatedIn").unwrap().unique_targets, 4);
    assert!(!bins.relationships.can_bin("locatedIn"));
    assert!(!bins.relationships.can_bin("sameAs"));

    let config = FeatureConfig {
        thresholds: BinningThresholds { relationship_load: 0.5, ..Default::default() },
        ..Default::default()
    };
    let store = cities();
    let ids = seeds(&store);
    let bins = FeatureExtractor::new(store, config).unwrap().fit(ids).await.unwrap();
    assert!(bins.relationships.can_bin("locatedIn"));
    assert_eq!(
        bins.relationships.get_bin("locatedIn", &NodeId::from("IT")),
        Some(&NodeId::from("IT"))
    );
    assert_eq!(bins.relationships.get_bin("sameAs", &NodeId::from("rome-it")), None);
}

// ============================================================================
// 3. Missing seeds do not contribute observations
// ============================================================================

#[tokio::test]
async fn test_fit_ignores_missing_seeds() {
    let store = cities();
    let extractor = FeatureExtractor::with_store(store);
    let bins = extractor
        .fit(["Atlantis", "El Dorado"].map(NodeId::from))
        .await
        .unwrap();

    assert!(bins.attributes.is_empty());
    assert!(bins.relationships.is_empty());
}

// ============================================================================
// 4. Discretizer artefacts land in the output directory
// ============================================================================

#[tokio::test]
async fn test_fit_writes_discretizer_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = cities();
    let ids = seeds(&store);
    let config = FeatureConfig::default().with_output_dir(dir.path());
    let extractor = FeatureExtractor::new(store, config).unwrap();
    extractor.fit(ids).await.unwrap();

    let bins_csv = std::fs::read_to_string(dir.path().join("attributes/bins.csv")).unwrap();
    assert!(bins_csv.starts_with("attribute,bins\npopulation,"));

    let country = std::fs::read_to_string(dir.path().join("attributes/country.csv")).unwrap();
    assert_eq!(country, "country,bin\nDE,DE\nES,ES\nFR,FR\nIT,IT\n");

    // skipped attributes get no value file
    assert!(!dir.path().join("attributes/slug.csv").exists());

    let loads = std::fs::read_to_string(dir.path().join("relationship.csv")).unwrap();
    assert_eq!(loads, "locatedIn,0.4,4\nsameAs,1,10\n");
}

// ============================================================================
// 5. An unwritable artefact directory does not stop fitting
// ============================================================================

#[tokio::test]
async fn test_fit_survives_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("attributes"), "not a directory").unwrap();

    let store = cities();
    let ids = seeds(&store);
    let config = FeatureConfig::default().with_output_dir(dir.path());
    let extractor = FeatureExtractor::new(store, config).unwrap();
    let bins = extractor.fit(ids).await.unwrap();

    assert!(matches!(bins.attributes.strategy("population"), Some(BinStrategy::Numeric(_))));
    assert!(bins.relationships.load("locatedIn").is_some());
    assert!(!dir.path().join("relationship.csv").exists());
}

// ============================================================================
// 6. Numeric bin invariants
// ============================================================================

fn fit_numbers(values: &[f64]) -> pgwalk::AttributeBins {
    let mut binner = AttributeBinner::default();
    for v in values {
        binner.observe("x", &Value::Float(*v));
    }
    binner.build().0
}

proptest! {
    #[test]
    fn prop_edges_non_decreasing(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
        let bins = fit_numbers(&values);
        let edges = bins.edges("x").unwrap();
        prop_assert!(!edges.is_empty());
        prop_assert!(edges.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_bin_contains_value(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 1..200),
        probe in -2.0e6f64..2.0e6,
    ) {
        let bins = fit_numbers(&values);
        let edges = bins.edges("x").unwrap();
        match bins.get_bin("x", &Value::Float(probe)).unwrap() {
            Bin::Index(k) => {
                prop_assert!(edges[k] <= probe);
                prop_assert!(probe < edges[k + 1]);
            }
            Bin::OutlierLow => prop_assert!(probe < edges[0]),
            Bin::OutlierHigh => prop_assert!(probe >= edges[edges.len() - 1]),
            other => prop_assert!(false, "unexpected bin {other:?}"),
        }
    }

    #[test]
    fn prop_get_bin_is_stable(
        values in prop::collection::vec(-1.0e3f64..1.0e3, 1..50),
        probe in -2.0e3f64..2.0e3,
    ) {
        let bins = fit_numbers(&values);
        let value = Value::Float(probe);
        prop_assert_eq!(bins.get_bin("x", &value), bins.get_bin("x", &value));
        prop_assert_eq!(
            bins.get_bin("x", &Value::from(probe.to_string())),
            bins.get_bin("x", &value)
        );
    }
}

#[test]
fn test_non_numeric_value_on_numeric_attribute() {
    let bins = fit_numbers(&[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(bins.get_bin("x", &Value::from("n/a")), Some(Bin::OutlierString));
    assert_eq!(bins.get_bin("x", &Value::Null), Some(Bin::OutlierString));
}
