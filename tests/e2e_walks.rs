//! End-to-end tests for pass 2: walk sampling against fitted bins.
//!
//! Bins are fitted with `FeatureExtractor::fit`, then walks are sampled with
//! a seeded `StdRng` so every run sees the same draws.

use std::collections::BTreeSet;

use pgwalk::walk::sampler::WalkSets;
use pgwalk::{
    BinningThresholds, FeatureBins, FeatureConfig, FeatureExtractor, MemoryStore, Node, NodeId,
    StepKind, WalkConfig, WalkSampler,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Helper: capitals pointing at a handful of countries.
// ============================================================================

fn capitals() -> MemoryStore {
    let store = MemoryStore::new();
    let rows = [
        ("Berlin", "Germany"),
        ("Bonn", "Germany"),
        ("Paris", "France"),
        ("Versailles", "France"),
        ("Rome", "Italy"),
        ("Ravenna", "Italy"),
        ("Madrid", "Spain"),
        ("Toledo", "Spain"),
        ("Lisbon", "Portugal"),
        ("Coimbra", "Portugal"),
        ("Vienna", "Austria"),
        ("Prague", "Czechia"),
    ];
    for (city, country) in rows {
        store.insert_node(Node::new(city).with_property("kind", "city"));
        store.insert_edge(city, "capitalOf", country);
        // one distinct target per edge: never walkable
        store.insert_edge(city, "label", format!("{city}@en"));
    }
    for country in ["Germany", "France", "Italy", "Spain", "Portugal", "Austria", "Czechia"] {
        store.insert_node(Node::new(country).with_property("continent", "Europe"));
    }
    store
}

async fn fitted(store: MemoryStore, relationship_load: f64) -> (FeatureExtractor<MemoryStore>, FeatureBins) {
    let seeds = store.node_ids();
    let config = FeatureConfig {
        thresholds: BinningThresholds { relationship_load, ..Default::default() },
        ..Default::default()
    };
    let extractor = FeatureExtractor::new(store, config).unwrap();
    let bins = extractor.fit(seeds).await.unwrap();
    (extractor, bins)
}

async fn walks(
    extractor: &FeatureExtractor<MemoryStore>,
    bins: &FeatureBins,
    seed: &str,
    allowed: &[StepKind],
    config: WalkConfig,
    rng_seed: u64,
) -> BTreeSet<String> {
    let sampler = WalkSampler::new(extractor.store(), bins);
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let mut sets: WalkSets = sampler
        .walks(&NodeId::from(seed), allowed, &[config], &mut rng)
        .await
        .unwrap();
    sets.remove(&config.key()).unwrap_or_default()
}

// ============================================================================
// 1. A single move ends with the terminal id
// ============================================================================

#[tokio::test]
async fn test_single_move_walk() {
    // 7 countries over 12 edges: load 0.58
    let (extractor, bins) = fitted(capitals(), 0.6).await;
    assert!(bins.relationships.can_bin("capitalOf"));

    let set = walks(&extractor, &bins, "Berlin", &[StepKind::RelationshipStep], WalkConfig::new(1, 5), 3).await;
    let expected: BTreeSet<String> = ["capitalOf->id=Germany".to_string()].into();
    assert_eq!(set, expected);
}

// ============================================================================
// 2. High-load types never show up as move tokens
// ============================================================================

#[tokio::test]
async fn test_high_load_relationship_never_moves() {
    let (extractor, bins) = fitted(capitals(), 0.2).await;
    assert!(!bins.relationships.can_bin("capitalOf"));
    assert!(!bins.relationships.can_bin("label"));

    for rng_seed in 0..5 {
        let set = walks(
            &extractor,
            &bins,
            "Rome",
            &[StepKind::RelationshipStep, StepKind::HasRelationship],
            WalkConfig::new(4, 30),
            rng_seed,
        )
        .await;
        assert!(!set.is_empty());
        for walk in &set {
            assert!(!walk.contains("->"), "unexpected move in {walk}");
            assert!(walk.split(',').all(|t| t == "hasRel_capitalOf" || t == "hasRel_label"));
        }
    }
}

// ============================================================================
// 3. Walks after a move read the neighbour's attributes
// ============================================================================

#[tokio::test]
async fn test_move_then_attribute() {
    let (extractor, bins) = fitted(capitals(), 0.6).await;

    let set = walks(
        &extractor,
        &bins,
        "Paris",
        &[StepKind::RelationshipStep, StepKind::HasAttribute],
        WalkConfig::new(2, 200),
        11,
    )
    .await;

    // every reachable walk of length 1 or 2
    let possible: BTreeSet<String> = [
        "has_kind",
        "has_kind,has_kind",
        "capitalOf->id=France",
        "has_kind,capitalOf->id=France",
        "capitalOf->has_continent",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert!(set.is_subset(&possible), "{set:?}");
    assert!(set.contains("capitalOf->has_continent"));
    assert!(set.contains("has_kind"));
}

// ============================================================================
// 4. Attribute values are tokenised through the bins
// ============================================================================

#[tokio::test]
async fn test_attribute_value_tokens() {
    let (extractor, bins) = fitted(capitals(), 0.2).await;

    let set = walks(&extractor, &bins, "Lisbon", &[StepKind::AttributeValue], WalkConfig::new(1, 5), 0).await;
    let expected: BTreeSet<String> = ["kind=city".to_string()].into();
    assert_eq!(set, expected);
}

// ============================================================================
// 5. Incoming moves and stalled walks
// ============================================================================

#[tokio::test]
async fn test_incoming_move_and_stall() {
    let (extractor, bins) = fitted(capitals(), 0.6).await;

    // Austria has exactly one incoming capitalOf edge
    let set = walks(
        &extractor,
        &bins,
        "Austria",
        &[StepKind::IncomingRelationshipStep],
        WalkConfig::new(1, 5),
        5,
    )
    .await;
    let expected: BTreeSet<String> = ["capitalOf<-id=Vienna".to_string()].into();
    assert_eq!(set, expected);

    // no incoming relationships at a city: every step stalls
    let set = walks(
        &extractor,
        &bins,
        "Vienna",
        &[StepKind::HasIncomingRelationship],
        WalkConfig::new(3, 10),
        5,
    )
    .await;
    assert!(set.is_empty());
}

// ============================================================================
// 6. Same RNG seed, same walk sets
// ============================================================================

#[tokio::test]
async fn test_walks_are_reproducible() {
    let (extractor, bins) = fitted(capitals(), 0.6).await;
    let sampler = WalkSampler::new(extractor.store(), &bins);
    let configs = WalkConfig::grid(&[2, 3], &[10, 25]);

    let mut a = StdRng::seed_from_u64(42);
    let mut b = StdRng::seed_from_u64(42);
    let first = sampler.walks(&"Madrid".into(), &StepKind::ALL, &configs, &mut a).await.unwrap();
    let second = sampler.walks(&"Madrid".into(), &StepKind::ALL, &configs, &mut b).await.unwrap();

    assert_eq!(first, second);
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["2x10", "2x25", "3x10", "3x25"]);
}

// ============================================================================
// 7. Walk string shape
// ============================================================================

#[tokio::test]
async fn test_walk_string_shape() {
    let (extractor, bins) = fitted(capitals(), 0.6).await;
    let sampler = WalkSampler::new(extractor.store(), &bins);
    let mut rng = StdRng::seed_from_u64(9);

    let sets = sampler
        .walks(&"Toledo".into(), &StepKind::ALL, &[WalkConfig::new(5, 100)], &mut rng)
        .await
        .unwrap();

    for walk in sets.values().flatten() {
        assert!(!walk.is_empty());
        assert!(!walk.ends_with(','), "{walk}");
        assert!(!walk.starts_with(','), "{walk}");
        assert!(!walk.contains(",,"), "{walk}");
        if walk.ends_with("->") || walk.ends_with("<-") {
            panic!("walk ends on a bare move: {walk}");
        }
    }
}
