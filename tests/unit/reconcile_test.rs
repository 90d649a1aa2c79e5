//! Unit tests for merging, filtering, deduplication and ranking.

use sculptuur_radar::catalog::{Catalog, LocationRecord, Source};
use sculptuur_radar::discovery::{deduplicate, reconcile, DiscoverySettings, RankedLocation};
use sculptuur_radar::geo::Coordinate;

const OTTERLO: (f64, f64) = (52.0952, 5.8169);

fn origin() -> Coordinate {
    Coordinate::new(OTTERLO.0, OTTERLO.1).unwrap()
}

fn record(id: &str, name: &str, lat: f64, lng: f64, source: Source) -> LocationRecord {
    LocationRecord::new(
        id,
        name,
        "Somewhere",
        "",
        Coordinate::new(lat, lng).unwrap(),
        source,
    )
}

fn ids(results: &[RankedLocation]) -> Vec<&str> {
    results.iter().map(|r| r.record.id.as_str()).collect()
}

#[test]
fn test_sculpture_garden_names_merge() {
    // 0.05 km apart, one name contains the other
    let discovered = vec![
        record("a", "Sculpture Garden", 52.10, 5.80, Source::AiDiscovered),
        record("b", "The Sculpture Garden Museum", 52.10045, 5.80, Source::AiDiscovered),
    ];

    let results = reconcile(origin(), &[], &discovered, &DiscoverySettings::default());

    assert_eq!(ids(&results), vec!["a"]);
}

#[test]
fn test_catalog_precedence() {
    let settings = DiscoverySettings::default();
    let catalog = vec![record("cat", "Kröller-Müller", 52.0951, 5.8197, Source::Catalog)];
    // Nearer to the origin than the catalog entry, but the same place
    let discovered = vec![record("ai", "KM Garden", 52.0952, 5.8180, Source::AiDiscovered)];

    let results = reconcile(origin(), &catalog, &discovered, &settings);

    assert_eq!(ids(&results), vec!["cat"]);
    assert_eq!(results[0].record.source, Source::Catalog);
}

#[test]
fn test_catalog_precedence_regardless_of_input_order() {
    let settings = DiscoverySettings::default();
    let ranked = vec![
        RankedLocation::new(
            record("ai", "Garden", 52.0952, 5.8169, Source::AiDiscovered),
            origin(),
        ),
        RankedLocation::new(
            record("cat", "Other Name", 52.0953, 5.8169, Source::Catalog),
            origin(),
        ),
    ];

    let unique = deduplicate(ranked, &settings);

    assert_eq!(ids(&unique), vec!["cat"]);
}

#[test]
fn test_dedup_idempotence() {
    let settings = DiscoverySettings::default();
    let candidates: Vec<RankedLocation> = vec![
        record("c1", "Middle Park", 52.10, 5.80, Source::Catalog),
        record("a1", "Middle Park North", 52.105, 5.80, Source::AiDiscovered),
        record("a2", "Lakeside", 52.0001, 5.9, Source::AiDiscovered),
        record("a3", "Lakeside Pavilion Ruins", 52.0002, 5.9, Source::AiDiscovered),
        record("a4", "Forest Walk", 52.05, 5.70, Source::AiDiscovered),
        record("c2", "Dunes", 52.20, 5.60, Source::Catalog),
    ]
    .into_iter()
    .map(|r| RankedLocation::new(r, origin()))
    .collect();

    let once = deduplicate(candidates, &settings);
    let twice = deduplicate(once.clone(), &settings);

    assert_eq!(ids(&once), vec!["c1", "c2", "a2", "a4"]);
    assert_eq!(once, twice);
}

#[test]
fn test_radius_filter_applies_to_both_sources() {
    let settings = DiscoverySettings::default();
    let catalog = vec![record("cat-far", "Far Catalog", 53.0, 5.8, Source::Catalog)];
    let discovered = vec![
        record("ai-far", "Far Curator", 51.0, 5.8, Source::AiDiscovered),
        record("ai-near", "Near Curator", 52.2, 5.8, Source::AiDiscovered),
    ];

    let results = reconcile(origin(), &catalog, &discovered, &settings);

    assert_eq!(ids(&results), vec!["ai-near"]);
    assert!(results.iter().all(|r| r.distance_km <= settings.search_radius_km));
}

#[test]
fn test_results_sorted_and_tied_to_origin() {
    let catalog = Catalog::bundled().unwrap();
    let settings = DiscoverySettings {
        search_radius_km: 150.0,
        ..Default::default()
    };

    let results = reconcile(origin(), catalog.records(), &[], &settings);

    assert!(!results.is_empty());
    assert!(results
        .windows(2)
        .all(|pair| pair[0].distance_km <= pair[1].distance_km));
    assert!(results.iter().all(|r| r.search_origin == origin()));
}

#[test]
fn test_radius_monotonicity() {
    let catalog = Catalog::bundled().unwrap();
    let discovered = vec![
        record("ai-1", "Veluwe Stones", 52.15, 5.90, Source::AiDiscovered),
        record("ai-2", "IJssel Walk", 52.25, 6.15, Source::AiDiscovered),
        record("ai-3", "Zeeland Dyke Art", 51.50, 3.90, Source::AiDiscovered),
    ];

    let mut previous = usize::MAX;
    for radius in [400.0, 200.0, 120.0, 100.0, 60.0, 50.0, 40.0, 10.0, 1.0, 0.0] {
        let settings = DiscoverySettings {
            search_radius_km: radius,
            max_results: usize::MAX,
            ..Default::default()
        };
        let count = reconcile(origin(), catalog.records(), &discovered, &settings).len();
        assert!(count <= previous, "radius {} gave {} > {}", radius, count, previous);
        previous = count;
    }
}

#[test]
fn test_radius_monotonicity_with_name_chain() {
    // "Garden" contains both other names; those two share no name and lie
    // 3.4 km apart. A is 40 km out, B and C about 10 km.
    let origin = Coordinate::new(52.0, 5.0).unwrap();
    let discovered = vec![
        record("a", "Garden", 52.36, 5.0, Source::AiDiscovered),
        record("b", "Garden North", 52.09, 5.0, Source::AiDiscovered),
        record("c", "Sculpture Garden", 52.09, 5.05, Source::AiDiscovered),
    ];

    let count_at = |radius: f64, name_match_max_km: Option<f64>| {
        let settings = DiscoverySettings {
            search_radius_km: radius,
            name_match_max_km,
            ..Default::default()
        };
        reconcile(origin, &[], &discovered, &settings).len()
    };

    // Unbounded name rule: A absorbs B and C whatever the radius
    assert_eq!(count_at(50.0, None), 1);
    assert_eq!(count_at(30.0, None), 0);

    // Default limit keeps all three apart
    assert_eq!(count_at(50.0, Some(1.0)), 3);
    assert_eq!(count_at(30.0, Some(1.0)), 2);
    assert_eq!(DiscoverySettings::default().name_match_max_km, Some(1.0));

    for limit in [None, Some(1.0)] {
        let mut previous = usize::MAX;
        for radius in [50.0, 40.0, 30.0, 20.0, 10.0, 5.0, 0.0] {
            let count = count_at(radius, limit);
            assert!(
                count <= previous,
                "limit {:?} radius {} gave {} > {}",
                limit,
                radius,
                count,
                previous
            );
            previous = count;
        }
    }
}

#[test]
fn test_cap_keeps_nearest() {
    // 30 candidates spaced about 1.1 km apart, fed in reverse
    let discovered: Vec<LocationRecord> = (0..30)
        .rev()
        .map(|i| {
            record(
                &format!("p{:02}", i),
                &format!("Point {:02}", i),
                OTTERLO.0 + i as f64 * 0.01,
                OTTERLO.1,
                Source::AiDiscovered,
            )
        })
        .collect();
    let settings = DiscoverySettings {
        max_results: 5,
        ..Default::default()
    };

    let results = reconcile(origin(), &[], &discovered, &settings);

    assert_eq!(ids(&results), vec!["p00", "p01", "p02", "p03", "p04"]);
}

#[test]
fn test_reconcile_is_deterministic() {
    let catalog = Catalog::bundled().unwrap();
    let discovered = vec![
        record("ai-1", "Veluwe Stones", 52.15, 5.90, Source::AiDiscovered),
        record("ai-2", "Veluwe Stones Two", 52.16, 5.91, Source::AiDiscovered),
    ];
    let settings = DiscoverySettings::default();

    let first = reconcile(origin(), catalog.records(), &discovered, &settings);
    let second = reconcile(origin(), catalog.records(), &discovered, &settings);

    assert_eq!(first, second);
}
