//! Integration tests for the discovery pipeline with a scripted curator.

use sculptuur_radar::catalog::{Catalog, Source};
use sculptuur_radar::curator::{
    Backend, BackendReply, CuratorClient, CuratorError, CuratorRequest, LocationQuery,
    RetryPolicy, Task, CURRENT_LOCATION_NAME,
};
use sculptuur_radar::discovery::{
    reconcile, Degradation, DiscoveryEngine, DiscoverySettings, SearchError,
};
use sculptuur_radar::geo::Coordinate;
use sculptuur_radar::storage::config::CuratorSettings;

use crate::curator_mock::{
    catalog_record, engine_with, geocode_reply, json_reply, no_parks, ScriptedBackend,
};

const OTTERLO: (f64, f64) = (52.0952, 5.8169);

/// Otterlo with quota exhausted: only the catalog entry inside the radius survives.
#[tokio::test]
async fn test_quota_fallback_returns_catalog_subset() {
    let backend = ScriptedBackend::new([
        geocode_reply(OTTERLO.0, OTTERLO.1, "Otterlo"),
        Err(CuratorError::QuotaExceeded),
    ]);
    let engine = engine_with(
        backend,
        vec![
            catalog_record("here", "Kröller-Müller", OTTERLO.0, OTTERLO.1),
            // ~120 km east
            catalog_record("far", "Distant Garden", OTTERLO.0, 7.58),
        ],
    );

    let outcome = engine.search(&LocationQuery::text("Otterlo")).await.unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].record.id, "here");
    assert!(outcome.results[0].distance_km < 1e-9);
    assert_eq!(outcome.degradation, Some(Degradation::QuotaExceeded));
    assert_eq!(outcome.discovered_count, 0);

    // Quota is terminal: one geocode call, one discovery call, no retries.
    assert_eq!(
        engine.curator().backend().tasks(),
        vec![Task::Geocode, Task::SearchParks]
    );
}

#[tokio::test]
async fn test_fallback_equals_catalog_only_reconcile() {
    let backend = ScriptedBackend::new([
        geocode_reply(OTTERLO.0, OTTERLO.1, "Otterlo"),
        Err(CuratorError::QuotaExceeded),
    ]);
    let catalog = Catalog::bundled().unwrap();
    let settings = DiscoverySettings::default();
    let engine = DiscoveryEngine::new(
        CuratorClient::new(backend, RetryPolicy::immediate(2)),
        catalog.clone(),
        settings.clone(),
    );

    let outcome = engine.search(&LocationQuery::text("Otterlo")).await.unwrap();
    let origin = Coordinate::new(OTTERLO.0, OTTERLO.1).unwrap();
    let expected = reconcile(origin, catalog.records(), &[], &settings);

    assert!(!outcome.results.is_empty());
    assert_eq!(outcome.results, expected);
    assert_eq!(outcome.results[0].record.id, "nl-01");
}

#[tokio::test]
async fn test_curator_candidates_are_merged() {
    let backend = ScriptedBackend::new([
        geocode_reply(OTTERLO.0, OTTERLO.1, "Otterlo"),
        json_reply(serde_json::json!({
            "curatorIntro": "The Veluwe hides more than one garden.",
            "parks": [
                // Same place as the catalog entry, a few meters off
                { "name": "Kroller Muller Sculpture Garden", "location": "Otterlo",
                  "desc": "Duplicate", "lat": 52.0953, "lng": 5.8170 },
                { "name": "Beeldenpark Het Depot", "location": "Wageningen",
                  "desc": "Depot garden", "lat": "52.2", "lng": 5.9, "isInteractive": true },
                // Outside the radius despite what the curator claims
                { "name": "Northern Dunes", "location": "Friesland",
                  "desc": "Too far", "lat": 53.5, "lng": 5.8 },
                { "name": "Broken Entry", "location": "Nowhere",
                  "desc": "Bad latitude", "lat": "NaN", "lng": 5.8 }
            ]
        })),
    ]);
    let engine = engine_with(
        backend,
        vec![catalog_record("nl-01", "Kröller-Müller", OTTERLO.0, OTTERLO.1)],
    );

    let outcome = engine.search(&LocationQuery::text("Otterlo")).await.unwrap();

    assert_eq!(outcome.discovered_count, 3);
    assert_eq!(outcome.degradation, None);
    assert_eq!(
        outcome.curator_note.as_deref(),
        Some("The Veluwe hides more than one garden.")
    );

    let names: Vec<&str> = outcome.results.iter().map(|r| r.record.name.as_str()).collect();
    assert_eq!(names, vec!["Kröller-Müller", "Beeldenpark Het Depot"]);
    assert_eq!(outcome.results[0].record.source, Source::Catalog);
    assert_eq!(outcome.results[1].record.source, Source::AiDiscovered);
    assert!(outcome.results[1].record.id.starts_with("ai-"));

    let origin = Coordinate::new(OTTERLO.0, OTTERLO.1).unwrap();
    assert!(outcome.results.iter().all(|r| r.search_origin == origin));
}

#[tokio::test]
async fn test_unresolvable_query_is_not_found() {
    let backend = ScriptedBackend::new([geocode_reply(0.0, 0.0, "")]);
    let engine = engine_with(backend, Vec::new());

    let result = engine.search(&LocationQuery::text("Atlantis")).await;

    assert_eq!(result.unwrap_err(), SearchError::NotFound);
    // Resolution failed, so discovery never ran.
    assert_eq!(engine.curator().backend().tasks(), vec![Task::Geocode]);
}

#[tokio::test]
async fn test_blank_query_never_reaches_backend() {
    let engine = engine_with(ScriptedBackend::default(), Vec::new());

    let result = engine.search(&LocationQuery::text("   ")).await;

    assert_eq!(result.unwrap_err(), SearchError::NotFound);
    assert_eq!(engine.curator().backend().calls(), 0);
}

#[tokio::test]
async fn test_resolution_quota_aborts_search() {
    let backend = ScriptedBackend::new([Err(CuratorError::QuotaExceeded)]);
    let engine = engine_with(backend, Vec::new());

    let result = engine.search(&LocationQuery::text("Otterlo")).await;

    assert_eq!(result.unwrap_err(), SearchError::QuotaExceeded);
    assert_eq!(engine.curator().backend().calls(), 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let backend = ScriptedBackend::new([
        Err(CuratorError::Transient("503".into())),
        Err(CuratorError::Transient("connection reset".into())),
        geocode_reply(OTTERLO.0, OTTERLO.1, "Otterlo"),
        no_parks(),
    ]);
    let engine = engine_with(backend, Vec::new());

    let outcome = engine.search(&LocationQuery::text("Otterlo")).await.unwrap();

    assert_eq!(outcome.display_name, "Otterlo");
    assert_eq!(engine.curator().backend().calls(), 4);
}

#[tokio::test]
async fn test_exhausted_retries_surface_transient() {
    let backend = ScriptedBackend::new([
        Err(CuratorError::Transient("503".into())),
        Err(CuratorError::Transient("503".into())),
        Err(CuratorError::Transient("503".into())),
    ]);
    let engine = engine_with(backend, Vec::new());

    let result = engine.search(&LocationQuery::text("Otterlo")).await;

    assert_eq!(result.unwrap_err(), SearchError::Transient);
    assert_eq!(engine.curator().backend().calls(), 3);
}

#[tokio::test]
async fn test_unparseable_discovery_degrades_to_catalog() {
    let prose = || Ok(BackendReply::text("I could not find any parks."));
    let backend = ScriptedBackend::new([
        geocode_reply(OTTERLO.0, OTTERLO.1, "Otterlo"),
        prose(),
        prose(),
        prose(),
    ]);
    let engine = engine_with(
        backend,
        vec![catalog_record("nl-01", "Kröller-Müller", OTTERLO.0, OTTERLO.1)],
    );

    let outcome = engine.search(&LocationQuery::text("Otterlo")).await.unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.discovered_count, 0);
    assert_eq!(engine.curator().backend().calls(), 4);
}

#[tokio::test]
async fn test_gps_query_skips_geocode() {
    let backend = ScriptedBackend::new([no_parks()]);
    let engine = engine_with(
        backend,
        vec![catalog_record("nl-01", "Kröller-Müller", OTTERLO.0, OTTERLO.1)],
    );

    let query = LocationQuery::gps(52.1, 5.8).unwrap();
    let outcome = engine.search(&query).await.unwrap();

    assert_eq!(outcome.display_name, CURRENT_LOCATION_NAME);
    assert_eq!(engine.curator().backend().tasks(), vec![Task::SearchParks]);
    assert!(matches!(
        &engine.curator().backend().requests()[0],
        CuratorRequest::SearchParks { lat, location_name, radius_km, .. }
            if *lat == 52.1 && location_name == CURRENT_LOCATION_NAME && *radius_km == 50.0
    ));
    assert_eq!(outcome.results.len(), 1);
}

#[tokio::test]
async fn test_result_cap_keeps_nearest() {
    let backend = ScriptedBackend::new([no_parks()]);
    // 20 entries roughly 1.1 km apart going north from the origin
    let catalog = (0..20)
        .rev()
        .map(|i| {
            catalog_record(
                &format!("site-{:02}", i),
                &format!("Site {:02}", i),
                52.0 + i as f64 * 0.01,
                5.0,
            )
        })
        .collect();
    let engine = engine_with(backend, catalog);

    let outcome = engine.search(&LocationQuery::gps(52.0, 5.0).unwrap()).await.unwrap();

    let ids: Vec<String> = outcome.results.iter().map(|r| r.record.id.clone()).collect();
    let expected: Vec<String> = (0..16).map(|i| format!("site-{:02}", i)).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_missing_credential() {
    // Real backend with no key: every call fails before any network access.
    let backend = Backend::from_settings(&CuratorSettings::default(), None);
    let engine = engine_with(
        backend,
        vec![catalog_record("nl-01", "Kröller-Müller", OTTERLO.0, OTTERLO.1)],
    );

    let text = engine.search(&LocationQuery::text("Otterlo")).await;
    assert_eq!(text.unwrap_err(), SearchError::Configuration);

    // A device fix needs no geocode, so the search degrades instead.
    let gps = engine
        .search(&LocationQuery::gps(OTTERLO.0, OTTERLO.1).unwrap())
        .await
        .unwrap();
    assert_eq!(gps.degradation, Some(Degradation::NotConfigured));
    assert_eq!(gps.results.len(), 1);
}

#[tokio::test]
async fn test_failed_question_shows_fixed_message() {
    let upstream = "error sending request for url (https://relay.internal:8443/curator?key=abc)";
    let backend = ScriptedBackend::new([
        Err(CuratorError::Transient(upstream.to_string())),
        Err(CuratorError::Transient(upstream.to_string())),
        Err(CuratorError::Transient(upstream.to_string())),
        Err(CuratorError::Rejected("HTTP 400: prompt blocked by policy".to_string())),
    ]);
    let curator = CuratorClient::new(backend, RetryPolicy::immediate(2));

    let question = curator.answer_question("Who made the Jardin d'émail?").await.unwrap_err();
    assert!(matches!(question, CuratorError::Transient(_)));
    assert!(question.to_string().contains("relay.internal"));
    assert!(!question.user_message().contains("relay.internal"));
    assert!(!question.user_message().contains("key=abc"));

    let story = curator.elaborate("Jardin d'émail", "Otterlo").await.unwrap_err();
    assert!(matches!(story, CuratorError::Rejected(_)));
    assert!(!story.user_message().contains("HTTP 400"));
    assert!(!story.user_message().contains("prompt blocked"));
    assert_eq!(curator.backend().calls(), 4);
}
