use std::time::Duration;

use catalog::{CatalogRow, Lineage};
use manifest::{ManifestItem, ManifestPayload};

use crate::engine::MatchEngine;
use crate::testing::{named_item, FailingManifestSource, MemoryKnowledge, StaticManifestSource};
use crate::types::{KnownProduct, MatchEngineConfig, MatchError, NoKnowledge, Provenance};

fn catalog_row(name: &str, vendor: Option<&str>) -> CatalogRow {
    CatalogRow {
        product_name: Some(name.to_string()),
        vendor: vendor.map(str::to_string),
        ..Default::default()
    }
}

fn engine_with(
    rows: &[CatalogRow],
    items: Vec<ManifestItem>,
    cfg: MatchEngineConfig,
) -> MatchEngine {
    let engine = MatchEngine::with_parts(
        cfg,
        Box::new(StaticManifestSource::of_items(items)),
        Box::new(NoKnowledge),
    )
    .expect("config is valid");
    engine.rebuild_index(rows);
    engine
}

const LOCATOR: &str = "https://transfers.example/manifest/42";

#[test]
fn compliant_transfer_name_matches_catalog_rosin() {
    let rows = [catalog_row(
        "Grape Gas Reserve Rosin by Dank Czar - 1g",
        Some("Dank Czar"),
    )];
    let items = vec![named_item(
        "Medically Compliant - Dank Czar Live Hash Rosin Reserve - Grape Gas - 1g",
    )];
    let engine = engine_with(&rows, items, MatchEngineConfig::default());

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.synthesized, 0);
    assert_eq!(
        outcome.matched_names,
        vec!["Grape Gas Reserve Rosin by Dank Czar - 1g".to_string()]
    );
    match &outcome.records[0].provenance {
        Provenance::Catalog { score, .. } => assert!(*score >= 0.3, "score {score} too low"),
        other => panic!("expected a catalog match, got {other:?}"),
    }
}

#[test]
fn foreign_vendor_is_rejected_not_matched() {
    // "omega" has no alias or word-overlap relation to "jsm llc": the
    // selector falls through to key terms, but the scorer's vendor guard
    // still rejects the cross-vendor pair.
    let rows = [catalog_row("Grape Gas Rosin", Some("jsm llc"))];
    let mut item = named_item("Grape Gas Hash Rosin 1g");
    item.vendor = Some("omega".to_string());
    let engine = engine_with(&rows, vec![item], MatchEngineConfig::default());

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert_eq!(outcome.matched, 0);
    assert_eq!(outcome.synthesized, 1);
    assert!(outcome.records[0].is_synthesized());
}

#[test]
fn nameless_items_are_skipped_silently() {
    let rows = [catalog_row("Blue Dream Flower", None)];
    let items = vec![
        ManifestItem::default(),
        named_item("   "),
        named_item("Blue Dream Flower"),
    ];
    let engine = engine_with(&rows, items, MatchEngineConfig::default());

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn floor_score_falls_below_threshold_and_synthesizes_hybrid() {
    // Vendor extraction pulls this entry into the slate, but the pair
    // shares no terms, tokens, or strains and the names are too different
    // in length for the similarity rule, leaving only the 0.05 floor.
    let mut row = catalog_row("Lavender Relief Balm", Some("omega farms"));
    row.product_type = Some("topical".to_string());
    let mut item = named_item("Omega Gummy Bears Variety Ten Pack Assorted");
    item.product_type = Some("edible".to_string());
    let engine = engine_with(&[row], vec![item], MatchEngineConfig::default());

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert_eq!(outcome.matched, 0);
    assert_eq!(outcome.synthesized, 1);
    let record = &outcome.records[0];
    assert!(record.is_synthesized());
    assert_eq!(record.lineage, Lineage::Hybrid);
}

#[test]
fn knowledge_store_enriches_synthesized_records() {
    let name = "House Special Elixir";
    let knowledge = MemoryKnowledge::default().with(
        name,
        KnownProduct {
            lineage: Some("SATIVA".to_string()),
            price: Some(9.5),
            vendor: Some("house brand".to_string()),
            brand: None,
        },
    );
    let mut item = named_item(name);
    item.product_type = Some("beverage".to_string());
    let engine = MatchEngine::with_parts(
        MatchEngineConfig::default(),
        Box::new(StaticManifestSource::of_items(vec![item])),
        Box::new(knowledge),
    )
    .expect("config is valid");
    engine.rebuild_index(&[catalog_row("Blue Dream Flower", None)]);

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    let record = &outcome.records[0];
    assert!(record.is_synthesized());
    assert_eq!(record.lineage, Lineage::Sativa);
    assert_eq!(record.price, Some(9.5));
    assert_eq!(record.vendor.as_deref(), Some("house brand"));
}

#[test]
fn empty_locator_rejected_before_any_fetch() {
    let source = StaticManifestSource::of_items(vec![named_item("Blue Dream Flower")]);
    let engine = MatchEngine::with_parts(
        MatchEngineConfig::default(),
        Box::new(source),
        Box::new(NoKnowledge),
    )
    .expect("config is valid");
    engine.rebuild_index(&[catalog_row("Blue Dream Flower", None)]);

    let err = engine.match_manifest("   ").expect_err("empty locator");
    assert!(matches!(err, MatchError::Input(_)));

    let err = engine.match_manifest("ftp://nope").expect_err("bad scheme");
    assert!(matches!(err, MatchError::Input(_)));
}

#[test]
fn zero_budget_truncates_immediately() {
    let rows = [catalog_row("Blue Dream Flower", None)];
    let items: Vec<ManifestItem> = (0..200)
        .map(|i| named_item(&format!("Blue Dream Flower Lot {i}")))
        .collect();
    let cfg = MatchEngineConfig::default().with_time_budget(Duration::ZERO);
    let engine = engine_with(&rows, items, cfg);

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert!(outcome.truncated);
    assert_eq!(outcome.processed, 0);
    assert!(outcome.records.is_empty());
}

#[test]
fn missing_catalog_short_circuits_without_fetching() {
    let source = StaticManifestSource::of_items(vec![named_item("Blue Dream Flower")]);
    let engine = MatchEngine::with_parts(
        MatchEngineConfig::default(),
        Box::new(source.clone()),
        Box::new(NoKnowledge),
    )
    .expect("config is valid");
    // No rebuild_index call: the engine has never seen a catalog.
    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert!(outcome.records.is_empty());
    assert_eq!(source.fetch_count(), 0);
    assert_eq!(engine.cache_status(), "not built");
}

#[test]
fn empty_catalog_yields_empty_outcome() {
    let engine = engine_with(&[], vec![named_item("Blue Dream Flower")], Default::default());
    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.processed, 0);
    assert_eq!(engine.cache_status(), "empty");
}

#[test]
fn fetch_failure_fails_the_whole_run() {
    let engine = MatchEngine::with_parts(
        MatchEngineConfig::default(),
        Box::new(FailingManifestSource),
        Box::new(NoKnowledge),
    )
    .expect("config is valid");
    engine.rebuild_index(&[catalog_row("Blue Dream Flower", None)]);

    let err = engine.match_manifest(LOCATOR).expect_err("fetch fails");
    assert!(matches!(err, MatchError::Manifest(_)));
}

#[test]
fn manifest_without_item_list_yields_empty_outcome() {
    let engine = MatchEngine::with_parts(
        MatchEngineConfig::default(),
        Box::new(StaticManifestSource::new(ManifestPayload::default())),
        Box::new(NoKnowledge),
    )
    .expect("config is valid");
    engine.rebuild_index(&[catalog_row("Blue Dream Flower", None)]);

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    assert_eq!(outcome.processed, 0);
    assert!(outcome.records.is_empty());
    assert!(!outcome.truncated);
}

#[test]
fn matched_record_merges_catalog_identity_with_shipment_fields() {
    let mut row = catalog_row("Grape Gas Rosin", Some("dank czar"));
    row.lineage = Some("INDICA".to_string());
    row.product_type = Some("concentrate".to_string());
    let mut item = named_item("Grape Gas Rosin");
    item.price = Some(25.0);
    item.weight = Some(1.0);
    item.unit = Some("g".to_string());
    let engine = engine_with(&[row], vec![item], MatchEngineConfig::default());

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    let record = &outcome.records[0];
    assert_eq!(record.name, "Grape Gas Rosin");
    assert_eq!(record.vendor.as_deref(), Some("dank czar"));
    assert_eq!(record.lineage, Lineage::Indica);
    assert_eq!(record.price, Some(25.0));
    assert_eq!(record.display_weight.as_deref(), Some("1 g"));
    match record.provenance {
        Provenance::Catalog { index, score } => {
            assert_eq!(index, 0);
            assert_eq!(score, 1.0);
        }
        _ => panic!("expected a catalog match"),
    }
}

#[test]
fn rebuilds_from_identical_rows_match_deterministically() {
    let rows = [
        catalog_row("Grape Gas Rosin", Some("dank czar")),
        catalog_row("Blue Dream Flower", Some("phat panda")),
        catalog_row("Zkittlez Pre-Roll", Some("phat panda")),
    ];
    let items = vec![
        named_item("Dank Czar Grape Gas Rosin 1g"),
        named_item("Blue Dream Flower 3.5g"),
    ];

    let run = || {
        let engine = engine_with(&rows, items.clone(), MatchEngineConfig::default());
        engine.match_manifest(LOCATOR).expect("run succeeds")
    };
    let (first, second) = (run(), run());
    assert_eq!(first.records, second.records);
    assert_eq!(first.matched_names, second.matched_names);
}

#[test]
fn last_outcome_tracks_the_most_recent_run() {
    let rows = [catalog_row("Blue Dream Flower", None)];
    let engine = engine_with(
        &rows,
        vec![named_item("Blue Dream Flower")],
        MatchEngineConfig::default(),
    );
    assert!(engine.last_outcome().is_none());

    let outcome = engine.match_manifest(LOCATOR).expect("run succeeds");
    let last = engine.last_outcome().expect("outcome stored");
    assert_eq!(last.records, outcome.records);
    assert_eq!(last.matched, 1);
}
