//! End-to-end tests for layer loading: source -> session -> assembler ->
//! renderer, with status reporting.

use async_trait::async_trait;
use bytes::Bytes;
use map_common::{MapError, MapResult};
use map_viewer::config::PageConfig;
use map_viewer::render::{Frame, LOAD_FAILED_MESSAGE};
use map_viewer::status::NO_MAPS_STATUS;
use map_viewer::{
    DirSource, LatestFigure, LayerSource, LoadOutcome, MapLoader, SelectionError, StatusBoard,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_utils::{
    complete_figure, feature, feature_collection, geoids, layers, mixed_collection,
    require_test_file, sample_manifest, service_testdata_dir, temp_data_dir,
    SUBCATEGORY_CONFIG_YAML,
};
use tokio::sync::Notify;

fn testdata_dir() -> PathBuf {
    service_testdata_dir("map-viewer")
}

struct Harness {
    loader: MapLoader,
    board: Arc<StatusBoard>,
    figures: Arc<LatestFigure>,
}

fn harness(config: PageConfig, source: Arc<dyn LayerSource>) -> Harness {
    let board = Arc::new(StatusBoard::new());
    let figures = Arc::new(LatestFigure::new());
    let loader = MapLoader::new(config, source, figures.clone(), board.clone());
    Harness {
        loader,
        board,
        figures,
    }
}

fn dir_harness(config: PageConfig, dir: impl Into<PathBuf>) -> Harness {
    harness(config, Arc::new(DirSource::new(dir)))
}

async fn rendered_figure(figures: &LatestFigure) -> Value {
    match figures.snapshot().await.frame {
        Some(Frame::Figure { figure, .. }) => serde_json::to_value(&figure).unwrap(),
        other => panic!("expected a rendered figure, got {:?}", other),
    }
}

/// Counts fetches per file.
struct CountingSource {
    inner: DirSource,
    fetches: AtomicUsize,
}

#[async_trait]
impl LayerSource for CountingSource {
    async fn fetch(&self, file: &str) -> MapResult<Bytes> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(file).await
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

/// Holds fetches of one file until released.
struct GatedSource {
    inner: DirSource,
    gated_file: &'static str,
    gate: Arc<Notify>,
}

#[async_trait]
impl LayerSource for GatedSource {
    async fn fetch(&self, file: &str) -> MapResult<Bytes> {
        if file == self.gated_file {
            self.gate.notified().await;
        }
        self.inner.fetch(file).await
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

// ============================================================================
// Status lifecycle
// ============================================================================

#[tokio::test]
async fn test_init_renders_first_layer() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    let outcome = h.loader.init().await;

    let LoadOutcome::Rendered { file, summary } = outcome else {
        panic!("expected a rendered layer");
    };
    assert_eq!(file, "pollution_income.json");
    let summary = summary.expect("feature collections report a summary");
    assert_eq!(summary.count, 4);
    assert_eq!(summary.valid_count, 3);
    assert_eq!(summary.dropped.unmapped, 1);

    assert_eq!(
        h.board.history(),
        vec![
            "Loading pollution_income.json...",
            "Loaded 4 features, 3 values (min: 62000, max: 120000)",
            "",
        ]
    );
    assert_eq!(h.board.snapshot().summary, Some(summary));

    let snapshot = h.figures.snapshot().await;
    assert_eq!(snapshot.revision, 1);
    let Some(Frame::Figure { config, .. }) = &snapshot.frame else {
        panic!("expected a figure frame");
    };
    assert!(config.responsive && config.display_mode_bar && !config.scroll_zoom);

    let figure = rendered_figure(&h.figures).await;
    assert_eq!(
        figure["data"][0]["locations"],
        json!([geoids::SAN_FRANCISCO, geoids::ALAMEDA, geoids::SANTA_CLARA, geoids::MARIN])
    );
    assert_eq!(figure["data"][0]["z"], json!([2.0 / 3.0, 1.0 / 3.0, null, 1.0]));
}

#[tokio::test]
async fn test_manifest_labels_and_ids() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    h.loader.discover().await;

    let view = h.loader.view().await;
    assert_eq!(view.catalog_size, 4);
    assert_eq!(view.layers[0].id().as_str(), "economic");
    assert_eq!(view.layers[0].label(), "Economic Status");
    assert_eq!(view.layers[1].label(), "Pollution Pm25");
    assert_eq!(view.layers[2].id().as_str(), "prebuilt_figure");
}

#[tokio::test]
async fn test_prebuilt_figure_passes_through() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    h.loader.discover().await;

    let outcome = h.loader.select_layer("prebuilt_figure.json").await.unwrap();
    assert!(matches!(outcome, LoadOutcome::Rendered { summary: None, .. }));
    assert_eq!(
        h.board.history(),
        vec!["Loading prebuilt_figure.json...", ""]
    );

    let figure = rendered_figure(&h.figures).await;
    assert_eq!(figure["layout"], json!({"title": {"text": "Monitoring Stations"}}));
    assert_eq!(figure["data"][0]["type"], "scattermapbox");

    let path = require_test_file!("prebuilt_figure.json");
    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(figure["data"], on_disk["data"]);
}

#[tokio::test]
async fn test_discover_mixed_manifest_entries() {
    let manifest = sample_manifest();
    let dir = temp_data_dir(&[("manifest.json", &manifest)]);
    let h = dir_harness(PageConfig::default(), dir.path());
    h.loader.discover().await;

    let view = h.loader.view().await;
    let labels: Vec<&str> = view.layers.iter().map(|l| l.label()).collect();
    assert_eq!(
        labels,
        vec!["Pollution Income", "Race / Ethnicity", "Pollution Age", "Pollution Pm25"]
    );
    assert_eq!(view.layers[3].file(), layers::PM25);
    assert_eq!(view.active_layer.as_deref(), Some(layers::INCOME));
}

#[tokio::test]
async fn test_bare_feature_list_with_alternate_value_field() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    h.loader.discover().await;

    let outcome = h.loader.select_layer("pollution_pm25").await.unwrap();
    let LoadOutcome::Rendered { summary: Some(summary), .. } = outcome else {
        panic!("expected a rendered feature collection");
    };
    assert_eq!(summary.count, 2);
    assert_eq!(summary.dropped.short_geoid, 1);
    assert_eq!(
        summary.status_line(),
        "Loaded 2 features, 2 values (min: 7.25, max: 9.5)"
    );

    let figure = rendered_figure(&h.figures).await;
    assert_eq!(
        figure["data"][0]["geojson"]["features"][1]["properties"]["county"],
        "Contra Costa"
    );
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_format_error_renders_placeholder() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    h.loader.init().await;

    let outcome = h.loader.select_layer("unrecognized.json").await.unwrap();
    let LoadOutcome::Failed { error, .. } = outcome else {
        panic!("expected a failed load");
    };
    assert!(matches!(error, MapError::Format { .. }));

    assert_eq!(
        h.board.snapshot().status,
        "Error loading unrecognized.json: Unrecognized JSON format for unrecognized.json"
    );
    let snapshot = h.figures.snapshot().await;
    assert_eq!(
        snapshot.frame,
        Some(Frame::Placeholder {
            message: LOAD_FAILED_MESSAGE.to_string()
        })
    );
    assert_eq!(snapshot.revision, 2);

    // Still usable afterwards
    let outcome = h.loader.select_layer("economic").await.unwrap();
    assert!(outcome.is_rendered());
    assert_eq!(h.board.snapshot().status, "");
}

#[tokio::test]
async fn test_missing_layer_file() {
    let manifest = json!(["missing.json"]);
    let dir = temp_data_dir(&[("manifest.json", &manifest)]);
    let h = dir_harness(PageConfig::default(), dir.path());

    let outcome = h.loader.init().await;
    let LoadOutcome::Failed { file, error } = outcome else {
        panic!("expected a failed load");
    };
    assert_eq!(file, "missing.json");
    assert_eq!(error.kind(), "transport");
    assert_eq!(error.http_status_code(), 404);
    assert_eq!(
        h.board.snapshot().status,
        "Error loading missing.json: HTTP 404 Not Found"
    );
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let manifest = json!(["broken.json"]);
    let dir = temp_data_dir(&[("manifest.json", &manifest)]);
    std::fs::write(dir.path().join("broken.json"), "{\"features\": [").unwrap();
    let h = dir_harness(PageConfig::default(), dir.path());

    let LoadOutcome::Failed { error, .. } = h.loader.init().await else {
        panic!("expected a failed load");
    };
    assert!(matches!(error, MapError::Decode(_)));
    assert!(h
        .board
        .snapshot()
        .status
        .starts_with("Error loading broken.json: Invalid JSON:"));
}

#[tokio::test]
async fn test_missing_manifest_uses_fallback_layers() {
    let dir = tempfile::tempdir().unwrap();
    let h = dir_harness(PageConfig::default(), dir.path());

    let outcome = h.loader.init().await;
    assert_eq!(outcome.file(), Some("pollution_income.json"));

    let view = h.loader.view().await;
    let labels: Vec<&str> = view.layers.iter().map(|l| l.label()).collect();
    assert_eq!(labels, vec!["Economic Status", "Race", "Age", "PM2.5"]);
}

#[tokio::test]
async fn test_unknown_layer_is_rejected_without_loading() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    h.loader.init().await;
    let history_before = h.board.history();

    let err = h.loader.select_layer("nope.json").await.unwrap_err();
    assert_eq!(err, SelectionError::UnknownLayer("nope.json".to_string()));
    assert_eq!(h.board.history(), history_before);
}

// ============================================================================
// Selection behaviour
// ============================================================================

#[tokio::test]
async fn test_empty_selection_reports_no_maps() {
    let config = PageConfig {
        map_filter: vec!["elsewhere.json".to_string()],
        ..PageConfig::default()
    };
    let h = dir_harness(config, testdata_dir());

    let outcome = h.loader.init().await;
    assert!(matches!(outcome, LoadOutcome::NoLayers));
    assert_eq!(h.board.snapshot().status, NO_MAPS_STATUS);
    assert_eq!(h.figures.snapshot().await.revision, 0);
}

#[tokio::test]
async fn test_subcategory_switch_uses_group_scale() {
    let collection = mixed_collection();
    let dir = temp_data_dir(&[
        ("pollution_income.json", &collection),
        ("pollution_race.json", &collection),
        ("pollution_age.json", &collection),
        ("pollution_pm25.json", &collection),
    ]);
    let config = PageConfig::from_yaml(SUBCATEGORY_CONFIG_YAML).unwrap();
    let h = dir_harness(config, dir.path());

    // No manifest in the directory: fallback list, default group
    let outcome = h.loader.init().await;
    assert_eq!(outcome.file(), Some("pollution_race.json"));
    let figure = rendered_figure(&h.figures).await;
    // Reversed default: list order flipped, positions kept
    assert_eq!(figure["data"][0]["colorscale"][0], json!([1.0, "#006837"]));

    let outcome = h.loader.select_subcategory("Environment").await.unwrap();
    assert_eq!(outcome.file(), Some("pollution_income.json"));
    let figure = rendered_figure(&h.figures).await;
    assert_eq!(figure["data"][0]["colorscale"][0], json!([0.0, "#f7fcf5"]));

    let view = h.loader.view().await;
    assert_eq!(view.active_subcategory.as_deref(), Some("Environment"));
    assert_eq!(view.layers[1].label(), "Fine Particulates");
}

#[tokio::test]
async fn test_every_selection_fetches_afresh() {
    let first = feature_collection(vec![feature(geoids::ALAMEDA, json!(1))]);
    let manifest = json!(["layer.json"]);
    let dir = temp_data_dir(&[("manifest.json", &manifest), ("layer.json", &first)]);
    let source = Arc::new(CountingSource {
        inner: DirSource::new(dir.path()),
        fetches: AtomicUsize::new(0),
    });
    let h = harness(PageConfig::default(), source.clone());

    h.loader.init().await;
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

    let second = feature_collection(vec![
        feature(geoids::ALAMEDA, json!(1)),
        feature(geoids::MARIN, json!(2)),
    ]);
    std::fs::write(
        dir.path().join("layer.json"),
        serde_json::to_string(&second).unwrap(),
    )
    .unwrap();

    let outcome = h.loader.select_layer("layer.json").await.unwrap();
    assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
    let LoadOutcome::Rendered { summary: Some(summary), .. } = outcome else {
        panic!("expected a rendered layer");
    };
    assert_eq!(summary.count, 2);
}

#[tokio::test]
async fn test_superseded_load_is_discarded() {
    let manifest = json!(["slow.json", "fast.json"]);
    let slow = mixed_collection();
    let fast = complete_figure();
    let dir = temp_data_dir(&[
        ("manifest.json", &manifest),
        ("slow.json", &slow),
        ("fast.json", &fast),
    ]);
    let gate = Arc::new(Notify::new());
    let source = Arc::new(GatedSource {
        inner: DirSource::new(dir.path()),
        gated_file: "slow.json",
        gate: gate.clone(),
    });
    let h = harness(PageConfig::default(), source);
    h.loader.discover().await;

    let slow_loader = h.loader.clone();
    let slow_task = tokio::spawn(async move { slow_loader.select_layer("slow.json").await });

    // Wait until the slow load holds its ticket and is parked in the fetch
    for _ in 0..1000 {
        if h.board.history().iter().any(|line| line == "Loading slow.json...") {
            break;
        }
        tokio::task::yield_now().await;
    }

    let outcome = h.loader.select_layer("fast.json").await.unwrap();
    assert!(outcome.is_rendered());

    gate.notify_one();
    let outcome = slow_task.await.unwrap().unwrap();
    assert!(matches!(outcome, LoadOutcome::Stale { .. }));

    // The newer selection's output is what stays on screen
    let snapshot = h.figures.snapshot().await;
    assert_eq!(snapshot.revision, 1);
    let figure = rendered_figure(&h.figures).await;
    assert_eq!(figure, fast);
    assert_eq!(h.board.snapshot().status, "");
    assert!(h.board.snapshot().summary.is_none());
}

// ============================================================================
// Layout and resize
// ============================================================================

#[tokio::test]
async fn test_viewport_height_sizes_layout() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    let loader = h.loader.clone().with_viewport_height(1000.0);
    loader.init().await;

    let figure = rendered_figure(&h.figures).await;
    assert_eq!(figure["layout"]["height"], 700.0);

    let small = h.loader.clone().with_viewport_height(200.0);
    small.select_layer("economic").await.unwrap();
    let figure = rendered_figure(&h.figures).await;
    assert_eq!(figure["layout"]["height"], 420.0);
}

#[tokio::test]
async fn test_resize_bumps_revision() {
    let h = dir_harness(PageConfig::default(), testdata_dir());
    h.loader.init().await;
    assert_eq!(h.figures.snapshot().await.revision, 1);

    h.loader.resize().await;
    assert_eq!(h.figures.snapshot().await.revision, 2);
}
