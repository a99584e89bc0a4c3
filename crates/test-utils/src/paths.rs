//! Path utilities for locating test data and staging data directories.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

/// Returns the workspace root directory.
///
/// Two levels above this crate's manifest directory (`crates/test-utils`).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the path to `services/{service_name}/testdata/`.
pub fn service_testdata_dir(service_name: &str) -> PathBuf {
    workspace_root()
        .join("services")
        .join(service_name)
        .join("testdata")
}

/// Searches for a test file.
///
/// Checks `TEST_DATA_DIR` (if set), then the map-viewer testdata directory,
/// then a workspace-level `testdata/`.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        service_testdata_dir("map-viewer").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Creates a temporary data directory populated with JSON files.
///
/// Each `(name, value)` pair is written as `name` containing `value`.
pub fn temp_data_dir(files: &[(&str, &Value)]) -> tempfile::TempDir {
    let dir = tempfile::Builder::new()
        .prefix("map_data_")
        .tempdir()
        .expect("Failed to create temporary data directory");

    for (name, value) in files {
        let body = serde_json::to_string_pretty(value).expect("Failed to encode test JSON");
        fs::write(dir.path().join(name), body).expect("Failed to write test data file");
    }

    dir
}
