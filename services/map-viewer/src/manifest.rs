//! Catalog discovery from `manifest.json`.

use map_common::{fallback_layers, Layer, ManifestEntry, MapResult};
use tracing::{info, warn};

use crate::metrics;
use crate::source::{fetch_json, LayerSource};

/// Name of the manifest file at the root of the data path.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Normalize decoded manifest JSON into layers, in manifest order.
pub fn parse_manifest(value: serde_json::Value) -> MapResult<Vec<Layer>> {
    let entries: Vec<ManifestEntry> = serde_json::from_value(value)?;
    Ok(entries.into_iter().map(ManifestEntry::into_layer).collect())
}

/// Load the catalog from `source`.
///
/// Never fails: an unreachable or unreadable manifest is replaced by the
/// built-in fallback list.
pub async fn discover_layers(source: &dyn LayerSource) -> Vec<Layer> {
    match fetch_json(source, MANIFEST_FILE).await.and_then(parse_manifest) {
        Ok(layers) => {
            info!(
                source = %source.describe(),
                layers = layers.len(),
                "Loaded manifest"
            );
            layers
        }
        Err(e) => {
            warn!(
                source = %source.describe(),
                error = %e,
                "No usable manifest, falling back to built-in layers"
            );
            metrics::record_manifest_fallback();
            fallback_layers()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_manifest_synthesizes_labels() {
        let layers = parse_manifest(json!([
            "median_income.json",
            {"file": "pm25.json", "label": "PM2.5"},
            {"file": "ozone.json", "id": "o3"}
        ]))
        .unwrap();

        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].label(), "Median Income");
        assert_eq!(layers[1].label(), "PM2.5");
        assert_eq!(layers[2].id().as_str(), "o3");
        assert_eq!(layers[2].label(), "Ozone");
    }

    #[test]
    fn test_parse_manifest_rejects_non_list() {
        assert!(parse_manifest(json!({"file": "a.json"})).is_err());
        assert!(parse_manifest(json!([42])).is_err());
    }

    #[test]
    fn test_empty_manifest_is_empty_catalog() {
        assert!(parse_manifest(json!([])).unwrap().is_empty());
    }
}
