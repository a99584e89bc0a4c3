//! GeoJSON feature types consumed by the pipeline.
//!
//! Only the properties are interpreted; geometry and any other members are
//! carried through untouched so the renderer can draw the regions.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One geographic region record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Type identifier (normally "Feature").
    #[serde(rename = "type", default = "feature_type")]
    pub type_: String,

    /// Geometry, passed through as-is.
    #[serde(default)]
    pub geometry: Value,

    /// Feature properties; `null` reads as empty.
    #[serde(default, deserialize_with = "nullable_map")]
    pub properties: Map<String, Value>,

    /// Any other members (`id`, `bbox`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn nullable_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    /// Create a feature with the given properties and no geometry.
    pub fn with_properties(properties: Map<String, Value>) -> Self {
        Self {
            type_: feature_type(),
            geometry: Value::Null,
            properties,
            extra: Map::new(),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
    }
}

/// An ordered sequence of features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// Array of features.
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Parse raw feature entries, keeping the ones that are objects.
///
/// Returns the parsed features and how many entries were skipped.
pub fn parse_features(raw: Vec<Value>) -> (Vec<Feature>, usize) {
    let mut skipped = 0;
    let features = raw
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<Feature>(v) {
            Ok(f) => Some(f),
            Err(_) => {
                skipped += 1;
                None
            }
        })
        .collect();
    (features, skipped)
}
