//! Common test fixtures for choropleth tests.
//!
//! GEOIDs follow the census tract layout: 2-digit state, 3-digit county,
//! 6-digit tract.

use serde_json::{json, Value};

/// Tract GEOIDs inside the default Bay Area region.
pub mod geoids {
    /// San Francisco county tract
    pub const SAN_FRANCISCO: &str = "06075010100";

    /// Alameda county tract
    pub const ALAMEDA: &str = "06001400100";

    /// Santa Clara county tract
    pub const SANTA_CLARA: &str = "06085500100";

    /// Marin county tract
    pub const MARIN: &str = "06041101100";

    /// Los Angeles county tract (not in the county table)
    pub const LOS_ANGELES: &str = "06037101110";

    /// Too short to contain a county code
    pub const TRUNCATED: &str = "0607";
}

/// Common layer files for testing.
pub mod layers {
    pub const INCOME: &str = "pollution_income.json";
    pub const RACE: &str = "pollution_race.json";
    pub const AGE: &str = "pollution_age.json";
    pub const PM25: &str = "pollution_pm25.json";
}

/// A feature with a `geoid` and a `value` property and a small polygon.
pub fn feature(geoid: &str, value: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[-122.5, 37.7], [-122.4, 37.7], [-122.4, 37.8], [-122.5, 37.7]]]
        },
        "properties": {"geoid": geoid, "value": value}
    })
}

/// A feature with arbitrary properties and no geometry.
pub fn feature_with_properties(properties: Value) -> Value {
    json!({"type": "Feature", "geometry": null, "properties": properties})
}

/// Wrap features in a FeatureCollection.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({"type": "FeatureCollection", "features": features})
}

/// A mixed collection exercising every filter and coercion path.
///
/// Kept features, in order: San Francisco ("1,234"), Alameda (10),
/// Santa Clara ("n/a"), Marin ("12%").
pub fn mixed_collection() -> Value {
    feature_collection(vec![
        feature(geoids::SAN_FRANCISCO, json!("1,234")),
        feature(geoids::LOS_ANGELES, json!(50)),
        feature(geoids::ALAMEDA, json!(10)),
        feature(geoids::TRUNCATED, json!(7)),
        feature(geoids::SANTA_CLARA, json!("n/a")),
        feature(geoids::MARIN, json!("12%")),
    ])
}

/// A pre-built chart description.
pub fn complete_figure() -> Value {
    json!({
        "data": [{"type": "choroplethmapbox", "locations": ["a"], "z": [1]}],
        "layout": {"title": {"text": "Prebuilt"}}
    })
}

/// A manifest mixing bare filenames and described entries.
pub fn sample_manifest() -> Value {
    json!([
        layers::INCOME,
        {"file": layers::RACE, "label": "Race / Ethnicity"},
        layers::AGE,
        {"file": layers::PM25}
    ])
}

/// Page configuration with subcategories and scale overrides.
pub const SUBCATEGORY_CONFIG_YAML: &str = r##"
title: Bay Area Environmental Justice
label_overrides:
  pollution_pm25.json: Fine Particulates
subcategories:
  Demographics:
    - pollution_race.json
    - pollution_age.json
  Environment:
    - pollution_pm25.json
    - pollution_income.json
subcategory_colors:
  Environment: Greens
colorscale: RdYlGn_r
"##;
