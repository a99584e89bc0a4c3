//! Region filtering and identifier stamping.

use map_common::RegionConfig;
use serde::Serialize;
use serde_json::Value;

use crate::coerce::id_string;
use crate::feature::Feature;

/// Property read for the geographic identifier.
pub const GEOID_FIELD: &str = "geoid";
/// Property stamped with the canonical identifier.
pub const ID_FIELD: &str = "id";
/// Property stamped with the resolved county name.
pub const COUNTY_FIELD: &str = "county";

/// Shortest GEOID that still contains a county code.
const MIN_GEOID_LEN: usize = 5;

/// Counts of features removed by the region filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    /// Entries that were not feature objects
    pub malformed: usize,
    /// GEOID missing or shorter than 5 characters
    pub short_geoid: usize,
    /// County code not present in the region table
    pub unmapped: usize,
    /// County resolved but outside the allowed set
    pub outside_region: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.malformed + self.short_geoid + self.unmapped + self.outside_region
    }
}

/// County code of a GEOID: the three characters starting at offset 2.
pub fn county_code(geoid: &str) -> Option<String> {
    if geoid.chars().count() < MIN_GEOID_LEN {
        return None;
    }
    Some(geoid.chars().skip(2).take(3).collect())
}

/// Keep the features whose county is in the region's allowed set.
///
/// Survivors keep their input order and gain `id` (string form of `geoid`)
/// and `county` properties. Nothing else is modified.
pub fn filter_region(
    features: Vec<Feature>,
    region: &RegionConfig,
    drops: &mut DropCounts,
) -> Vec<Feature> {
    features
        .into_iter()
        .filter_map(|mut feature| {
            let geoid = id_string(feature.property(GEOID_FIELD));
            let Some(code) = county_code(&geoid) else {
                drops.short_geoid += 1;
                return None;
            };

            let Some(county) = region.county_name(&code).map(str::to_string) else {
                drops.unmapped += 1;
                return None;
            };

            if !region.is_allowed(&county) {
                drops.outside_region += 1;
                return None;
            }

            feature.set_property(COUNTY_FIELD, Value::String(county));
            feature.set_property(ID_FIELD, Value::String(geoid));
            Some(feature)
        })
        .collect()
}
