//! Region scoping: county code table, allowed counties and map center.
//!
//! The defaults describe the nine-county San Francisco Bay Area, keyed by
//! the three-digit county FIPS code found at offset 2 of a tract GEOID.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where the map is centered and how far it is zoomed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    7.5
}

impl Default for MapCenter {
    fn default() -> Self {
        Self {
            lat: 38.0,
            lon: -122.5,
            zoom: default_zoom(),
        }
    }
}

/// Region table used to scope a larger dataset to one metropolitan area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Map center and zoom for the rendered layout
    #[serde(default)]
    pub center: MapCenter,

    /// County code -> county name
    #[serde(default = "default_counties")]
    pub counties: HashMap<String, String>,

    /// County names kept after filtering
    #[serde(default = "default_allowed")]
    pub allowed: Vec<String>,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            center: MapCenter::default(),
            counties: default_counties(),
            allowed: default_allowed(),
        }
    }
}

impl RegionConfig {
    /// Resolve a three-character county code to its name.
    pub fn county_name(&self, code: &str) -> Option<&str> {
        self.counties.get(code).map(|s| s.as_str())
    }

    /// Check whether a county name is in the allowed set.
    pub fn is_allowed(&self, county: &str) -> bool {
        self.allowed.iter().any(|c| c == county)
    }
}

fn default_counties() -> HashMap<String, String> {
    [
        ("001", "Alameda"),
        ("013", "Contra Costa"),
        ("041", "Marin"),
        ("055", "Napa"),
        ("075", "San Francisco"),
        ("081", "San Mateo"),
        ("085", "Santa Clara"),
        ("095", "Solano"),
        ("097", "Sonoma"),
    ]
    .into_iter()
    .map(|(code, name)| (code.to_string(), name.to_string()))
    .collect()
}

fn default_allowed() -> Vec<String> {
    [
        "Alameda",
        "Contra Costa",
        "Marin",
        "Napa",
        "San Francisco",
        "Solano",
        "Sonoma",
        "San Mateo",
        "Santa Clara",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bay_area() {
        let region = RegionConfig::default();
        assert_eq!(region.county_name("075"), Some("San Francisco"));
        assert_eq!(region.county_name("037"), None);
        assert!(region.is_allowed("Marin"));
        assert!(!region.is_allowed("Los Angeles"));
        assert_eq!(region.center.zoom, 7.5);
    }
}
