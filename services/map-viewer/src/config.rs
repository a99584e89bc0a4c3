//! Viewer configuration.
//!
//! Two layers:
//! - [`PageConfig`]: the page-level overlay read from YAML (allow-list, label
//!   overrides, subcategories, color scales, region). Immutable once loaded;
//!   a reconfiguration swaps in a whole new value.
//! - [`ViewerConfig`]: the page overlay plus process settings (data path,
//!   listen address, viewport height, HTTP timeout).

use anyhow::{Context, Result};
use map_common::{MapError, MapResult, RegionConfig, ScaleSpec};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// Page configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page title surfaced by the catalog API
    #[serde(default)]
    pub title: Option<String>,

    /// Files to keep from the catalog; empty keeps everything
    #[serde(default)]
    pub map_filter: Vec<String>,

    /// File -> display label
    #[serde(default)]
    pub label_overrides: HashMap<String, String>,

    #[serde(default)]
    pub subcategories: Subcategories,

    #[serde(default)]
    pub subcategory_default: Option<String>,

    /// Subcategory -> color scale used while it is active
    #[serde(default)]
    pub subcategory_colors: HashMap<String, ScaleSpec>,

    /// Page-wide color scale
    #[serde(default)]
    pub colorscale: Option<ScaleSpec>,

    #[serde(default)]
    pub region: RegionConfig,
}

impl PageConfig {
    /// Parse a page configuration from YAML text.
    pub fn from_yaml(text: &str) -> MapResult<Self> {
        serde_yaml::from_str(text).map_err(|e| MapError::Config(e.to_string()))
    }

    /// Load a page configuration file.
    ///
    /// A missing file is not an error: the default (unfiltered, no
    /// subcategories, default scale) configuration is used instead.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = ?path, "Page config not found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page config: {:?}", path))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse page config: {:?}", path))?;

        info!(
            path = ?path,
            subcategories = config.subcategories.len(),
            map_filter = config.map_filter.len(),
            "Loaded page config"
        );
        config.warn_on_suspicious_scales();
        Ok(config)
    }

    /// Whether an allow-list is in effect.
    pub fn has_map_filter(&self) -> bool {
        !self.map_filter.is_empty()
    }

    /// Scale to use while `subcategory` is active.
    ///
    /// Subcategories without their own scale use the page-wide one.
    pub fn scale_for(&self, subcategory: Option<&str>) -> Option<&ScaleSpec> {
        subcategory
            .and_then(|name| self.subcategory_colors.get(name))
            .or(self.colorscale.as_ref())
    }

    /// Subcategory to activate first: the configured default when it
    /// exists, otherwise the first declared one.
    pub fn initial_subcategory(&self) -> Option<&str> {
        if let Some(name) = self.subcategory_default.as_deref() {
            if self.subcategories.get(name).is_some() {
                return Some(name);
            }
            warn!(
                subcategory = name,
                "Default subcategory is not declared, using the first one"
            );
        }
        self.subcategories.names().next()
    }

    /// Log a warning for every scale that will not resolve as written.
    ///
    /// Scales are never rejected; unknown presets fall back to the default
    /// and explicit stops are used as given.
    pub fn warn_on_suspicious_scales(&self) {
        if let Some(spec) = &self.colorscale {
            if let Err(reason) = spec.validate() {
                warn!(reason = %reason, "Suspicious page color scale");
            }
        }
        for (name, spec) in &self.subcategory_colors {
            if let Err(reason) = spec.validate() {
                warn!(subcategory = %name, reason = %reason, "Suspicious subcategory color scale");
            }
        }
    }
}

// ============================================================================
// Subcategories
// ============================================================================

/// Named groups of layer files, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subcategories(Vec<(String, Vec<String>)>);

impl Subcategories {
    pub fn new(groups: Vec<(String, Vec<String>)>) -> Self {
        Self(groups)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Files belonging to `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, files)| files.as_slice())
    }
}

impl Serialize for Subcategories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, files) in &self.0 {
            map.serialize_entry(name, files)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Subcategories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedGroups;

        impl<'de> Visitor<'de> for OrderedGroups {
            type Value = Subcategories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of subcategory name to a list of files")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Subcategories::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut groups: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((name, files)) = access.next_entry::<String, Vec<String>>()? {
                    match groups.iter_mut().find(|(existing, _)| *existing == name) {
                        Some(slot) => slot.1 = files,
                        None => groups.push((name, files)),
                    }
                }
                Ok(Subcategories(groups))
            }
        }

        deserializer.deserialize_any(OrderedGroups)
    }
}

// ============================================================================
// Process configuration
// ============================================================================

/// Default viewport height used to size layouts.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 900.0;

/// Default timeout for HTTP data sources.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub page: PageConfig,

    /// Local directory or `http(s)://` base URL holding the manifest and layers
    pub data_path: String,

    pub listen: String,

    pub viewport_height: f64,

    pub http_timeout: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            data_path: "data".to_string(),
            listen: "0.0.0.0:8080".to_string(),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl ViewerConfig {
    /// Check process settings that cannot be fixed by falling back.
    pub fn validate(&self) -> MapResult<()> {
        if self.data_path.trim().is_empty() {
            return Err(MapError::Config("data path must not be empty".to_string()));
        }
        if !self.viewport_height.is_finite() || self.viewport_height < 0.0 {
            return Err(MapError::Config(format!(
                "viewport height must be a non-negative number, got {}",
                self.viewport_height
            )));
        }
        if self.http_timeout.is_zero() {
            return Err(MapError::Config("HTTP timeout must be positive".to_string()));
        }
        Ok(())
    }
}
