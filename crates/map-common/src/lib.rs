//! Common types and utilities shared across the choropleth map viewer.

pub mod error;
pub mod layer;
pub mod region;
pub mod scale;

pub use error::{MapError, MapResult};
pub use layer::{fallback_layers, tidy_label, Layer, LayerId, ManifestEntry};
pub use region::{MapCenter, RegionConfig};
pub use scale::{resolve_colorscale, ColorStop, ScaleSpec};
