//! Choropleth figure pipeline.
//!
//! Turns a raw layer payload into a renderable figure:
//! - Complete chart descriptions pass through untouched
//! - Feature collections are filtered to a region, their values coerced to
//!   numbers, ranked into percentiles and colored with a resolved scale
//!
//! # Usage
//!
//! ```ignore
//! use choropleth::{assemble, MapContext, TracingDiagnostics};
//!
//! let figure = assemble(payload, "pollution_pm25.json", &MapContext::default(), &TracingDiagnostics)?;
//! ```

pub mod assemble;
pub mod coerce;
pub mod feature;
pub mod figure;
pub mod geo_filter;
pub mod percentile;
pub mod stats;

pub use assemble::{assemble, build_choropleth, classify, MapContext, Payload};
pub use coerce::coerce_number;
pub use feature::{Feature, FeatureCollection};
pub use figure::{Figure, FigureData, FigureLayout, PlotConfig};
pub use geo_filter::{filter_region, DropCounts};
pub use percentile::percentile_ranks;
pub use stats::{DiagnosticsSink, Summary, TracingDiagnostics};
