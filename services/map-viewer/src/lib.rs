//! Choropleth map viewer.
//!
//! Discovers data layers from a manifest, tracks which layers are visible
//! and active, and turns each selection into a rendered choropleth figure.

pub mod config;
pub mod handlers;
pub mod loader;
pub mod manifest;
pub mod metrics;
pub mod render;
pub mod server;
pub mod session;
pub mod source;
pub mod status;

pub use config::{PageConfig, Subcategories, ViewerConfig};
pub use loader::{LoadOutcome, MapLoader};
pub use render::{FileRenderer, Frame, FrameSnapshot, LatestFigure, Renderer};
pub use session::{CatalogView, LoadTicket, SelectionError, Session, SessionState};
pub use source::{source_for, DirSource, HttpSource, LayerSource};
pub use status::{StatusBoard, StatusSink, TracingStatus};
