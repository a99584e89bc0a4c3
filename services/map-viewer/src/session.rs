//! Catalog and selection state.
//!
//! A [`Session`] owns the discovered catalog, the page configuration and the
//! current selection. It never does I/O: every transition that should lead
//! to a layer load returns a [`LoadTicket`] for the caller to act on.
//!
//! ```text
//! Uninitialized --load_catalog--> CatalogLoaded --select_*--> SelectionApplied
//! ```

use map_common::{Layer, RegionConfig, ScaleSpec};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PageConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    CatalogLoaded,
    SelectionApplied,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Catalog has not been loaded")]
    NotLoaded,

    #[error("Unknown subcategory: {0}")]
    UnknownSubcategory(String),

    #[error("Layer not in the current selection: {0}")]
    UnknownLayer(String),
}

/// A request to load one layer, issued by a selection.
///
/// Sequence numbers increase with every ticket; only the latest ticket's
/// result may be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    pub seq: u64,
    pub layer: Layer,
    /// Scale active when the selection was made
    pub scale: Option<ScaleSpec>,
    pub region: RegionConfig,
}

/// Serializable view of the session for the API and CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub title: Option<String>,
    pub state: SessionState,
    pub subcategories: Vec<String>,
    pub active_subcategory: Option<String>,
    pub layers: Vec<Layer>,
    pub active_layer: Option<String>,
    pub catalog_size: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: PageConfig,
    state: SessionState,
    catalog: Vec<Layer>,
    visible: Vec<Layer>,
    active_layer: Option<Layer>,
    active_subcategory: Option<String>,
    active_scale: Option<ScaleSpec>,
    last_seq: u64,
}

impl Session {
    pub fn new(config: PageConfig) -> Self {
        let active_scale = config.colorscale.clone();
        Self {
            config,
            state: SessionState::Uninitialized,
            catalog: Vec::new(),
            visible: Vec::new(),
            active_layer: None,
            active_subcategory: None,
            active_scale,
            last_seq: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Replace the catalog and rebuild the selection.
    ///
    /// Returns a ticket for the first visible layer, or `None` when nothing
    /// is visible.
    pub fn load_catalog(&mut self, layers: Vec<Layer>) -> Option<LoadTicket> {
        info!(layers = layers.len(), "Catalog loaded");
        self.catalog = layers;
        self.state = SessionState::CatalogLoaded;
        self.apply_selection()
    }

    /// Swap in a new page configuration and rebuild the selection over the
    /// existing catalog.
    pub fn reconfigure(&mut self, config: PageConfig) -> Option<LoadTicket> {
        self.config = config;
        self.active_subcategory = None;
        self.active_scale = self.config.colorscale.clone();
        if self.state == SessionState::Uninitialized {
            return None;
        }
        self.apply_selection()
    }

    /// Activate a subcategory.
    ///
    /// The visible list becomes the allow-listed catalog restricted to the
    /// group's files, and the scale switches to the group's own scale (or
    /// the page-wide one if it has none).
    pub fn select_subcategory(&mut self, name: &str) -> Result<Option<LoadTicket>, SelectionError> {
        if self.state == SessionState::Uninitialized {
            return Err(SelectionError::NotLoaded);
        }
        if self.config.subcategories.get(name).is_none() {
            return Err(SelectionError::UnknownSubcategory(name.to_string()));
        }

        self.activate_subcategory(name);
        self.state = SessionState::SelectionApplied;
        Ok(self.issue_for_first())
    }

    /// Make a visible layer active, by file or id.
    pub fn select_layer(&mut self, key: &str) -> Result<LoadTicket, SelectionError> {
        if self.state == SessionState::Uninitialized {
            return Err(SelectionError::NotLoaded);
        }

        let layer = self
            .visible
            .iter()
            .find(|layer| layer.matches(key))
            .cloned()
            .ok_or_else(|| SelectionError::UnknownLayer(key.to_string()))?;

        self.state = SessionState::SelectionApplied;
        Ok(self.issue(layer))
    }

    /// Whether `ticket` is still the latest one issued.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.seq == self.last_seq
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn catalog(&self) -> &[Layer] {
        &self.catalog
    }

    pub fn visible(&self) -> &[Layer] {
        &self.visible
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer.as_ref()
    }

    pub fn active_subcategory(&self) -> Option<&str> {
        self.active_subcategory.as_deref()
    }

    pub fn active_scale(&self) -> Option<&ScaleSpec> {
        self.active_scale.as_ref()
    }

    pub fn view(&self) -> CatalogView {
        CatalogView {
            title: self.config.title.clone(),
            state: self.state,
            subcategories: self.config.subcategories.names().map(String::from).collect(),
            active_subcategory: self.active_subcategory.clone(),
            layers: self.visible.clone(),
            active_layer: self.active_layer.as_ref().map(|l| l.file().to_string()),
            catalog_size: self.catalog.len(),
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Allow-list, then label overrides, in catalog order.
    fn configured_layers(&self) -> Vec<Layer> {
        let allow: Option<HashSet<&str>> = self
            .config
            .has_map_filter()
            .then(|| self.config.map_filter.iter().map(String::as_str).collect());

        self.catalog
            .iter()
            .filter(|layer| allow.as_ref().map_or(true, |a| a.contains(layer.file())))
            .map(|layer| match self.config.label_overrides.get(layer.file()) {
                Some(label) if !label.is_empty() => layer.relabeled(label.as_str()),
                _ => layer.clone(),
            })
            .collect()
    }

    fn apply_selection(&mut self) -> Option<LoadTicket> {
        let initial = self.config.initial_subcategory().map(String::from);
        match initial {
            Some(name) => self.activate_subcategory(&name),
            None => {
                self.visible = self.configured_layers();
                self.active_scale = self.config.colorscale.clone();
            }
        }
        self.issue_for_first()
    }

    fn activate_subcategory(&mut self, name: &str) {
        let members: HashSet<&str> = self
            .config
            .subcategories
            .get(name)
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();

        let visible: Vec<Layer> = self
            .configured_layers()
            .into_iter()
            .filter(|layer| members.contains(layer.file()))
            .collect();

        debug!(subcategory = name, visible = visible.len(), "Subcategory selected");
        self.visible = visible;
        self.active_scale = self.config.scale_for(Some(name)).cloned();
        self.active_subcategory = Some(name.to_string());
    }

    fn issue_for_first(&mut self) -> Option<LoadTicket> {
        match self.visible.first().cloned() {
            Some(layer) => Some(self.issue(layer)),
            None => {
                self.active_layer = None;
                None
            }
        }
    }

    fn issue(&mut self, layer: Layer) -> LoadTicket {
        self.last_seq += 1;
        self.active_layer = Some(layer.clone());
        LoadTicket {
            seq: self.last_seq,
            layer,
            scale: self.active_scale.clone(),
            region: self.config.region.clone(),
        }
    }
}
