//! Layer load orchestration: fetch, classify, assemble, render.
//!
//! Selections go through the [`Session`] under a short lock that only covers
//! the state transition. The fetch runs unlocked, so a newer selection can
//! be issued while an older load is still in flight; when the older one
//! completes its result is discarded.

use choropleth::{assemble, DiagnosticsSink, Figure, MapContext, PlotConfig, Summary};
use map_common::{MapError, MapResult};
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{PageConfig, DEFAULT_VIEWPORT_HEIGHT};
use crate::manifest::discover_layers;
use crate::metrics;
use crate::render::{Renderer, LOAD_FAILED_MESSAGE};
use crate::session::{CatalogView, LoadTicket, SelectionError, Session};
use crate::source::{fetch_json, LayerSource};
use crate::status::{StatusSink, NO_MAPS_STATUS};

/// How a selection's load ended.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The layer was drawn.
    Rendered {
        file: String,
        /// Present for feature collections, absent for pass-through figures
        summary: Option<Summary>,
    },

    /// The load failed; a placeholder was drawn.
    Failed { file: String, error: MapError },

    /// A newer selection was made while this load was in flight.
    Stale { file: String, seq: u64 },

    /// The selection has no visible layers; nothing was loaded.
    NoLayers,
}

impl LoadOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, LoadOutcome::Rendered { .. })
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            LoadOutcome::Rendered { file, .. }
            | LoadOutcome::Failed { file, .. }
            | LoadOutcome::Stale { file, .. } => Some(file),
            LoadOutcome::NoLayers => None,
        }
    }
}

/// Collects the summary reported during assembly.
#[derive(Default)]
struct CapturedSummary(RefCell<Option<Summary>>);

impl DiagnosticsSink for CapturedSummary {
    fn report(&self, summary: &Summary) {
        *self.0.borrow_mut() = Some(summary.clone());
    }
}

/// Assemble a decoded payload for `ticket`.
fn build_figure(
    payload: Value,
    ticket: &LoadTicket,
    viewport_height: f64,
) -> MapResult<(Figure, Option<Summary>)> {
    let ctx = MapContext {
        region: ticket.region.clone(),
        scale: ticket.scale.clone(),
        viewport_height,
    };
    let captured = CapturedSummary::default();
    let figure = assemble(payload, ticket.layer.file(), &ctx, &captured)?;
    Ok((figure, captured.0.into_inner()))
}

/// Drives a [`Session`] against a source, a renderer and a status sink.
#[derive(Clone)]
pub struct MapLoader {
    session: Arc<Mutex<Session>>,
    source: Arc<dyn LayerSource>,
    renderer: Arc<dyn Renderer>,
    status: Arc<dyn StatusSink>,
    viewport_height: f64,
    plot_config: PlotConfig,
}

impl MapLoader {
    pub fn new(
        config: PageConfig,
        source: Arc<dyn LayerSource>,
        renderer: Arc<dyn Renderer>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::new(config))),
            source,
            renderer,
            status,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            plot_config: PlotConfig::default(),
        }
    }

    pub fn with_viewport_height(mut self, viewport_height: f64) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    pub async fn view(&self) -> CatalogView {
        self.session.lock().await.view()
    }

    // ------------------------------------------------------------------------
    // Selection entry points
    // ------------------------------------------------------------------------

    /// Load the catalog without loading any layer.
    ///
    /// Returns the ticket for the first visible layer, if any.
    pub async fn discover(&self) -> Option<LoadTicket> {
        let layers = discover_layers(self.source.as_ref()).await;
        self.session.lock().await.load_catalog(layers)
    }

    /// Load (or reload) the catalog and then the first visible layer.
    pub async fn init(&self) -> LoadOutcome {
        let ticket = self.discover().await;
        self.dispatch(ticket).await
    }

    pub async fn select_subcategory(&self, name: &str) -> Result<LoadOutcome, SelectionError> {
        let ticket = self.session.lock().await.select_subcategory(name)?;
        Ok(self.dispatch(ticket).await)
    }

    pub async fn select_layer(&self, key: &str) -> Result<LoadOutcome, SelectionError> {
        let ticket = self.session.lock().await.select_layer(key)?;
        Ok(self.load(ticket).await)
    }

    pub async fn reconfigure(&self, config: PageConfig) -> LoadOutcome {
        config.warn_on_suspicious_scales();
        let ticket = self.session.lock().await.reconfigure(config);
        self.dispatch(ticket).await
    }

    /// Forward a viewport resize to the renderer.
    pub async fn resize(&self) {
        self.renderer.resize().await;
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    async fn dispatch(&self, ticket: Option<LoadTicket>) -> LoadOutcome {
        match ticket {
            Some(ticket) => self.load(ticket).await,
            None => {
                info!("No layers visible for the current selection");
                self.status.status(NO_MAPS_STATUS);
                LoadOutcome::NoLayers
            }
        }
    }

    /// Fetch and render the layer named by `ticket`.
    ///
    /// Every call fetches afresh. The result is only applied if `ticket` is
    /// still the latest one when the fetch completes.
    #[instrument(skip(self, ticket), fields(file = %ticket.layer.file(), seq = ticket.seq))]
    async fn load(&self, ticket: LoadTicket) -> LoadOutcome {
        let file = ticket.layer.file().to_string();
        self.status.status(&format!("Loading {}...", file));
        let started = Instant::now();

        let result = fetch_json(self.source.as_ref(), &file)
            .await
            .and_then(|payload| build_figure(payload, &ticket, self.viewport_height));
        metrics::record_load(started.elapsed());

        // Held until the outcome is applied so no newer ticket can slip in
        // between the check and the redraw.
        let session = self.session.lock().await;
        if !session.is_current(&ticket) {
            debug!(
                file = %file,
                seq = ticket.seq,
                "Discarding result of superseded load"
            );
            metrics::record_stale_discard();
            return LoadOutcome::Stale {
                file,
                seq: ticket.seq,
            };
        }

        let outcome = match result {
            Ok((figure, summary)) => {
                if let Some(summary) = &summary {
                    self.status.diagnostics(summary);
                    self.status.status(&summary.status_line());
                }
                match self.renderer.render(&figure, &self.plot_config).await {
                    Ok(()) => {
                        self.status.status("");
                        info!(
                            file = %file,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "Rendered layer"
                        );
                        LoadOutcome::Rendered { file, summary }
                    }
                    Err(e) => self.fail(file, e).await,
                }
            }
            Err(e) => self.fail(file, e).await,
        };
        drop(session);
        outcome
    }

    async fn fail(&self, file: String, error: MapError) -> LoadOutcome {
        error!(file = %file, kind = error.kind(), error = %error, "Failed to load map");
        metrics::record_load_error(error.kind());
        self.status.status(&error.status_message(&file));

        if let Err(e) = self.renderer.placeholder(LOAD_FAILED_MESSAGE).await {
            warn!(error = %e, "Failed to draw placeholder");
        }

        LoadOutcome::Failed { file, error }
    }
}
