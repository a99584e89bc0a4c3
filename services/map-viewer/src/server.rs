//! HTTP server wiring.

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::ViewerConfig;
use crate::handlers;
use crate::loader::MapLoader;
use crate::render::LatestFigure;
use crate::source::LayerSource;
use crate::status::StatusBoard;

/// Shared application state.
pub struct AppState {
    pub loader: MapLoader,

    /// Latest status line and summary
    pub board: Arc<StatusBoard>,

    /// Latest rendered frame
    pub figures: Arc<LatestFigure>,

    /// Installed Prometheus recorder, if any
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: &ViewerConfig,
        source: Arc<dyn LayerSource>,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        let board = Arc::new(StatusBoard::new());
        let figures = Arc::new(LatestFigure::new());
        let loader = MapLoader::new(
            config.page.clone(),
            source,
            figures.clone(),
            board.clone(),
        )
        .with_viewport_height(config.viewport_height);

        Self {
            loader,
            board,
            figures,
            prometheus,
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Catalog and selection
        .route("/api/catalog", get(handlers::catalog::catalog_handler))
        .route("/api/catalog/reload", post(handlers::catalog::reload_handler))
        .route(
            "/api/subcategories/:name",
            post(handlers::catalog::subcategory_handler),
        )
        .route(
            "/api/layers/:file/select",
            post(handlers::catalog::select_layer_handler),
        )
        // Rendered output
        .route("/api/figure", get(handlers::figure::figure_handler))
        .route("/api/resize", post(handlers::figure::resize_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

/// Load the catalog and first layer, then serve the API until shutdown.
pub async fn serve(state: Arc<AppState>, listen: &str) -> Result<()> {
    let outcome = state.loader.init().await;
    info!(
        file = outcome.file().unwrap_or(""),
        rendered = outcome.is_rendered(),
        "Initial load finished"
    );

    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", listen))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
