//! Choropleth map viewer CLI and HTTP server.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use map_viewer::config::{PageConfig, ViewerConfig};
use map_viewer::server::{self, AppState};
use map_viewer::{source_for, FileRenderer, LoadOutcome, MapLoader, Session, TracingStatus};

#[derive(Parser, Debug)]
#[command(name = "map-viewer")]
#[command(about = "Choropleth map viewer: layer catalog, rendering and HTTP API")]
struct Cli {
    /// Page config YAML (allow-list, labels, subcategories, color scales)
    #[arg(short, long, default_value = "config/page.yaml", env = "MAP_PAGE_CONFIG")]
    config: PathBuf,

    /// Directory or http(s) base URL holding manifest.json and layer files
    #[arg(short, long, default_value = "data", env = "MAP_DATA_PATH")]
    data: String,

    /// Viewport height used to size map layouts
    #[arg(long, default_value_t = 900.0, env = "MAP_VIEWPORT_HEIGHT")]
    viewport_height: f64,

    /// Timeout for HTTP data sources, in seconds
    #[arg(long, default_value_t = 30, env = "MAP_HTTP_TIMEOUT_SECS")]
    http_timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "MAP_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the visible layers
    Layers {
        /// Subcategory to list instead of the default one
        #[arg(short, long)]
        subcategory: Option<String>,
    },

    /// Load one layer and write the rendered figure as JSON
    Render {
        /// Layer file or id
        #[arg(short, long)]
        layer: String,

        /// Output path
        #[arg(short, long, default_value = "figure.json")]
        out: PathBuf,
    },

    /// Serve the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long, default_value = "0.0.0.0:8080", env = "MAP_VIEWER_LISTEN")]
        listen: String,

        /// Number of tokio worker threads (default: number of CPU cores)
        #[arg(long, env = "MAP_VIEWER_WORKER_THREADS")]
        worker_threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Commands::Serve {
        worker_threads: Some(threads),
        ..
    } = &cli.command
    {
        info!("Configuring tokio runtime with {} worker threads", threads);
        runtime_builder.worker_threads(*threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cli))
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = ViewerConfig {
        page: PageConfig::load(&cli.config)?,
        data_path: cli.data.clone(),
        viewport_height: cli.viewport_height,
        http_timeout: Duration::from_secs(cli.http_timeout_secs),
        ..ViewerConfig::default()
    };

    match cli.command {
        Commands::Layers { subcategory } => list_layers(config, subcategory).await,
        Commands::Render { layer, out } => render_layer(config, &layer, out).await,
        Commands::Serve { listen, .. } => {
            let config = ViewerConfig { listen, ..config };
            run_server(config).await
        }
    }
}

async fn list_layers(config: ViewerConfig, subcategory: Option<String>) -> Result<()> {
    config.validate()?;
    let source = source_for(&config.data_path, config.http_timeout)?;
    let layers = map_viewer::manifest::discover_layers(source.as_ref()).await;

    let mut session = Session::new(config.page);
    session.load_catalog(layers);
    if let Some(name) = subcategory {
        session.select_subcategory(&name)?;
    }

    let view = session.view();
    if let Some(title) = &view.title {
        println!("{}", title);
    }
    if let Some(active) = &view.active_subcategory {
        println!("Subcategory: {} (of {})", active, view.subcategories.join(", "));
    }
    if view.layers.is_empty() {
        println!("{}", map_viewer::status::NO_MAPS_STATUS);
    }
    for layer in &view.layers {
        let marker = if view.active_layer.as_deref() == Some(layer.file()) {
            "*"
        } else {
            " "
        };
        println!(
            "{} {:<16} {:<28} {}",
            marker,
            layer.id().as_str(),
            layer.label(),
            layer.file()
        );
    }
    Ok(())
}

async fn render_layer(config: ViewerConfig, layer: &str, out: PathBuf) -> Result<()> {
    config.validate()?;
    let source = source_for(&config.data_path, config.http_timeout)?;
    let loader = MapLoader::new(
        config.page,
        source,
        Arc::new(FileRenderer::new(&out)),
        Arc::new(TracingStatus),
    )
    .with_viewport_height(config.viewport_height);

    loader.discover().await;
    match loader.select_layer(layer).await? {
        LoadOutcome::Rendered { .. } => {
            info!(path = ?out, "Figure written");
            Ok(())
        }
        LoadOutcome::Failed { file, error } => bail!(error.status_message(&file)),
        other => bail!("Layer {} was not rendered: {:?}", layer, other),
    }
}

async fn run_server(config: ViewerConfig) -> Result<()> {
    config.validate()?;

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    let source = source_for(&config.data_path, config.http_timeout)?;
    info!(source = %source.describe(), "Starting map viewer");

    let state = Arc::new(AppState::new(&config, source, Some(prometheus_handle)));
    server::serve(state, &config.listen).await
}
