//! Rendering collaborators.
//!
//! The viewer does not draw anything itself: it hands a finished figure (or
//! a placeholder message) to a [`Renderer`], which redraws in place.

use async_trait::async_trait;
use choropleth::{Figure, PlotConfig};
use map_common::MapResult;
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Message rendered in place of a map when a load fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load map. See console for details.";

/// What is currently drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    Figure { figure: Figure, config: PlotConfig },
    Placeholder { message: String },
}

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Replace the drawn output with `figure`.
    async fn render(&self, figure: &Figure, config: &PlotConfig) -> MapResult<()>;

    /// Replace the drawn output with a message.
    async fn placeholder(&self, message: &str) -> MapResult<()>;

    /// The viewport changed size; redraw at the new size.
    async fn resize(&self);
}

// ============================================================================
// In-memory
// ============================================================================

/// Latest frame plus a revision bumped on every redraw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub revision: u64,
    pub frame: Option<Frame>,
}

/// Keeps the most recent frame for pollers (the HTTP API).
#[derive(Debug, Default)]
pub struct LatestFigure {
    inner: RwLock<FrameSnapshot>,
}

impl LatestFigure {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> FrameSnapshot {
        self.inner.read().await.clone()
    }

    async fn replace(&self, frame: Frame) {
        let mut inner = self.inner.write().await;
        inner.revision += 1;
        inner.frame = Some(frame);
    }
}

#[async_trait]
impl Renderer for LatestFigure {
    async fn render(&self, figure: &Figure, config: &PlotConfig) -> MapResult<()> {
        self.replace(Frame::Figure {
            figure: figure.clone(),
            config: *config,
        })
        .await;
        Ok(())
    }

    async fn placeholder(&self, message: &str) -> MapResult<()> {
        self.replace(Frame::Placeholder {
            message: message.to_string(),
        })
        .await;
        Ok(())
    }

    async fn resize(&self) {
        let mut inner = self.inner.write().await;
        if inner.frame.is_some() {
            inner.revision += 1;
            debug!(revision = inner.revision, "Resize requested");
        }
    }
}

// ============================================================================
// File
// ============================================================================

/// Writes each frame as pretty-printed JSON to a fixed path.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
}

impl FileRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn write(&self, frame: &Frame) -> MapResult<()> {
        let body = serde_json::to_vec_pretty(frame)?;
        tokio::fs::write(&self.path, body).await?;
        info!(path = ?self.path, "Wrote frame");
        Ok(())
    }
}

#[async_trait]
impl Renderer for FileRenderer {
    async fn render(&self, figure: &Figure, config: &PlotConfig) -> MapResult<()> {
        self.write(&Frame::Figure {
            figure: figure.clone(),
            config: *config,
        })
        .await
    }

    async fn placeholder(&self, message: &str) -> MapResult<()> {
        self.write(&Frame::Placeholder {
            message: message.to_string(),
        })
        .await
    }

    async fn resize(&self) {
        // Output is a static file; nothing to redraw.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_figure() -> Figure {
        Figure::passthrough(json!([{"type": "bar"}]), json!({}))
    }

    #[test]
    fn test_latest_figure_revisions() {
        tokio_test::block_on(async {
            let sink = LatestFigure::new();
            sink.resize().await;
            assert_eq!(sink.snapshot().await.revision, 0);

            sink.render(&sample_figure(), &PlotConfig::default()).await.unwrap();
            sink.resize().await;
            sink.placeholder(LOAD_FAILED_MESSAGE).await.unwrap();

            let snapshot = sink.snapshot().await;
            assert_eq!(snapshot.revision, 3);
            assert_eq!(
                snapshot.frame,
                Some(Frame::Placeholder {
                    message: LOAD_FAILED_MESSAGE.to_string()
                })
            );
        });
    }

    #[test]
    fn test_frame_serialization() {
        let frame = Frame::Figure {
            figure: sample_figure(),
            config: PlotConfig::default(),
        };
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({
                "kind": "figure",
                "figure": {"data": [{"type": "bar"}], "layout": {}},
                "config": {"responsive": true, "displayModeBar": true, "scrollZoom": false}
            })
        );
    }

    #[tokio::test]
    async fn test_file_renderer_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FileRenderer::new(dir.path().join("out.json"));
        renderer.placeholder("nothing here").await.unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(renderer.path()).unwrap()).unwrap();
        assert_eq!(written, json!({"kind": "placeholder", "message": "nothing here"}));
    }
}
