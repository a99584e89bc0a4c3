//! Rendered output handlers.

use axum::{extract::Extension, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::render::FrameSnapshot;
use crate::server::AppState;

/// GET /api/figure - latest frame and its revision
pub async fn figure_handler(Extension(state): Extension<Arc<AppState>>) -> Json<FrameSnapshot> {
    Json(state.figures.snapshot().await)
}

#[derive(Serialize)]
pub struct ResizeResponse {
    pub revision: u64,
}

/// POST /api/resize - viewport changed; pollers redraw on the new revision
pub async fn resize_handler(Extension(state): Extension<Arc<AppState>>) -> Json<ResizeResponse> {
    state.loader.resize().await;
    Json(ResizeResponse {
        revision: state.figures.snapshot().await.revision,
    })
}
