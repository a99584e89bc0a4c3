//! Catalog and selection handlers.

use axum::{
    extract::{Extension, Path},
    response::Response,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::{outcome_response, ApiError};
use crate::server::AppState;
use crate::session::CatalogView;
use crate::status::StatusSnapshot;

#[derive(Serialize)]
pub struct CatalogResponse {
    #[serde(flatten)]
    pub catalog: CatalogView,
    pub status: StatusSnapshot,
}

/// GET /api/catalog
pub async fn catalog_handler(Extension(state): Extension<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        catalog: state.loader.view().await,
        status: state.board.snapshot(),
    })
}

/// POST /api/catalog/reload - rediscover layers and load the first one
pub async fn reload_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    info!("Reloading catalog");
    outcome_response(state.loader.init().await)
}

/// POST /api/subcategories/:name
pub async fn subcategory_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state.loader.select_subcategory(&name).await?;
    Ok(outcome_response(outcome))
}

/// POST /api/layers/:file/select - `file` may also be a layer id
pub async fn select_layer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state.loader.select_layer(&file).await?;
    Ok(outcome_response(outcome))
}
