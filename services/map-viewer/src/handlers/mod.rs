//! HTTP request handlers for the map viewer API.

pub mod catalog;
pub mod figure;
pub mod health;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use choropleth::Summary;
use serde::Serialize;

use crate::loader::LoadOutcome;
use crate::session::SelectionError;
use crate::status::NO_MAPS_STATUS;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error carrying its own status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        let status = match err {
            SelectionError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            SelectionError::UnknownSubcategory(_) | SelectionError::UnknownLayer(_) => {
                StatusCode::NOT_FOUND
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Result of a selection, as returned by the API.
#[derive(Debug, Serialize)]
pub struct OutcomeReport {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Status line the viewer shows for this outcome
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

/// Turn a load outcome into a response.
///
/// Failed loads use the status code of their error class; superseded loads
/// answer 409 since a newer selection owns the output.
pub fn outcome_response(outcome: LoadOutcome) -> Response {
    let file = outcome.file().map(String::from);
    let (code, report) = match outcome {
        LoadOutcome::Rendered { summary, .. } => (
            StatusCode::OK,
            OutcomeReport {
                outcome: "rendered",
                file,
                status: String::new(),
                summary,
            },
        ),
        LoadOutcome::Failed { file: name, error } => (
            StatusCode::from_u16(error.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            OutcomeReport {
                outcome: "failed",
                file,
                status: error.status_message(&name),
                summary: None,
            },
        ),
        LoadOutcome::Stale { .. } => (
            StatusCode::CONFLICT,
            OutcomeReport {
                outcome: "superseded",
                file,
                status: String::new(),
                summary: None,
            },
        ),
        LoadOutcome::NoLayers => (
            StatusCode::OK,
            OutcomeReport {
                outcome: "no_layers",
                file: None,
                status: NO_MAPS_STATUS.to_string(),
                summary: None,
            },
        ),
    };
    (code, Json(report)).into_response()
}
