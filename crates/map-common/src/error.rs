//! Error types for the map viewer.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for layer loading.
///
/// Partial data defects (missing geoid, unmapped region, non-numeric value)
/// are never represented here; they are filtered out and counted instead.
#[derive(Debug, Error)]
pub enum MapError {
    // === Load Errors ===
    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("{0}")]
    Transport(String),

    #[error("Invalid JSON: {0}")]
    Decode(String),

    #[error("Unrecognized JSON format for {file}")]
    Format { file: String },

    #[error("Feature collection has no usable features array: {0}")]
    MalformedFeatures(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl MapError {
    /// Short classification used for metrics labels and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MapError::HttpStatus { .. } | MapError::Transport(_) => "transport",
            MapError::Decode(_) => "decode",
            MapError::Format { .. } | MapError::MalformedFeatures(_) => "format",
            MapError::Config(_) => "config",
            MapError::Io(_) => "io",
        }
    }

    /// The user-visible status line for a failed load of `file`.
    pub fn status_message(&self, file: &str) -> String {
        format!("Error loading {}: {}", file, self)
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            MapError::HttpStatus { status, .. } if *status == 404 => 404,
            MapError::HttpStatus { .. } | MapError::Transport(_) => 502,
            MapError::Decode(_) | MapError::Format { .. } | MapError::MalformedFeatures(_) => 422,
            MapError::Config(_) | MapError::Io(_) => 500,
        }
    }
}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_includes_reason() {
        let err = MapError::Format {
            file: "odd.json".to_string(),
        };
        assert_eq!(
            err.status_message("odd.json"),
            "Error loading odd.json: Unrecognized JSON format for odd.json"
        );
        assert_eq!(err.kind(), "format");
    }

    #[test]
    fn test_http_status_message() {
        let err = MapError::HttpStatus {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_json_error_is_decode() {
        let err: MapError = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "decode");
        assert_eq!(err.http_status_code(), 422);
    }
}
