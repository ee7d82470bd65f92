//! Confluence error payloads.

use serde::Deserialize;

/// Error body returned by the v2 API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    /// Individual errors, most relevant first.
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// One entry of an [`ErrorResponse`].
///
/// Only the title is read; `status`, `code` and `detail` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
}
