//! Error types for Confluence integration.

use std::path::PathBuf;

use crate::types::ErrorResponse;

/// Title Confluence Cloud reports when a sibling page already has the title.
const DUPLICATE_TITLE_PREFIX: &str = "A page with this title already exists";

/// Fragment of the duplicate-title detail, used when the body is not JSON.
const DUPLICATE_TITLE_DETAIL: &str = "already exists with the same TITLE";

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Update rejected because the page moved past the expected version.
    #[error(
        "version conflict on page {page_id} (tried version {version}): page was modified by \
         another user, please try again - {body}"
    )]
    VersionConflict {
        /// Page being updated.
        page_id: String,
        /// Version number that was submitted.
        version: u32,
        /// Response body.
        body: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfluenceError {
    /// HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            Self::VersionConflict { .. } => Some(409),
            _ => None,
        }
    }

    /// Whether page creation failed because the title is already taken.
    #[must_use]
    pub fn is_duplicate_title(&self) -> bool {
        let Self::HttpResponse { status, body } = self else {
            return false;
        };
        if *status < 400 {
            return false;
        }
        if let Ok(response) = serde_json::from_str::<ErrorResponse>(body)
            && let Some(first) = response.errors.first()
            && first.title.starts_with(DUPLICATE_TITLE_PREFIX)
        {
            return true;
        }
        matches!(*status, 400 | 409) && body.contains(DUPLICATE_TITLE_DETAIL)
    }
}

/// Attachment validation error, raised before any network call.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// No page ID was given.
    #[error("--page-id is required")]
    MissingPageId,

    /// No file path was given.
    #[error("--file is required")]
    MissingPath,

    /// File does not exist.
    #[error("attachment file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Path exists but is not a regular file.
    #[error("attachment path is not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// File has no content.
    #[error("attachment file is empty: {}", .0.display())]
    Empty(PathBuf),

    /// File metadata could not be read.
    #[error("cannot read attachment {}: {source}", path.display())]
    Io {
        /// Attachment path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Error from the create, update and upload workflows.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A required option was empty.
    #[error("--{0} is required")]
    MissingOption(&'static str),

    /// Neither creation nor title lookup produced a parent page ID.
    #[error("could not determine parent page ID for \"{0}\"")]
    ParentUnresolved(String),

    /// Attachment validation failed.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Body file could not be read.
    #[error("error reading file {}: {source}", path.display())]
    BodyFile {
        /// Body file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),
}
