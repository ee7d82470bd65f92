//! Page updater for Confluence.
//!
//! This module provides the [`PageUpdater`] struct that encapsulates the entire
//! workflow for updating a report page:
//!
//! 1. Replace page content (only when a body or attachment was requested)
//! 2. Upload the attachment
//! 3. Re-read the page and make sure the attachments macro and the release
//!    status macro are present, then check once whether a concurrent edit
//!    stripped them again
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use cfl_config::Config;
//! use cfl_confluence::{BodySource, ConfluenceClient, PageUpdater, UpdateRequest};
//!
//! let config = Config::load(None)?;
//! let client = ConfluenceClient::from_config(&config.confluence);
//! let request = UpdateRequest {
//!     page_id: "65601".to_owned(),
//!     body: BodySource::file("report.html"),
//!     attachment: None,
//! };
//! let result = PageUpdater::new(&client).update(&request)?;
//! println!("version {}", result.page.version.number);
//! # Ok(())
//! # }
//! ```

mod executor;
mod result;

use std::path::PathBuf;

pub use executor::{PageUpdater, compose_macros};
pub use result::{SelfHeal, UpdateResult};

use crate::content::BodySource;

/// Page update request.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    /// Page to update.
    pub page_id: String,
    /// Replacement body; leave empty to keep the current content.
    pub body: BodySource,
    /// File to upload and embed.
    pub attachment: Option<PathBuf>,
}

impl UpdateRequest {
    fn attachment_path(&self) -> Option<&PathBuf> {
        self.attachment
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Whether the page content has to be rewritten before macro reconciliation.
    fn needs_content_update(&self) -> bool {
        self.body.is_requested() || self.attachment_path().is_some()
    }
}
