//! Dated page publishing.
//!
//! [`PageCreator`] publishes a report as a child of a monthly parent page:
//!
//! 1. Create `"[YYYY-MM] {title}"` under the given parent, or adopt the
//!    existing page when the title is already taken
//! 2. Create `"[YYYY-MM-DD HH:MM:SS] {title}"` under it with the report body
//! 3. Optionally upload a file and add the attachments macro to the child
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use cfl_config::Config;
//! use cfl_confluence::{BodySource, ConfluenceClient, CreateRequest, PageCreator};
//!
//! let config = Config::load(None)?;
//! let client = ConfluenceClient::from_config(&config.confluence);
//! let request = CreateRequest {
//!     space_id: "98306".to_owned(),
//!     parent_id: "123".to_owned(),
//!     title: "Nightly".to_owned(),
//!     body: BodySource::file("report.html"),
//!     attachment: Some("report.html".into()),
//!     run_at: chrono::Local::now().naive_local(),
//! };
//! let result = PageCreator::new(&client).create(&request)?;
//! println!("{}", result.url);
//! # Ok(())
//! # }
//! ```

mod executor;

use std::path::PathBuf;

use chrono::NaiveDateTime;

pub use executor::PageCreator;

use crate::content::BodySource;
use crate::error::PublishError;
use crate::types::{Attachment, Page};

/// Page creation request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Space to create the pages in.
    pub space_id: String,
    /// Page the monthly parent is nested under.
    pub parent_id: String,
    /// Base title; both page titles are derived from it.
    pub title: String,
    /// Report body.
    pub body: BodySource,
    /// File to attach to the child page.
    pub attachment: Option<PathBuf>,
    /// Run timestamp used for both titles.
    pub run_at: NaiveDateTime,
}

impl CreateRequest {
    /// Check required options before anything is sent.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.space_id.is_empty() {
            return Err(PublishError::MissingOption("space-id"));
        }
        if self.parent_id.is_empty() {
            return Err(PublishError::MissingOption("parent-page-id"));
        }
        if self.title.is_empty() {
            return Err(PublishError::MissingOption("title"));
        }
        Ok(())
    }

    /// Monthly parent title, `"[YYYY-MM] {title}"`.
    #[must_use]
    pub fn parent_title(&self) -> String {
        format!("[{}] {}", self.run_at.format("%Y-%m"), self.title)
    }

    /// Child title, `"[YYYY-MM-DD HH:MM:SS] {title}"`.
    #[must_use]
    pub fn child_title(&self) -> String {
        format!("[{}] {}", self.run_at.format("%Y-%m-%d %H:%M:%S"), self.title)
    }

    fn attachment_path(&self) -> Option<&PathBuf> {
        self.attachment
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Result of a successful page creation.
#[derive(Debug)]
pub struct CreateResult {
    /// Effective parent page ID.
    pub parent_id: String,
    /// Whether the parent already existed and was looked up by title.
    pub parent_adopted: bool,
    /// The created child page (latest known state).
    pub page: Page,
    /// Browser URL of the child page.
    pub url: String,
    /// Uploaded attachment, if a file was given.
    pub attachment: Option<Attachment>,
    /// Whether the attachments macro was written into the child page.
    pub macro_added: bool,
}
