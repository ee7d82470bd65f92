//! Page operations consumed by the publishing workflows.
//!
//! [`ConfluenceClient`](crate::ConfluenceClient) implements [`PageGateway`]
//! over HTTP. With the `mock` feature, `MockGateway` implements it in memory.

use std::path::Path;

use crate::error::ConfluenceError;
use crate::types::{Attachment, Page};

/// Compare-and-swap page write.
///
/// The server accepts the write only if `next_version` is exactly one more
/// than the page's current version; otherwise it answers with a version
/// conflict.
#[derive(Debug, Clone, Copy)]
pub struct PageUpdate<'a> {
    /// Page to update.
    pub page_id: &'a str,
    /// Title to store (usually unchanged).
    pub title: &'a str,
    /// New storage-format body.
    pub body: &'a str,
    /// Version number this write will create.
    pub next_version: u32,
    /// Version message.
    pub message: &'a str,
}

impl<'a> PageUpdate<'a> {
    /// Write following `page`'s current version, keeping its ID and title.
    #[must_use]
    pub fn after(page: &'a Page, body: &'a str, message: &'a str) -> Self {
        Self {
            page_id: &page.id,
            title: &page.title,
            body,
            next_version: page.version.number + 1,
            message,
        }
    }
}

/// Confluence page operations.
pub trait PageGateway {
    /// Create a page under `parent_id` in `space_id`.
    fn create_page(
        &self,
        space_id: &str,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError>;

    /// Fetch a page, with its storage-format body when `storage_format` is set.
    fn get_page(&self, page_id: &str, storage_format: bool) -> Result<Page, ConfluenceError>;

    /// Pages whose title matches `title`, in server order.
    fn find_pages_by_title(&self, title: &str) -> Result<Vec<Page>, ConfluenceError>;

    /// Write a new page version.
    ///
    /// Returns [`ConfluenceError::VersionConflict`] when `next_version` is stale.
    fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError>;

    /// Upload a local file as an attachment (replacing one with the same name).
    fn upload_attachment(&self, page_id: &str, path: &Path) -> Result<Attachment, ConfluenceError>;

    /// Browser URL for a page.
    fn page_url(&self, page: &Page) -> String;
}
