//! Page operations for Confluence API.

use serde_json::json;
use tracing::{debug, info};

use super::{ConfluenceClient, read_json};
use crate::error::ConfluenceError;
use crate::gateway::PageUpdate;
use crate::types::{Page, PagesResponse};

impl ConfluenceClient {
    /// Create a page in storage representation.
    pub(crate) fn create_page(
        &self,
        space_id: &str,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/pages", self.api_url());

        let payload = json!({
            "spaceId": space_id,
            "parentId": parent_id,
            "status": "current",
            "title": title,
            "body": {
                "representation": "storage",
                "value": body
            }
        });

        info!("Creating page '{}' under {}", title, parent_id);
        debug!("POST {}", url);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        read_json(response)
    }

    /// Get page by ID.
    pub(crate) fn get_page(
        &self,
        page_id: &str,
        storage_format: bool,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/pages/{}", self.api_url(), page_id);

        info!("Getting page {}", page_id);
        debug!("GET {}", url);

        let mut request = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json");
        if storage_format {
            request = request.query("body-format", "storage");
        }

        read_json(request.call()?)
    }

    /// Find pages by exact title.
    pub(crate) fn find_pages_by_title(&self, title: &str) -> Result<Vec<Page>, ConfluenceError> {
        let url = format!("{}/pages", self.api_url());

        info!("Looking up pages titled '{}'", title);
        debug!("GET {}", url);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .query("title", title)
            .call()?;

        let pages: PagesResponse = read_json(response)?;
        Ok(pages.results)
    }

    /// Write the page at `update.next_version`.
    pub(crate) fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError> {
        let url = format!("{}/pages/{}", self.api_url(), update.page_id);

        let payload = json!({
            "id": update.page_id,
            "status": "current",
            "title": update.title,
            "body": {
                "representation": "storage",
                "value": update.body
            },
            "version": {
                "number": update.next_version,
                "message": update.message
            }
        });

        info!(
            "Updating page {} to version {}",
            update.page_id, update.next_version
        );
        debug!("PUT {}", url);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        if response.status().as_u16() == 409 {
            let body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::VersionConflict {
                page_id: update.page_id.to_owned(),
                version: update.next_version,
                body,
            });
        }

        let page: Page = read_json(response)?;
        info!(
            "Updated page {} to version {}",
            page.id, page.version.number
        );
        Ok(page)
    }
}
