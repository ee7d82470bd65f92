//! Confluence REST API client.
//!
//! Provides sync HTTP client for the Confluence Cloud REST API with basic
//! (email + API token) authentication. Pages go through the v2 API,
//! attachments through the v1 content API.

mod attachments;
mod pages;

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cfl_config::ConfluenceConfig;
use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;
use crate::gateway::{PageGateway, PageUpdate};
use crate::types::{Attachment, Page};

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create client from resolved configuration.
    #[must_use]
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth_header: basic_auth(&config.email, &config.api_token),
        }
    }

    /// v2 API base URL.
    fn api_url(&self) -> String {
        format!("{}/wiki/api/v2", self.base_url)
    }

    /// v1 REST API base URL.
    fn rest_url(&self) -> String {
        format!("{}/wiki/rest/api", self.base_url)
    }

    /// Get web URL for page.
    fn web_url(&self, page: &Page) -> String {
        if let Some(links) = &page.links
            && let Some(webui) = &links.webui
        {
            return format!("{}/wiki{}", self.base_url, webui);
        }

        format!(
            "{}/wiki/pages/viewpage.action?pageId={}",
            self.base_url, page.id
        )
    }
}

impl PageGateway for ConfluenceClient {
    fn create_page(
        &self,
        space_id: &str,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        ConfluenceClient::create_page(self, space_id, parent_id, title, body)
    }

    fn get_page(&self, page_id: &str, storage_format: bool) -> Result<Page, ConfluenceError> {
        ConfluenceClient::get_page(self, page_id, storage_format)
    }

    fn find_pages_by_title(&self, title: &str) -> Result<Vec<Page>, ConfluenceError> {
        ConfluenceClient::find_pages_by_title(self, title)
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError> {
        ConfluenceClient::update_page(self, update)
    }

    fn upload_attachment(&self, page_id: &str, path: &Path) -> Result<Attachment, ConfluenceError> {
        ConfluenceClient::upload_attachment(self, page_id, path)
    }

    fn page_url(&self, page: &Page) -> String {
        self.web_url(page)
    }
}

/// `Authorization` header value for basic auth.
fn basic_auth(email: &str, api_token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{api_token}")))
}

/// Turn an error status into [`ConfluenceError::HttpResponse`].
fn check_status(response: Response<ureq::Body>) -> Result<ureq::Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if !(200..300).contains(&status) {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader)
}

/// Check status and decode the JSON body.
fn read_json<T: DeserializeOwned>(response: Response<ureq::Body>) -> Result<T, ConfluenceError> {
    let mut body_reader = check_status(response)?;
    let text = body_reader.read_to_string()?;
    Ok(serde_json::from_str(&text)?)
}
