//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page as returned by the v2 pages API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page status ("current", "draft", ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Page title.
    pub title: String,
    /// Space the page lives in.
    #[serde(rename = "spaceId", default)]
    pub space_id: Option<String>,
    /// Parent page ID.
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    /// Version information.
    pub version: Version,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// Storage-format body, or an empty string when the body was not requested.
    #[must_use]
    pub fn storage_value(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map_or("", |s| s.value.as_str())
    }

    /// Current version number.
    #[must_use]
    pub fn version_number(&self) -> u32 {
        self.version.number
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

impl Storage {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            representation: "storage".to_owned(),
        }
    }
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link, relative to `{base_url}/wiki`.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Page list response.
///
/// Pagination cursors are ignored; only the first page of results is used.
#[derive(Debug, Clone, Deserialize)]
pub struct PagesResponse {
    /// Matching pages in server order.
    pub results: Vec<Page>,
}
