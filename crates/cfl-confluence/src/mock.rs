//! In-memory gateway for testing.
//!
//! Provides [`MockGateway`] for exercising the workflows without a Confluence
//! server. It enforces the same version rule as the real API and can be
//! scripted to fail calls or to simulate someone editing a page between two
//! of our requests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use crate::error::ConfluenceError;
use crate::gateway::{PageGateway, PageUpdate};
use crate::types::{Attachment, Body, Links, Page, Storage, Version};

/// Error body Confluence Cloud returns for a taken title.
const DUPLICATE_TITLE_BODY: &str = r#"{"errors":[{"status":400,"code":"BAD_REQUEST","title":"A page with this title already exists: A page already exists with the same TITLE in this space","detail":null}]}"#;

/// Gateway operation, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `create_page`
    Create,
    /// `get_page`
    Get,
    /// `find_pages_by_title`
    Find,
    /// `update_page`
    Update,
    /// `upload_attachment`
    Upload,
}

/// Recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreatePage {
        space_id: String,
        parent_id: String,
        title: String,
    },
    GetPage {
        page_id: String,
    },
    FindPagesByTitle {
        title: String,
    },
    UpdatePage {
        page_id: String,
        next_version: u32,
        message: String,
    },
    UploadAttachment {
        page_id: String,
        filename: String,
    },
}

type Edit = Box<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Default)]
struct MockState {
    pages: HashMap<String, Page>,
    order: Vec<String>,
    next_id: u64,
    calls: Vec<GatewayCall>,
    counts: HashMap<Operation, usize>,
    failures: HashMap<(Operation, usize), (u16, String)>,
    sticky_failures: HashMap<Operation, (u16, String)>,
    edits_after_update: HashMap<usize, Edit>,
    attachments: HashMap<String, Vec<String>>,
}

/// Mock gateway for testing.
///
/// # Example
///
/// ```ignore
/// use cfl_confluence::{MockGateway, PageGateway};
///
/// let gateway = MockGateway::new().with_page("1", "Report", 3, "<p>x</p>");
/// let page = gateway.get_page("1", true).unwrap();
/// assert_eq!(page.version.number, 3);
/// ```
pub struct MockGateway {
    state: RwLock<MockState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            state: RwLock::new(MockState {
                next_id: 1000,
                ..MockState::default()
            }),
        }
    }
}

impl MockGateway {
    /// Create a new empty mock gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, id: &str, title: &str, version: u32, body: &str) -> Self {
        {
            let mut state = self.state.write().unwrap();
            state.insert(make_page(id, title, None, version, body));
        }
        self
    }

    /// Fail the `nth` (1-based) call of `operation` with `status`.
    ///
    /// A 409 on [`Operation::Update`] surfaces as a version conflict.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, operation: Operation, nth: usize, status: u16, body: &str) -> Self {
        self.state
            .write()
            .unwrap()
            .failures
            .insert((operation, nth), (status, body.to_owned()));
        self
    }

    /// Fail every upload with `status`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_upload_failure(self, status: u16, body: &str) -> Self {
        self.state
            .write()
            .unwrap()
            .sticky_failures
            .insert(Operation::Upload, (status, body.to_owned()));
        self
    }

    /// Simulate a concurrent edit right after the `nth` (1-based) successful update.
    ///
    /// The edit rewrites the body and bumps the version once.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_edit_after_update<F>(self, nth: usize, edit: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.state
            .write()
            .unwrap()
            .edits_after_update
            .insert(nth, Box::new(edit));
        self
    }

    /// All calls made so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Number of calls made for `operation`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state
            .read()
            .unwrap()
            .counts
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Current server-side state of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn page(&self, id: &str) -> Option<Page> {
        self.state.read().unwrap().pages.get(id).cloned()
    }

    /// Page with the given title, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn page_by_title(&self, title: &str) -> Option<Page> {
        let state = self.state.read().unwrap();
        state
            .order
            .iter()
            .filter_map(|id| state.pages.get(id))
            .find(|p| p.title == title)
            .cloned()
    }

    /// Attachment filenames uploaded to a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn attachments(&self, page_id: &str) -> Vec<String> {
        self.state
            .read()
            .unwrap()
            .attachments
            .get(page_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl MockState {
    fn insert(&mut self, page: Page) {
        if !self.pages.contains_key(&page.id) {
            self.order.push(page.id.clone());
        }
        self.pages.insert(page.id.clone(), page);
    }

    /// Record a call and return the scripted failure for it, if any.
    fn record(&mut self, operation: Operation, call: GatewayCall) -> Option<(u16, String)> {
        self.calls.push(call);
        let count = self.counts.entry(operation).or_insert(0);
        *count += 1;
        let nth = *count;
        self.failures
            .remove(&(operation, nth))
            .or_else(|| self.sticky_failures.get(&operation).cloned())
    }

    fn get(&self, page_id: &str) -> Result<&Page, ConfluenceError> {
        self.pages.get(page_id).ok_or_else(|| not_found(page_id))
    }
}

impl PageGateway for MockGateway {
    fn create_page(
        &self,
        space_id: &str,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        let call = GatewayCall::CreatePage {
            space_id: space_id.to_owned(),
            parent_id: parent_id.to_owned(),
            title: title.to_owned(),
        };
        if let Some((status, body)) = state.record(Operation::Create, call) {
            return Err(ConfluenceError::HttpResponse { status, body });
        }
        if state.pages.values().any(|p| p.title == title) {
            return Err(ConfluenceError::HttpResponse {
                status: 400,
                body: DUPLICATE_TITLE_BODY.to_owned(),
            });
        }

        state.next_id += 1;
        let id = state.next_id.to_string();
        let page = make_page(&id, title, Some(parent_id), 1, body);
        state.insert(page.clone());
        Ok(page)
    }

    fn get_page(&self, page_id: &str, storage_format: bool) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        let call = GatewayCall::GetPage {
            page_id: page_id.to_owned(),
        };
        if let Some((status, body)) = state.record(Operation::Get, call) {
            return Err(ConfluenceError::HttpResponse { status, body });
        }
        let mut page = state.get(page_id)?.clone();
        if !storage_format {
            page.body = None;
        }
        Ok(page)
    }

    fn find_pages_by_title(&self, title: &str) -> Result<Vec<Page>, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        let call = GatewayCall::FindPagesByTitle {
            title: title.to_owned(),
        };
        if let Some((status, body)) = state.record(Operation::Find, call) {
            return Err(ConfluenceError::HttpResponse { status, body });
        }
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.pages.get(id))
            .filter(|p| p.title == title)
            .cloned()
            .collect())
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        let call = GatewayCall::UpdatePage {
            page_id: update.page_id.to_owned(),
            next_version: update.next_version,
            message: update.message.to_owned(),
        };
        if let Some((status, body)) = state.record(Operation::Update, call) {
            return Err(if status == 409 {
                ConfluenceError::VersionConflict {
                    page_id: update.page_id.to_owned(),
                    version: update.next_version,
                    body,
                }
            } else {
                ConfluenceError::HttpResponse { status, body }
            });
        }

        let current = state.get(update.page_id)?.version.number;
        if update.next_version != current + 1 {
            return Err(ConfluenceError::VersionConflict {
                page_id: update.page_id.to_owned(),
                version: update.next_version,
                body: format!("current version is {current}"),
            });
        }

        let parent_id = state.get(update.page_id)?.parent_id.clone();
        let page = make_page(
            update.page_id,
            update.title,
            parent_id.as_deref(),
            update.next_version,
            update.body,
        );
        state.insert(page.clone());

        let nth = state.counts.get(&Operation::Update).copied().unwrap_or(0);
        if let Some(edit) = state.edits_after_update.remove(&nth) {
            let mut edited = page.clone();
            let new_body = edit(edited.storage_value());
            edited.body = Some(Body {
                storage: Some(Storage::new(new_body)),
            });
            edited.version.number += 1;
            state.insert(edited);
        }

        Ok(page)
    }

    fn upload_attachment(&self, page_id: &str, path: &Path) -> Result<Attachment, ConfluenceError> {
        let mut state = self.state.write().unwrap();
        let filename = path
            .file_name()
            .map_or_else(|| "attachment".to_owned(), |n| n.to_string_lossy().into_owned());
        let call = GatewayCall::UploadAttachment {
            page_id: page_id.to_owned(),
            filename: filename.clone(),
        };
        if let Some((status, body)) = state.record(Operation::Upload, call) {
            return Err(ConfluenceError::HttpResponse { status, body });
        }
        state.get(page_id)?;

        let names = state.attachments.entry(page_id.to_owned()).or_default();
        if !names.contains(&filename) {
            names.push(filename.clone());
        }
        Ok(Attachment {
            id: format!("att-{page_id}-{filename}"),
            title: filename,
        })
    }

    fn page_url(&self, page: &Page) -> String {
        format!("https://mock.example/wiki/pages/{}", page.id)
    }
}

fn not_found(page_id: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("page {page_id} not found"),
    }
}

fn make_page(id: &str, title: &str, parent_id: Option<&str>, version: u32, body: &str) -> Page {
    Page {
        id: id.to_owned(),
        status: Some("current".to_owned()),
        title: title.to_owned(),
        space_id: None,
        parent_id: parent_id.map(str::to_owned),
        version: Version {
            number: version,
            message: None,
        },
        body: Some(Body {
            storage: Some(Storage::new(body)),
        }),
        links: Some(Links {
            webui: Some(format!("/pages/{id}")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_enforces_next_version() {
        let gateway = MockGateway::new().with_page("1", "T", 3, "<p/>");
        let page = gateway.get_page("1", true).unwrap();

        let stale = PageUpdate {
            next_version: 3,
            ..PageUpdate::after(&page, "<p>new</p>", "m")
        };
        assert!(matches!(
            gateway.update_page(&stale),
            Err(ConfluenceError::VersionConflict { version: 3, .. })
        ));

        let updated = gateway
            .update_page(&PageUpdate::after(&page, "<p>new</p>", "m"))
            .unwrap();
        assert_eq!(updated.version.number, 4);
        assert_eq!(gateway.page("1").unwrap().storage_value(), "<p>new</p>");
    }

    #[test]
    fn test_create_duplicate_title() {
        let gateway = MockGateway::new();
        gateway.create_page("S", "1", "Title", "").unwrap();
        let err = gateway.create_page("S", "1", "Title", "").unwrap_err();
        assert!(err.is_duplicate_title());
    }

    #[test]
    fn test_edit_after_update_bumps_version() {
        let gateway = MockGateway::new()
            .with_page("1", "T", 1, "<p/>")
            .with_edit_after_update(1, |body| format!("{body}<p>edited</p>"));
        let page = gateway.get_page("1", true).unwrap();
        gateway
            .update_page(&PageUpdate::after(&page, "<p>ours</p>", "m"))
            .unwrap();

        let latest = gateway.page("1").unwrap();
        assert_eq!(latest.version.number, 3);
        assert_eq!(latest.storage_value(), "<p>ours</p><p>edited</p>");
    }

    #[test]
    fn test_scripted_failure_hits_only_nth_call() {
        let gateway = MockGateway::new()
            .with_page("1", "T", 1, "")
            .with_failure(Operation::Get, 2, 500, "boom");
        assert!(gateway.get_page("1", true).is_ok());
        assert!(gateway.get_page("1", true).is_err());
        assert!(gateway.get_page("1", true).is_ok());
        assert_eq!(gateway.call_count(Operation::Get), 3);
    }
}
