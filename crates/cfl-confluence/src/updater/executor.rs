//! Page updater implementation.

use std::path::Path;

use tracing::{error, info, warn};

use crate::error::{ConfluenceError, PublishError};
use crate::gateway::{PageGateway, PageUpdate};
use crate::macros::{
    MacroFragment, append_if_missing, attachment_macro, has_attachment_macro, has_status_macro,
    place_status_macro, status_macro,
};
use crate::report::{self, TestCounts};
use crate::types::{Attachment, Page};
use crate::uploader::{AttachmentRequest, upload_validated, validate_file};

use super::UpdateRequest;
use super::result::{SelfHeal, UpdateResult};

const CONTENT_MESSAGE: &str = "Updated content via CLI";
const MACROS_MESSAGE: &str = "Enabled macros via CLI";
const REPAIR_MESSAGE: &str = "Re-added macros after concurrent edit";

/// Handles updating report pages and keeping their macros in place.
pub struct PageUpdater<'a> {
    gateway: &'a dyn PageGateway,
}

/// Outcome of the macro reconciliation pass.
struct Reconciliation {
    page: Page,
    counts: TestCounts,
    written: bool,
    self_heal: SelfHeal,
}

impl<'a> PageUpdater<'a> {
    /// Create a new page updater.
    #[must_use]
    pub fn new(gateway: &'a dyn PageGateway) -> Self {
        Self { gateway }
    }

    /// Update a page.
    ///
    /// This method:
    /// 1. Replaces the page content when a body or attachment was requested
    /// 2. Uploads the attachment
    /// 3. Ensures the attachments and release status macros are present
    ///
    /// The final concurrent edit repair is best-effort and never fails the update.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the page ID is empty
    /// - the body file or attachment cannot be read
    /// - any Confluence call of steps 1-3 fails (a version conflict
    ///   surfaces as [`ConfluenceError::VersionConflict`])
    pub fn update(&self, request: &UpdateRequest) -> Result<UpdateResult, PublishError> {
        if request.page_id.is_empty() {
            return Err(PublishError::MissingOption("page-id"));
        }
        let attachment_path = request.attachment_path();
        if let Some(path) = attachment_path {
            validate_file(path)?;
        }

        let content_replaced = if request.needs_content_update() {
            let body = request.body.resolve()?;
            self.replace_content(&request.page_id, body, attachment_path.is_some())?;
            true
        } else {
            info!("No content or file upload requested. Keeping current page content unchanged.");
            false
        };

        let attachment = match attachment_path {
            Some(path) => Some(self.upload(&request.page_id, path)?),
            None => {
                info!("No file attachment specified, still ensuring macros are enabled");
                None
            }
        };

        let reconciliation = self.reconcile_macros(&request.page_id)?;
        let url = self.gateway.page_url(&reconciliation.page);
        info!("All operations completed successfully.");

        Ok(UpdateResult {
            page: reconciliation.page,
            url,
            counts: reconciliation.counts,
            content_replaced,
            attachment,
            macros_written: reconciliation.written,
            self_heal: reconciliation.self_heal,
        })
    }

    /// Write the new content: body file, inline body or the current body,
    /// plus the attachments macro when a file is being attached.
    fn replace_content(
        &self,
        page_id: &str,
        body: Option<String>,
        embed_attachments: bool,
    ) -> Result<Page, PublishError> {
        let current = self.gateway.get_page(page_id, true)?;

        let mut content = match body {
            Some(body) => body,
            None => current.storage_value().to_owned(),
        };

        if embed_attachments && !has_attachment_macro(&content) {
            if !content.is_empty() {
                content.push_str("\n\n");
            }
            content.push_str(&attachment_macro());
        }

        let page = self
            .gateway
            .update_page(&PageUpdate::after(&current, &content, CONTENT_MESSAGE))?;
        info!("Page content updated successfully!");
        Ok(page)
    }

    fn upload(&self, page_id: &str, path: &Path) -> Result<Attachment, PublishError> {
        info!("Processing file upload for page ID: {}", page_id);
        upload_validated(self.gateway, &AttachmentRequest { page_id, path })
    }

    /// Make sure the freshest page body carries both macros.
    fn reconcile_macros(&self, page_id: &str) -> Result<Reconciliation, PublishError> {
        info!("Ensuring attachment macro and status macro are enabled...");

        let current = self.gateway.get_page(page_id, true)?;
        let body = current.storage_value();
        info!("Current page version: {}", current.version.number);

        let counts = report::extract(body);
        info!(
            "Macro status check - attachments: {}, status: {}",
            has_attachment_macro(body),
            has_status_macro(body)
        );

        let new_body = compose_macros(body, counts);
        if new_body == body {
            info!("All macros already exist, no update needed.");
            return Ok(Reconciliation {
                page: current,
                counts,
                written: false,
                self_heal: SelfHeal::NotNeeded,
            });
        }

        let update = PageUpdate::after(&current, &new_body, MACROS_MESSAGE);
        let written = match self.gateway.update_page(&update) {
            Ok(page) => page,
            Err(err @ ConfluenceError::VersionConflict { .. }) => {
                error!("Version conflict detected. Page was modified by another user.");
                error!("Please try again or refresh the page content.");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        info!("Macros enabled successfully.");

        let (page, self_heal) = self.self_heal(page_id, update.next_version, counts, written);
        Ok(Reconciliation {
            page,
            counts,
            written: true,
            self_heal,
        })
    }

    /// Re-read the page once and restore macros a concurrent edit removed.
    ///
    /// Failures only warn: the requested update has already succeeded.
    fn self_heal(
        &self,
        page_id: &str,
        written_version: u32,
        counts: TestCounts,
        written: Page,
    ) -> (Page, SelfHeal) {
        info!("Checking if page was edited while macros were being enabled...");

        let latest = match self.gateway.get_page(page_id, true) {
            Ok(page) => page,
            Err(err) => {
                warn!("Could not get latest page info for version check: {}", err);
                return (written, SelfHeal::Unchecked);
            }
        };
        info!("Latest page version after update: {}", latest.version.number);

        if latest.version.number <= written_version {
            return (latest, SelfHeal::NotNeeded);
        }

        info!("Page has been edited concurrently, re-checking macros...");
        let body = latest.storage_value();
        let attachments = MacroFragment::Attachments;
        let status = MacroFragment::Status(counts);
        let with_attachments = append_if_missing(body, &attachments, attachments.is_present_in(body));
        let repaired = append_if_missing(
            &with_attachments,
            &status,
            status.is_present_in(&with_attachments),
        );

        if repaired == body {
            info!("Macros still exist after concurrent edit, no re-update needed");
            return (latest, SelfHeal::MacrosIntact);
        }

        info!("Macros were lost during concurrent edit, re-adding them...");
        match self
            .gateway
            .update_page(&PageUpdate::after(&latest, &repaired, REPAIR_MESSAGE))
        {
            Ok(page) => {
                info!("Macros successfully re-added after concurrent edit");
                let version = page.version.number;
                (page, SelfHeal::Repaired { version })
            }
            Err(err) => {
                warn!("Failed to re-add macros after concurrent edit: {}", err);
                (latest, SelfHeal::RepairFailed)
            }
        }
    }
}

/// Body with the attachments and status macros ensured.
///
/// A missing status macro goes into the empty "Overall Status" cell when the
/// report has one; otherwise the missing macros are appended, attachments
/// first.
#[must_use]
pub fn compose_macros(body: &str, counts: TestCounts) -> String {
    let attachments = MacroFragment::Attachments;

    let with_status = if has_status_macro(body) {
        body.to_owned()
    } else if let Some(placed) = place_status_macro(body, &status_macro(counts)) {
        info!("Adding status macro to Overall Status");
        placed
    } else {
        let with_attachments = append_if_missing(body, &attachments, has_attachment_macro(body));
        append_if_missing(&with_attachments, &MacroFragment::Status(counts), false)
    };

    let present = has_attachment_macro(&with_status);
    append_if_missing(&with_status, &attachments, present)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::content::BodySource;
    use crate::error::AttachmentError;
    use crate::mock::{GatewayCall, MockGateway, Operation};

    const REPORT: &str = "<p>Total Tests: 10</p><p>Failed: 2</p>";
    const PLACEHOLDER_REPORT: &str = "<table><tr><td><strong>Overall Status</strong></td>\
        <td colspan=\"2\"></td></tr></table><p>Total Tests: 4</p><p>Failed: 0</p>";

    fn page_only(id: &str) -> UpdateRequest {
        UpdateRequest {
            page_id: id.to_owned(),
            ..UpdateRequest::default()
        }
    }

    fn attachment_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        write!(file, "<html>report</html>").unwrap();
        file
    }

    fn count(body: &str, needle: &str) -> usize {
        body.matches(needle).count()
    }

    #[test]
    fn test_compose_appends_both_macros() {
        let body = compose_macros(REPORT, TestCounts { failed: 2, total: 10 });
        let expected = format!(
            "{REPORT}{}{}",
            attachment_macro(),
            status_macro(TestCounts { failed: 2, total: 10 })
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn test_compose_places_status_in_placeholder() {
        let counts = TestCounts { failed: 0, total: 4 };
        let body = compose_macros(PLACEHOLDER_REPORT, counts);
        let expected_cell = format!("<td colspan=\"2\">{}</td>", status_macro(counts));
        assert!(body.contains(&expected_cell));
        assert!(body.ends_with(&attachment_macro()));
        assert_eq!(count(&body, "<ac:task-list>"), 1);
    }

    #[test]
    fn test_compose_only_attachments_when_status_present() {
        let existing = format!("<p>x</p>{}", status_macro(TestCounts::default()));
        let body = compose_macros(&existing, TestCounts { failed: 9, total: 9 });
        assert_eq!(body, format!("{existing}{}", attachment_macro()));
    }

    #[test]
    fn test_compose_is_stable() {
        let once = compose_macros(REPORT, report::extract(REPORT));
        let twice = compose_macros(&once, report::extract(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_update_page_id_only_skips_content_write() {
        let gateway = MockGateway::new().with_page("1", "Report", 5, REPORT);
        let result = PageUpdater::new(&gateway).update(&page_only("1")).unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::GetPage {
                    page_id: "1".to_owned()
                },
                GatewayCall::UpdatePage {
                    page_id: "1".to_owned(),
                    next_version: 6,
                    message: MACROS_MESSAGE.to_owned(),
                },
                GatewayCall::GetPage {
                    page_id: "1".to_owned()
                },
            ]
        );
        assert!(!result.content_replaced);
        assert!(result.macros_written);
        assert_eq!(result.counts, TestCounts { failed: 2, total: 10 });
        assert_eq!(result.self_heal, SelfHeal::NotNeeded);
        assert_eq!(result.page.version.number, 6);

        let body = gateway.page("1").unwrap().storage_value().to_owned();
        assert!(body.contains("<ac:task-status>complete</ac:task-status><ac:task-body>HOLD-OFF"));
        assert_eq!(count(&body, r#"ac:name="attachments""#), 1);
    }

    #[test]
    fn test_update_macros_present_makes_no_write() {
        let body = compose_macros(REPORT, report::extract(REPORT));
        let gateway = MockGateway::new().with_page("1", "Report", 2, &body);
        let result = PageUpdater::new(&gateway).update(&page_only("1")).unwrap();

        assert!(!result.macros_written);
        assert_eq!(result.self_heal, SelfHeal::NotNeeded);
        assert_eq!(gateway.call_count(Operation::Update), 0);
        assert_eq!(gateway.page("1").unwrap().version.number, 2);
    }

    #[test]
    fn test_update_inline_body_replaces_content() {
        let gateway = MockGateway::new().with_page("1", "Report", 1, "<p>old</p>");
        let request = UpdateRequest {
            page_id: "1".to_owned(),
            body: BodySource::inline("<p>Total Tests: 3</p><p>Failed: 0</p>"),
            attachment: None,
        };
        let result = PageUpdater::new(&gateway).update(&request).unwrap();

        assert!(result.content_replaced);
        assert_eq!(result.counts, TestCounts { failed: 0, total: 3 });
        let page = gateway.page("1").unwrap();
        assert_eq!(page.version.number, 3);
        assert_eq!(page.title, "Report");
        assert!(page.storage_value().starts_with("<p>Total Tests: 3</p>"));
        assert!(!page.storage_value().contains("old"));
        assert!(page.storage_value().contains(
            "<ac:task-status>complete</ac:task-status><ac:task-body>GOOD FOR RELEASE"
        ));
    }

    #[test]
    fn test_update_with_attachment_embeds_and_uploads() {
        let file = attachment_file();
        let gateway = MockGateway::new().with_page("1", "Report", 1, REPORT);
        let request = UpdateRequest {
            page_id: "1".to_owned(),
            body: BodySource::default(),
            attachment: Some(file.path().to_path_buf()),
        };
        let result = PageUpdater::new(&gateway).update(&request).unwrap();

        assert!(result.content_replaced);
        assert!(result.attachment.is_some());
        assert_eq!(gateway.attachments("1").len(), 1);

        let body = gateway.page("1").unwrap().storage_value().to_owned();
        assert!(body.starts_with(&format!("{REPORT}\n\n{}", attachment_macro())));
        assert_eq!(count(&body, r#"ac:name="attachments""#), 1);
        assert_eq!(count(&body, "<ac:task-list>"), 1);
        assert_eq!(gateway.call_count(Operation::Update), 2);
    }

    #[test]
    fn test_update_missing_attachment_fails_before_network() {
        let gateway = MockGateway::new().with_page("1", "Report", 1, REPORT);
        let request = UpdateRequest {
            page_id: "1".to_owned(),
            body: BodySource::default(),
            attachment: Some("/nonexistent/report.html".into()),
        };
        let err = PageUpdater::new(&gateway).update(&request).unwrap_err();

        assert!(matches!(err, PublishError::Attachment(AttachmentError::NotFound(_))));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_update_unreadable_body_file_fails_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = MockGateway::new().with_page("1", "Report", 1, REPORT);
        let request = UpdateRequest {
            page_id: "1".to_owned(),
            body: BodySource::file(dir.path().join("missing.html")),
            attachment: None,
        };
        let err = PageUpdater::new(&gateway).update(&request).unwrap_err();

        assert!(matches!(err, PublishError::BodyFile { .. }));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_update_missing_page_id() {
        let gateway = MockGateway::new();
        let err = PageUpdater::new(&gateway).update(&page_only("")).unwrap_err();
        assert_eq!(err.to_string(), "--page-id is required");
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_update_version_conflict_is_fatal() {
        let gateway = MockGateway::new()
            .with_page("1", "Report", 1, REPORT)
            .with_failure(Operation::Update, 1, 409, "stale");
        let err = PageUpdater::new(&gateway).update(&page_only("1")).unwrap_err();

        assert!(matches!(
            err,
            PublishError::Confluence(ConfluenceError::VersionConflict { version: 2, .. })
        ));
        assert!(err.to_string().contains("please try again"));
    }

    #[test]
    fn test_self_heal_repairs_stripped_macros() {
        let gateway = MockGateway::new()
            .with_page("1", "Report", 5, REPORT)
            .with_edit_after_update(1, |_| "<p>rewritten by someone</p>".to_owned());
        let result = PageUpdater::new(&gateway).update(&page_only("1")).unwrap();

        assert_eq!(gateway.call_count(Operation::Update), 2);
        assert_eq!(result.self_heal, SelfHeal::Repaired { version: 8 });
        assert_eq!(
            gateway.calls().last(),
            Some(&GatewayCall::UpdatePage {
                page_id: "1".to_owned(),
                next_version: 8,
                message: REPAIR_MESSAGE.to_owned(),
            })
        );

        let body = gateway.page("1").unwrap().storage_value().to_owned();
        assert!(body.starts_with("<p>rewritten by someone</p>"));
        assert!(has_attachment_macro(&body));
        // Counts come from the body read before the concurrent edit.
        assert!(body.contains("<ac:task-status>complete</ac:task-status><ac:task-body>HOLD-OFF"));
    }

    #[test]
    fn test_self_heal_repairs_only_missing_macro() {
        let gateway = MockGateway::new()
            .with_page("1", "Report", 1, REPORT)
            .with_edit_after_update(1, |body| body.replace(&attachment_macro(), ""));
        let result = PageUpdater::new(&gateway).update(&page_only("1")).unwrap();

        assert_eq!(result.self_heal, SelfHeal::Repaired { version: 4 });
        let body = gateway.page("1").unwrap().storage_value().to_owned();
        assert_eq!(count(&body, r#"ac:name="attachments""#), 1);
        assert_eq!(count(&body, "<ac:task-list>"), 1);
    }

    #[test]
    fn test_self_heal_macros_intact() {
        let gateway = MockGateway::new()
            .with_page("1", "Report", 1, REPORT)
            .with_edit_after_update(1, |body| format!("{body}<p>note</p>"));
        let result = PageUpdater::new(&gateway).update(&page_only("1")).unwrap();

        assert_eq!(result.self_heal, SelfHeal::MacrosIntact);
        assert_eq!(gateway.call_count(Operation::Update), 1);
        assert_eq!(result.page.version.number, 3);
    }

    #[test]
    fn test_self_heal_write_failure_only_warns() {
        let gateway = MockGateway::new()
            .with_page("1", "Report", 1, REPORT)
            .with_edit_after_update(1, |_| "<p>gone</p>".to_owned())
            .with_failure(Operation::Update, 2, 409, "raced again");
        let result = PageUpdater::new(&gateway).update(&page_only("1")).unwrap();

        assert_eq!(result.self_heal, SelfHeal::RepairFailed);
        assert_eq!(gateway.call_count(Operation::Update), 2);
        assert_eq!(gateway.page("1").unwrap().storage_value(), "<p>gone</p>");
    }

    #[test]
    fn test_self_heal_refetch_failure_only_warns() {
        let gateway = MockGateway::new()
            .with_page("1", "Report", 1, REPORT)
            .with_failure(Operation::Get, 2, 503, "unavailable");
        let result = PageUpdater::new(&gateway).update(&page_only("1")).unwrap();

        assert_eq!(result.self_heal, SelfHeal::Unchecked);
        assert_eq!(result.page.version.number, 2);
    }
}
