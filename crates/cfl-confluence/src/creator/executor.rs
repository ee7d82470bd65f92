//! Page creator implementation.

use std::path::Path;

use tracing::info;

use crate::error::PublishError;
use crate::gateway::{PageGateway, PageUpdate};
use crate::macros::{MacroFragment, append_if_missing};
use crate::types::{Attachment, Page};
use crate::uploader::{AttachmentRequest, upload_validated};

use super::{CreateRequest, CreateResult};

/// Handles creating dated report pages.
pub struct PageCreator<'a> {
    gateway: &'a dyn PageGateway,
}

impl<'a> PageCreator<'a> {
    /// Create a new page creator.
    #[must_use]
    pub fn new(gateway: &'a dyn PageGateway) -> Self {
        Self { gateway }
    }

    /// Publish the report pages described by `request`.
    ///
    /// Pages created before a later step fails are left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a required option is empty (before any request is sent)
    /// - the body file or attachment cannot be read
    /// - the parent page can neither be created nor found
    /// - any other Confluence call fails
    pub fn create(&self, request: &CreateRequest) -> Result<CreateResult, PublishError> {
        request.validate()?;
        if let Some(path) = request.attachment_path() {
            crate::uploader::validate_file(path)?;
        }

        let content = request.body.resolve()?.unwrap_or_default();
        info!("Content length: {}", content.len());

        let parent_title = request.parent_title();
        let (parent_id, parent_adopted) = self.resolve_parent(request, &parent_title, &content)?;

        let child = self.gateway.create_page(
            &request.space_id,
            &parent_id,
            &request.child_title(),
            &content,
        )?;
        info!("Successfully created content page with ID: {}", child.id);

        let url = self.gateway.page_url(&child);
        info!("Page URL: {}", url);

        let Some(path) = request.attachment_path() else {
            info!("No file attachment specified, page creation completed");
            return Ok(CreateResult {
                parent_id,
                parent_adopted,
                page: child,
                url,
                attachment: None,
                macro_added: false,
            });
        };

        let (attachment, page, macro_added) = self.attach(&child.id, path)?;
        info!("Page creation completed successfully");

        Ok(CreateResult {
            parent_id,
            parent_adopted,
            page,
            url,
            attachment: Some(attachment),
            macro_added,
        })
    }

    /// Create the monthly parent, or adopt it when the title is taken.
    fn resolve_parent(
        &self,
        request: &CreateRequest,
        parent_title: &str,
        content: &str,
    ) -> Result<(String, bool), PublishError> {
        let (id, adopted) = match self.gateway.create_page(
            &request.space_id,
            &request.parent_id,
            parent_title,
            content,
        ) {
            Ok(page) => {
                info!("Created parent page with ID: {}", page.id);
                (page.id, false)
            }
            Err(err) if err.is_duplicate_title() => {
                info!("Page with title already exists, getting existing page ID...");
                let existing = self
                    .gateway
                    .find_pages_by_title(parent_title)?
                    .into_iter()
                    .find(|p| p.title == parent_title)
                    .map(|p| p.id)
                    .unwrap_or_default();
                info!("Found existing page with ID: {}", existing);
                (existing, true)
            }
            Err(err) => return Err(err.into()),
        };

        if id.is_empty() {
            return Err(PublishError::ParentUnresolved(parent_title.to_owned()));
        }
        Ok((id, adopted))
    }

    /// Upload `path` and make sure the page shows its attachments.
    fn attach(
        &self,
        page_id: &str,
        path: &Path,
    ) -> Result<(Attachment, Page, bool), PublishError> {
        info!("Processing file upload for page ID: {}", page_id);
        let attachment = upload_validated(self.gateway, &AttachmentRequest { page_id, path })?;

        info!("Ensuring attachment macro is enabled...");
        let current = self.gateway.get_page(page_id, true)?;
        let body = current.storage_value();
        let fragment = MacroFragment::Attachments;
        if fragment.is_present_in(body) {
            info!("Attachment macro already present");
            return Ok((attachment, current, false));
        }

        let new_body = append_if_missing(body, &fragment, false);
        let page = self.gateway.update_page(&PageUpdate::after(
            &current,
            &new_body,
            "Added attachment macro",
        ))?;
        info!("Attachment macro enabled successfully");
        Ok((attachment, page, true))
    }
}
