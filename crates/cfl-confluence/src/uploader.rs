//! Standalone attachment upload.

use std::path::Path;

use tracing::info;

use crate::error::{AttachmentError, PublishError};
use crate::gateway::PageGateway;
use crate::types::Attachment;

/// Local file to attach to a page.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentRequest<'a> {
    /// Target page.
    pub page_id: &'a str,
    /// File to upload.
    pub path: &'a Path,
}

impl AttachmentRequest<'_> {
    /// Check the request locally, returning the file size.
    pub fn validate(&self) -> Result<u64, AttachmentError> {
        if self.page_id.is_empty() {
            return Err(AttachmentError::MissingPageId);
        }
        validate_file(self.path)
    }
}

/// Check that `path` names a non-empty regular file, returning its size.
pub fn validate_file(path: &Path) -> Result<u64, AttachmentError> {
    if path.as_os_str().is_empty() {
        return Err(AttachmentError::MissingPath);
    }
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AttachmentError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(AttachmentError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile(path.to_path_buf()));
    }
    if metadata.len() == 0 {
        return Err(AttachmentError::Empty(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// Validate and upload a file to an existing page.
pub(crate) fn upload_validated(
    gateway: &dyn PageGateway,
    request: &AttachmentRequest<'_>,
) -> Result<Attachment, PublishError> {
    let size = request.validate()?;
    info!(
        "Uploading {} ({} bytes) to page {}",
        request.path.display(),
        size,
        request.page_id
    );
    let attachment = gateway.upload_attachment(request.page_id, request.path)?;
    info!(
        "File uploaded successfully as attachment '{}' (id={})",
        attachment.title, attachment.id
    );
    Ok(attachment)
}

/// Uploads attachments without touching page content.
pub struct AttachmentUploader<'a> {
    gateway: &'a dyn PageGateway,
}

impl<'a> AttachmentUploader<'a> {
    /// Create a new uploader.
    #[must_use]
    pub fn new(gateway: &'a dyn PageGateway) -> Self {
        Self { gateway }
    }

    /// Upload `request.path` to `request.page_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (nothing is sent) or the upload
    /// is rejected.
    pub fn upload(&self, request: &AttachmentRequest<'_>) -> Result<Attachment, PublishError> {
        upload_validated(self.gateway, request)
    }
}
