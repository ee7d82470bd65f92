//! `cfl upload attachment` command implementation.

use std::path::PathBuf;

use cfl_confluence::{Attachment, AttachmentRequest, AttachmentUploader, PageGateway};
use clap::{Args, Subcommand};

use crate::error::CliError;
use crate::output::Output;

/// `cfl upload` commands.
#[derive(Subcommand)]
pub(crate) enum UploadCommand {
    /// Attach a file to an existing page.
    Attachment(UploadAttachmentArgs),
}

impl UploadCommand {
    /// Execute the upload subcommand.
    pub(crate) fn execute(
        self,
        gateway: &dyn PageGateway,
        output: &Output,
    ) -> Result<(), CliError> {
        match self {
            Self::Attachment(args) => {
                args.execute(gateway, output)?;
                Ok(())
            }
        }
    }
}

/// Arguments for the upload attachment command.
#[derive(Args)]
pub(crate) struct UploadAttachmentArgs {
    /// Page to attach the file to.
    #[arg(long)]
    page_id: String,

    /// File to upload.
    #[arg(long)]
    file: PathBuf,
}

impl UploadAttachmentArgs {
    fn execute(
        &self,
        gateway: &dyn PageGateway,
        output: &Output,
    ) -> Result<Attachment, CliError> {
        output.info(&format!(
            "Uploading {} to page {}...",
            self.file.display(),
            self.page_id
        ));

        let attachment = AttachmentUploader::new(gateway).upload(&AttachmentRequest {
            page_id: &self.page_id,
            path: &self.file,
        })?;

        output.success(&format!(
            "File uploaded successfully as '{}' (id={})",
            attachment.title, attachment.id
        ));
        Ok(attachment)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use cfl_confluence::MockGateway;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_upload_attachment_command() {
        let mut file = tempfile::Builder::new()
            .prefix("results")
            .suffix(".xml")
            .tempfile()
            .unwrap();
        write!(file, "<testsuite/>").unwrap();

        let gateway = MockGateway::new().with_page("5", "Report", 1, "");
        let args = UploadAttachmentArgs {
            page_id: "5".to_owned(),
            file: file.path().to_path_buf(),
        };
        let attachment = args.execute(&gateway, &Output::new()).unwrap();

        assert!(attachment.title.starts_with("results"));
        assert_eq!(gateway.attachments("5"), vec![attachment.title]);
        // Upload never rewrites the page.
        assert_eq!(gateway.page("5").unwrap().version.number, 1);
    }

    #[test]
    fn test_upload_attachment_empty_page_id() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let gateway = MockGateway::new();
        let args = UploadAttachmentArgs {
            page_id: String::new(),
            file: file.path().to_path_buf(),
        };

        let err = args.execute(&gateway, &Output::new()).unwrap_err();
        assert_eq!(err.to_string(), "--page-id is required");
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_upload_attachment_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let gateway = MockGateway::new().with_page("5", "Report", 1, "");
        let args = UploadAttachmentArgs {
            page_id: "5".to_owned(),
            file: file.path().to_path_buf(),
        };

        let err = args.execute(&gateway, &Output::new()).unwrap_err();
        assert!(err.to_string().starts_with("attachment file is empty"));
    }
}
