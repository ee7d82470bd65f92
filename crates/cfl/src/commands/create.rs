//! `cfl create page` command implementation.

use std::path::PathBuf;

use cfl_confluence::{CreateRequest, CreateResult, PageCreator, PageGateway};
use chrono::{Local, NaiveDateTime};
use clap::{Args, Subcommand};

use super::BodyArgs;
use crate::error::CliError;
use crate::output::Output;

/// `cfl create` commands.
#[derive(Subcommand)]
pub(crate) enum CreateCommand {
    /// Create a dated report page under a monthly parent page.
    Page(CreatePageArgs),
}

impl CreateCommand {
    /// Execute the create subcommand.
    pub(crate) fn execute(
        self,
        gateway: &dyn PageGateway,
        output: &Output,
    ) -> Result<(), CliError> {
        match self {
            Self::Page(args) => {
                args.execute(gateway, output, Local::now().naive_local())?;
                Ok(())
            }
        }
    }
}

/// Arguments for the create page command.
#[derive(Args)]
pub(crate) struct CreatePageArgs {
    /// Space to create the pages in.
    #[arg(long)]
    space_id: String,

    /// Page the monthly parent page is created under.
    #[arg(long)]
    parent_page_id: String,

    /// Base title for the monthly and dated pages.
    #[arg(long)]
    title: String,

    #[command(flatten)]
    body: BodyArgs,

    /// File to attach to the new page.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl CreatePageArgs {
    fn request(&self, run_at: NaiveDateTime) -> CreateRequest {
        CreateRequest {
            space_id: self.space_id.clone(),
            parent_id: self.parent_page_id.clone(),
            title: self.title.clone(),
            body: self.body.source(),
            attachment: self.file.clone(),
            run_at,
        }
    }

    fn execute(
        &self,
        gateway: &dyn PageGateway,
        output: &Output,
        run_at: NaiveDateTime,
    ) -> Result<CreateResult, CliError> {
        let request = self.request(run_at);
        output.info(&format!("Publishing \"{}\"...", request.child_title()));

        let result = PageCreator::new(gateway).create(&request)?;
        print_create_result(output, &result);
        Ok(result)
    }
}

fn print_create_result(output: &Output, result: &CreateResult) {
    output.success("\nPage created successfully!");
    output.field("ID", &result.page.id);
    output.field("Title", &result.page.title);
    let parent_state = if result.parent_adopted {
        "existing"
    } else {
        "new"
    };
    output.field("Parent", format!("{} ({parent_state})", result.parent_id));

    if let Some(attachment) = &result.attachment {
        output.field("Attachment", &attachment.title);
        if result.macro_added {
            output.info("Attachments macro added");
        }
    }
    output.url(&result.url);
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use cfl_confluence::{MockGateway, Operation, PublishError};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn run_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    fn args(file: Option<PathBuf>) -> CreatePageArgs {
        CreatePageArgs {
            space_id: "98306".to_owned(),
            parent_page_id: "123".to_owned(),
            title: "Nightly".to_owned(),
            body: BodyArgs {
                body_value: Some("<p>Total Tests: 5</p>".to_owned()),
                ..BodyArgs::default()
            },
            file,
        }
    }

    #[test]
    fn test_create_page_command() {
        let gateway = MockGateway::new().with_page("123", "Reports", 1, "");
        let result = args(None)
            .execute(&gateway, &Output::new(), run_at())
            .unwrap();

        assert_eq!(result.page.title, "[2026-01-02 03:04:05] Nightly");
        let parent = gateway.page_by_title("[2026-01] Nightly").unwrap();
        assert_eq!(result.parent_id, parent.id);
        assert_eq!(parent.storage_value(), "<p>Total Tests: 5</p>");
    }

    #[test]
    fn test_create_page_with_attachment() {
        let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        write!(file, "<html/>").unwrap();

        let gateway = MockGateway::new().with_page("123", "Reports", 1, "");
        let result = args(Some(file.path().to_path_buf()))
            .execute(&gateway, &Output::new(), run_at())
            .unwrap();

        assert!(result.macro_added);
        assert_eq!(gateway.attachments(&result.page.id).len(), 1);
    }

    #[test]
    fn test_create_page_empty_space_id() {
        let gateway = MockGateway::new();
        let mut create = args(None);
        create.space_id.clear();

        let err = create
            .execute(&gateway, &Output::new(), run_at())
            .unwrap_err();
        assert_eq!(err.to_string(), "--space-id is required");
        assert!(matches!(
            err,
            CliError::Publish(PublishError::MissingOption("space-id"))
        ));
        assert_eq!(gateway.call_count(Operation::Create), 0);
    }
}
