//! `cfl update page` command implementation.

use std::path::PathBuf;

use cfl_confluence::{PageGateway, PageUpdater, SelfHeal, UpdateRequest, UpdateResult};
use clap::{Args, Subcommand};

use super::BodyArgs;
use crate::error::CliError;
use crate::output::Output;

/// `cfl update` commands.
#[derive(Subcommand)]
pub(crate) enum UpdateCommand {
    /// Update a page and enable the attachments and release status macros.
    Page(UpdatePageArgs),
}

impl UpdateCommand {
    /// Execute the update subcommand.
    pub(crate) fn execute(
        self,
        gateway: &dyn PageGateway,
        output: &Output,
    ) -> Result<(), CliError> {
        match self {
            Self::Page(args) => {
                args.execute(gateway, output)?;
                Ok(())
            }
        }
    }
}

/// Arguments for the update page command.
#[derive(Args)]
pub(crate) struct UpdatePageArgs {
    /// Page to update.
    #[arg(long)]
    page_id: String,

    #[command(flatten)]
    body: BodyArgs,

    /// File to upload and embed in the page.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl UpdatePageArgs {
    fn execute(
        &self,
        gateway: &dyn PageGateway,
        output: &Output,
    ) -> Result<UpdateResult, CliError> {
        let request = UpdateRequest {
            page_id: self.page_id.clone(),
            body: self.body.source(),
            attachment: self.file.clone(),
        };
        output.info(&format!("Updating page {}...", request.page_id));

        let result = PageUpdater::new(gateway).update(&request)?;
        print_update_result(output, &result);
        Ok(result)
    }
}

fn print_update_result(output: &Output, result: &UpdateResult) {
    output.success("\nPage updated successfully!");
    output.field("ID", &result.page.id);
    output.field("Title", &result.page.title);
    output.field("Version", result.page.version.number);
    if !result.content_replaced {
        output.field("Content", "unchanged");
    }
    if let Some(attachment) = &result.attachment {
        output.field("Attachment", &attachment.title);
    }

    output.separator();
    output.info(&format!(
        "Tests: {} total, {} failed",
        result.counts.total, result.counts.failed
    ));
    if result.counts.has_failures() {
        output.warning("Release status: HOLD-OFF");
    } else {
        output.success("Release status: GOOD FOR RELEASE");
    }
    if !result.macros_written {
        output.info("Macros already present");
    }
    output.separator();

    match result.self_heal {
        SelfHeal::NotNeeded | SelfHeal::MacrosIntact => {}
        SelfHeal::Repaired { version } => output.warning(&format!(
            "Page was edited concurrently; macros re-added in version {version}"
        )),
        SelfHeal::Unchecked => {
            output.warning("Warning: could not verify macros after a possible concurrent edit");
        }
        SelfHeal::RepairFailed => {
            output.warning("Warning: macros may be missing after a concurrent edit");
        }
    }
    output.url(&result.url);
}
