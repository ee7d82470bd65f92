//! CLI command implementations.

mod create;
mod update;
mod upload;

use std::path::{Path, PathBuf};

use cfl_config::Config;
use cfl_confluence::{BodySource, ConfluenceClient};
use clap::Args;
use tracing::debug;

pub(crate) use create::CreateCommand;
pub(crate) use update::UpdateCommand;
pub(crate) use upload::UploadCommand;

use crate::error::CliError;
use crate::output::Output;

/// Page body options shared by `create page` and `update page`.
#[derive(Args, Debug, Default)]
pub(crate) struct BodyArgs {
    /// Storage-format page body.
    #[arg(long)]
    body_value: Option<String>,

    /// Read the page body from a file (takes precedence over --body-value).
    #[arg(long)]
    body_value_from_file: Option<PathBuf>,

    /// Wrap the body in a plain-text code block.
    #[arg(long)]
    as_code: bool,
}

impl BodyArgs {
    fn source(&self) -> BodySource {
        BodySource {
            inline: self.body_value.clone(),
            file: self.body_value_from_file.clone(),
            as_code: self.as_code,
        }
    }
}

/// Load configuration and build the Confluence client.
pub(crate) fn connect(
    config_path: Option<&Path>,
    output: &Output,
) -> Result<ConfluenceClient, CliError> {
    let config = Config::load(config_path)?;
    match &config.config_path {
        Some(path) => debug!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using environment"),
    }

    if !config.confluence.has_credentials() {
        output.warning(
            "Warning: EMAIL or API_TOKEN is not set; requests will not be authenticated",
        );
    }

    Ok(ConfluenceClient::from_config(&config.confluence))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_body_args_source() {
        let args = BodyArgs {
            body_value: Some("<p>x</p>".to_owned()),
            body_value_from_file: Some(PathBuf::from("report.html")),
            as_code: true,
        };
        let source = args.source();
        assert_eq!(source.inline.as_deref(), Some("<p>x</p>"));
        assert_eq!(source.file, Some(PathBuf::from("report.html")));
        assert!(source.as_code);
    }

    #[test]
    fn test_body_args_empty() {
        assert!(!BodyArgs::default().source().is_requested());
    }

    #[test]
    fn test_connect_with_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfl.toml");
        std::fs::write(
            &path,
            r#"
[confluence]
base_url = "https://wiki.example.com/"
email = "ci@example.com"
api_token = "token"
"#,
        )
        .unwrap();

        assert!(connect(Some(&path), &Output::new()).is_ok());
    }

    #[test]
    fn test_connect_missing_config_file() {
        let result = connect(Some(Path::new("/nonexistent/cfl.toml")), &Output::new());
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
