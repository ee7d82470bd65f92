//! Page body resolution from command-line options.

use std::path::PathBuf;

use crate::error::PublishError;
use crate::macros::code_macro;

/// Page body requested by the caller.
///
/// A body file wins over an inline value. Empty values count as absent.
#[derive(Debug, Clone, Default)]
pub struct BodySource {
    /// Inline storage-format body.
    pub inline: Option<String>,
    /// File holding the body.
    pub file: Option<PathBuf>,
    /// Wrap the body in a plain-text code macro.
    pub as_code: bool,
}

impl BodySource {
    /// Body given inline.
    #[must_use]
    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            inline: Some(value.into()),
            ..Self::default()
        }
    }

    /// Body read from `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    /// Whether any body was supplied.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.file_path().is_some() || self.inline_value().is_some()
    }

    /// Resolve the body: file contents, then inline value, then `None`.
    pub fn resolve(&self) -> Result<Option<String>, PublishError> {
        let content = if let Some(path) = self.file_path() {
            let data = std::fs::read_to_string(path).map_err(|source| PublishError::BodyFile {
                path: path.clone(),
                source,
            })?;
            Some(data)
        } else {
            self.inline_value().map(str::to_owned)
        };

        Ok(content.map(|c| if self.as_code { code_macro(&c) } else { c }))
    }

    fn file_path(&self) -> Option<&PathBuf> {
        self.file.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    fn inline_value(&self) -> Option<&str> {
        self.inline.as_deref().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_resolve_nothing() {
        let source = BodySource::default();
        assert!(!source.is_requested());
        assert_eq!(source.resolve().unwrap(), None);
    }

    #[test]
    fn test_resolve_empty_values_are_absent() {
        let source = BodySource {
            inline: Some(String::new()),
            file: Some(PathBuf::new()),
            as_code: false,
        };
        assert!(!source.is_requested());
        assert_eq!(source.resolve().unwrap(), None);
    }

    #[test]
    fn test_resolve_inline() {
        let source = BodySource::inline("<p>hi</p>");
        assert!(source.is_requested());
        assert_eq!(source.resolve().unwrap().as_deref(), Some("<p>hi</p>"));
    }

    #[test]
    fn test_resolve_file_wins_over_inline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<p>from file</p>").unwrap();
        let source = BodySource {
            inline: Some("<p>inline</p>".to_owned()),
            file: Some(file.path().to_path_buf()),
            as_code: false,
        };
        assert_eq!(source.resolve().unwrap().as_deref(), Some("<p>from file</p>"));
    }

    #[test]
    fn test_resolve_missing_file_is_error() {
        let source = BodySource::file("/nonexistent/body.html");
        let err = source.resolve().unwrap_err();
        assert!(matches!(err, PublishError::BodyFile { .. }));
        assert!(err.to_string().contains("/nonexistent/body.html"));
    }

    #[test]
    fn test_resolve_as_code() {
        let source = BodySource {
            as_code: true,
            ..BodySource::inline("make test")
        };
        let body = source.resolve().unwrap().unwrap();
        assert!(body.contains(r#"ac:name="code""#));
        assert!(body.contains("<![CDATA[make test]]>"));
    }
}
