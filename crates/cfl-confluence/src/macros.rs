//! Confluence storage-format macro fragments.
//!
//! Fragments are appended to page bodies with a presence probe first, so a
//! body never carries more than one of each.

use std::sync::LazyLock;

use regex::Regex;

use crate::report::TestCounts;

/// Marker identifying the attachments macro.
const ATTACHMENTS_MARKER: &str = r#"ac:name="attachments""#;

/// Marker identifying the status task list.
const TASK_LIST_MARKER: &str = "ac:task-list";

const GOOD_FOR_RELEASE: &str = "GOOD FOR RELEASE";
const HOLD_OFF: &str = "HOLD-OFF";

/// Empty second cell of the "Overall Status" row in generated reports.
static OVERALL_STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<td><strong>Overall Status</strong></td>\s*<td colspan=['"]2['"]>\s*</td>"#)
        .unwrap()
});

/// A macro that can be injected into a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroFragment {
    /// Attachments list widget.
    Attachments,
    /// Release status checklist derived from test counts.
    Status(TestCounts),
}

impl MacroFragment {
    /// Storage-format markup for this fragment.
    #[must_use]
    pub fn markup(&self) -> String {
        match self {
            Self::Attachments => attachment_macro(),
            Self::Status(counts) => status_macro(*counts),
        }
    }

    /// Whether `body` already contains this kind of fragment.
    #[must_use]
    pub fn is_present_in(&self, body: &str) -> bool {
        match self {
            Self::Attachments => has_attachment_macro(body),
            Self::Status(_) => has_status_macro(body),
        }
    }
}

/// Attachments macro wrapped in a paragraph.
#[must_use]
pub fn attachment_macro() -> String {
    r#"<p><ac:structured-macro ac:name="attachments" ac:schema-version="1"></ac:structured-macro></p>"#
        .to_owned()
}

#[must_use]
pub fn has_attachment_macro(body: &str) -> bool {
    body.contains(ATTACHMENTS_MARKER)
}

/// Two-item task list: exactly one of "GOOD FOR RELEASE" / "HOLD-OFF" is complete.
///
/// Any failed test puts the page on hold. Zero counts render as passing.
#[must_use]
pub fn status_macro(counts: TestCounts) -> String {
    let (good, hold) = if counts.has_failures() {
        ("incomplete", "complete")
    } else {
        ("complete", "incomplete")
    };
    format!(
        "<ac:task-list>\
         <ac:task><ac:task-status>{good}</ac:task-status><ac:task-body>{good_label}</ac:task-body></ac:task>\
         <ac:task><ac:task-status>{hold}</ac:task-status><ac:task-body>{hold_label}</ac:task-body></ac:task>\
         </ac:task-list>",
        good_label = GOOD_FOR_RELEASE,
        hold_label = HOLD_OFF,
    )
}

#[must_use]
pub fn has_status_macro(body: &str) -> bool {
    body.contains(TASK_LIST_MARKER)
}

/// Append `fragment` unless `present` says it is already there.
#[must_use]
pub fn append_if_missing(body: &str, fragment: &MacroFragment, present: bool) -> String {
    if present {
        body.to_owned()
    } else {
        let mut out = String::with_capacity(body.len() + 256);
        out.push_str(body);
        out.push_str(&fragment.markup());
        out
    }
}

/// Put `status` into the empty "Overall Status" cell.
///
/// Returns `None` when the body has no such placeholder.
#[must_use]
pub fn place_status_macro(body: &str, status: &str) -> Option<String> {
    if !OVERALL_STATUS_RE.is_match(body) {
        return None;
    }
    let replacement = format!(
        r#"<td><strong>Overall Status</strong></td><td colspan="2">{status}</td>"#
    );
    Some(
        OVERALL_STATUS_RE
            .replace(body, regex::NoExpand(&replacement))
            .into_owned(),
    )
}

/// Wrap raw text in a plain-text code macro.
#[must_use]
pub fn code_macro(content: &str) -> String {
    // "]]>" cannot appear inside CDATA; split it across two sections.
    let escaped = content.replace("]]>", "]]]]><![CDATA[>");
    format!(
        "<ac:structured-macro ac:name=\"code\" ac:schema-version=\"1\">\
         <ac:parameter ac:name=\"language\">text</ac:parameter>\
         <ac:plain-text-body><![CDATA[{escaped}]]></ac:plain-text-body>\
         </ac:structured-macro>"
    )
}
