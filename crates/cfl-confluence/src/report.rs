//! Test count extraction from report HTML.
//!
//! Reports are scraped, not parsed: the first pattern pair matches plain
//! `Failed: N` / `Total Tests: N` labels and the second pair matches the same
//! labels wrapped in `<strong>`. Anything unrecognised yields zero counts.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

static FAILED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Failed:\s*(\d+)").unwrap());

static TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total Tests:\s*(\d+)").unwrap());

static FAILED_STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<strong>Failed:</strong>\s*(\d+)").unwrap());

static TOTAL_STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<strong>Total Tests:</strong>\s*(\d+)").unwrap());

/// Failed and total test counts found in a report.
///
/// `{0, 0}` means either an all-passing empty run or no report at all; the
/// two cases cannot be told apart and both render as passing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCounts {
    /// Number of failed tests.
    pub failed: u32,
    /// Total number of tests.
    pub total: u32,
}

impl TestCounts {
    /// Whether the run should be held back from release.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Extract test counts from report HTML.
#[must_use]
pub fn extract(html: &str) -> TestCounts {
    let mut counts = TestCounts {
        failed: capture_count(&FAILED_RE, html),
        total: capture_count(&TOTAL_RE, html),
    };

    if counts == TestCounts::default() {
        counts = TestCounts {
            failed: capture_count(&FAILED_STRONG_RE, html),
            total: capture_count(&TOTAL_STRONG_RE, html),
        };
    }

    info!(
        "Parsed test results - failed: {}, total: {}",
        counts.failed, counts.total
    );
    counts
}

/// First capture group of `re` as a count, zero when absent or out of range.
fn capture_count(re: &Regex, html: &str) -> u32 {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
