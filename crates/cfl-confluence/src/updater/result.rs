//! Result types for page update operations.

use crate::report::TestCounts;
use crate::types::{Attachment, Page};

/// Outcome of the post-write concurrent edit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfHeal {
    /// No macro write happened, or nobody else wrote after us.
    NotNeeded,
    /// The page could not be re-read; nothing was checked.
    Unchecked,
    /// Someone edited the page but both macros survived.
    MacrosIntact,
    /// Missing macros were re-added at this version.
    Repaired {
        /// Version written by the repair.
        version: u32,
    },
    /// The repair write was rejected; the page may lack macros.
    RepairFailed,
}

/// Result of a successful page update.
#[derive(Debug)]
pub struct UpdateResult {
    /// Latest known page state.
    pub page: Page,
    /// URL to view the updated page.
    pub url: String,
    /// Test counts read from the page body.
    pub counts: TestCounts,
    /// Whether the content replacement write happened.
    pub content_replaced: bool,
    /// Uploaded attachment, if a file was given.
    pub attachment: Option<Attachment>,
    /// Whether missing macros were written.
    pub macros_written: bool,
    /// Concurrent edit check outcome.
    pub self_heal: SelfHeal,
}
