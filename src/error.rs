//! Error types for the injury2table library.
//!
//! One enum covers every failure the pipeline can surface. Each variant
//! carries the context a caller needs to act on it — the requested
//! location for retrieval failures, the offending page for shape
//! mismatches, the expected-vs-observed column lists for schema failures.
//! Nothing is swallowed: every error propagates to the caller, and the
//! only suppressed failures are best-effort temp-file cleanup errors
//! (handled inside `tempfile`'s Drop), which must never mask the primary
//! error.
//!
//! There is no retry above the transport layer: a malformed document is
//! reported, not retried. Only transient HTTP failures are retried, and
//! only within the budget described on [`ExtractError::RemoteRetrieval`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the injury2table library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Retrieval errors ─────────────────────────────────────────────────
    /// The report could not be fetched from its URL.
    ///
    /// Raised after the transport-level retry budget is exhausted (up to
    /// `attempts` GETs, retrying only on 429/500/502/503/504 and transient
    /// transport failures) or immediately on a non-retryable failure.
    #[error("Failed to retrieve report from '{url}' after {attempts} attempt(s): {reason}")]
    RemoteRetrieval {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The report could not be read from a local path.
    #[error("Failed to open report '{path}': {reason}\nCheck the path exists and is readable.")]
    LocalRetrieval { path: PathBuf, reason: String },

    // ── Document-structure errors ────────────────────────────────────────
    /// The header page does not expose the expected column names.
    ///
    /// Fatal: no partial result is returned, and continuation pages are
    /// never extracted for a document that fails this gate.
    #[error(
        "Report header does not match the expected schema.\n  expected: {expected:?}\n  observed: {observed:?}"
    )]
    SchemaValidation {
        expected: Vec<String>,
        observed: Vec<String>,
    },

    /// A continuation page's extracted column count disagrees with the
    /// header page's.
    #[error("Page {page}: extracted {observed} column(s), expected {expected}")]
    FragmentShape {
        page: usize,
        expected: usize,
        observed: usize,
    },

    /// A fill-down column is blank in the very first data row, so
    /// carry-forward has no value to inherit from.
    #[error(
        "Column '{column}' is blank in the first data row; cannot fill down.\nThe report renders this value once per group — a blank here means the extraction area is wrong or the document is malformed."
    )]
    IncompleteFirstRow { column: String },

    // ── Engine errors ────────────────────────────────────────────────────
    /// The table-extraction engine failed for the given page range.
    #[error("Table extraction failed on page(s) {pages}: {detail}")]
    Extraction { pages: String, detail: String },

    // ── Config errors ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
