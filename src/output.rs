//! Output types: the final injury table and its run statistics.
//!
//! [`InjuryTable`] is the only artifact the pipeline returns to the
//! caller. Everything upstream of it (the downloaded temp file, per-page
//! fragments, the raw merged table) is transient and owned by the
//! invocation. All types serialise to JSON so callers can persist or ship
//! results in whatever format they choose — the library does not mandate
//! an output protocol.

use serde::{Deserialize, Serialize};

/// One normalized injury record: cell values aligned positionally with
/// [`InjuryTable::columns`].
///
/// The field set is schema-defined (the expected column list the caller
/// configured) and identical for every record regardless of which page it
/// came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryRecord {
    pub values: Vec<String>,
}

impl InjuryRecord {
    /// Look up a value by column name against the table's column list.
    pub fn value<'a>(&'a self, columns: &[String], name: &str) -> Option<&'a str> {
        columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }
}

/// A cell whose value fell outside the configured enumeration for its
/// column. The value is kept in the record verbatim — flagging is a
/// signal, never a drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedCell {
    /// 0-indexed record number in [`InjuryTable::records`].
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// The final, caller-owned extraction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryTable {
    /// Column names, exactly as validated on the header page.
    pub columns: Vec<String>,
    /// Normalized records in page order, then in-page order.
    pub records: Vec<InjuryRecord>,
    /// Cells that failed an enumeration check (passed through, flagged).
    pub flagged: Vec<FlaggedCell>,
    /// Run statistics.
    pub stats: ExtractionStats,
}

impl InjuryTable {
    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Statistics describing a completed extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub page_count: usize,
    /// Data rows contributed by the header page.
    pub header_rows: usize,
    /// Data rows contributed by continuation pages.
    pub continuation_rows: usize,
    /// Re-rendered header artifacts dropped during reconciliation.
    pub reheader_rows_dropped: usize,
    /// Continuation fragments skipped because they were empty.
    pub empty_fragments_skipped: usize,
    /// Blank cells filled by carry-forward normalization.
    pub cells_carried_forward: usize,
    /// Cells flagged by enumeration checks.
    pub cells_flagged: usize,
    /// Wall-clock time spent acquiring the source (download or probe).
    pub retrieval_duration_ms: u64,
    /// Wall-clock time spent in the extraction engine.
    pub extraction_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// Lightweight document metadata returned by [`crate::extract::inspect`]
/// without running the full pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the document came from (the URL or path as given).
    pub source: String,
    /// Total page count.
    pub page_count: usize,
}
