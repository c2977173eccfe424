//! The table-extraction engine seam.
//!
//! PDF-to-table extraction and page counting are external capabilities,
//! not part of this crate's core. They sit behind the narrow
//! [`TableEngine`] trait so the pipeline can be driven by a deterministic
//! fake in tests without ever touching a real PDF, and so an alternative
//! backend can be dropped in through
//! [`crate::config::ExtractionConfig::builder`].
//!
//! The trait is synchronous on purpose: the built-in pdfium backend is
//! not async-safe, so the pipeline wraps every call in
//! `tokio::task::spawn_blocking` (see [`crate::pipeline::pages`]).

use std::path::Path;

use thiserror::Error;

use crate::geometry::{PageGeometry, PageRange, PageRole};

pub mod pdfium;

pub use pdfium::PdfiumEngine;

/// One page's extracted table slice, prior to reconciliation.
///
/// Fragments read with [`PageRole::Header`] carry the inferred column-name
/// row in `header`; fragments read with [`PageRole::Continuation`] carry
/// `None` and every extracted row is data. A conforming engine never
/// infers a header on a continuation page, but the reconciler still
/// checks and drops one if an engine gets this wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFragment {
    /// 1-indexed page the fragment was read from.
    pub page: usize,
    /// Column-name row, present only for header-page fragments.
    pub header: Option<Vec<String>>,
    /// Data rows in top-to-bottom order; each row one cell per column.
    pub rows: Vec<Vec<String>>,
}

impl TableFragment {
    /// Column count of the fragment: header width if present, else the
    /// width of the first data row.
    pub fn column_count(&self) -> usize {
        self.header
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.rows.first().map(Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.header.is_none()
    }
}

/// Failures internal to an engine backend.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The document could not be opened or parsed at all.
    #[error("could not open document: {0}")]
    Open(String),

    /// A specific page could not be read.
    #[error("page {page}: {detail}")]
    Page { page: usize, detail: String },
}

/// The external extraction capability: byte source + geometry → fragments,
/// byte source → page count.
pub trait TableEngine: Send + Sync {
    /// Number of pages in the document at `path`. Always ≥ 1 for a
    /// well-formed document.
    fn page_count(&self, path: &Path) -> Result<usize, EngineError>;

    /// Extract the tabular region described by `geometry` from every page
    /// in `pages`, returning one fragment per page in ascending page
    /// order. `role` controls header inference: [`PageRole::Header`]
    /// treats the first extracted row as column names,
    /// [`PageRole::Continuation`] treats every row as data.
    fn read_table(
        &self,
        path: &Path,
        pages: PageRange,
        geometry: &PageGeometry,
        role: PageRole,
    ) -> Result<Vec<TableFragment>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_column_count_prefers_header() {
        let f = TableFragment {
            page: 1,
            header: Some(vec!["A".into(), "B".into(), "C".into()]),
            rows: vec![vec!["1".into(), "2".into(), "3".into()]],
        };
        assert_eq!(f.column_count(), 3);
    }

    #[test]
    fn fragment_column_count_falls_back_to_rows() {
        let f = TableFragment {
            page: 2,
            header: None,
            rows: vec![vec!["1".into(), "2".into()]],
        };
        assert_eq!(f.column_count(), 2);
        assert!(!f.is_empty());
    }

    #[test]
    fn empty_fragment() {
        let f = TableFragment {
            page: 3,
            header: None,
            rows: vec![],
        };
        assert_eq!(f.column_count(), 0);
        assert!(f.is_empty());
    }
}
