//! Fragment reconciliation: merge named header-page fragments with
//! positional continuation fragments into one raw table.
//!
//! The header page is the only page that names its columns; every other
//! page contributes rows by position alone. Reconciliation pins the
//! authoritative column schema to the validated header row, then absorbs
//! every fragment under it, matching on [`PageRole`] so neither page kind
//! can be handled implicitly.
//!
//! Row order is load-bearing: the report groups players under visually
//! merged date/matchup/team cells, so rows are concatenated in page order
//! and in-page order with no sorting and no deduplication.

use tracing::debug;

use crate::engine::TableFragment;
use crate::error::ExtractError;
use crate::geometry::PageRole;

/// One raw (pre-normalization) data row with its page of origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub page: usize,
    pub cells: Vec<String>,
}

/// The merged table: every row has exactly `columns.len()` cells.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Reconciliation result plus bookkeeping for the run statistics.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub table: RawTable,
    pub header_rows: usize,
    pub continuation_rows: usize,
    pub reheader_rows_dropped: usize,
    pub empty_fragments_skipped: usize,
}

/// Merge header-page and continuation-page fragments under the validated
/// column schema.
pub fn reconcile(
    columns: Vec<String>,
    header_fragments: &[TableFragment],
    continuation_fragments: &[TableFragment],
) -> Result<ReconcileOutcome, ExtractError> {
    let mut outcome = ReconcileOutcome {
        table: RawTable {
            columns,
            rows: Vec::new(),
        },
        header_rows: 0,
        continuation_rows: 0,
        reheader_rows_dropped: 0,
        empty_fragments_skipped: 0,
    };

    for (index, fragment) in header_fragments.iter().enumerate() {
        absorb(&mut outcome, PageRole::Header, fragment, index == 0)?;
    }
    for fragment in continuation_fragments {
        absorb(&mut outcome, PageRole::Continuation, fragment, false)?;
    }

    debug!(
        "reconciled {} row(s) ({} header-page, {} continuation; {} re-rendered header(s) dropped, {} empty fragment(s) skipped)",
        outcome.table.rows.len(),
        outcome.header_rows,
        outcome.continuation_rows,
        outcome.reheader_rows_dropped,
        outcome.empty_fragments_skipped,
    );
    Ok(outcome)
}

/// Absorb one fragment's rows into the table.
///
/// `first` marks the fragment whose header row established the schema;
/// its data rows are taken verbatim. Every other fragment may carry a
/// re-rendered header — either an engine-inferred header row (which must
/// never exist on a continuation page: dropped if it equals the schema,
/// reinstated as data otherwise) or a data row whose cells equal the
/// column names.
fn absorb(
    outcome: &mut ReconcileOutcome,
    role: PageRole,
    fragment: &TableFragment,
    first: bool,
) -> Result<(), ExtractError> {
    if fragment.is_empty() {
        if !first {
            outcome.empty_fragments_skipped += 1;
        }
        return Ok(());
    }

    if !first {
        if let Some(ref header) = fragment.header {
            if is_reheader(header, &outcome.table.columns) {
                outcome.reheader_rows_dropped += 1;
            } else {
                push_row(outcome, role, fragment.page, header.clone())?;
            }
        }
    }

    for row in &fragment.rows {
        if !first && is_reheader(row, &outcome.table.columns) {
            outcome.reheader_rows_dropped += 1;
            continue;
        }
        push_row(outcome, role, fragment.page, row.clone())?;
    }
    Ok(())
}

fn push_row(
    outcome: &mut ReconcileOutcome,
    role: PageRole,
    page: usize,
    cells: Vec<String>,
) -> Result<(), ExtractError> {
    let expected = outcome.table.columns.len();
    if cells.len() != expected {
        return Err(ExtractError::FragmentShape {
            page,
            expected,
            observed: cells.len(),
        });
    }
    match role {
        PageRole::Header => outcome.header_rows += 1,
        PageRole::Continuation => outcome.continuation_rows += 1,
    }
    outcome.table.rows.push(RawRow { page, cells });
    Ok(())
}

/// A row is a re-rendered header artifact iff its trimmed cells equal the
/// column names position-by-position.
fn is_reheader(cells: &[String], columns: &[String]) -> bool {
    cells.len() == columns.len()
        && cells
            .iter()
            .zip(columns)
            .all(|(cell, column)| cell.trim() == column)
}
