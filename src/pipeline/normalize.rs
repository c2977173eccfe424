//! Normalization: deterministic cleanup of the raw merged table.
//!
//! Three cheap passes run in a fixed order. Each is a pure function of
//! its input, which keeps the pipeline easy to re-order, extend, and test
//! rule-by-rule:
//!
//! 1. Whitespace — trim each cell and collapse internal runs, so cell
//!    comparisons downstream (carry-forward blankness, enumeration
//!    membership) see canonical text.
//! 2. Carry-forward — the report renders group values (date, matchup,
//!    team) once per visual merge; blank cells under a fill-down column
//!    inherit the nearest preceding non-blank value.
//! 3. Enumeration checks — out-of-vocabulary values are flagged and kept,
//!    never dropped: a new status label in the report is a signal the
//!    caller wants to see, not data to lose.
//!
//! Row count in equals row count out; no rows are merged or split, and
//! normalizing an already-clean table is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{FlaggedCell, InjuryRecord};
use crate::pipeline::reconcile::RawTable;

/// Normalization result plus bookkeeping for the run statistics.
#[derive(Debug)]
pub struct NormalizeOutcome {
    pub records: Vec<InjuryRecord>,
    pub flagged: Vec<FlaggedCell>,
    pub cells_carried_forward: usize,
}

static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trim and collapse internal whitespace runs in one cell.
fn clean_cell(cell: &str) -> String {
    RE_WHITESPACE_RUN.replace_all(cell.trim(), " ").to_string()
}

/// Transform the raw table into the final record rows.
pub fn normalize(
    table: &RawTable,
    config: &ExtractionConfig,
) -> Result<NormalizeOutcome, ExtractError> {
    let mut rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.cells.iter().map(|c| clean_cell(c)).collect())
        .collect();

    let cells_carried_forward = fill_down(&mut rows, &table.columns, &config.carry_forward)?;
    let flagged = flag_enumerations(&rows, &table.columns, config);

    Ok(NormalizeOutcome {
        records: rows
            .into_iter()
            .map(|values| InjuryRecord { values })
            .collect(),
        flagged,
        cells_carried_forward,
    })
}

/// Blank cells in a fill-down column inherit the nearest preceding
/// non-blank value. The first row must carry a value — there is nothing
/// above it to inherit from.
fn fill_down(
    rows: &mut [Vec<String>],
    columns: &[String],
    carry_forward: &[String],
) -> Result<usize, ExtractError> {
    let mut filled = 0;
    for column in carry_forward {
        let Some(index) = columns.iter().position(|c| c == column) else {
            continue; // validated at config build; unknown names cannot reach here
        };
        let mut last: Option<String> = None;
        for row in rows.iter_mut() {
            let cell = &mut row[index];
            if cell.is_empty() {
                match last {
                    Some(ref value) => {
                        *cell = value.clone();
                        filled += 1;
                    }
                    None => {
                        return Err(ExtractError::IncompleteFirstRow {
                            column: column.clone(),
                        });
                    }
                }
            } else {
                last = Some(cell.clone());
            }
        }
    }
    Ok(filled)
}

/// Record every cell whose value falls outside its column's configured
/// vocabulary. Values pass through untouched.
fn flag_enumerations(
    rows: &[Vec<String>],
    columns: &[String],
    config: &ExtractionConfig,
) -> Vec<FlaggedCell> {
    let mut flagged = Vec::new();
    for (column, allowed) in &config.enumerations {
        let Some(index) = columns.iter().position(|c| c == column) else {
            continue;
        };
        for (row_index, row) in rows.iter().enumerate() {
            let value = &row[index];
            if !value.is_empty() && !allowed.iter().any(|v| v == value) {
                warn!(
                    "row {}: unexpected {} value {:?} (allowed: {:?})",
                    row_index, column, value, allowed
                );
                flagged.push(FlaggedCell {
                    row: row_index,
                    column: column.clone(),
                    value: value.clone(),
                });
            }
        }
    }
    // Deterministic output despite HashMap iteration order.
    flagged.sort_by(|a, b| (a.row, &a.column).cmp(&(b.row, &b.column)));
    flagged
}
