//! The published league-report layout, shipped as a convenience preset.
//!
//! The report is a landscape-letter PDF (792 × 612 pt). Page 1 carries a
//! title block above the table and the only rendered column labels; later
//! pages start the same table higher on the page with no labels. The
//! numbers below were measured against published report samples; a caller
//! whose report revision diverges supplies its own geometry through
//! [`ExtractionConfig::builder`] — the preset is data, not logic.

use crate::config::ExtractionConfig;
use crate::geometry::{PageGeometry, Rect};

/// Column labels as rendered on the report's header page, in order.
pub const OFFICIAL_COLUMNS: [&str; 7] = [
    "Game Date",
    "Game Time",
    "Matchup",
    "Team",
    "Player Name",
    "Current Status",
    "Reason",
];

/// Columns the report renders once per visually merged group; blank cells
/// under them inherit the value above.
pub const OFFICIAL_CARRY_FORWARD: [&str; 4] = ["Game Date", "Game Time", "Matchup", "Team"];

/// The report's status vocabulary.
pub const OFFICIAL_STATUSES: [&str; 5] =
    ["Out", "Doubtful", "Questionable", "Probable", "Available"];

/// Table region and column boundaries on the header page.
pub fn official_header_geometry() -> PageGeometry {
    PageGeometry::new(
        Rect::new(68.0, 20.0, 588.0, 772.0),
        vec![78.0, 137.0, 208.0, 288.0, 428.0, 525.0],
    )
}

/// Table region on continuation pages: same columns, table starts at the
/// top margin because there is no title block.
pub fn official_continuation_geometry() -> PageGeometry {
    PageGeometry::new(
        Rect::new(28.0, 20.0, 588.0, 772.0),
        vec![78.0, 137.0, 208.0, 288.0, 428.0, 525.0],
    )
}

/// A ready-to-use [`ExtractionConfig`] for the published report layout.
pub fn official() -> ExtractionConfig {
    ExtractionConfig::builder()
        .header_geometry(official_header_geometry())
        .continuation_geometry(official_continuation_geometry())
        .expected_columns(OFFICIAL_COLUMNS)
        .carry_forward(OFFICIAL_CARRY_FORWARD)
        .enumeration("Current Status", OFFICIAL_STATUSES)
        .build()
        .expect("preset layout is internally consistent")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_preset_builds() {
        let config = official();
        assert_eq!(config.expected_columns.len(), 7);
        assert_eq!(config.header_geometry.column_count(), 7);
        assert_eq!(config.continuation_geometry().column_count(), 7);
    }

    #[test]
    fn carry_forward_columns_are_a_subset_of_the_schema() {
        for c in OFFICIAL_CARRY_FORWARD {
            assert!(OFFICIAL_COLUMNS.contains(&c), "{c} missing from schema");
        }
    }
}
