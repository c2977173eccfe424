//! # injury2table
//!
//! Extract league injury-report PDFs into clean, schema-validated tables.
//!
//! ## Why this crate?
//!
//! The published injury report is a multi-page PDF with an awkward shape:
//! only page 1 carries column labels, later pages restart the same table
//! higher up with none, group values (date, matchup, team) are rendered
//! once per visual merge and blank underneath, and the CDN serving it
//! intermittently stalls connections. This crate owns all of that — it
//! retrieves the document robustly, extracts each page's table region by
//! fixed coordinates, reconciles the header/continuation split, and
//! returns one column-complete table of injury records.
//!
//! ## Pipeline Overview
//!
//! ```text
//! URL / path
//!  │
//!  ├─ 1. Source     stream the PDF into a scoped temp file (or probe a
//!  │                local path); retry/backoff at the transport layer only
//!  ├─ 2. Pages      engine reads page 1 (header geometry, header row
//!  │                inferred) and pages 2..N (continuation geometry, no
//!  │                header inference)
//!  ├─ 3. Schema     header page must expose exactly the expected columns
//!  ├─ 4. Reconcile  named + positional fragments → one raw table
//!  ├─ 5. Normalize  whitespace, carry-forward fill-down, enumerations
//!  └─ 6. Output     InjuryTable (records + flags + run stats)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use injury2table::{extract_from_url, layout};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = layout::official();
//!     let table = extract_from_url(
//!         "https://example.com/Injury-Report_2026-02-06_05PM.pdf",
//!         &config,
//!     )
//!     .await?;
//!     for record in &table.records {
//!         println!("{:?}", record.values);
//!     }
//!     eprintln!("{} records, {} flagged", table.len(), table.flagged.len());
//!     Ok(())
//! }
//! ```
//!
//! Reports with a different layout supply their own geometry:
//!
//! ```rust
//! use injury2table::{ExtractionConfig, PageGeometry, Rect};
//!
//! let config = ExtractionConfig::builder()
//!     .header_geometry(PageGeometry::new(
//!         Rect::new(60.0, 20.0, 585.0, 775.0),
//!         vec![150.0, 280.0, 410.0],
//!     ))
//!     .expected_columns(["Team", "Player Name", "Current Status", "Reason"])
//!     .carry_forward(["Team"])
//!     .build()?;
//! # Ok::<(), injury2table::ExtractError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `injury2table` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! injury2table = { version = "0.1", default-features = false }
//! ```
//!
//! ## The extraction engine
//!
//! PDF-to-table extraction and page counting sit behind the
//! [`TableEngine`] trait. The built-in [`engine::PdfiumEngine`] covers the
//! fixed-layout report; tests and alternative backends inject their own
//! implementation via [`ExtractionConfig::builder`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod layout;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use engine::{EngineError, TableEngine, TableFragment};
pub use error::ExtractError;
pub use extract::{
    extract_from_path, extract_from_path_sync, extract_from_url, extract_from_url_sync, inspect,
};
pub use geometry::{PageGeometry, PageRange, PageRole, Rect};
pub use output::{ExtractionStats, FlaggedCell, InjuryRecord, InjuryTable, ReportMetadata};
