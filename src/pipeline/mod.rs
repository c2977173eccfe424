//! Pipeline stages for report extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different extraction backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ pages ──▶ schema ──▶ reconcile ──▶ normalize
//! (URL/path) (engine)  (gate)     (raw table)   (records)
//! ```
//!
//! 1. [`source`]    — acquire the PDF bytes: streamed download into a
//!    scoped temp file, or a probed local path
//! 2. [`pages`]     — drive the table engine for the header page and the
//!    continuation pages; runs in `spawn_blocking` because pdfium is not
//!    async-safe
//! 3. [`schema`]    — validate the header page's column names before any
//!    continuation page is extracted
//! 4. [`reconcile`] — concatenate named and positional fragments into one
//!    raw table with a single column schema
//! 5. [`normalize`] — whitespace cleanup, carry-forward fill-down, and
//!    enumeration flagging

pub mod normalize;
pub mod pages;
pub mod reconcile;
pub mod schema;
pub mod source;
