//! Page extraction: drive the table engine once per document region.
//!
//! Exactly two extraction calls happen per run. The header page (page 1)
//! is read with the header geometry and header inference on; continuation
//! pages (2..N) are read with the continuation geometry and header
//! inference off — and only when the document has a second page at all.
//! A single-page report is the common case and not an error.
//!
//! ## Why spawn_blocking?
//!
//! The built-in engine wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto the
//! blocking thread pool so Tokio worker threads never stall during
//! extraction.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::ExtractionConfig;
use crate::engine::{EngineError, TableEngine, TableFragment};
use crate::error::ExtractError;
use crate::geometry::{PageRange, PageRole};

/// Probe the document's page count on the blocking pool.
///
/// Returns the raw [`EngineError`] so the caller can map it per source
/// mode (a local probe failure is a retrieval error, a remote one is
/// not — the download already succeeded).
pub async fn page_count(
    engine: &Arc<dyn TableEngine>,
    path: &Path,
) -> Result<usize, EngineError> {
    let engine = Arc::clone(engine);
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || engine.page_count(&path))
        .await
        .map_err(|e| EngineError::Open(format!("page-count task panicked: {e}")))?
}

/// Read the header page's fragments (header inference enabled).
pub async fn header_fragments(
    engine: &Arc<dyn TableEngine>,
    path: &Path,
    config: &ExtractionConfig,
) -> Result<Vec<TableFragment>, ExtractError> {
    read_fragments(
        engine,
        path,
        config,
        PageRange::single(1),
        PageRole::Header,
    )
    .await
}

/// Read continuation-page fragments (header inference disabled).
///
/// A single-page document yields an empty list without touching the
/// engine.
pub async fn continuation_fragments(
    engine: &Arc<dyn TableEngine>,
    path: &Path,
    config: &ExtractionConfig,
    page_count: usize,
) -> Result<Vec<TableFragment>, ExtractError> {
    if page_count < 2 {
        debug!("single-page document, skipping continuation extraction");
        return Ok(Vec::new());
    }
    read_fragments(
        engine,
        path,
        config,
        PageRange::new(2, page_count),
        PageRole::Continuation,
    )
    .await
}

async fn read_fragments(
    engine: &Arc<dyn TableEngine>,
    path: &Path,
    config: &ExtractionConfig,
    range: PageRange,
    role: PageRole,
) -> Result<Vec<TableFragment>, ExtractError> {
    let engine = Arc::clone(engine);
    let path = path.to_path_buf();
    let geometry = match role {
        PageRole::Header => config.header_geometry.clone(),
        PageRole::Continuation => config.continuation_geometry().clone(),
    };

    let fragments = tokio::task::spawn_blocking(move || {
        engine.read_table(&path, range, &geometry, role)
    })
    .await
    .map_err(|e| ExtractError::Extraction {
        pages: range.to_string(),
        detail: format!("extraction task panicked: {e}"),
    })?
    .map_err(|e| ExtractError::Extraction {
        pages: range.to_string(),
        detail: e.to_string(),
    })?;

    debug!(
        "pages {}: {} fragment(s), {} data row(s)",
        range,
        fragments.len(),
        fragments.iter().map(|f| f.rows.len()).sum::<usize>()
    );
    Ok(fragments)
}
