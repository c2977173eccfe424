//! Report-extraction entry points.
//!
//! One invocation is one linear sequence of awaited steps: acquire the
//! byte source, probe the page count, read the header page, validate its
//! schema, read the continuation pages, reconcile, normalize. Nothing is
//! shared between invocations, so callers may run several extractions
//! concurrently — each owns its own temp file and engine handles.
//!
//! The header-schema gate sits BETWEEN the two extraction calls on
//! purpose: a malformed document is rejected after one engine call
//! instead of after extracting every page.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::engine::{PdfiumEngine, TableEngine};
use crate::error::ExtractError;
use crate::output::{ExtractionStats, InjuryTable, ReportMetadata};
use crate::pipeline::{normalize, pages, reconcile, schema, source};

/// Extract an injury report from a URL.
///
/// Downloads the PDF into a uniquely named temp file (the report CDN
/// stalls connections, so the engine is never pointed at the network),
/// runs the pipeline, and deletes the temp file on every exit path.
///
/// # Errors
/// [`ExtractError::RemoteRetrieval`] for transport failures after the
/// retry budget; [`ExtractError::SchemaValidation`],
/// [`ExtractError::FragmentShape`], [`ExtractError::IncompleteFirstRow`],
/// or [`ExtractError::Extraction`] for document failures.
pub async fn extract_from_url(
    url: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<InjuryTable, ExtractError> {
    let url = url.as_ref();
    let total_start = Instant::now();
    info!("Starting extraction: {}", url);

    let retrieval_start = Instant::now();
    let byte_source = source::fetch_remote(url, config).await?;
    let engine = resolve_engine(config);
    let page_count = pages::page_count(&engine, byte_source.path())
        .await
        .map_err(|e| ExtractError::Extraction {
            pages: "document".into(),
            detail: e.to_string(),
        })?;
    let retrieval_duration_ms = retrieval_start.elapsed().as_millis() as u64;

    // `byte_source` owns the temp file; it is dropped (and the file
    // deleted) whether the pipeline returns or errors.
    run_pipeline(
        &engine,
        byte_source.path(),
        config,
        page_count,
        retrieval_duration_ms,
        total_start,
    )
    .await
}

/// Extract an injury report from a local file.
///
/// The caller's file is read directly — never mutated, never deleted, and
/// no temp file is created.
pub async fn extract_from_path(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<InjuryTable, ExtractError> {
    let path = path.as_ref();
    let total_start = Instant::now();
    info!("Starting extraction: {}", path.display());

    let retrieval_start = Instant::now();
    let byte_source = source::probe_local(path)?;
    let engine = resolve_engine(config);
    let page_count = pages::page_count(&engine, byte_source.path())
        .await
        .map_err(|e| ExtractError::LocalRetrieval {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let retrieval_duration_ms = retrieval_start.elapsed().as_millis() as u64;

    run_pipeline(
        &engine,
        byte_source.path(),
        config,
        page_count,
        retrieval_duration_ms,
        total_start,
    )
    .await
}

/// Synchronous wrapper around [`extract_from_url`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_from_url_sync(
    url: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<InjuryTable, ExtractError> {
    runtime()?.block_on(extract_from_url(url, config))
}

/// Synchronous wrapper around [`extract_from_path`].
pub fn extract_from_path_sync(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<InjuryTable, ExtractError> {
    runtime()?.block_on(extract_from_path(path, config))
}

/// Probe a report's page count without extracting anything.
///
/// `source` is treated as a URL when it starts with `http://` or
/// `https://`, otherwise as a local path. Remote probes download the
/// document (retry budget and all) into a temp file that is deleted
/// before returning.
pub async fn inspect(
    source_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ReportMetadata, ExtractError> {
    let source_str = source_str.as_ref();
    let engine = resolve_engine(config);

    let byte_source = if is_url(source_str) {
        source::fetch_remote(source_str, config).await?
    } else {
        source::probe_local(Path::new(source_str))?
    };

    let page_count = pages::page_count(&engine, byte_source.path())
        .await
        .map_err(|e| match byte_source {
            source::ByteSource::Local(ref path) => ExtractError::LocalRetrieval {
                path: path.clone(),
                reason: e.to_string(),
            },
            source::ByteSource::Downloaded(_) => ExtractError::Extraction {
                pages: "document".into(),
                detail: e.to_string(),
            },
        })?;

    Ok(ReportMetadata {
        source: source_str.to_string(),
        page_count,
    })
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn resolve_engine(config: &ExtractionConfig) -> Arc<dyn TableEngine> {
    config
        .engine
        .clone()
        .unwrap_or_else(|| Arc::new(PdfiumEngine::new()))
}

fn runtime() -> Result<tokio::runtime::Runtime, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("failed to create tokio runtime: {e}")))
}

/// The linear stage sequence shared by both entry modes.
async fn run_pipeline(
    engine: &Arc<dyn TableEngine>,
    path: &Path,
    config: &ExtractionConfig,
    page_count: usize,
    retrieval_duration_ms: u64,
    total_start: Instant,
) -> Result<InjuryTable, ExtractError> {
    debug!("report has {} page(s)", page_count);

    // ── Header page, then the schema gate ────────────────────────────────
    let extraction_start = Instant::now();
    let header_fragments = pages::header_fragments(engine, path, config).await?;
    let columns = schema::validate_header(&header_fragments, &config.expected_columns)?;

    // ── Continuation pages (skipped entirely for one-page reports) ───────
    let continuation_fragments =
        pages::continuation_fragments(engine, path, config, page_count).await?;
    let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;

    // ── Reconcile and normalize ──────────────────────────────────────────
    let merged = reconcile::reconcile(columns, &header_fragments, &continuation_fragments)?;
    let cleaned = normalize::normalize(&merged.table, config)?;

    let stats = ExtractionStats {
        page_count,
        header_rows: merged.header_rows,
        continuation_rows: merged.continuation_rows,
        reheader_rows_dropped: merged.reheader_rows_dropped,
        empty_fragments_skipped: merged.empty_fragments_skipped,
        cells_carried_forward: cleaned.cells_carried_forward,
        cells_flagged: cleaned.flagged.len(),
        retrieval_duration_ms,
        extraction_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} record(s) from {} page(s) in {}ms",
        cleaned.records.len(),
        page_count,
        stats.total_duration_ms
    );

    Ok(InjuryTable {
        columns: merged.table.columns,
        records: cleaned.records,
        flagged: cleaned.flagged,
        stats,
    })
}
