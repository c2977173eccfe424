//! End-to-end pipeline tests for injury2table.
//!
//! The extraction engine is substituted with a deterministic fake so no
//! real PDF parsing (and no pdfium library) is needed. Remote-path tests
//! run against a loopback HTTP listener, so no network access is needed
//! either.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use injury2table::{
    extract_from_path, extract_from_path_sync, extract_from_url, inspect, EngineError,
    ExtractError, ExtractionConfig, PageGeometry, PageRange, PageRole, Rect, TableEngine,
    TableFragment,
};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Deterministic engine: canned page count and fragments, with a call log.
struct FakeEngine {
    page_count: usize,
    header: Vec<TableFragment>,
    continuation: Vec<TableFragment>,
    calls: Mutex<Vec<(PageRange, PageRole)>>,
}

impl FakeEngine {
    fn new(
        page_count: usize,
        header: Vec<TableFragment>,
        continuation: Vec<TableFragment>,
    ) -> Arc<Self> {
        Arc::new(Self {
            page_count,
            header,
            continuation,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(PageRange, PageRole)> {
        self.calls.lock().unwrap().clone()
    }
}

impl TableEngine for FakeEngine {
    fn page_count(&self, _path: &Path) -> Result<usize, EngineError> {
        Ok(self.page_count)
    }

    fn read_table(
        &self,
        _path: &Path,
        pages: PageRange,
        _geometry: &PageGeometry,
        role: PageRole,
    ) -> Result<Vec<TableFragment>, EngineError> {
        self.calls.lock().unwrap().push((pages, role));
        Ok(match role {
            PageRole::Header => self.header.clone(),
            PageRole::Continuation => self.continuation.clone(),
        })
    }
}

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn header_fragment(header: &[&str], rows: &[&[&str]]) -> TableFragment {
    TableFragment {
        page: 1,
        header: Some(cells(header)),
        rows: rows.iter().map(|r| cells(r)).collect(),
    }
}

fn continuation_fragment(page: usize, rows: &[&[&str]]) -> TableFragment {
    TableFragment {
        page,
        header: None,
        rows: rows.iter().map(|r| cells(r)).collect(),
    }
}

/// Config over a two-column schema with carry-forward on "Team".
fn config_with_engine(engine: Arc<FakeEngine>) -> ExtractionConfig {
    ExtractionConfig::builder()
        .header_geometry(PageGeometry::new(
            Rect::new(0.0, 0.0, 500.0, 700.0),
            vec![200.0],
        ))
        .expected_columns(["Team", "Player Name"])
        .carry_forward(["Team"])
        .engine(engine)
        .build()
        .expect("valid config")
}

/// A minimal file that passes the PDF magic-byte probe.
fn fake_pdf() -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(b"%PDF-1.7\nfake report body\n%%EOF\n")
        .expect("write");
    f
}

// ── Loopback HTTP helpers ────────────────────────────────────────────────────

fn http_response(status: &str, body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/pdf\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

/// Serve the same canned response to every connection, counting hits.
fn spawn_http_server(response: Vec<u8>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_thread = Arc::clone(&hits);
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            hits_in_thread.fetch_add(1, Ordering::SeqCst);
            let _ = stream.write_all(&response);
        }
    });
    (format!("http://{addr}/Injury-Report.pdf"), hits)
}

/// Temp files our pipeline would have created and (on a bug) leaked.
fn download_leftovers() -> HashSet<PathBuf> {
    std::fs::read_dir(std::env::temp_dir())
        .expect("read temp dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("injury2table-"))
        })
        .collect()
}

/// Serialises the two temp-cleanup tests so their leftover scans cannot
/// observe each other's in-flight temp file.
static TEMP_SCAN_GUARD: Mutex<()> = Mutex::new(());

// ── Local-path pipeline tests ────────────────────────────────────────────────

#[tokio::test]
async fn single_page_report_skips_continuation_extraction() {
    let engine = FakeEngine::new(
        1,
        vec![header_fragment(
            &["Team", "Player Name"],
            &[&["Celtics", "A"], &["Celtics", "B"]],
        )],
        vec![],
    );
    let config = config_with_engine(Arc::clone(&engine));
    let pdf = fake_pdf();

    let table = extract_from_path(pdf.path(), &config).await.expect("extract");

    assert_eq!(table.len(), 2, "output rows = header page data rows");
    assert_eq!(table.stats.page_count, 1);
    assert_eq!(table.stats.continuation_rows, 0);
    // Exactly one engine read: the header page. No continuation call.
    assert_eq!(engine.calls(), vec![(PageRange::single(1), PageRole::Header)]);
}

#[tokio::test]
async fn multi_page_report_concatenates_all_fragments() {
    let engine = FakeEngine::new(
        4,
        vec![header_fragment(
            &["Team", "Player Name"],
            &[&["Celtics", "A"], &["Celtics", "B"]],
        )],
        vec![
            continuation_fragment(2, &[&["Lakers", "C"]]),
            continuation_fragment(3, &[]), // blank page region: skipped, not an error
            continuation_fragment(4, &[&["Heat", "D"], &["Heat", "E"]]),
        ],
    );
    let config = config_with_engine(Arc::clone(&engine));
    let pdf = fake_pdf();

    let table = extract_from_path(pdf.path(), &config).await.expect("extract");

    assert_eq!(table.len(), 5, "2 header rows + 1 + 0 + 2 continuation rows");
    assert_eq!(table.stats.header_rows, 2);
    assert_eq!(table.stats.continuation_rows, 3);
    assert_eq!(table.stats.empty_fragments_skipped, 1);
    assert_eq!(
        engine.calls(),
        vec![
            (PageRange::single(1), PageRole::Header),
            (PageRange::new(2, 4), PageRole::Continuation),
        ]
    );

    // Page order, then in-page order.
    let players: Vec<&str> = table
        .records
        .iter()
        .map(|r| r.value(&table.columns, "Player Name").unwrap())
        .collect();
    assert_eq!(players, vec!["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn schema_mismatch_fails_before_continuation_extraction() {
    let engine = FakeEngine::new(
        3,
        vec![header_fragment(&["Franchise", "Player Name"], &[])],
        vec![continuation_fragment(2, &[&["Lakers", "C"]])],
    );
    let config = config_with_engine(Arc::clone(&engine));
    let pdf = fake_pdf();

    let err = extract_from_path(pdf.path(), &config).await.unwrap_err();

    match err {
        ExtractError::SchemaValidation { expected, observed } => {
            assert_eq!(expected, vec!["Team".to_string(), "Player Name".to_string()]);
            assert_eq!(
                observed,
                vec!["Franchise".to_string(), "Player Name".to_string()]
            );
        }
        other => panic!("expected SchemaValidation, got {other:?}"),
    }
    // Fail-fast gate: the engine never saw a continuation request.
    assert_eq!(engine.calls(), vec![(PageRange::single(1), PageRole::Header)]);
}

#[tokio::test]
async fn narrower_continuation_fragment_names_the_offending_page() {
    let engine = FakeEngine::new(
        3,
        vec![TableFragment {
            page: 1,
            header: Some(cells(&["A", "B", "C", "D"])),
            rows: vec![cells(&["1", "2", "3", "4"])],
        }],
        vec![continuation_fragment(3, &[&["1", "2", "3"]])],
    );
    let config = ExtractionConfig::builder()
        .header_geometry(PageGeometry::new(
            Rect::new(0.0, 0.0, 500.0, 700.0),
            vec![100.0, 200.0, 300.0],
        ))
        .expected_columns(["A", "B", "C", "D"])
        .engine(engine)
        .build()
        .expect("valid config");
    let pdf = fake_pdf();

    let err = extract_from_path(pdf.path(), &config).await.unwrap_err();
    match err {
        ExtractError::FragmentShape {
            page,
            expected,
            observed,
        } => {
            assert_eq!((page, expected, observed), (3, 4, 3));
        }
        other => panic!("expected FragmentShape, got {other:?}"),
    }
}

#[tokio::test]
async fn carry_forward_spans_page_boundaries() {
    let engine = FakeEngine::new(
        2,
        vec![header_fragment(
            &["Team", "Player Name"],
            &[&["TeamA", "P1"], &["", "P2"]],
        )],
        vec![continuation_fragment(2, &[&["", "P3"], &["TeamB", "P4"]])],
    );
    let config = config_with_engine(engine);
    let pdf = fake_pdf();

    let table = extract_from_path(pdf.path(), &config).await.expect("extract");

    let teams: Vec<&str> = table
        .records
        .iter()
        .map(|r| r.value(&table.columns, "Team").unwrap())
        .collect();
    assert_eq!(teams, vec!["TeamA", "TeamA", "TeamA", "TeamB"]);
    assert_eq!(table.stats.cells_carried_forward, 2);
}

#[tokio::test]
async fn missing_local_file_is_a_retrieval_error() {
    let engine = FakeEngine::new(1, vec![], vec![]);
    let config = config_with_engine(engine);

    let err = extract_from_path("/definitely/not/a/real/report.pdf", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::LocalRetrieval { .. }));
}

#[test]
fn sync_wrapper_runs_outside_a_runtime() {
    let engine = FakeEngine::new(
        1,
        vec![header_fragment(&["Team", "Player Name"], &[&["Celtics", "A"]])],
        vec![],
    );
    let config = config_with_engine(engine);
    let pdf = fake_pdf();

    let table = extract_from_path_sync(pdf.path(), &config).expect("extract");
    assert_eq!(table.len(), 1);
}

#[tokio::test]
async fn inspect_reports_the_page_count_without_extracting() {
    let engine = FakeEngine::new(7, vec![], vec![]);
    let config = config_with_engine(Arc::clone(&engine));
    let pdf = fake_pdf();

    let meta = inspect(pdf.path().to_str().unwrap(), &config)
        .await
        .expect("inspect");
    assert_eq!(meta.page_count, 7);
    assert!(engine.calls().is_empty(), "inspect must not extract tables");
}

// ── Remote-path tests ────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_success_deletes_the_temp_file() {
    let _guard = TEMP_SCAN_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    let before = download_leftovers();

    let (url, hits) = spawn_http_server(http_response(
        "200 OK",
        b"%PDF-1.7\nfake report body\n%%EOF\n",
    ));
    let engine = FakeEngine::new(
        1,
        vec![header_fragment(&["Team", "Player Name"], &[&["Celtics", "A"]])],
        vec![],
    );
    let config = config_with_engine(engine);

    let table = extract_from_url(&url, &config).await.expect("extract");
    assert_eq!(table.len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    assert_eq!(
        download_leftovers(),
        before,
        "temp file must be deleted after a successful run"
    );
}

#[tokio::test]
async fn remote_validation_failure_still_deletes_the_temp_file() {
    let _guard = TEMP_SCAN_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    let before = download_leftovers();

    let (url, _hits) = spawn_http_server(http_response(
        "200 OK",
        b"%PDF-1.7\nfake report body\n%%EOF\n",
    ));
    // Header page does not match the schema: the pipeline fails after the
    // download, which is exactly the path that must not leak the file.
    let engine = FakeEngine::new(2, vec![header_fragment(&["Wrong", "Header"], &[])], vec![]);
    let config = config_with_engine(engine);

    let err = extract_from_url(&url, &config).await.unwrap_err();
    assert!(matches!(err, ExtractError::SchemaValidation { .. }));

    assert_eq!(
        download_leftovers(),
        before,
        "temp file must be deleted after a failed run"
    );
}

#[tokio::test]
async fn persistent_503_exhausts_exactly_five_attempts() {
    let (url, hits) = spawn_http_server(http_response("503 Service Unavailable", b""));
    let engine = FakeEngine::new(1, vec![], vec![]);
    let mut config = config_with_engine(engine);
    config.retry_backoff_ms = 1; // keep the test fast; the curve is still exponential

    let err = extract_from_url(&url, &config).await.unwrap_err();
    match err {
        ExtractError::RemoteRetrieval {
            attempts, reason, ..
        } => {
            assert_eq!(attempts, 5, "budget is exactly five attempts");
            assert!(reason.contains("503"), "got: {reason}");
        }
        other => panic!("expected RemoteRetrieval, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 5, "never fewer, never more");
}

#[tokio::test]
async fn status_404_is_not_retried() {
    let (url, hits) = spawn_http_server(http_response("404 Not Found", b""));
    let engine = FakeEngine::new(1, vec![], vec![]);
    let mut config = config_with_engine(engine);
    config.retry_backoff_ms = 1;

    let err = extract_from_url(&url, &config).await.unwrap_err();
    match err {
        ExtractError::RemoteRetrieval { attempts, .. } => assert_eq!(attempts, 1),
        other => panic!("expected RemoteRetrieval, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_pdf_body_is_rejected() {
    // Takes the scan guard: this test creates (and deletes) a temp file,
    // which must not flicker through the cleanup tests' directory scans.
    let _guard = TEMP_SCAN_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    let (url, _hits) = spawn_http_server(http_response("200 OK", b"<html>maintenance</html>"));
    let engine = FakeEngine::new(1, vec![], vec![]);
    let config = config_with_engine(engine);

    let err = extract_from_url(&url, &config).await.unwrap_err();
    match err {
        ExtractError::RemoteRetrieval { reason, .. } => {
            assert!(reason.contains("not a PDF"), "got: {reason}")
        }
        other => panic!("expected RemoteRetrieval, got {other:?}"),
    }
}
