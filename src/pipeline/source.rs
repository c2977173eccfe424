//! Source acquisition: turn a URL or local path into a stable byte source.
//!
//! ## Why download to a temp file?
//!
//! The extraction engine requires a file-system path — and the report CDN
//! intermittently stalls connections, so the engine must NEVER be pointed
//! at a URL. The body is streamed to a `NamedTempFile` whose drop deletes
//! it on every exit path — success, validation failure, extraction
//! failure, or panic — so cleanup needs no per-branch handling and a
//! cleanup failure can never mask the primary error.
//!
//! ## Retry policy
//!
//! GET only. Up to `max_attempts` tries (default 5), retrying solely on
//! status 429/500/502/503/504 and transient transport failures
//! (connect/timeout), with delay `retry_backoff_ms × 2^(attempt−1)`. Any
//! other failure is surfaced immediately — re-requesting a 404 or a
//! malformed body buys nothing.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::error::ExtractError;

/// Status codes worth a retry: rate limiting and transient server-side
/// failures.
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// The CDN rejects non-browser user agents.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// The resolved byte source — either the caller's own file or a scoped
/// temp file holding a downloaded body.
#[derive(Debug)]
pub enum ByteSource {
    /// The caller's path, read directly; never mutated or deleted.
    Local(PathBuf),
    /// Downloaded body. Deleting happens in `NamedTempFile`'s Drop, which
    /// suppresses cleanup errors so they cannot mask a pipeline error.
    Downloaded(NamedTempFile),
}

impl ByteSource {
    /// Path to the PDF regardless of how it was acquired.
    pub fn path(&self) -> &Path {
        match self {
            ByteSource::Local(p) => p,
            ByteSource::Downloaded(tmp) => tmp.path(),
        }
    }
}

/// Fetch a remote report into a scoped temp file, honouring the retry
/// budget.
pub async fn fetch_remote(
    url: &str,
    config: &ExtractionConfig,
) -> Result<ByteSource, ExtractError> {
    let client = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .read_timeout(std::time::Duration::from_secs(config.read_timeout_secs))
        .build()
        .map_err(|e| retrieval_err(url, 0, format!("client build: {e}")))?;

    let headers = request_headers(&config.extra_headers)?;

    let mut last_reason = String::from("no attempt made");
    for attempt in 1..=config.max_attempts {
        if attempt > 1 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 2);
            warn!(
                "'{}': retry {}/{} after {}ms — {}",
                url, attempt, config.max_attempts, backoff, last_reason
            );
            tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
        }

        match client.get(url).headers(headers.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    info!("Validated '{}' (HTTP {})", url, status.as_u16());
                    return download_body(url, response, attempt).await;
                }
                last_reason = format!("HTTP {status}");
                if !is_retryable_status(status) {
                    return Err(retrieval_err(url, attempt, last_reason));
                }
            }
            Err(e) => {
                last_reason = e.to_string();
                if !(e.is_timeout() || e.is_connect()) {
                    return Err(retrieval_err(url, attempt, last_reason));
                }
            }
        }
    }

    Err(retrieval_err(url, config.max_attempts, last_reason))
}

/// Resolve a local report path, distinguishing missing-file from
/// permission causes and rejecting non-PDF content up front.
pub fn probe_local(path: &Path) -> Result<ByteSource, ExtractError> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        let reason = match e.kind() {
            std::io::ErrorKind::NotFound => "file not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "permission denied".to_string(),
            _ => e.to_string(),
        };
        ExtractError::LocalRetrieval {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(ExtractError::LocalRetrieval {
            path: path.to_path_buf(),
            reason: format!("not a PDF (starts with {magic:?})"),
        });
    }

    debug!("Resolved local report: {}", path.display());
    Ok(ByteSource::Local(path.to_path_buf()))
}

/// Stream the response body into a uniquely named temp file and verify
/// the PDF magic bytes.
async fn download_body(
    url: &str,
    response: reqwest::Response,
    attempt: u32,
) -> Result<ByteSource, ExtractError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("injury2table-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| retrieval_err(url, attempt, format!("temp file: {e}")))?;

    let mut magic: Vec<u8> = Vec::with_capacity(4);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| retrieval_err(url, attempt, format!("body read: {e}")))?;
        if magic.len() < 4 {
            magic.extend(chunk.iter().take(4 - magic.len()));
        }
        tmp.as_file_mut()
            .write_all(&chunk)
            .map_err(|e| retrieval_err(url, attempt, format!("temp write: {e}")))?;
    }

    if magic != b"%PDF" {
        return Err(retrieval_err(
            url,
            attempt,
            format!("not a PDF (starts with {magic:?})"),
        ));
    }

    info!("Downloaded '{}' to {}", url, tmp.path().display());
    Ok(ByteSource::Downloaded(tmp))
}

/// Default headers extended/overridden by caller-supplied pairs.
fn request_headers(extra: &[(String, String)]) -> Result<HeaderMap, ExtractError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/pdf"));
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ExtractError::InvalidConfig(format!("HTTP header '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ExtractError::InvalidConfig(format!("HTTP header '{name:?}': {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUS.contains(&status.as_u16())
}

fn retrieval_err(url: &str, attempts: u32, reason: String) -> ExtractError {
    ExtractError::RemoteRetrieval {
        url: url.to_string(),
        attempts,
        reason,
    }
}
