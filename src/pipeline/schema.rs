//! Header-schema validation: the fail-fast gate between header-page and
//! continuation-page extraction.
//!
//! The first header-page fragment must expose exactly the expected column
//! names — same set, same order, same case. Running this check before any
//! continuation pages are touched means a malformed document costs one
//! engine call, not N.

use tracing::debug;

use crate::engine::TableFragment;
use crate::error::ExtractError;

/// Validate the header page's first fragment against the expected schema
/// and return the authoritative column list.
pub fn validate_header(
    header_fragments: &[TableFragment],
    expected: &[String],
) -> Result<Vec<String>, ExtractError> {
    let observed: Vec<String> = header_fragments
        .first()
        .and_then(|f| f.header.clone())
        .unwrap_or_default();

    if observed != expected {
        return Err(ExtractError::SchemaValidation {
            expected: expected.to_vec(),
            observed,
        });
    }

    debug!("header schema validated: {} column(s)", observed.len());
    Ok(observed)
}
