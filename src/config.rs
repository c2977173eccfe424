//! Configuration types for injury-report extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across invocations and to
//! diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The config mixes two required inputs (header geometry, expected
//! columns) with a long tail of optional ones (continuation geometry,
//! fill-down list, enumerations, HTTP headers, retry knobs, a replacement
//! engine). The builder lets callers set only what they care about and
//! validates the cross-field constraints once, in `build()`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::TableEngine;
use crate::error::ExtractError;
use crate::geometry::PageGeometry;

/// Configuration for one report extraction.
///
/// Built via [`ExtractionConfig::builder()`], or use
/// [`crate::layout::official()`] for the published league-report layout.
///
/// # Example
/// ```rust
/// use injury2table::{ExtractionConfig, PageGeometry, Rect};
///
/// let config = ExtractionConfig::builder()
///     .header_geometry(PageGeometry::new(
///         Rect::new(60.0, 20.0, 585.0, 775.0),
///         vec![150.0, 280.0, 410.0],
///     ))
///     .expected_columns(["Team", "Player Name", "Current Status", "Reason"])
///     .carry_forward(["Team"])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Table location on page 1, the only page carrying column labels.
    pub header_geometry: PageGeometry,

    /// Table location on pages 2..N. `None` means the header geometry is
    /// reused; [`ExtractionConfig::continuation_geometry`] resolves the
    /// default so a geometry is always in hand when fragments are
    /// requested.
    pub continuation: Option<PageGeometry>,

    /// The exact column names the header page must expose, in order.
    /// Comparison is case-sensitive.
    pub expected_columns: Vec<String>,

    /// Columns whose blank cells inherit the nearest preceding non-blank
    /// value (the report renders these once per visually merged group).
    pub carry_forward: Vec<String>,

    /// Per-column allowed value sets. Values outside the set are kept but
    /// flagged in [`crate::output::InjuryTable::flagged`].
    pub enumerations: HashMap<String, Vec<String>>,

    /// Extra HTTP headers for remote retrieval; these extend and override
    /// the built-in defaults (browser User-Agent, `Accept:
    /// application/pdf`).
    pub extra_headers: Vec<(String, String)>,

    /// Maximum HTTP attempts for a remote source. Default: 5.
    ///
    /// Retries apply only to GET, and only to status 429/500/502/503/504
    /// or a transient transport failure. A malformed document is never
    /// retried — this budget is transport-level only.
    pub max_attempts: u32,

    /// Base retry delay in milliseconds. Default: 1500.
    ///
    /// Doubles after each attempt: 1.5 s → 3 s → 6 s → 12 s. Exponential
    /// backoff gives the report CDN time to recover instead of hammering
    /// it at a fixed cadence.
    pub retry_backoff_ms: u64,

    /// HTTP connect timeout in seconds. Default: 5.
    pub connect_timeout_secs: u64,

    /// HTTP read timeout in seconds. Default: 60.
    ///
    /// The report CDN intermittently stalls mid-body; a generous read
    /// timeout lets slow-but-live transfers finish while still bounding a
    /// dead one.
    pub read_timeout_secs: u64,

    /// Replacement table engine. `None` uses the built-in pdfium backend.
    /// Tests inject deterministic fakes here.
    pub engine: Option<Arc<dyn TableEngine>>,
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("header_geometry", &self.header_geometry)
            .field("continuation", &self.continuation)
            .field("expected_columns", &self.expected_columns)
            .field("carry_forward", &self.carry_forward)
            .field("enumerations", &self.enumerations)
            .field("extra_headers", &self.extra_headers)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("engine", &self.engine.as_ref().map(|_| "<dyn TableEngine>"))
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder::default()
    }

    /// The geometry to use for pages 2..N, falling back to the header
    /// geometry when none was supplied.
    pub fn continuation_geometry(&self) -> &PageGeometry {
        self.continuation.as_ref().unwrap_or(&self.header_geometry)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Default)]
pub struct ExtractionConfigBuilder {
    header_geometry: Option<PageGeometry>,
    continuation: Option<PageGeometry>,
    expected_columns: Vec<String>,
    carry_forward: Vec<String>,
    enumerations: HashMap<String, Vec<String>>,
    extra_headers: Vec<(String, String)>,
    max_attempts: Option<u32>,
    retry_backoff_ms: Option<u64>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    engine: Option<Arc<dyn TableEngine>>,
}

impl ExtractionConfigBuilder {
    pub fn header_geometry(mut self, geometry: PageGeometry) -> Self {
        self.header_geometry = Some(geometry);
        self
    }

    pub fn continuation_geometry(mut self, geometry: PageGeometry) -> Self {
        self.continuation = Some(geometry);
        self
    }

    pub fn expected_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn carry_forward<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.carry_forward = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict a column to an allowed value set; out-of-set values are
    /// flagged, never dropped.
    pub fn enumeration<S, I, V>(mut self, column: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.enumerations
            .insert(column.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Add an HTTP header to remote requests (extends/overrides defaults).
    pub fn http_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n.max(1));
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = Some(ms);
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs.max(1));
        self
    }

    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.read_timeout_secs = Some(secs.max(1));
        self
    }

    pub fn engine(mut self, engine: Arc<dyn TableEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Build the configuration, validating cross-field constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let header_geometry = self.header_geometry.ok_or_else(|| {
            ExtractError::InvalidConfig("header geometry is required".into())
        })?;
        if self.expected_columns.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "expected column list must not be empty".into(),
            ));
        }
        if header_geometry.column_count() != self.expected_columns.len() {
            return Err(ExtractError::InvalidConfig(format!(
                "header geometry describes {} column(s) but {} expected column name(s) were given",
                header_geometry.column_count(),
                self.expected_columns.len()
            )));
        }
        if let Some(ref cont) = self.continuation {
            if cont.column_count() != header_geometry.column_count() {
                return Err(ExtractError::InvalidConfig(format!(
                    "continuation geometry describes {} column(s), header geometry {}",
                    cont.column_count(),
                    header_geometry.column_count()
                )));
            }
        }
        for column in &self.carry_forward {
            if !self.expected_columns.contains(column) {
                return Err(ExtractError::InvalidConfig(format!(
                    "carry-forward column '{column}' is not in the expected column list"
                )));
            }
        }
        for column in self.enumerations.keys() {
            if !self.expected_columns.contains(column) {
                return Err(ExtractError::InvalidConfig(format!(
                    "enumerated column '{column}' is not in the expected column list"
                )));
            }
        }

        Ok(ExtractionConfig {
            header_geometry,
            continuation: self.continuation,
            expected_columns: self.expected_columns,
            carry_forward: self.carry_forward,
            enumerations: self.enumerations,
            extra_headers: self.extra_headers,
            max_attempts: self.max_attempts.unwrap_or(5),
            retry_backoff_ms: self.retry_backoff_ms.unwrap_or(1500),
            connect_timeout_secs: self.connect_timeout_secs.unwrap_or(5),
            read_timeout_secs: self.read_timeout_secs.unwrap_or(60),
            engine: self.engine,
        })
    }
}
