//! The built-in pdfium-backed engine.
//!
//! ## Why character geometry instead of a table detector?
//!
//! The report layout is fixed and known: the caller supplies the table's
//! bounding area and the x positions of its column boundaries. That turns
//! extraction into a deterministic geometric pass — harvest the page's
//! characters with their bounds, keep the ones inside the area, cluster
//! them into rows by vertical position, and bucket each row's characters
//! into columns by the boundary list. No layout analysis, no heuristics
//! about ruling lines.
//!
//! ## Coordinate systems
//!
//! [`crate::geometry::PageGeometry`] measures y from the top of the page;
//! pdfium measures from the bottom. The conversion (`page_height − y`)
//! happens once per character, here, so the rest of the crate only ever
//! sees top-origin coordinates.
//!
//! Every entry point constructs its own `Pdfium` binding and document
//! handle; nothing is cached between calls, so concurrent invocations
//! never share state.

use std::path::Path;

use pdfium_render::prelude::*;
use tracing::debug;

use super::{EngineError, TableEngine, TableFragment};
use crate::geometry::{PageGeometry, PageRange, PageRole};

/// Fixed-layout, stream-mode table reader backed by pdfium.
///
/// Binds to the pdfium system library via `Pdfium::default()` (override
/// the library location with `PDFIUM_LIB_PATH`).
#[derive(Debug, Default)]
pub struct PdfiumEngine;

impl PdfiumEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TableEngine for PdfiumEngine {
    fn page_count(&self, path: &Path) -> Result<usize, EngineError> {
        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::Open(format!("{e:?}")))?;
        Ok(document.pages().len() as usize)
    }

    fn read_table(
        &self,
        path: &Path,
        pages: PageRange,
        geometry: &PageGeometry,
        role: PageRole,
    ) -> Result<Vec<TableFragment>, EngineError> {
        let pdfium = Pdfium::default();
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| EngineError::Open(format!("{e:?}")))?;
        let doc_pages = document.pages();

        let mut fragments = Vec::with_capacity(pages.len());
        for page_num in pages.iter() {
            let page = doc_pages
                .get((page_num - 1) as u16)
                .map_err(|e| EngineError::Page {
                    page: page_num,
                    detail: format!("{e:?}"),
                })?;
            fragments.push(read_page_table(&page, page_num, geometry, role)?);
        }
        Ok(fragments)
    }
}

/// A character with its midpoint in top-origin page coordinates.
struct CharBox {
    ch: char,
    x: f32,
    y: f32,
    left: f32,
    right: f32,
    height: f32,
}

/// Extract one page's table region into a fragment.
fn read_page_table(
    page: &PdfPage,
    page_num: usize,
    geometry: &PageGeometry,
    role: PageRole,
) -> Result<TableFragment, EngineError> {
    let page_height = page.height().value;
    let text = page.text().map_err(|e| EngineError::Page {
        page: page_num,
        detail: format!("{e:?}"),
    })?;

    let mut chars: Vec<CharBox> = Vec::new();
    for text_char in text.chars().iter() {
        let Some(ch) = text_char.unicode_char() else {
            continue;
        };
        if ch.is_control() {
            continue;
        }
        let Ok(bounds) = text_char.loose_bounds() else {
            continue;
        };
        let left = bounds.left.value;
        let right = bounds.right.value;
        // pdfium's y grows upward; flip to top-origin.
        let top = page_height - bounds.top.value;
        let bottom = page_height - bounds.bottom.value;
        let x = (left + right) / 2.0;
        let y = (top + bottom) / 2.0;
        if geometry.area.contains(x, y) {
            chars.push(CharBox {
                ch,
                x,
                y,
                left,
                right,
                height: (bottom - top).abs(),
            });
        }
    }

    let mut rows = cluster_rows(chars, geometry);
    debug!(
        "page {}: {} row(s) inside extraction area",
        page_num,
        rows.len()
    );

    let header = match role {
        PageRole::Header if !rows.is_empty() => Some(rows.remove(0)),
        PageRole::Header | PageRole::Continuation => None,
    };

    Ok(TableFragment {
        page: page_num,
        header,
        rows,
    })
}

/// Group area-filtered characters into rows, then bucket each row's
/// characters into columns by the boundary list.
fn cluster_rows(mut chars: Vec<CharBox>, geometry: &PageGeometry) -> Vec<Vec<String>> {
    if chars.is_empty() {
        return Vec::new();
    }

    chars.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    // Two characters belong to the same visual line when their vertical
    // midpoints are closer than a fraction of the typical glyph height.
    let mut heights: Vec<f32> = chars.iter().map(|c| c.height).collect();
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_height = heights[heights.len() / 2];
    let row_tolerance = (median_height * 0.5).max(2.0);

    let mut line_groups: Vec<Vec<CharBox>> = Vec::new();
    let mut current: Vec<CharBox> = Vec::new();
    let mut current_y = chars[0].y;
    for c in chars {
        if (c.y - current_y).abs() > row_tolerance && !current.is_empty() {
            line_groups.push(std::mem::take(&mut current));
            current_y = c.y;
        }
        current.push(c);
    }
    if !current.is_empty() {
        line_groups.push(current);
    }

    line_groups
        .into_iter()
        .map(|line| line_to_cells(line, geometry))
        .collect()
}

/// Assemble one visual line into a fixed-width cell row.
fn line_to_cells(mut line: Vec<CharBox>, geometry: &PageGeometry) -> Vec<String> {
    line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    // Word gaps larger than this get an explicit space even when the PDF
    // carries no space glyph.
    let mut widths: Vec<f32> = line.iter().map(|c| c.right - c.left).collect();
    widths.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_width = widths.get(widths.len() / 2).copied().unwrap_or(4.0);
    let space_gap = (median_width * 0.4).max(1.0);

    let mut cells = vec![String::new(); geometry.column_count()];
    let mut prev: Option<(usize, f32)> = None; // (column, right edge)
    for c in &line {
        let col = geometry.column_of(c.x);
        let cell = &mut cells[col];
        if let Some((prev_col, prev_right)) = prev {
            if prev_col == col && c.left - prev_right > space_gap && !cell.ends_with(' ') {
                cell.push(' ');
            }
        }
        cell.push(c.ch);
        prev = Some((col, c.right));
    }

    for cell in &mut cells {
        let trimmed = cell.trim();
        if trimmed.len() != cell.len() {
            *cell = trimmed.to_string();
        }
    }
    cells
}
