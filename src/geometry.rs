//! Page geometry: where the table lives on each page.
//!
//! The report has a fixed layout, so the table is located by coordinates
//! rather than detected. A [`PageGeometry`] is the passive contract the
//! extraction engine consumes: a rectangular area plus an ordered list of
//! column boundaries. Two geometries exist per run — one for the header
//! page and one for continuation pages — because the first page carries a
//! title block that pushes the table down.
//!
//! Coordinates are PDF points (1/72 inch) measured from the **top-left**
//! corner of the page, the convention of stream-mode table extractors.
//! The built-in pdfium engine converts to pdfium's bottom-left origin
//! internally.

use serde::{Deserialize, Serialize};

/// A rectangular region on a page, in points from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Whether a point (x, y-from-top) falls inside the region.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Where the table lives on a page: its bounding area plus the x positions
/// separating adjacent columns.
///
/// For a table of N columns, `columns` holds N−1 boundaries in ascending
/// order. Text left of the first boundary belongs to column 0, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub area: Rect,
    pub columns: Vec<f32>,
}

impl PageGeometry {
    pub fn new(area: Rect, columns: Vec<f32>) -> Self {
        Self { area, columns }
    }

    /// Number of columns this geometry describes.
    pub fn column_count(&self) -> usize {
        self.columns.len() + 1
    }

    /// Index of the column an x position falls into.
    pub fn column_of(&self, x: f32) -> usize {
        self.columns.iter().take_while(|&&b| x >= b).count()
    }
}

/// Which kind of page a fragment is read from.
///
/// The header page is the only page carrying column name labels; every
/// later page renders the same table layout without them. Keeping the two
/// as an explicit tagged union makes the reconciliation step exhaustive:
/// a `match` on `PageRole` cannot silently ignore one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageRole {
    /// Page 1. The first extracted row is the column-name header.
    Header,
    /// Pages 2..N. No row is ever treated as a header, even if the
    /// extraction engine believes it found one.
    Continuation,
}

/// A 1-indexed, inclusive range of pages to extract from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
}

impl PageRange {
    /// A single page.
    pub fn single(page: usize) -> Self {
        Self {
            first: page,
            last: page,
        }
    }

    /// An inclusive span of pages.
    pub fn new(first: usize, last: usize) -> Self {
        debug_assert!(first >= 1 && last >= first);
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn is_empty(&self) -> bool {
        false // first ≤ last is a construction invariant
    }

    /// Iterate the 1-indexed page numbers in the range.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.first..=self.last
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_boundary_points() {
        let r = Rect::new(10.0, 20.0, 100.0, 200.0);
        assert!(r.contains(20.0, 10.0));
        assert!(r.contains(200.0, 100.0));
        assert!(!r.contains(19.9, 50.0));
        assert!(!r.contains(50.0, 100.1));
    }

    #[test]
    fn column_of_buckets_by_boundary() {
        let g = PageGeometry::new(Rect::new(0.0, 0.0, 100.0, 300.0), vec![100.0, 200.0]);
        assert_eq!(g.column_count(), 3);
        assert_eq!(g.column_of(50.0), 0);
        assert_eq!(g.column_of(100.0), 1); // boundary belongs to the right column
        assert_eq!(g.column_of(150.0), 1);
        assert_eq!(g.column_of(250.0), 2);
    }

    #[test]
    fn page_range_display_and_iter() {
        assert_eq!(PageRange::single(1).to_string(), "1");
        assert_eq!(PageRange::new(2, 5).to_string(), "2-5");
        assert_eq!(PageRange::new(2, 4).iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(PageRange::new(2, 4).len(), 3);
    }
}
