//! Cell formats and run-length format rows
//!
//! A [`Format`] is the set of display attributes attached to one cell.
//! Formats are stored per row as an ordered sequence of [`Region`]s, each
//! covering a run of consecutive cells with identical attributes. Contiguous
//! styled spans dominate real terminal output, so a row usually compresses
//! to a handful of regions.

use bitflags::bitflags;

/// Text color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Default color (whatever the renderer uses for fg/bg)
    #[default]
    Default,
    /// Palette index; 0-15 are the classic ANSI colors
    Indexed(u8),
    /// True Color (24bit RGB)
    Rgb(u8, u8, u8),
}

bitflags! {
    /// Cell character attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellAttrs: u16 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const BLINK     = 0b0001_0000;
        const INVERSE   = 0b0010_0000;
        const HIDDEN    = 0b0100_0000;
        const STRIKE    = 0b1000_0000;
    }
}

/// Cursor style (DECSCUSR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    /// Block cursor (default)
    #[default]
    Block,
    /// Underline cursor
    Underline,
    /// Bar (vertical line) cursor
    Bar,
}

/// Display attributes for one cell.
///
/// The default value is "no attributes, default colors"; a freshly cleared
/// cell compares equal to `Format::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Format {
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

/// A run of consecutive cells sharing one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Number of cells covered
    pub size: usize,
    /// Format of every cell in the run
    pub format: Format,
}

/// Run-length-compressed formats for one row.
///
/// Invariant: the region sizes sum to the row's cell count, and no region
/// has size zero. Point edits split runs; equal neighbours are re-merged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatRow {
    regions: Vec<Region>,
}

impl FormatRow {
    /// A row of `width` default-formatted cells.
    pub fn new(width: usize) -> Self {
        Self::filled(width, Format::default())
    }

    /// A row of `width` cells all carrying `format`.
    pub fn filled(width: usize, format: Format) -> Self {
        let regions = if width == 0 {
            Vec::new()
        } else {
            vec![Region { size: width, format }]
        };
        Self { regions }
    }

    /// Total cell count (sum of region sizes).
    pub fn width(&self) -> usize {
        self.regions.iter().map(|r| r.size).sum()
    }

    /// The regions, in column order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Format of the cell at `col`; default when out of range.
    pub fn format_at(&self, col: usize) -> Format {
        let mut off = 0;
        for r in &self.regions {
            if col < off + r.size {
                return r.format;
            }
            off += r.size;
        }
        Format::default()
    }

    /// Set one cell at `col` to `format`, splitting and merging runs.
    pub(crate) fn paint(&mut self, col: usize, format: Format) {
        self.range_paint(col, col, format);
    }

    /// Uniform paint over the inclusive column range `[start, end]`.
    pub(crate) fn range_paint(&mut self, start: usize, end: usize, format: Format) {
        let w = self.width();
        if w == 0 || start > end || start >= w {
            return;
        }
        let end = end.min(w - 1);
        let mut regions = self.slice(0, start);
        regions.push(Region {
            size: end - start + 1,
            format,
        });
        regions.extend(self.slice(end + 1, w));
        self.regions = regions;
        self.normalize();
    }

    /// Insert `n` cells of `format` at `col`, then truncate back to the
    /// original width; the right-most runs fall off.
    pub(crate) fn insert(&mut self, col: usize, format: Format, n: usize) {
        let w = self.width();
        if n == 0 || col >= w {
            return;
        }
        let mut regions = self.slice(0, col);
        regions.push(Region { size: n, format });
        regions.extend(self.slice(col, w));
        self.regions = regions;
        self.truncate(w);
        self.normalize();
    }

    /// Delete `n` cells at `col`, extending the tail with default format so
    /// the width is preserved.
    pub(crate) fn delete(&mut self, col: usize, n: usize) {
        let w = self.width();
        if n == 0 || col >= w {
            return;
        }
        let n = n.min(w - col);
        let mut regions = self.slice(0, col);
        regions.extend(self.slice(col + n, w));
        regions.push(Region {
            size: n,
            format: Format::default(),
        });
        self.regions = regions;
        self.normalize();
    }

    /// Grow (with default-formatted cells) or shrink to `width`.
    pub(crate) fn resize(&mut self, width: usize) {
        let w = self.width();
        if width < w {
            self.truncate(width);
        } else if width > w {
            self.regions.push(Region {
                size: width - w,
                format: Format::default(),
            });
        }
        self.normalize();
    }

    /// Regions covering the half-open column range `[start, end)`.
    fn slice(&self, start: usize, end: usize) -> Vec<Region> {
        let mut out = Vec::new();
        let mut off = 0;
        for r in &self.regions {
            let lo = start.max(off);
            let hi = end.min(off + r.size);
            if lo < hi {
                out.push(Region {
                    size: hi - lo,
                    format: r.format,
                });
            }
            off += r.size;
        }
        out
    }

    /// Cut runs so the total size is at most `width`.
    fn truncate(&mut self, width: usize) {
        let mut off = 0;
        let mut keep = 0;
        for r in &mut self.regions {
            if off >= width {
                break;
            }
            r.size = r.size.min(width - off);
            off += r.size;
            keep += 1;
        }
        self.regions.truncate(keep);
    }

    /// Merge equal neighbours and drop empty runs.
    fn normalize(&mut self) {
        let mut out: Vec<Region> = Vec::with_capacity(self.regions.len());
        for r in self.regions.drain(..) {
            if r.size == 0 {
                continue;
            }
            match out.last_mut() {
                Some(last) if last.format == r.format => last.size += r.size,
                _ => out.push(r),
            }
        }
        self.regions = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Format {
        Format {
            fg: Color::Indexed(1),
            ..Format::default()
        }
    }

    fn bold() -> Format {
        Format {
            attrs: CellAttrs::BOLD,
            ..Format::default()
        }
    }

    #[test]
    fn new_row_is_one_default_region() {
        let row = FormatRow::new(80);
        assert_eq!(row.width(), 80);
        assert_eq!(row.regions().len(), 1);
        assert_eq!(row.format_at(0), Format::default());
        assert_eq!(row.format_at(79), Format::default());
    }

    #[test]
    fn zero_width_row() {
        let mut row = FormatRow::new(0);
        assert_eq!(row.width(), 0);
        row.paint(0, red());
        row.delete(0, 3);
        assert_eq!(row.width(), 0);
    }

    #[test]
    fn paint_splits_runs() {
        let mut row = FormatRow::new(10);
        row.paint(4, red());
        assert_eq!(row.width(), 10);
        assert_eq!(row.regions().len(), 3);
        assert_eq!(row.format_at(3), Format::default());
        assert_eq!(row.format_at(4), red());
        assert_eq!(row.format_at(5), Format::default());
    }

    #[test]
    fn paint_merges_equal_neighbours() {
        let mut row = FormatRow::new(10);
        row.paint(4, red());
        row.paint(5, red());
        row.paint(3, red());
        assert_eq!(row.regions().len(), 3);
        assert_eq!(row.regions()[1], Region { size: 3, format: red() });
        row.paint(4, Format::default());
        // split again: default, red, default, red, default
        assert_eq!(row.width(), 10);
        assert_eq!(row.format_at(3), red());
        assert_eq!(row.format_at(4), Format::default());
        assert_eq!(row.format_at(5), red());
    }

    #[test]
    fn range_paint_clamps_to_width() {
        let mut row = FormatRow::new(10);
        row.range_paint(6, 99, bold());
        assert_eq!(row.width(), 10);
        assert_eq!(row.format_at(5), Format::default());
        for col in 6..10 {
            assert_eq!(row.format_at(col), bold());
        }
    }

    #[test]
    fn insert_preserves_width() {
        let mut row = FormatRow::new(10);
        row.range_paint(7, 9, red());
        row.insert(2, bold(), 3);
        assert_eq!(row.width(), 10);
        assert_eq!(row.format_at(1), Format::default());
        for col in 2..5 {
            assert_eq!(row.format_at(col), bold());
        }
        // the old cols shifted right by three; the red tail fell off
        assert_eq!(row.format_at(9), Format::default());
        assert!(row.regions().iter().all(|r| r.format != red()));
    }

    #[test]
    fn insert_past_end_is_noop() {
        let mut row = FormatRow::new(5);
        let before = row.clone();
        row.insert(5, red(), 2);
        assert_eq!(row, before);
    }

    #[test]
    fn delete_extends_tail_with_default() {
        let mut row = FormatRow::filled(10, red());
        row.delete(4, 3);
        assert_eq!(row.width(), 10);
        assert_eq!(row.format_at(3), red());
        assert_eq!(row.format_at(6), red());
        assert_eq!(row.format_at(7), Format::default());
        assert_eq!(row.format_at(9), Format::default());
    }

    #[test]
    fn delete_clamps_count() {
        let mut row = FormatRow::filled(6, red());
        row.delete(4, 100);
        assert_eq!(row.width(), 6);
        assert_eq!(row.format_at(3), red());
        assert_eq!(row.format_at(4), Format::default());
    }

    #[test]
    fn resize_grows_with_default_tail() {
        let mut row = FormatRow::filled(4, red());
        row.resize(8);
        assert_eq!(row.width(), 8);
        assert_eq!(row.format_at(3), red());
        assert_eq!(row.format_at(4), Format::default());
        row.resize(2);
        assert_eq!(row.width(), 2);
        assert_eq!(row.format_at(1), red());
    }

    #[test]
    fn region_sizes_sum_to_width_after_edits() {
        let mut row = FormatRow::new(20);
        row.paint(0, red());
        row.range_paint(5, 12, bold());
        row.insert(3, red(), 4);
        row.delete(10, 6);
        row.paint(19, bold());
        assert_eq!(row.regions().iter().map(|r| r.size).sum::<usize>(), 20);
        assert!(row.regions().iter().all(|r| r.size > 0));
    }
}
