//! Gap-buffer-backed text engine: storage, layout/wrapping, selection, and
//! styling, independent of any particular terminal or rendering backend.
//!
//! [`Buffer`] is the primary type: a gap buffer (§4.3) underneath a line-
//! oriented navigation convenience that the rest of the editor stack
//! (`motion`, `core-model`, `core-actions`) depends on, plus the spec's true
//! linear byte-position API for layout, selection, and search to build on.

pub mod buffer;
pub mod layout;
pub mod motion;
pub mod search;
pub mod segment;
pub mod selection;
pub mod style;
pub mod width;
#[cfg(feature = "term-probe")]
pub mod width_probe;

pub use buffer::{Buffer, Position};
pub use layout::{Row, RowIndex, Wrap};
pub use search::{find_text, FindFlags};
pub use selection::{Granularity, Selection};
pub use style::{Color, StyleEntry, StyleFlags, StyleTable};
pub use width::egc_width;

/// Grapheme and width utilities. Pure helpers operating on a single line.
pub mod grapheme {
    use crate::egc_width;
    use unicode_segmentation::UnicodeSegmentation;

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Compute visual column (terminal cells) up to (but not including) byte offset.
    pub fn visual_col(line: &str, byte: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += egc_width(g) as usize;
        }
        col
    }

    /// Width in terminal cells of this grapheme cluster.
    pub fn cluster_width(g: &str) -> usize {
        egc_width(g) as usize
    }

    /// Naive word classification: alphanumeric or underscore start.
    pub fn is_word(g: &str) -> bool {
        g.chars()
            .next()
            .map(|c| c == '_' || c.is_alphanumeric())
            .unwrap_or(false)
    }
}
