//! §4.7 TEXT rendering: the `Font`/`Canvas` capability traits the TEXT engine
//! is specified against, plus the row/caret/gutter painters built on top of
//! them. `Frame` (this crate's existing monochrome cell grid) is the
//! `Canvas` implementation; `CellFont` resolves widths through the same
//! Unicode width table `core-text::egc_width` uses, so layout and painting
//! never disagree on how many columns a character occupies.

use crate::{CellFlags, Frame};
use core_text::style::{StyleBuffer, StyleFlags, StyleTable};
use core_text::{Buffer, Row, Selection};

/// Character metrics a renderer needs to lay out text ("a `Font` capability:
/// character-width queries, ascent, fixed-pitch flag").
pub trait Font {
    fn char_width(&self, ch: char) -> u16;
    fn ascent(&self) -> u16;
    fn is_fixed_pitch(&self) -> bool;
}

/// A terminal-cell font: one row of text is one row of cells, and a
/// character's width is however many columns its grapheme cluster occupies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellFont;

impl Font for CellFont {
    fn char_width(&self, ch: char) -> u16 {
        let mut buf = [0u8; 4];
        core_text::egc_width(ch.encode_utf8(&mut buf))
    }
    fn ascent(&self) -> u16 {
        1
    }
    fn is_fixed_pitch(&self) -> bool {
        true
    }
}

/// Drawing surface a row/caret/gutter painter writes into ("a `Canvas`
/// capability: filled rectangles, clipped text drawing, foreground/
/// background colours"). `Frame` is reverse-video/monochrome, so colour is
/// represented as [`CellFlags`] rather than RGB pairs.
pub trait Canvas {
    fn width(&self) -> u16;
    fn height(&self) -> u16;
    fn draw_text(&mut self, x: u16, y: u16, cluster: &str, width: u16, flags: CellFlags);
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, flags: CellFlags);
    fn set_flags(&mut self, x: u16, y: u16, width: u16, flags: CellFlags);
    fn clear_flags(&mut self, x: u16, y: u16, width: u16, flags: CellFlags);
}

impl Canvas for Frame {
    fn width(&self) -> u16 {
        self.width
    }
    fn height(&self) -> u16 {
        self.height
    }
    fn draw_text(&mut self, x: u16, y: u16, cluster: &str, width: u16, flags: CellFlags) {
        self.set_cluster(x, y, cluster, width, flags);
    }
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, flags: CellFlags) {
        for dy in 0..h {
            for dx in 0..w {
                self.set_cluster(x + dx, y + dy, " ", 1, flags);
            }
        }
    }
    fn set_flags(&mut self, x: u16, y: u16, width: u16, flags: CellFlags) {
        self.apply_flags_span(x, y, width, flags);
    }
    fn clear_flags(&mut self, x: u16, y: u16, width: u16, flags: CellFlags) {
        self.clear_flags_span(x, y, width, flags);
    }
}

/// The inputs `styleOf` consults, in order: style-buffer byte, selection
/// membership, highlight membership, active-row flag, control-character
/// flag (§4.7).
pub struct StyleContext<'a> {
    pub styles: Option<&'a StyleBuffer>,
    pub style_table: &'a StyleTable,
    pub selection: Option<Selection>,
    pub highlight: Option<Selection>,
    pub active_row: Option<usize>,
}

/// Resolves the paint style for the byte at `pos` on display row `row`,
/// consulting the inputs in `ctx` in §4.7's order.
pub fn style_of(ctx: &StyleContext<'_>, pos: usize, row: usize, ch: char) -> CellFlags {
    let mut flags = CellFlags::empty();
    if let Some(styles) = ctx.styles {
        let idx = styles.style_at(pos);
        if let Some(entry) = ctx.style_table.get(idx) {
            if entry.flags.contains(StyleFlags::BOLD) {
                flags |= CellFlags::BOLD;
            }
            if entry.flags.contains(StyleFlags::UNDERLINE) {
                flags |= CellFlags::UNDERLINE;
            }
        }
    }
    if ctx.selection.is_some_and(|s| s.contains(pos)) {
        flags |= CellFlags::SELECTED;
    } else if ctx.highlight.is_some_and(|h| h.contains(pos)) {
        flags |= CellFlags::HIGHLIGHT;
    } else if ctx.active_row == Some(row) {
        flags |= CellFlags::ACTIVE_ROW;
    }
    if ch.is_control() {
        flags |= CellFlags::CONTROL;
    }
    flags
}

/// Paints one display row left to right, switching style whenever
/// `styleOf` changes ("horizontally clip-scan the row left to right").
/// `y`/`x_offset` place the row on `canvas`; `row_number` is the display row
/// index used for active-row/selection-row bookkeeping (not the same as `y`
/// once a gutter or viewport scroll offsets them).
pub fn draw_text_row(
    canvas: &mut impl Canvas,
    font: &impl Font,
    buffer: &Buffer,
    style_table: &StyleTable,
    row: Row,
    row_number: usize,
    y: u16,
    x_offset: u16,
    selection: Option<Selection>,
    highlight: Option<Selection>,
    active_row: Option<usize>,
) {
    let ctx = StyleContext {
        styles: buffer.styles(),
        style_table,
        selection,
        highlight,
        active_row,
    };
    let mut x = x_offset;
    let max_x = canvas.width();
    let mut pos = row.start;
    while pos < row.end && x < max_x {
        let ch = buffer.char_at(pos).unwrap_or(' ');
        if ch == '\n' {
            break;
        }
        let w = font.char_width(ch).max(1);
        let flags = style_of(&ctx, pos, row_number, ch);
        let cluster = ch.to_string();
        canvas.draw_text(x, y, &cluster, w, flags);
        x = x.saturating_add(w);
        pos = buffer.inc(pos);
    }
}

/// Caret rendering mode (§4.7): insert mode draws a thin bar between
/// columns; overstrike draws a block the width of the character under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretStyle {
    Insert,
    Overstrike,
}

impl CaretStyle {
    fn width(self, char_width: u16) -> u16 {
        match self {
            CaretStyle::Insert => 1,
            CaretStyle::Overstrike => char_width.max(1),
        }
    }
}

/// Paints the caret at `(x, y)`. Idempotent: painting an already-painted
/// caret is a no-op on cell content, only (re-)asserting the flag.
pub fn paint_caret(canvas: &mut impl Canvas, x: u16, y: u16, char_width: u16, style: CaretStyle) {
    canvas.set_flags(x, y, style.width(char_width), CellFlags::CURSOR | CellFlags::REVERSE);
}

/// Erases the caret at `(x, y)`, restoring the cell's prior text — only the
/// overlay flags are cleared, the drawn cluster is untouched.
pub fn erase_caret(canvas: &mut impl Canvas, x: u16, y: u16, char_width: u16, style: CaretStyle) {
    canvas.clear_flags(x, y, style.width(char_width), CellFlags::CURSOR | CellFlags::REVERSE);
}

/// Paints the line-number gutter when `barcolumns > 0`: a left-hand band of
/// that width, decimal `row+1` right-justified per visible row.
pub fn draw_gutter(canvas: &mut impl Canvas, barcolumns: u16, first_visible_row: usize, visible_rows: usize) {
    if barcolumns == 0 {
        return;
    }
    let width = barcolumns as usize;
    for i in 0..visible_rows {
        let number = first_visible_row + i + 1;
        let text = format!("{number:>width$}");
        for (col, ch) in text.chars().take(width).enumerate() {
            canvas.draw_text(col as u16, i as u16, &ch.to_string(), 1, CellFlags::empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::style::{StyleEntry, StyleTable};

    fn ascii_row(buffer: &Buffer) -> Row {
        Row { start: 0, end: buffer.len() }
    }

    #[test]
    fn cell_font_matches_core_text_widths() {
        let font = CellFont;
        assert_eq!(font.char_width('a'), 1);
        assert_eq!(font.char_width('文'), 2);
        assert!(font.is_fixed_pitch());
    }

    #[test]
    fn style_of_prioritizes_selection_over_highlight() {
        let table = StyleTable::new();
        let ctx = StyleContext {
            styles: None,
            style_table: &table,
            selection: Some(Selection::range(2, 5)),
            highlight: Some(Selection::range(0, 10)),
            active_row: None,
        };
        let flags = style_of(&ctx, 3, 0, 'x');
        assert!(flags.contains(CellFlags::SELECTED));
        assert!(!flags.contains(CellFlags::HIGHLIGHT));
    }

    #[test]
    fn style_of_falls_back_to_active_row_then_control_flag() {
        let table = StyleTable::new();
        let ctx = StyleContext {
            styles: None,
            style_table: &table,
            selection: None,
            highlight: None,
            active_row: Some(4),
        };
        let flags = style_of(&ctx, 0, 4, '\u{7}');
        assert!(flags.contains(CellFlags::ACTIVE_ROW));
        assert!(flags.contains(CellFlags::CONTROL));
    }

    #[test]
    fn style_of_reads_style_buffer_bold_flag() {
        let mut table = StyleTable::new();
        table.change_style(1, StyleEntry { flags: StyleFlags::BOLD, ..Default::default() });
        let mut buffer = Buffer::from_str("t", "hello").unwrap();
        buffer.enable_styles();
        // Directly mirror what a highlighter would do: tag byte 0 as style 1.
        buffer.replace(0, 1, b"h", Some(1));
        let styles = buffer.styles();
        let ctx = StyleContext {
            styles,
            style_table: &table,
            selection: None,
            highlight: None,
            active_row: None,
        };
        let flags = style_of(&ctx, 0, 0, 'h');
        assert!(flags.contains(CellFlags::BOLD));
    }

    #[test]
    fn draw_text_row_paints_every_character() {
        let buffer = Buffer::from_str("t", "abc").unwrap();
        let table = StyleTable::new();
        let font = CellFont;
        let mut frame = Frame::new(10, 1);
        draw_text_row(&mut frame, &font, &buffer, &table, ascii_row(&buffer), 0, 0, 0, None, None, None);
        assert_eq!(frame.line_clusters(0)[..3], ["a", "b", "c"]);
    }

    #[test]
    fn paint_and_erase_caret_round_trips() {
        let mut frame = Frame::new(5, 1);
        frame.set_cluster(2, 0, "x", 1, CellFlags::empty());
        paint_caret(&mut frame, 2, 0, 1, CaretStyle::Overstrike);
        let (cluster, _, flags, _) = frame.row_leaders(0).nth(2).unwrap();
        assert_eq!(cluster, "x");
        assert!(flags.contains(CellFlags::CURSOR));
        erase_caret(&mut frame, 2, 0, 1, CaretStyle::Overstrike);
        let (cluster, _, flags, _) = frame.row_leaders(0).nth(2).unwrap();
        assert_eq!(cluster, "x", "erase must not touch drawn content");
        assert!(!flags.contains(CellFlags::CURSOR));
    }

    #[test]
    fn gutter_right_justifies_row_numbers() {
        let mut frame = Frame::new(10, 3);
        draw_gutter(&mut frame, 3, 0, 3);
        assert_eq!(frame.line_clusters(0)[..3], [" ", " ", "1"]);
        assert_eq!(frame.line_clusters(1)[..3], [" ", " ", "2"]);
        assert_eq!(frame.line_clusters(2)[..3], [" ", " ", "3"]);
    }
}
