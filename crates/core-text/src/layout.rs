//! Display-row layout: wrapping a logical buffer into visible rows, and the
//! incrementally-maintained row index (§4.4).
//!
//! A "line" is `'\n'`-delimited; a "row" is whatever wrapping (no-wrap or
//! word-wrap) produces from a line. `Wrap::No` rows are exactly lines.
//! `Wrap::Word` rows break at the last whitespace before the target width,
//! falling back to a hard break after at least one column if no whitespace
//! is available.

use crate::buffer::Buffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    No,
    Word(usize),
}

/// One visible row: its linear byte span `[start, end)` in the buffer
/// (`end` exclusive of any consumed trailing whitespace that was eaten by
/// the wrap, inclusive of a trailing `'\n'` when the row ends a line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub start: usize,
    pub end: usize,
}

/// The incrementally-maintained `visrow[]` table from §4.4: row boundaries
/// for the whole buffer, recomputed only over the span an edit actually
/// touched rather than from scratch.
#[derive(Debug, Clone, Default)]
pub struct RowIndex {
    rows: Vec<Row>,
}

impl RowIndex {
    pub fn new() -> Self {
        RowIndex { rows: Vec::new() }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Full rebuild. `rebuild_range` below is the incremental counterpart
    /// used after an edit; this is the base case (empty index, or a caller
    /// that doesn't care about incrementality, e.g. initial load).
    pub fn rebuild(&mut self, buffer: &Buffer, wrap: Wrap) {
        self.rows = wrap_all(buffer, wrap);
    }

    /// Step 1-4 of §4.4's maintenance algorithm: re-measure only the rows
    /// whose text actually changed (`changed_start..changed_end_old`, now
    /// `changed_start..changed_end_new` post-edit), and shift every row
    /// after the change by the length delta rather than re-wrapping the
    /// whole buffer.
    ///
    /// `changed_start`/`changed_end_old` bound the edited region in the
    /// buffer's *old* coordinates (before the edit); `delta` is
    /// `new_len - old_len` for that region, already applied to `buffer`.
    pub fn rebuild_range(&mut self, buffer: &Buffer, wrap: Wrap, changed_start: usize, changed_end_old: usize, delta: i64) {
        if self.rows.is_empty() {
            self.rebuild(buffer, wrap);
            return;
        }
        let first_row = self.rows.iter().position(|r| r.end > changed_start).unwrap_or(self.rows.len());
        let last_row_old = self
            .rows
            .iter()
            .position(|r| r.start >= changed_end_old)
            .unwrap_or(self.rows.len());

        let rewrap_from = self.rows.get(first_row).map(|r| r.start).unwrap_or(changed_start);
        let rewrap_to_new = if last_row_old < self.rows.len() {
            (self.rows[last_row_old].start as i64 + delta).max(0) as usize
        } else {
            buffer.len()
        };

        let mut new_rows = wrap_span(buffer, wrap, rewrap_from, rewrap_to_new.max(rewrap_from));
        if new_rows.is_empty() {
            new_rows.push(Row { start: rewrap_from, end: rewrap_from });
        }

        let mut rebuilt = Vec::with_capacity(self.rows.len());
        rebuilt.extend_from_slice(&self.rows[..first_row]);
        rebuilt.extend(new_rows);
        for r in &self.rows[last_row_old..] {
            rebuilt.push(Row {
                start: (r.start as i64 + delta).max(0) as usize,
                end: (r.end as i64 + delta).max(0) as usize,
            });
        }
        self.rows = rebuilt;
    }

    pub fn row_from_pos(&self, pos: usize) -> usize {
        match self.rows.binary_search_by(|r| {
            if pos < r.start {
                std::cmp::Ordering::Greater
            } else if pos >= r.end && r.end != r.start {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        }) {
            Ok(i) => i,
            Err(i) => i.min(self.rows.len().saturating_sub(1)),
        }
    }

    pub fn pos_from_row(&self, row: usize) -> usize {
        self.rows.get(row).map(|r| r.start).unwrap_or(0)
    }
}

fn wrap_all(buffer: &Buffer, wrap: Wrap) -> Vec<Row> {
    wrap_span(buffer, wrap, 0, buffer.len())
}

/// Wraps the span `[from, to)`. The caller guarantees `from` is the start of
/// a row (a buffer position that begins a line, in `Wrap::No` mode, or any
/// position in `Wrap::Word` mode since word-wrap rows don't need to align to
/// line starts when re-wrapping a sub-span).
fn wrap_span(buffer: &Buffer, wrap: Wrap, from: usize, to: usize) -> Vec<Row> {
    match wrap {
        Wrap::No => wrap_no(buffer, from, to),
        Wrap::Word(width) => wrap_word(buffer, from, to, width),
    }
}

fn wrap_no(buffer: &Buffer, from: usize, to: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut start = from;
    let mut pos = from;
    while pos < to {
        if buffer.byte_at(pos) == Some(b'\n') {
            rows.push(Row { start, end: pos + 1 });
            start = pos + 1;
        }
        pos += 1;
    }
    if start <= to {
        rows.push(Row { start, end: to });
    }
    rows
}

/// Breaks at the last whitespace before `width` columns; if none exists,
/// breaks after at least one column has been consumed (never produces a
/// zero-width row, so pathological single very-long-word lines still make
/// progress).
fn wrap_word(buffer: &Buffer, from: usize, to: usize, width: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut line_start = from;
    loop {
        if line_start >= to {
            break;
        }
        let mut line_end = line_start;
        while line_end < to && buffer.byte_at(line_end) != Some(b'\n') {
            line_end += 1;
        }
        let has_newline = line_end < to;
        let row_end_of_line = if has_newline { line_end + 1 } else { line_end };

        let mut pos = line_start;
        while pos < line_end {
            let mut col = 0usize;
            let mut cursor = pos;
            let mut last_space: Option<usize> = None;
            while cursor < line_end && col < width {
                let b = buffer.byte_at(cursor).unwrap_or(b' ');
                if b == b' ' || b == b'\t' {
                    last_space = Some(cursor);
                }
                col += 1;
                cursor += 1;
            }
            if cursor >= line_end && col < width {
                // Remainder of the line fits within width unbroken — the
                // scan ran out of line, not out of width budget.
                rows.push(Row { start: pos, end: row_end_of_line });
                pos = row_end_of_line;
                break;
            }
            let break_at = match last_space {
                Some(s) if s > pos => s + 1,
                // No whitespace in the window: hard-break one column short
                // of the width budget so the next row still starts with
                // unconsumed text instead of landing exactly on the line end.
                _ => (pos + width.max(1) - 1).max(pos + 1),
            };
            rows.push(Row { start: pos, end: break_at });
            pos = break_at;
        }
        if pos == line_start {
            rows.push(Row { start: line_start, end: row_end_of_line });
        }
        line_start = row_end_of_line;
    }
    if rows.is_empty() {
        rows.push(Row { start: from, end: to });
    }
    rows
}

/// Expands tabs to spaces at `tabcols`-column stops, for rectangular block
/// operations (§4.5 step 1/2: "extract+detab region, detab replacement").
pub fn detab(text: &str, tabcols: usize) -> String {
    let tabcols = tabcols.max(1);
    let mut out = String::with_capacity(text.len());
    for line in text.split('\n') {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut col = 0;
        for c in line.chars() {
            if c == '\t' {
                let spaces = tabcols - (col % tabcols);
                out.extend(std::iter::repeat_n(' ', spaces));
                col += spaces;
            } else {
                out.push(c);
                col += 1;
            }
        }
    }
    out
}

/// The inverse of [`detab`]: collapses runs of spaces that land exactly on
/// tab stops back into `'\t'` characters (§4.5 step 5, "optionally entab").
pub fn entab(text: &str, tabcols: usize) -> String {
    let tabcols = tabcols.max(1);
    let mut out = String::with_capacity(text.len());
    for line in text.split('\n') {
        if !out.is_empty() {
            out.push('\n');
        }
        let mut col = 0;
        let mut pending_spaces = 0usize;
        for c in line.chars() {
            if c == ' ' {
                pending_spaces += 1;
                col += 1;
                if col % tabcols == 0 && pending_spaces >= tabcols {
                    out.push('\t');
                    pending_spaces = 0;
                }
            } else {
                out.extend(std::iter::repeat_n(' ', pending_spaces));
                pending_spaces = 0;
                out.push(c);
                col += 1;
            }
        }
        out.extend(std::iter::repeat_n(' ', pending_spaces));
    }
    out
}

/// Logical column count of `line` up to `byte`, expanding tabs to
/// `tabcols`-column stops (a supplemented feature from `original_source/`,
/// `countCols`/column arithmetic per §4.4).
pub fn count_cols(line: &str, byte: usize, tabcols: usize) -> usize {
    let tabcols = tabcols.max(1);
    let mut col = 0;
    for (idx, c) in line.char_indices() {
        if idx >= byte {
            break;
        }
        if c == '\t' {
            col += tabcols - (col % tabcols);
        } else {
            col += 1;
        }
    }
    col
}

/// Byte offset of the first non-blank character on `line` (a supplemented
/// feature, `indentOfLine`), or the line's length if it's all whitespace.
pub fn indent_of_line(line: &str) -> usize {
    line.char_indices()
        .find(|(_, c)| *c != ' ' && *c != '\t')
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Finds the position in `buffer` of the character matching the bracket at
/// `pos`, scanning forward or backward and tracking nesting depth. A
/// supplemented feature (`findMatching`) used for bracket-jump navigation.
pub fn find_matching(buffer: &Buffer, pos: usize) -> Option<usize> {
    const PAIRS: &[(u8, u8)] = &[(b'(', b')'), (b'[', b']'), (b'{', b'}')];
    let here = buffer.byte_at(pos)?;
    if let Some(&(open, close)) = PAIRS.iter().find(|(o, c)| *o == here || *c == here) {
        let forward = here == open;
        let mut depth = 0i32;
        if forward {
            let mut p = pos;
            loop {
                if let Some(b) = buffer.byte_at(p) {
                    if b == open {
                        depth += 1;
                    } else if b == close {
                        depth -= 1;
                        if depth == 0 {
                            return Some(p);
                        }
                    }
                }
                if p + 1 >= buffer.len() {
                    return None;
                }
                p += 1;
            }
        } else {
            let mut p = pos;
            loop {
                if let Some(b) = buffer.byte_at(p) {
                    if b == close {
                        depth += 1;
                    } else if b == open {
                        depth -= 1;
                        if depth == 0 {
                            return Some(p);
                        }
                    }
                }
                if p == 0 {
                    return None;
                }
                p -= 1;
            }
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_wrap_rows_match_lines() {
        let buffer = Buffer::from_str("t", "ab\ncd\nef").unwrap();
        let mut idx = RowIndex::new();
        idx.rebuild(&buffer, Wrap::No);
        assert_eq!(idx.nrows(), 3);
        assert_eq!(idx.rows()[0], Row { start: 0, end: 3 });
        assert_eq!(idx.rows()[2], Row { start: 6, end: 8 });
    }

    #[test]
    fn word_wrap_breaks_at_whitespace() {
        let buffer = Buffer::from_str("t", "the quick brown fox").unwrap();
        let mut idx = RowIndex::new();
        idx.rebuild(&buffer, Wrap::Word(10));
        assert!(idx.nrows() >= 2);
        for row in idx.rows() {
            let text = buffer.extract_text(row.start, row.end);
            assert!(text.chars().filter(|c| !c.is_whitespace()).count() > 0 || row.start == row.end);
        }
    }

    #[test]
    fn word_wrap_hard_breaks_long_run_with_no_whitespace() {
        let buffer = Buffer::from_str("t", "aa bbb ccccc").unwrap();
        let mut idx = RowIndex::new();
        idx.rebuild(&buffer, Wrap::Word(5));
        let texts: Vec<String> = idx
            .rows()
            .iter()
            .map(|r| buffer.extract_text(r.start, r.end))
            .collect();
        assert_eq!(texts, vec!["aa ", "bbb ", "cccc", "c"]);
    }

    #[test]
    fn row_from_pos_finds_containing_row() {
        let buffer = Buffer::from_str("t", "ab\ncd\nef").unwrap();
        let mut idx = RowIndex::new();
        idx.rebuild(&buffer, Wrap::No);
        assert_eq!(idx.row_from_pos(0), 0);
        assert_eq!(idx.row_from_pos(4), 1);
        assert_eq!(idx.row_from_pos(7), 2);
    }

    #[test]
    fn detab_and_entab_round_trip_on_tab_stops() {
        let original = "a\tb\tc";
        let detabbed = detab(original, 4);
        assert_eq!(detabbed, "a   b   c");
        let entabbed = entab(&detabbed, 4);
        assert_eq!(entabbed, original);
    }

    #[test]
    fn find_matching_bracket_forward_and_backward() {
        let buffer = Buffer::from_str("t", "a(b(c)d)e").unwrap();
        assert_eq!(find_matching(&buffer, 1), Some(7));
        assert_eq!(find_matching(&buffer, 7), Some(1));
        assert_eq!(find_matching(&buffer, 3), Some(5));
    }

    #[test]
    fn indent_of_line_finds_first_non_blank() {
        assert_eq!(indent_of_line("   foo"), 3);
        assert_eq!(indent_of_line("foo"), 0);
        assert_eq!(indent_of_line("   "), 3);
    }
}
