//! The style table and the parallel style buffer that rides alongside the
//! gap buffer (§3.2/§4.7: "style buffer: optional parallel byte array...
//! opaque style index per byte").
//!
//! A byte's style index is opaque to [`crate::buffer::Buffer`] — it only
//! ever plumbs the index through `replace`/`insert`; resolving an index to
//! paint attributes is the renderer's job via [`StyleTable::resolve`].

/// A single RGB colour. Deliberately minimal: `core-text` has no terminal or
/// rendering dependency of its own, so this isn't tied to any particular
/// backend's colour type — `core-render` converts it to whatever its `Font`/
/// `Canvas` traits expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

bitflags::bitflags! {
    /// Per-style flag set, matching the original `FXHiliteStyle` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 1 << 0;
        const UNDERLINE = 1 << 1;
        const STRIKEOUT = 1 << 2;
        const CONTROL   = 1 << 3;
    }
}

/// One entry in the highlight style table: seven colours (normal/selected/
/// highlighted foreground+background, plus an active-row background) and a
/// flag set. The spec's own prose rounds this to "five colours" but the
/// underlying struct it's grounded on (`FXHiliteStyle`) carries all seven.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleEntry {
    pub normal_fg: Color,
    pub normal_bg: Color,
    pub select_fg: Color,
    pub select_bg: Color,
    pub hilite_fg: Color,
    pub hilite_bg: Color,
    pub active_bg: Color,
    pub flags: StyleFlags,
}

/// The table styles are looked up in. Index 0 is reserved for "no style"
/// (plain text); `setHiliteStyles` (§6.2) replaces the table wholesale.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    entries: Vec<StyleEntry>,
}

impl StyleTable {
    pub fn new() -> Self {
        StyleTable { entries: vec![StyleEntry::default()] }
    }

    pub fn set_styles(&mut self, entries: Vec<StyleEntry>) {
        self.entries = entries;
    }

    pub fn get(&self, index: u16) -> Option<&StyleEntry> {
        self.entries.get(index as usize)
    }

    pub fn change_style(&mut self, index: u16, entry: StyleEntry) {
        let idx = index as usize;
        if idx >= self.entries.len() {
            self.entries.resize(idx + 1, StyleEntry::default());
        }
        self.entries[idx] = entry;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The parallel per-byte style index array, kept the same logical length as
/// the text buffer and edited in lockstep with it.
#[derive(Clone)]
pub struct StyleBuffer {
    indices: Vec<u16>,
}

impl StyleBuffer {
    pub fn new(initial_len: usize) -> Self {
        StyleBuffer { indices: vec![0; initial_len] }
    }

    pub fn style_at(&self, pos: usize) -> u16 {
        self.indices.get(pos).copied().unwrap_or(0)
    }

    pub fn set_range(&mut self, start: usize, end: usize, style: u16) {
        let end = end.min(self.indices.len());
        for s in self.indices[start.min(end)..end].iter_mut() {
            *s = style;
        }
    }

    /// Mirrors a `replace(pos, ndel, ..., nins)` edit on the text buffer:
    /// removes `ndel` style slots at `pos` and inserts `nins` slots carrying
    /// `style`, so the style buffer never drifts out of lockstep with the
    /// text it annotates.
    pub fn replace(&mut self, pos: usize, ndel: usize, nins: usize, style: u16) {
        let pos = pos.min(self.indices.len());
        let ndel = ndel.min(self.indices.len() - pos);
        self.indices.splice(pos..pos + ndel, std::iter::repeat_n(style, nins));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_buffer_tracks_replace_edits() {
        let mut sb = StyleBuffer::new(5);
        sb.set_range(0, 5, 1);
        sb.replace(2, 1, 3, 2);
        assert_eq!(sb.style_at(0), 1);
        assert_eq!(sb.style_at(2), 2);
        assert_eq!(sb.style_at(4), 2);
        assert_eq!(sb.style_at(6), 1);
    }

    #[test]
    fn style_table_falls_back_to_none_for_unknown_index() {
        let table = StyleTable::new();
        assert!(table.get(5).is_none());
    }

    #[test]
    fn change_style_grows_table() {
        let mut table = StyleTable::new();
        table.change_style(3, StyleEntry { flags: StyleFlags::BOLD, ..Default::default() });
        assert_eq!(table.len(), 4);
        assert!(table.get(3).unwrap().flags.contains(StyleFlags::BOLD));
    }
}
