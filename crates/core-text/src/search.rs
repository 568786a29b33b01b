//! `findText` (§6.2): regex or verbatim search over a [`Buffer`], built on
//! `core_rex`. The buffer itself stays regex-agnostic — this module is the
//! only place `core-text` reaches for `core_rex`.

use core_rex::{Error, Mode, Program};

use crate::buffer::Buffer;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FindFlags: u8 {
        const IGNORE_CASE = 1 << 0;
        const VERBATIM    = 1 << 1;
        const BACKWARD    = 1 << 2;
        const WRAP        = 1 << 3;
    }
}

/// Searches `buffer` for `pattern` starting at `start`, honouring
/// `flags`. Returns the matched `[begin, end)` span. With `WRAP` set, a
/// failed search in the requested direction retries from the opposite end
/// of the buffer once.
pub fn find_text(buffer: &Buffer, pattern: &str, start: usize, flags: FindFlags) -> Result<Option<(usize, usize)>, Error> {
    let mut mode = Mode::CAPTURE;
    if flags.contains(FindFlags::IGNORE_CASE) {
        mode |= Mode::IGNORE_CASE;
    }
    if flags.contains(FindFlags::VERBATIM) {
        mode |= Mode::VERBATIM;
    }
    if flags.contains(FindFlags::BACKWARD) {
        mode |= Mode::REVERSE;
    }

    let program = Program::compile(pattern, mode)?;
    let subject = buffer.get_text();
    let backward = flags.contains(FindFlags::BACKWARD);

    let first = if backward {
        program.search(&subject, start, 0, mode)
    } else {
        program.search(&subject, start, subject.len(), mode)
    };
    if let Some(caps) = first {
        return Ok(caps[0]);
    }
    if flags.contains(FindFlags::WRAP) {
        let wrapped = if backward {
            program.search(&subject, subject.len(), start, mode)
        } else {
            program.search(&subject, 0, start, mode)
        };
        return Ok(wrapped.and_then(|caps| caps[0]));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_forward_match() {
        let buffer = Buffer::from_str("t", "alpha beta gamma").unwrap();
        let found = find_text(&buffer, "beta", 0, FindFlags::empty()).unwrap();
        assert_eq!(found, Some((6, 10)));
    }

    #[test]
    fn finds_backward_match() {
        let buffer = Buffer::from_str("t", "cat dog cat").unwrap();
        let found = find_text(&buffer, "cat", buffer.len(), FindFlags::BACKWARD).unwrap();
        assert_eq!(found, Some((8, 11)));
    }

    #[test]
    fn wrap_retries_from_the_other_end() {
        let buffer = Buffer::from_str("t", "needle haystack").unwrap();
        let found = find_text(&buffer, "needle", 7, FindFlags::WRAP).unwrap();
        assert_eq!(found, Some((0, 6)));
        let not_wrapped = find_text(&buffer, "needle", 7, FindFlags::empty()).unwrap();
        assert_eq!(not_wrapped, None);
    }

    #[test]
    fn verbatim_mode_treats_pattern_literally() {
        let buffer = Buffer::from_str("t", "a.b a+b").unwrap();
        let found = find_text(&buffer, "a+b", 0, FindFlags::VERBATIM).unwrap();
        assert_eq!(found, Some((4, 7)));
    }
}
