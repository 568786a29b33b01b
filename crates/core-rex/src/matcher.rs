//! The backtracking interpreter.
//!
//! Both plain backtracking matches and the committed sub-matches needed by
//! atomic groups, possessive quantifiers, and lookaround are served by one
//! function, [`Matcher::run`], parameterized over a `stop` program counter:
//! reaching `stop` is treated as immediate success. Top-level matches pass
//! `usize::MAX` as `stop` (never equal to a real instruction index) and rely
//! on the compiled program always ending in [`Inst::Pass`].
//!
//! Each call to `run` is one backtracking choice point; a counter enforces
//! [`MAX_RECURSION`] so a pathological pattern fails a match rather than
//! blowing the native stack.

use crate::mode::Mode;
use crate::opcode::{AsciiClass, Inst, NlPolicy, Polarity, UnicodeClass, MAX_RECURSION, NSUBEXP};

/// Capture slots, indexed by group number. Slot 0 is the whole match and is
/// filled in by the driver functions below, not by any `SubBeg`/`SubEnd`
/// instruction (those only ever target slots 1..NSUBEXP).
pub type Captures = [Option<(usize, usize)>; NSUBEXP];

pub fn empty_captures() -> Captures {
    [None; NSUBEXP]
}

struct Matcher<'a> {
    subject: &'a str,
    mode: Mode,
    match_start: usize,
    depth: u32,
    caps: Captures,
    counters: [u16; NSUBEXP],
}

impl<'a> Matcher<'a> {
    fn byte(&self, pos: usize) -> Option<u8> {
        self.subject.as_bytes().get(pos).copied()
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.subject[pos..].chars().next()
    }

    fn run(&mut self, pc: usize, pos: usize, stop: usize, prog: &[Inst]) -> Option<usize> {
        if pc == stop {
            return Some(pos);
        }
        self.depth += 1;
        let result = if self.depth > MAX_RECURSION {
            None
        } else {
            self.dispatch(pc, pos, stop, prog)
        };
        self.depth -= 1;
        result
    }

    fn dispatch(&mut self, pc: usize, pos: usize, stop: usize, prog: &[Inst]) -> Option<usize> {
        match &prog[pc] {
            Inst::Fail => None,
            Inst::Pass => Some(pos),

            Inst::Jump(t) => self.run(*t, pos, stop, prog),
            Inst::Branch(t) => self
                .run(pc + 1, pos, stop, prog)
                .or_else(|| self.run(*t, pos, stop, prog)),
            Inst::BranchRev(t) => self
                .run(*t, pos, stop, prog)
                .or_else(|| self.run(pc + 1, pos, stop, prog)),

            Inst::Atomic(end) => match self.run(pc + 1, pos, *end, prog) {
                Some(p2) => self.run(*end, p2, stop, prog),
                None => None,
            },
            Inst::If(end) => {
                let p2 = self.run(pc + 1, pos, *end, prog).unwrap_or(pos);
                self.run(*end, p2, stop, prog)
            }
            Inst::While(end) => {
                let cur = self.commit_loop(pc, pos, *end, prog, 0, u16::MAX);
                self.run(*end, cur, stop, prog)
            }
            Inst::Until(end) => {
                let start_pos = pos;
                let cur = self.commit_loop(pc, pos, *end, prog, 1, u16::MAX);
                if cur == start_pos {
                    None
                } else {
                    self.run(*end, cur, stop, prog)
                }
            }
            Inst::For { min, max, end } => {
                let mut n = 0u16;
                let mut cur = pos;
                while n < *max {
                    match self.run(pc + 1, cur, *end, prog) {
                        Some(p2) if p2 > cur => {
                            cur = p2;
                            n += 1;
                        }
                        Some(p2) => {
                            cur = p2;
                            n += 1;
                            break;
                        }
                        None => break,
                    }
                }
                if n < *min {
                    None
                } else {
                    self.run(*end, cur, stop, prog)
                }
            }

            Inst::NotEmpty => {
                if pos == self.match_start {
                    None
                } else {
                    self.run(pc + 1, pos, stop, prog)
                }
            }
            Inst::StrBeg => {
                if pos == 0 {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::StrEnd => {
                if pos == self.subject.len() {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::LineBeg => {
                let at_begin = (pos == 0 && !self.mode.contains(Mode::NOT_BOL))
                    || (pos > 0 && self.byte(pos - 1) == Some(b'\n'));
                if at_begin {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::LineEnd => {
                let at_end = (pos == self.subject.len() && !self.mode.contains(Mode::NOT_EOL))
                    || self.byte(pos) == Some(b'\n');
                if at_end {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }

            Inst::WordBeg => {
                if !self.is_word_byte_before(pos) && self.is_word_byte_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::WordEnd => {
                if self.is_word_byte_before(pos) && !self.is_word_byte_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::WordBnd => {
                if self.is_word_byte_before(pos) != self.is_word_byte_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::WordInt => {
                if self.is_word_byte_before(pos) == self.is_word_byte_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::UWordBeg => {
                if !self.is_word_char_before(pos) && self.is_word_char_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::UWordEnd => {
                if self.is_word_char_before(pos) && !self.is_word_char_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::UWordBnd => {
                if self.is_word_char_before(pos) != self.is_word_char_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }
            Inst::UWordInt => {
                if self.is_word_char_before(pos) == self.is_word_char_at(pos) {
                    self.run(pc + 1, pos, stop, prog)
                } else {
                    None
                }
            }

            Inst::Chars(bytes) => self.match_byte_run(pos, bytes, false).and_then(|p2| self.run(pc + 1, p2, stop, prog)),
            Inst::CharsCi(bytes) => self.match_byte_run(pos, bytes, true).and_then(|p2| self.run(pc + 1, p2, stop, prog)),
            Inst::UChars(chars) => self.match_char_run(pos, chars, false).and_then(|p2| self.run(pc + 1, p2, stop, prog)),
            Inst::UCharsCi(chars) => self.match_char_run(pos, chars, true).and_then(|p2| self.run(pc + 1, p2, stop, prog)),

            Inst::Any => match self.byte(pos) {
                Some(b) if b != b'\n' => self.run(pc + 1, pos + 1, stop, prog),
                _ => None,
            },
            Inst::AnyNl => match self.byte(pos) {
                Some(_) => self.run(pc + 1, pos + 1, stop, prog),
                None => None,
            },
            Inst::In(set) => match self.byte(pos) {
                Some(b) if set.test(b) => self.run(pc + 1, pos + 1, stop, prog),
                _ => None,
            },
            Inst::NotIn(set) => match self.byte(pos) {
                Some(b) if !set.test(b) => self.run(pc + 1, pos + 1, stop, prog),
                _ => None,
            },
            Inst::AnyOf(list) => match self.byte(pos) {
                Some(b) if list.contains(&b) => self.run(pc + 1, pos + 1, stop, prog),
                _ => None,
            },
            Inst::AnyBut(list) => match self.byte(pos) {
                Some(b) if !list.contains(&b) => self.run(pc + 1, pos + 1, stop, prog),
                _ => None,
            },
            Inst::AsciiPred(class, negated, nl) => match self.byte(pos) {
                Some(b) => {
                    let mut ok = class.matches(b) != *negated;
                    if *negated && *nl == NlPolicy::ExcludeNewline && b == b'\n' {
                        ok = false;
                    }
                    if ok {
                        self.run(pc + 1, pos + 1, stop, prog)
                    } else {
                        None
                    }
                }
                None => None,
            },
            Inst::Char(b) => match self.byte(pos) {
                Some(x) if x == *b => self.run(pc + 1, pos + 1, stop, prog),
                _ => None,
            },
            Inst::CharCi(b) => match self.byte(pos) {
                Some(x) if x.to_ascii_lowercase() == *b => self.run(pc + 1, pos + 1, stop, prog),
                _ => None,
            },

            Inst::UAny => match self.char_at(pos) {
                Some(c) if c != '\n' => self.run(pc + 1, pos + c.len_utf8(), stop, prog),
                _ => None,
            },
            Inst::UAnyNl => match self.char_at(pos) {
                Some(c) => self.run(pc + 1, pos + c.len_utf8(), stop, prog),
                None => None,
            },
            Inst::UIn(ranges) => match self.char_at(pos) {
                Some(c) if ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi) => {
                    self.run(pc + 1, pos + c.len_utf8(), stop, prog)
                }
                _ => None,
            },
            Inst::UNotIn(ranges) => match self.char_at(pos) {
                Some(c) if !ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi) => {
                    self.run(pc + 1, pos + c.len_utf8(), stop, prog)
                }
                _ => None,
            },
            Inst::UnicodePred(class, negated, nl) => match self.char_at(pos) {
                Some(c) => {
                    let mut ok = class.matches(c) != *negated;
                    if *negated && *nl == NlPolicy::ExcludeNewline && c == '\n' {
                        ok = false;
                    }
                    if ok {
                        self.run(pc + 1, pos + c.len_utf8(), stop, prog)
                    } else {
                        None
                    }
                }
                None => None,
            },
            Inst::UChar(c) => match self.char_at(pos) {
                Some(x) if x == *c => self.run(pc + 1, pos + x.len_utf8(), stop, prog),
                _ => None,
            },
            Inst::UCharCi(c) => match self.char_at(pos) {
                Some(x) if chars_eq_ci(x, *c) => self.run(pc + 1, pos + x.len_utf8(), stop, prog),
                _ => None,
            },

            Inst::Lookaround { polarity, behind, end } => {
                let satisfied = if *behind {
                    self.lookbehind_satisfied(pc, pos, *end, prog)
                } else {
                    self.run(pc + 1, pos, *end, prog).is_some()
                };
                let ok = match polarity {
                    Polarity::Positive => satisfied,
                    Polarity::Negative => !satisfied,
                };
                if ok {
                    self.run(*end, pos, stop, prog)
                } else {
                    None
                }
            }

            Inst::SubBeg(idx) => {
                let old = self.caps[*idx as usize];
                self.caps[*idx as usize] = Some((pos, pos));
                let r = self.run(pc + 1, pos, stop, prog);
                if r.is_none() {
                    self.caps[*idx as usize] = old;
                }
                r
            }
            Inst::SubEnd(idx) => {
                let old = self.caps[*idx as usize];
                let start = old.map(|(s, _)| s).unwrap_or(pos);
                self.caps[*idx as usize] = Some((start, pos));
                let r = self.run(pc + 1, pos, stop, prog);
                if r.is_none() {
                    self.caps[*idx as usize] = old;
                }
                r
            }
            Inst::Ref(idx) => self.match_backref(pc, pos, stop, *idx, false, prog),
            Inst::RefCi(idx) => self.match_backref(pc, pos, stop, *idx, true, prog),

            Inst::Zero(idx) => {
                self.counters[*idx as usize] = 0;
                self.run(pc + 1, pos, stop, prog)
            }
            Inst::Incr(idx) => {
                self.counters[*idx as usize] = self.counters[*idx as usize].saturating_add(1);
                self.run(pc + 1, pos, stop, prog)
            }
            // Never emitted by the compiler (counted repeats are unrolled at
            // compile time); kept only so the opcode catalog is complete.
            Inst::JumpLt(_, t) | Inst::JumpGt(_, t) => self.run(*t, pos, stop, prog),
        }
    }

    fn commit_loop(&mut self, pc: usize, pos: usize, end: usize, prog: &[Inst], _min: u16, max: u16) -> usize {
        let mut cur = pos;
        let mut n = 0u16;
        loop {
            if n >= max {
                break;
            }
            match self.run(pc + 1, cur, end, prog) {
                Some(p2) if p2 > cur => {
                    cur = p2;
                    n += 1;
                }
                _ => break,
            }
        }
        cur
    }

    fn match_backref(&mut self, pc: usize, pos: usize, stop: usize, idx: u8, ci: bool, prog: &[Inst]) -> Option<usize> {
        match self.caps[idx as usize] {
            None => self.run(pc + 1, pos, stop, prog),
            Some((s, e)) => {
                let needle = &self.subject[s..e];
                let end = pos + needle.len();
                if end > self.subject.len() {
                    return None;
                }
                let hay = &self.subject[pos..end];
                let matches = if ci {
                    hay.eq_ignore_ascii_case(needle)
                } else {
                    hay == needle
                };
                if matches {
                    self.run(pc + 1, end, stop, prog)
                } else {
                    None
                }
            }
        }
    }

    fn lookbehind_satisfied(&mut self, pc: usize, pos: usize, end: usize, prog: &[Inst]) -> bool {
        let mut start = pos;
        loop {
            if self.run(pc + 1, start, end, prog) == Some(pos) {
                return true;
            }
            if start == 0 {
                return false;
            }
            start -= 1;
            while start > 0 && !self.subject.is_char_boundary(start) {
                start -= 1;
            }
        }
    }

    fn match_byte_run(&self, pos: usize, bytes: &[u8], ci: bool) -> Option<usize> {
        let end = pos + bytes.len();
        let hay = self.subject.as_bytes().get(pos..end)?;
        let matches = if ci {
            hay.eq_ignore_ascii_case(bytes)
        } else {
            hay == bytes
        };
        matches.then_some(end)
    }

    fn match_char_run(&self, pos: usize, chars: &[char], ci: bool) -> Option<usize> {
        let mut cur = pos;
        for &want in chars {
            let got = self.char_at(cur)?;
            let ok = if ci { chars_eq_ci(got, want) } else { got == want };
            if !ok {
                return None;
            }
            cur += got.len_utf8();
        }
        Some(cur)
    }

    fn is_word_byte_at(&self, pos: usize) -> bool {
        self.byte(pos).is_some_and(|b| AsciiClass::Word.matches(b))
    }
    fn is_word_byte_before(&self, pos: usize) -> bool {
        pos > 0 && self.byte(pos - 1).is_some_and(|b| AsciiClass::Word.matches(b))
    }
    fn is_word_char_at(&self, pos: usize) -> bool {
        self.char_at(pos).is_some_and(|c| UnicodeClass::Word.matches(c))
    }
    fn is_word_char_before(&self, pos: usize) -> bool {
        if pos == 0 {
            return false;
        }
        let mut p = pos - 1;
        while p > 0 && !self.subject.is_char_boundary(p) {
            p -= 1;
        }
        self.char_at(p).is_some_and(|c| UnicodeClass::Word.matches(c))
    }
}

fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Attempts an anchored match at `pos` only. `mode` here is consulted only
/// for `NOT_BOL`/`NOT_EOL`; every other flag was already baked into the
/// compiled program.
pub fn amatch(prog: &[Inst], subject: &str, pos: usize, mode: Mode) -> Option<Captures> {
    let mut m = Matcher {
        subject,
        mode,
        match_start: pos,
        depth: 0,
        caps: empty_captures(),
        counters: [0; NSUBEXP],
    };
    let end = m.run(0, pos, usize::MAX, prog)?;
    let mut caps = m.caps;
    caps[0] = Some((pos, end));
    Some(caps)
}

/// Scans for the first match between `from` and `to`. When `from <= to` this
/// walks forward (leftmost match wins); when `from > to` it walks backward,
/// which combined with forward `amatch` at each trial position implements
/// reverse search without needing a byte-reversed program.
pub fn search(prog: &[Inst], subject: &str, from: usize, to: usize, mode: Mode) -> Option<Captures> {
    if from <= to {
        let mut pos = from;
        loop {
            if let Some(caps) = amatch(prog, subject, pos, mode) {
                return Some(caps);
            }
            if pos >= to {
                return None;
            }
            pos = next_char_boundary(subject, pos);
        }
    } else {
        let mut pos = from;
        loop {
            if let Some(caps) = amatch(prog, subject, pos, mode) {
                return Some(caps);
            }
            if pos <= to {
                return None;
            }
            pos = prev_char_boundary(subject, pos);
        }
    }
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos + 1;
    while p < s.len() && !s.is_char_boundary(p) {
        p += 1;
    }
    p.min(s.len())
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    if pos == 0 {
        return 0;
    }
    let mut p = pos - 1;
    while p > 0 && !s.is_char_boundary(p) {
        p -= 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;

    fn run_search(pattern: &str, mode: Mode, subject: &str) -> Option<(usize, usize)> {
        let compiled = compile(pattern, mode).unwrap();
        search(&compiled.insts, subject, 0, subject.len(), mode).map(|c| c[0].unwrap())
    }

    #[test]
    fn digits_search_finds_first_run() {
        assert_eq!(run_search(r"\d+", Mode::NORMAL, "ab12cd345"), Some((2, 4)));
    }

    #[test]
    fn lazy_star_matches_minimally() {
        assert_eq!(run_search("a*?b", Mode::NORMAL, "aaab"), Some((0, 4)));
        assert_eq!(run_search("a*?", Mode::NORMAL, "aaab"), Some((0, 0)));
    }

    #[test]
    fn capturing_group_records_span() {
        let compiled = compile("(a|b)+", Mode::CAPTURE).unwrap();
        let caps = search(&compiled.insts, "abba", 0, 4, Mode::CAPTURE).unwrap();
        assert_eq!(caps[0], Some((0, 4)));
        assert!(caps[1].is_some());
    }

    #[test]
    fn backreference_requires_equal_repeat() {
        let compiled = compile(r"(\w+)\s\1", Mode::CAPTURE).unwrap();
        assert!(search(&compiled.insts, "hey hey", 0, 7, Mode::CAPTURE).is_some());
        assert!(search(&compiled.insts, "hey there", 0, 9, Mode::CAPTURE).is_none());
    }

    #[test]
    fn possessive_star_then_a_fails_where_greedy_would_backtrack() {
        let greedy = compile("a*a", Mode::NORMAL).unwrap();
        assert!(search(&greedy.insts, "aaa", 0, 3, Mode::NORMAL).is_some());
        let possessive = compile("a*+a", Mode::NORMAL).unwrap();
        assert!(search(&possessive.insts, "aaa", 0, 3, Mode::NORMAL).is_none());
    }

    #[test]
    fn newline_mode_lets_dot_cross_lines() {
        assert!(run_search("a.b", Mode::NORMAL, "a\nb").is_none());
        assert!(run_search("a.b", Mode::NEWLINE, "a\nb").is_some());
    }

    #[test]
    fn reverse_scan_finds_rightmost_match() {
        let compiled = compile(r"\d+", Mode::NORMAL).unwrap();
        let subject = "12 ab 34";
        let caps = search(&compiled.insts, subject, subject.len(), 0, Mode::NORMAL).unwrap();
        assert_eq!(caps[0], Some((6, 8)));
    }

    #[test]
    fn not_empty_rejects_zero_width_match() {
        let compiled = compile("a*", Mode::NOT_EMPTY).unwrap();
        assert!(search(&compiled.insts, "bbb", 0, 3, Mode::NOT_EMPTY).is_none());
        assert!(search(&compiled.insts, "baaa", 0, 4, Mode::NOT_EMPTY).is_some());
    }
}
