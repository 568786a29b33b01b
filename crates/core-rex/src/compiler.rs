//! Pattern parser and bytecode emitter.
//!
//! The grammar is PCRE-like: `exp := branch ('|' branch)*`, `branch := piece*`,
//! `piece := atom rep?`. Atoms and branches are each compiled into a small,
//! self-contained, *locally indexed* `Vec<Inst>` (as if it were its own
//! standalone program starting at index 0); [`opcode::append_sub`] splices a
//! local subprogram into a larger one, rewriting its internal jump targets to
//! the new base. This is the "builder + fixup" alternative to the source's
//! shift-down/memmove trick, sanctioned as an equivalent by the design notes.
//!
//! Quantifiers are not a dedicated opcode. Greedy `*`/`+`/`?` expand to
//! `Branch`/`Jump` loops, lazy ones to `BranchRev`/`Jump`, exactly mirroring
//! the source's own description of those two opcodes. Possessive quantifiers
//! and atomic groups compile to the dedicated non-backtracking opcodes
//! (`Atomic`, `If`, `While`, `Until`, `For`) since those must commit on
//! success and never restore on failure of the surrounding expression.

use crate::error::Error;
use crate::mode::Mode;
use crate::opcode::{append_sub, AsciiClass, ByteSet, Inst, NlPolicy, Polarity, UnicodeClass, ONEINDIG};

/// Counted-repeat unrolling is capped to keep pathological patterns like
/// `x{1,30000}` from producing absurd program sizes; beyond this the
/// compiler reports `Error::Complex` rather than `Error::Long`, since the
/// pattern itself (not its compiled size) is what's unreasonable.
const MAX_UNROLL: u32 = 1000;

/// Hard cap on emitted instructions, standing in for the source's
/// ±32,767-byte program size limit (`Error::Long`).
const MAX_PROGRAM_LEN: usize = 32_767;

pub struct Compiled {
    pub insts: Vec<Inst>,
    pub ncap: u8,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    mode: Mode,
    ncap: u8,
}

pub fn compile(pattern: &str, mode: Mode) -> Result<Compiled, Error> {
    if pattern.is_empty() {
        return Err(Error::Empty);
    }
    if mode.contains(Mode::VERBATIM) {
        return compile_verbatim(pattern, mode);
    }

    let mut parser = Parser {
        chars: pattern.chars().collect(),
        pos: 0,
        mode,
        ncap: 1,
    };

    let mut body = parser.parse_exp()?;
    if parser.pos != parser.chars.len() {
        return Err(Error::More);
    }

    if mode.contains(Mode::WORDS) {
        let mut wrapped = vec![Inst::WordBeg];
        append_sub(&mut wrapped, body);
        wrapped.push(Inst::WordEnd);
        body = wrapped;
    }
    if mode.contains(Mode::EXACT) {
        let mut wrapped = vec![Inst::StrBeg];
        append_sub(&mut wrapped, body);
        wrapped.push(Inst::StrEnd);
        body = wrapped;
    }
    if mode.contains(Mode::NOT_EMPTY) {
        body.push(Inst::NotEmpty);
    }
    body.push(Inst::Pass);

    if body.len() > MAX_PROGRAM_LEN {
        return Err(Error::Long);
    }

    Ok(Compiled { insts: body, ncap: parser.ncap })
}

fn compile_verbatim(pattern: &str, mode: Mode) -> Result<Compiled, Error> {
    let mut insts = Vec::new();
    if mode.contains(Mode::UNICODE) {
        let chars: Vec<char> = pattern.chars().collect();
        if mode.contains(Mode::IGNORE_CASE) {
            insts.push(Inst::UCharsCi(chars.into_boxed_slice()));
        } else {
            insts.push(Inst::UChars(chars.into_boxed_slice()));
        }
    } else {
        let bytes = pattern.as_bytes().to_vec();
        if mode.contains(Mode::IGNORE_CASE) {
            insts.push(Inst::CharsCi(bytes.to_ascii_lowercase().into_boxed_slice()));
        } else {
            insts.push(Inst::Chars(bytes.into_boxed_slice()));
        }
    }
    insts.push(Inst::Pass);
    Ok(Compiled { insts, ncap: 1 })
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // exp := branch ('|' branch)*
    fn parse_exp(&mut self) -> Result<Vec<Inst>, Error> {
        let first = self.parse_branch()?;
        if self.peek() != Some('|') {
            return Ok(first);
        }
        let mut branches = vec![first];
        while self.eat('|') {
            branches.push(self.parse_branch()?);
        }
        Ok(combine_alternation(branches))
    }

    // branch := piece*
    fn parse_branch(&mut self) -> Result<Vec<Inst>, Error> {
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let piece = self.parse_piece()?;
            append_sub(&mut out, piece);
        }
        Ok(out)
    }

    // piece := atom rep?
    fn parse_piece(&mut self) -> Result<Vec<Inst>, Error> {
        let atom = self.parse_atom()?;
        self.parse_rep(atom)
    }

    fn parse_rep(&mut self, atom: Vec<Inst>) -> Result<Vec<Inst>, Error> {
        let (min, max) = match self.peek() {
            Some('*') => {
                self.advance();
                (0u16, ONEINDIG)
            }
            Some('+') => {
                self.advance();
                (1u16, ONEINDIG)
            }
            Some('?') => {
                self.advance();
                (0u16, 1u16)
            }
            Some('{') => match self.try_parse_brace() {
                Some(bounds) => bounds?,
                None => return Ok(atom),
            },
            _ => return Ok(atom),
        };

        if min > max {
            return Err(Error::Range);
        }

        let suffix = self.peek();
        let possessive = suffix == Some('+');
        let lazy = suffix == Some('?');
        if possessive || lazy {
            self.advance();
        }

        if possessive {
            Ok(self.compile_possessive(atom, min, max))
        } else {
            self.compile_backtracking(atom, min, max, lazy)
        }
    }

    /// Tries to parse `{n}`, `{n,}`, or `{n,m}` at the current position.
    /// Returns `None` (and leaves `pos` untouched) if what follows `{` is not
    /// a valid counted-repeat body, so a literal `{` can fall through to
    /// being matched as an ordinary character.
    fn try_parse_brace(&mut self) -> Option<Result<(u16, u16), Error>> {
        let save = self.pos;
        self.advance(); // '{'
        let n = self.parse_number();
        let n = match n {
            Some(n) => n,
            None => {
                self.pos = save;
                return None;
            }
        };
        let m = if self.eat(',') {
            self.parse_number().unwrap_or(ONEINDIG)
        } else {
            n
        };
        if !self.eat('}') {
            self.pos = save;
            return None;
        }
        Some(Ok((n, m)))
    }

    fn parse_number(&mut self) -> Option<u16> {
        let start = self.pos;
        let mut v: u32 = 0;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            v = v * 10 + c.to_digit(10).unwrap();
            self.pos += 1;
            if v > u32::from(ONEINDIG) {
                v = u32::from(ONEINDIG);
            }
        }
        if self.pos == start {
            None
        } else {
            Some(v as u16)
        }
    }

    /// Greedy/lazy expansion: mandatory copies for `min`, then either a
    /// trailing star-loop (unbounded max) or up to `max-min` nested optional
    /// copies, each an ordinary `?` — all built from `Branch`/`BranchRev`/
    /// `Jump`, matching the source's description of those two opcodes.
    fn compile_backtracking(
        &self,
        atom: Vec<Inst>,
        min: u16,
        max: u16,
        lazy: bool,
    ) -> Result<Vec<Inst>, Error> {
        let mut out = Vec::new();
        for _ in 0..min {
            append_sub(&mut out, atom.clone());
        }
        if max == ONEINDIG {
            append_sub(&mut out, star_loop(atom, lazy));
        } else {
            let extra = u32::from(max) - u32::from(min);
            if extra > MAX_UNROLL {
                return Err(Error::Complex);
            }
            let mut optional_tail = Vec::new();
            for _ in 0..extra {
                optional_tail = nest_optional(atom.clone(), optional_tail, lazy);
            }
            append_sub(&mut out, optional_tail);
        }
        Ok(out)
    }

    /// Possessive expansion: maps directly onto the dedicated
    /// non-backtracking scope opcodes.
    fn compile_possessive(&self, atom: Vec<Inst>, min: u16, max: u16) -> Vec<Inst> {
        let end = atom.len() + 1;
        let mut out = Vec::with_capacity(end);
        if min == 0 && max == ONEINDIG {
            out.push(Inst::While(end));
        } else if min == 1 && max == ONEINDIG {
            out.push(Inst::Until(end));
        } else if min == 0 && max == 1 {
            out.push(Inst::If(end));
        } else {
            out.push(Inst::For { min, max, end });
        }
        append_sub(&mut out, atom);
        out
    }

    fn parse_atom(&mut self) -> Result<Vec<Inst>, Error> {
        let c = match self.peek() {
            Some(c) => c,
            None => return Err(Error::NoAtom),
        };
        match c {
            '(' => self.parse_group(),
            '[' => self.parse_charclass(),
            '.' => {
                self.advance();
                Ok(vec![if self.mode.contains(Mode::UNICODE) {
                    if self.mode.contains(Mode::NEWLINE) {
                        Inst::UAnyNl
                    } else {
                        Inst::UAny
                    }
                } else if self.mode.contains(Mode::NEWLINE) {
                    Inst::AnyNl
                } else {
                    Inst::Any
                }])
            }
            '^' => {
                self.advance();
                Ok(vec![if self.mode.contains(Mode::EXACT) {
                    Inst::StrBeg
                } else {
                    Inst::LineBeg
                }])
            }
            '$' => {
                self.advance();
                Ok(vec![if self.mode.contains(Mode::EXACT) {
                    Inst::StrEnd
                } else {
                    Inst::LineEnd
                }])
            }
            '\\' => self.parse_escape(),
            '*' | '+' | '?' | '{' | '|' => Err(Error::NoAtom),
            ')' => Err(Error::Paren),
            '}' => Err(Error::Brace),
            ']' => Err(Error::Bracket),
            _ => {
                self.advance();
                Ok(vec![self.literal_char(c)])
            }
        }
    }

    fn literal_char(&self, c: char) -> Inst {
        if self.mode.contains(Mode::UNICODE) {
            if self.mode.contains(Mode::IGNORE_CASE) {
                Inst::UCharCi(c)
            } else {
                Inst::UChar(c)
            }
        } else if c.is_ascii() {
            if self.mode.contains(Mode::IGNORE_CASE) {
                Inst::CharCi(c.to_ascii_lowercase() as u8)
            } else {
                Inst::Char(c as u8)
            }
        } else {
            // Non-ASCII literal while not in Unicode mode: treat as an
            // opaque UTF-8 byte run, matching the raw-byte subject model.
            let mut buf = [0u8; 4];
            let s = c.encode_utf8(&mut buf);
            Inst::Chars(s.as_bytes().to_vec().into_boxed_slice())
        }
    }

    fn parse_group(&mut self) -> Result<Vec<Inst>, Error> {
        self.advance(); // '('
        if self.peek() == Some('?') {
            match self.peek_at(1) {
                Some(':') => {
                    self.pos += 2;
                    let inner = self.parse_exp()?;
                    if !self.eat(')') {
                        return Err(Error::Paren);
                    }
                    return Ok(inner);
                }
                Some('>') => {
                    self.pos += 2;
                    let inner = self.parse_exp()?;
                    if !self.eat(')') {
                        return Err(Error::Paren);
                    }
                    let end = inner.len() + 1;
                    let mut out = vec![Inst::Atomic(end)];
                    append_sub(&mut out, inner);
                    return Ok(out);
                }
                Some('=') => {
                    self.pos += 2;
                    return self.parse_lookaround(Polarity::Positive, false);
                }
                Some('!') => {
                    self.pos += 2;
                    return self.parse_lookaround(Polarity::Negative, false);
                }
                Some('<') => match self.peek_at(2) {
                    Some('=') => {
                        self.pos += 3;
                        return self.parse_lookaround(Polarity::Positive, true);
                    }
                    Some('!') => {
                        self.pos += 3;
                        return self.parse_lookaround(Polarity::Negative, true);
                    }
                    _ => return Err(Error::Token),
                },
                _ => return Err(Error::Token),
            }
        }

        let capturing = self.mode.contains(Mode::CAPTURE);
        let index = if capturing {
            if self.ncap as usize >= crate::opcode::NSUBEXP {
                return Err(Error::Memory);
            }
            let idx = self.ncap;
            self.ncap += 1;
            Some(idx)
        } else {
            None
        };

        let inner = self.parse_exp()?;
        if !self.eat(')') {
            return Err(Error::Paren);
        }

        if let Some(idx) = index {
            let mut out = vec![Inst::SubBeg(idx)];
            append_sub(&mut out, inner);
            out.push(Inst::SubEnd(idx));
            Ok(out)
        } else {
            Ok(inner)
        }
    }

    fn parse_lookaround(&mut self, polarity: Polarity, behind: bool) -> Result<Vec<Inst>, Error> {
        let inner = self.parse_exp()?;
        if !self.eat(')') {
            return Err(Error::Paren);
        }
        let end = inner.len() + 1;
        let mut out = vec![Inst::Lookaround { polarity, behind, end }];
        append_sub(&mut out, inner);
        Ok(out)
    }

    fn parse_escape(&mut self) -> Result<Vec<Inst>, Error> {
        self.advance(); // backslash
        let c = match self.advance() {
            Some(c) => c,
            None => return Err(Error::NoAtom),
        };
        let nl = if self.mode.contains(Mode::NEWLINE) {
            NlPolicy::IncludeNewline
        } else {
            NlPolicy::ExcludeNewline
        };
        let unicode = self.mode.contains(Mode::UNICODE);
        let inst = match c {
            'w' => class_inst(unicode, AsciiClass::Word, UnicodeClass::Word, false, nl),
            'W' => class_inst(unicode, AsciiClass::Word, UnicodeClass::Word, true, nl),
            's' => class_inst(unicode, AsciiClass::Space, UnicodeClass::Space, false, nl),
            'S' => class_inst(unicode, AsciiClass::Space, UnicodeClass::Space, true, nl),
            'd' => class_inst(unicode, AsciiClass::Digit, UnicodeClass::Digit, false, nl),
            'D' => class_inst(unicode, AsciiClass::Digit, UnicodeClass::Digit, true, nl),
            'h' => class_inst(unicode, AsciiClass::Hex, UnicodeClass::Digit, false, nl),
            'H' => class_inst(unicode, AsciiClass::Hex, UnicodeClass::Digit, true, nl),
            'p' => class_inst(unicode, AsciiClass::Punct, UnicodeClass::Punct, false, nl),
            'P' => class_inst(unicode, AsciiClass::Punct, UnicodeClass::Punct, true, nl),
            'l' => class_inst(unicode, AsciiClass::Letter, UnicodeClass::Letter, false, nl),
            'L' => class_inst(unicode, AsciiClass::Letter, UnicodeClass::Letter, true, nl),
            'u' => class_inst(unicode, AsciiClass::Upper, UnicodeClass::Upper, false, nl),
            'U' => class_inst(unicode, AsciiClass::Lower, UnicodeClass::Lower, false, nl),
            'b' => {
                if unicode {
                    Inst::UWordBnd
                } else {
                    Inst::WordBnd
                }
            }
            'B' => {
                if unicode {
                    Inst::UWordInt
                } else {
                    Inst::WordInt
                }
            }
            'A' => Inst::StrBeg,
            'Z' => Inst::StrEnd,
            '<' => {
                if unicode {
                    Inst::UWordBeg
                } else {
                    Inst::WordBeg
                }
            }
            '>' => {
                if unicode {
                    Inst::UWordEnd
                } else {
                    Inst::WordEnd
                }
            }
            '1'..='9' => {
                if self.mode.contains(Mode::REVERSE) {
                    return Err(Error::Support);
                }
                if !self.mode.contains(Mode::CAPTURE) {
                    return Err(Error::BackRef);
                }
                let level = c.to_digit(10).unwrap() as u8;
                if level >= self.ncap {
                    return Err(Error::BackRef);
                }
                if self.mode.contains(Mode::IGNORE_CASE) {
                    Inst::RefCi(level)
                } else {
                    Inst::Ref(level)
                }
            }
            _ => return Ok(vec![self.literal_char(self.unescape_single(c)?)]),
        };
        Ok(vec![inst])
    }

    /// Resolves a single-character escape (`\n`, `\xHH`, `\cX`, `\0OOO`, or a
    /// literal escaped metacharacter) to the character it stands for.
    fn unescape_single(&mut self, c: char) -> Result<char, Error> {
        let resolved = match c {
            'a' => '\u{7}',
            'e' => '\u{1b}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            'c' => {
                let ctl = self.advance().ok_or(Error::Token)?;
                if ('@'..='_').contains(&ctl) {
                    ((ctl as u8) - b'@') as char
                } else if ctl == '?' {
                    127u8 as char
                } else {
                    return Err(Error::Token);
                }
            }
            '0' => {
                let mut v: u32 = 0;
                let mut digits = 0;
                while digits < 2 && matches!(self.peek(), Some(d) if ('0'..='7').contains(&d)) {
                    v = v * 8 + self.advance().unwrap().to_digit(8).unwrap();
                    digits += 1;
                }
                char::from_u32(v).unwrap_or('\0')
            }
            'x' => {
                let h1 = self.advance().filter(|c| c.is_ascii_hexdigit()).ok_or(Error::Token)?;
                let h2 = self.advance().filter(|c| c.is_ascii_hexdigit()).ok_or(Error::Token)?;
                let v = h1.to_digit(16).unwrap() * 16 + h2.to_digit(16).unwrap();
                char::from_u32(v).unwrap_or('\0')
            }
            other => other,
        };
        Ok(resolved)
    }

    fn parse_charclass(&mut self) -> Result<Vec<Inst>, Error> {
        self.advance(); // '['
        let negate = self.eat('^');
        if self.mode.contains(Mode::UNICODE) {
            let ranges = self.parse_charclass_unicode()?;
            return Ok(vec![if negate { Inst::UNotIn(ranges) } else { Inst::UIn(ranges) }]);
        }

        let mut set = ByteSet::empty();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(Error::Bracket),
                Some(']') if !first => {
                    self.advance();
                    break;
                }
                _ => {}
            }
            first = false;
            let lo = self.charclass_item(&mut set)?;
            let lo = match lo {
                Some(lo) => lo,
                None => continue, // a shorthand class was unioned in directly
            };
            if self.peek() == Some('-') && self.peek_at(1) != Some(']') && self.peek_at(1).is_some() {
                self.advance();
                let hi = self
                    .charclass_item(&mut set)?
                    .ok_or(Error::Range)?;
                if hi < lo {
                    return Err(Error::Range);
                }
                set.set_range(lo, hi);
            } else {
                set.set(lo);
                if self.mode.contains(Mode::IGNORE_CASE) {
                    set.set(ascii_swap_case(lo));
                }
            }
        }

        if negate && !self.mode.contains(Mode::NEWLINE) {
            set.set(b'\n');
        }
        Ok(vec![if negate { Inst::NotIn(Box::new(set)) } else { Inst::In(Box::new(set)) }])
    }

    /// Parses one charclass member: a literal byte, or a `\w`-style
    /// shorthand (unioned directly into `set`, returning `None`).
    fn charclass_item(&mut self, set: &mut ByteSet) -> Result<Option<u8>, Error> {
        match self.advance() {
            None => Err(Error::Bracket),
            Some('\\') => {
                let c = self.advance().ok_or(Error::Bracket)?;
                let shorthand = match c {
                    'w' => Some((AsciiClass::Word, false)),
                    'W' => Some((AsciiClass::Word, true)),
                    's' => Some((AsciiClass::Space, false)),
                    'S' => Some((AsciiClass::Space, true)),
                    'd' => Some((AsciiClass::Digit, false)),
                    'D' => Some((AsciiClass::Digit, true)),
                    'h' => Some((AsciiClass::Hex, false)),
                    'H' => Some((AsciiClass::Hex, true)),
                    'p' => Some((AsciiClass::Punct, false)),
                    'P' => Some((AsciiClass::Punct, true)),
                    'l' => Some((AsciiClass::Letter, false)),
                    'L' => Some((AsciiClass::Letter, true)),
                    'u' => Some((AsciiClass::Upper, false)),
                    'U' => Some((AsciiClass::Lower, false)),
                    _ => None,
                };
                if let Some((class, negated)) = shorthand {
                    union_ascii_class(set, class, negated);
                    return Ok(None);
                }
                Ok(Some(self.unescape_single(c)? as u8))
            }
            Some(c) if c.is_ascii() => Ok(Some(c as u8)),
            Some(_) => Err(Error::Class),
        }
    }

    fn parse_charclass_unicode(&mut self) -> Result<Box<[(char, char)]>, Error> {
        let mut ranges = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(Error::Bracket),
                Some(']') if !first => {
                    self.advance();
                    break;
                }
                _ => {}
            }
            first = false;
            let lo = match self.advance() {
                Some('\\') => self.unescape_single(self.advance().ok_or(Error::Bracket)?)?,
                Some(c) => c,
                None => return Err(Error::Bracket),
            };
            if self.peek() == Some('-') && self.peek_at(1) != Some(']') && self.peek_at(1).is_some() {
                self.advance();
                let hi = match self.advance() {
                    Some('\\') => self.unescape_single(self.advance().ok_or(Error::Bracket)?)?,
                    Some(c) => c,
                    None => return Err(Error::Bracket),
                };
                if hi < lo {
                    return Err(Error::Range);
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        Ok(ranges.into_boxed_slice())
    }
}

fn class_inst(
    unicode: bool,
    ascii: AsciiClass,
    uni: UnicodeClass,
    negated: bool,
    nl: NlPolicy,
) -> Inst {
    if unicode {
        Inst::UnicodePred(uni, negated, nl)
    } else {
        Inst::AsciiPred(ascii, negated, nl)
    }
}

fn union_ascii_class(set: &mut ByteSet, class: AsciiClass, negated: bool) {
    for b in 0u16..=255 {
        let matches = class.matches(b as u8);
        if matches != negated {
            set.set(b as u8);
        }
    }
}

fn ascii_swap_case(b: u8) -> u8 {
    if b.is_ascii_uppercase() {
        b.to_ascii_lowercase()
    } else if b.is_ascii_lowercase() {
        b.to_ascii_uppercase()
    } else {
        b
    }
}

/// Builds a greedy/lazy star loop around a locally-indexed `body`.
fn star_loop(body: Vec<Inst>, lazy: bool) -> Vec<Inst> {
    // L0: Branch(exit) / BranchRev(exit)
    // body (offset by 1)
    // Jump(0)
    // exit:
    let body_len = body.len();
    let exit = body_len + 2;
    let mut out = Vec::with_capacity(body_len + 2);
    out.push(if lazy { Inst::BranchRev(exit) } else { Inst::Branch(exit) });
    append_sub(&mut out, body);
    out.push(Inst::Jump(0));
    out
}

/// Wraps `body` as one more optional repetition nested around `tail` (used
/// to build bounded `{n,m}` expansion beyond the mandatory `min` copies).
fn nest_optional(body: Vec<Inst>, tail: Vec<Inst>, lazy: bool) -> Vec<Inst> {
    // Branch/BranchRev(exit); body; tail; exit:
    let mut combined = body;
    append_sub(&mut combined, tail);
    let exit = combined.len() + 1;
    let mut out = Vec::with_capacity(combined.len() + 1);
    out.push(if lazy { Inst::BranchRev(exit) } else { Inst::Branch(exit) });
    append_sub(&mut out, combined);
    out
}

fn combine_alternation(branches: Vec<Vec<Inst>>) -> Vec<Inst> {
    let mut iter = branches.into_iter().rev();
    let mut tail = iter.next().unwrap_or_default();
    for branch in iter {
        tail = alt2(branch, tail);
    }
    tail
}

fn alt2(branch: Vec<Inst>, tail: Vec<Inst>) -> Vec<Inst> {
    let pos_l2 = branch.len() + 2;
    let pos_end = pos_l2 + tail.len();
    let mut out = Vec::with_capacity(pos_end);
    out.push(Inst::Branch(pos_l2));
    append_sub(&mut out, branch);
    out.push(Inst::Jump(pos_end));
    append_sub(&mut out, tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_ok(pattern: &str, mode: Mode) -> Compiled {
        compile(pattern, mode).expect("pattern should compile")
    }

    #[test]
    fn empty_pattern_is_an_error() {
        assert_eq!(compile("", Mode::NORMAL), Err(Error::Empty));
    }

    #[test]
    fn literal_concatenation_compiles() {
        let c = compile_ok("abc", Mode::NORMAL);
        assert!(matches!(c.insts.last(), Some(Inst::Pass)));
    }

    #[test]
    fn unmatched_paren_is_an_error() {
        assert_eq!(compile("(abc", Mode::CAPTURE), Err(Error::Paren));
    }

    #[test]
    fn backreference_without_capture_is_an_error() {
        assert_eq!(compile(r"(a)\1", Mode::NORMAL), Err(Error::BackRef));
    }

    #[test]
    fn backreference_in_reverse_mode_is_unsupported() {
        assert_eq!(
            compile(r"(a)\1", Mode::CAPTURE | Mode::REVERSE),
            Err(Error::Support)
        );
    }

    #[test]
    fn possessive_star_a_plus_a_is_complex_but_compiles() {
        let c = compile_ok("a*+a", Mode::NORMAL);
        assert!(c.insts.iter().any(|i| matches!(i, Inst::While(_))));
    }

    #[test]
    fn counted_repeat_descending_range_is_an_error() {
        assert_eq!(compile("a{5,2}", Mode::NORMAL), Err(Error::Range));
    }

    #[test]
    fn capture_count_tracks_groups() {
        let c = compile_ok("(a)(b(c))", Mode::CAPTURE);
        assert_eq!(c.ncap, 4);
    }

    #[test]
    fn too_many_captures_is_memory_error() {
        let pat = "(a)".repeat(10);
        assert_eq!(compile(&pat, Mode::CAPTURE), Err(Error::Memory));
    }
}
