//! Bespoke little-endian byte codec for [`crate::Program`].
//!
//! Not a format used anywhere outside this crate; it exists so a host
//! application (e.g. a config file of saved searches) can persist a compiled
//! program without recompiling the source pattern every time. Every
//! [`Inst`] variant round-trips explicitly rather than relying on a derive,
//! since jump targets are plain `usize` indices with no external schema.

use crate::error::Error;
use crate::opcode::{AsciiClass, ByteSet, Inst, NlPolicy, Polarity, UnicodeClass};

const MAGIC: &[u8; 4] = b"REX1";

pub fn to_bytes(insts: &[Inst], ncap: u8) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(ncap);
    write_u32(&mut out, insts.len() as u32);
    for inst in insts {
        write_inst(&mut out, inst);
    }
    out
}

pub fn from_bytes(bytes: &[u8]) -> Result<(Vec<Inst>, u8), Error> {
    let mut r = Reader { bytes, pos: 0 };
    if r.take(4)? != MAGIC.as_slice() {
        return Err(Error::Token);
    }
    let ncap = r.byte()?;
    let count = r.u32()? as usize;
    let mut insts = Vec::with_capacity(count);
    for _ in 0..count {
        insts.push(read_inst(&mut r)?);
    }
    Ok((insts, ncap))
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn write_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn write_usize(out: &mut Vec<u8>, v: usize) {
    write_u32(out, v as u32);
}
fn write_char(out: &mut Vec<u8>, c: char) {
    write_u32(out, c as u32);
}
fn write_bytes(out: &mut Vec<u8>, b: &[u8]) {
    write_u32(out, b.len() as u32);
    out.extend_from_slice(b);
}
fn write_chars(out: &mut Vec<u8>, c: &[char]) {
    write_u32(out, c.len() as u32);
    for &ch in c {
        write_char(out, ch);
    }
}
fn write_ranges(out: &mut Vec<u8>, r: &[(char, char)]) {
    write_u32(out, r.len() as u32);
    for &(lo, hi) in r {
        write_char(out, lo);
        write_char(out, hi);
    }
}
fn write_byteset(out: &mut Vec<u8>, s: &ByteSet) {
    out.extend_from_slice(&s.0);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self.pos + n;
        let s = self.bytes.get(self.pos..end).ok_or(Error::Token)?;
        self.pos = end;
        Ok(s)
    }
    fn byte(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }
    fn u32(&mut self) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }
    fn u16(&mut self) -> Result<u16, Error> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }
    fn usize(&mut self) -> Result<usize, Error> {
        Ok(self.u32()? as usize)
    }
    fn char(&mut self) -> Result<char, Error> {
        char::from_u32(self.u32()?).ok_or(Error::Token)
    }
    fn bytes_vec(&mut self) -> Result<Box<[u8]>, Error> {
        let len = self.usize()?;
        Ok(self.take(len)?.to_vec().into_boxed_slice())
    }
    fn chars_vec(&mut self) -> Result<Box<[char]>, Error> {
        let len = self.usize()?;
        let mut v = Vec::with_capacity(len);
        for _ in 0..len {
            v.push(self.char()?);
        }
        Ok(v.into_boxed_slice())
    }
    fn ranges_vec(&mut self) -> Result<Box<[(char, char)]>, Error> {
        let len = self.usize()?;
        let mut v = Vec::with_capacity(len);
        for _ in 0..len {
            v.push((self.char()?, self.char()?));
        }
        Ok(v.into_boxed_slice())
    }
    fn byteset(&mut self) -> Result<ByteSet, Error> {
        let raw: [u8; 32] = self.take(32)?.try_into().map_err(|_| Error::Token)?;
        Ok(ByteSet(raw))
    }
}

macro_rules! tag {
    ($out:ident, $n:expr) => {
        $out.push($n)
    };
}

fn write_inst(out: &mut Vec<u8>, inst: &Inst) {
    match inst {
        Inst::Fail => tag!(out, 0),
        Inst::Pass => tag!(out, 1),
        Inst::Jump(t) => { tag!(out, 2); write_usize(out, *t); }
        Inst::Branch(t) => { tag!(out, 3); write_usize(out, *t); }
        Inst::BranchRev(t) => { tag!(out, 4); write_usize(out, *t); }
        Inst::Atomic(t) => { tag!(out, 5); write_usize(out, *t); }
        Inst::If(t) => { tag!(out, 6); write_usize(out, *t); }
        Inst::While(t) => { tag!(out, 7); write_usize(out, *t); }
        Inst::Until(t) => { tag!(out, 8); write_usize(out, *t); }
        Inst::For { min, max, end } => {
            tag!(out, 9);
            write_u16(out, *min);
            write_u16(out, *max);
            write_usize(out, *end);
        }
        Inst::NotEmpty => tag!(out, 10),
        Inst::StrBeg => tag!(out, 11),
        Inst::StrEnd => tag!(out, 12),
        Inst::LineBeg => tag!(out, 13),
        Inst::LineEnd => tag!(out, 14),
        Inst::WordBeg => tag!(out, 15),
        Inst::WordEnd => tag!(out, 16),
        Inst::WordBnd => tag!(out, 17),
        Inst::WordInt => tag!(out, 18),
        Inst::UWordBeg => tag!(out, 19),
        Inst::UWordEnd => tag!(out, 20),
        Inst::UWordBnd => tag!(out, 21),
        Inst::UWordInt => tag!(out, 22),
        Inst::Chars(b) => { tag!(out, 23); write_bytes(out, b); }
        Inst::CharsCi(b) => { tag!(out, 24); write_bytes(out, b); }
        Inst::UChars(c) => { tag!(out, 25); write_chars(out, c); }
        Inst::UCharsCi(c) => { tag!(out, 26); write_chars(out, c); }
        Inst::Any => tag!(out, 27),
        Inst::AnyNl => tag!(out, 28),
        Inst::In(s) => { tag!(out, 29); write_byteset(out, s); }
        Inst::NotIn(s) => { tag!(out, 30); write_byteset(out, s); }
        Inst::AnyOf(b) => { tag!(out, 31); write_bytes(out, b); }
        Inst::AnyBut(b) => { tag!(out, 32); write_bytes(out, b); }
        Inst::AsciiPred(c, n, nl) => {
            tag!(out, 33);
            out.push(ascii_class_id(*c));
            out.push(*n as u8);
            out.push(nl_id(*nl));
        }
        Inst::Char(b) => { tag!(out, 34); out.push(*b); }
        Inst::CharCi(b) => { tag!(out, 35); out.push(*b); }
        Inst::UAny => tag!(out, 36),
        Inst::UAnyNl => tag!(out, 37),
        Inst::UIn(r) => { tag!(out, 38); write_ranges(out, r); }
        Inst::UNotIn(r) => { tag!(out, 39); write_ranges(out, r); }
        Inst::UnicodePred(c, n, nl) => {
            tag!(out, 40);
            out.push(unicode_class_id(*c));
            out.push(*n as u8);
            out.push(nl_id(*nl));
        }
        Inst::UChar(c) => { tag!(out, 41); write_char(out, *c); }
        Inst::UCharCi(c) => { tag!(out, 42); write_char(out, *c); }
        Inst::Lookaround { polarity, behind, end } => {
            tag!(out, 43);
            out.push(matches!(polarity, Polarity::Negative) as u8);
            out.push(*behind as u8);
            write_usize(out, *end);
        }
        Inst::SubBeg(i) => { tag!(out, 44); out.push(*i); }
        Inst::SubEnd(i) => { tag!(out, 45); out.push(*i); }
        Inst::Ref(i) => { tag!(out, 46); out.push(*i); }
        Inst::RefCi(i) => { tag!(out, 47); out.push(*i); }
        Inst::Zero(i) => { tag!(out, 48); out.push(*i); }
        Inst::Incr(i) => { tag!(out, 49); out.push(*i); }
        Inst::JumpLt(i, t) => { tag!(out, 50); out.push(*i); write_usize(out, *t); }
        Inst::JumpGt(i, t) => { tag!(out, 51); out.push(*i); write_usize(out, *t); }
    }
}

fn read_inst(r: &mut Reader) -> Result<Inst, Error> {
    Ok(match r.byte()? {
        0 => Inst::Fail,
        1 => Inst::Pass,
        2 => Inst::Jump(r.usize()?),
        3 => Inst::Branch(r.usize()?),
        4 => Inst::BranchRev(r.usize()?),
        5 => Inst::Atomic(r.usize()?),
        6 => Inst::If(r.usize()?),
        7 => Inst::While(r.usize()?),
        8 => Inst::Until(r.usize()?),
        9 => {
            let min = r.u16()?;
            let max = r.u16()?;
            let end = r.usize()?;
            Inst::For { min, max, end }
        }
        10 => Inst::NotEmpty,
        11 => Inst::StrBeg,
        12 => Inst::StrEnd,
        13 => Inst::LineBeg,
        14 => Inst::LineEnd,
        15 => Inst::WordBeg,
        16 => Inst::WordEnd,
        17 => Inst::WordBnd,
        18 => Inst::WordInt,
        19 => Inst::UWordBeg,
        20 => Inst::UWordEnd,
        21 => Inst::UWordBnd,
        22 => Inst::UWordInt,
        23 => Inst::Chars(r.bytes_vec()?),
        24 => Inst::CharsCi(r.bytes_vec()?),
        25 => Inst::UChars(r.chars_vec()?),
        26 => Inst::UCharsCi(r.chars_vec()?),
        27 => Inst::Any,
        28 => Inst::AnyNl,
        29 => Inst::In(Box::new(r.byteset()?)),
        30 => Inst::NotIn(Box::new(r.byteset()?)),
        31 => Inst::AnyOf(r.bytes_vec()?),
        32 => Inst::AnyBut(r.bytes_vec()?),
        33 => {
            let class = ascii_class_from_id(r.byte()?)?;
            let negated = r.byte()? != 0;
            let nl = nl_from_id(r.byte()?)?;
            Inst::AsciiPred(class, negated, nl)
        }
        34 => Inst::Char(r.byte()?),
        35 => Inst::CharCi(r.byte()?),
        36 => Inst::UAny,
        37 => Inst::UAnyNl,
        38 => Inst::UIn(r.ranges_vec()?),
        39 => Inst::UNotIn(r.ranges_vec()?),
        40 => {
            let class = unicode_class_from_id(r.byte()?)?;
            let negated = r.byte()? != 0;
            let nl = nl_from_id(r.byte()?)?;
            Inst::UnicodePred(class, negated, nl)
        }
        41 => Inst::UChar(r.char()?),
        42 => Inst::UCharCi(r.char()?),
        43 => {
            let polarity = if r.byte()? != 0 { Polarity::Negative } else { Polarity::Positive };
            let behind = r.byte()? != 0;
            let end = r.usize()?;
            Inst::Lookaround { polarity, behind, end }
        }
        44 => Inst::SubBeg(r.byte()?),
        45 => Inst::SubEnd(r.byte()?),
        46 => Inst::Ref(r.byte()?),
        47 => Inst::RefCi(r.byte()?),
        48 => Inst::Zero(r.byte()?),
        49 => Inst::Incr(r.byte()?),
        50 => Inst::JumpLt(r.byte()?, r.usize()?),
        51 => Inst::JumpGt(r.byte()?, r.usize()?),
        _ => return Err(Error::Token),
    })
}

fn ascii_class_id(c: AsciiClass) -> u8 {
    match c {
        AsciiClass::Upper => 0,
        AsciiClass::Lower => 1,
        AsciiClass::Space => 2,
        AsciiClass::Digit => 3,
        AsciiClass::Hex => 4,
        AsciiClass::Letter => 5,
        AsciiClass::Punct => 6,
        AsciiClass::Word => 7,
    }
}
fn ascii_class_from_id(id: u8) -> Result<AsciiClass, Error> {
    Ok(match id {
        0 => AsciiClass::Upper,
        1 => AsciiClass::Lower,
        2 => AsciiClass::Space,
        3 => AsciiClass::Digit,
        4 => AsciiClass::Hex,
        5 => AsciiClass::Letter,
        6 => AsciiClass::Punct,
        7 => AsciiClass::Word,
        _ => return Err(Error::Token),
    })
}
fn unicode_class_id(c: UnicodeClass) -> u8 {
    match c {
        UnicodeClass::Upper => 0,
        UnicodeClass::Lower => 1,
        UnicodeClass::Title => 2,
        UnicodeClass::Space => 3,
        UnicodeClass::Digit => 4,
        UnicodeClass::Letter => 5,
        UnicodeClass::Punct => 6,
        UnicodeClass::Word => 7,
    }
}
fn unicode_class_from_id(id: u8) -> Result<UnicodeClass, Error> {
    Ok(match id {
        0 => UnicodeClass::Upper,
        1 => UnicodeClass::Lower,
        2 => UnicodeClass::Title,
        3 => UnicodeClass::Space,
        4 => UnicodeClass::Digit,
        5 => UnicodeClass::Letter,
        6 => UnicodeClass::Punct,
        7 => UnicodeClass::Word,
        _ => return Err(Error::Token),
    })
}
fn nl_id(nl: NlPolicy) -> u8 {
    match nl {
        NlPolicy::ExcludeNewline => 0,
        NlPolicy::IncludeNewline => 1,
    }
}
fn nl_from_id(id: u8) -> Result<NlPolicy, Error> {
    Ok(match id {
        0 => NlPolicy::ExcludeNewline,
        1 => NlPolicy::IncludeNewline,
        _ => return Err(Error::Token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::mode::Mode;

    #[test]
    fn round_trips_a_compiled_program() {
        let compiled = compile(r"(\w+)\s\1", Mode::CAPTURE | Mode::IGNORE_CASE).unwrap();
        let bytes = to_bytes(&compiled.insts, compiled.ncap);
        let (insts, ncap) = from_bytes(&bytes).unwrap();
        assert_eq!(ncap, compiled.ncap);
        assert_eq!(insts.len(), compiled.insts.len());
    }

    #[test]
    fn rejects_truncated_input() {
        assert_eq!(from_bytes(b"REX1"), Err(Error::Token));
    }
}
