//! The bytecode instruction set and the character-class primitives it dispatches to.
//!
//! Instructions are a tagged enum rather than the original's flat byte stream
//! with a numeric opcode table; jump targets are instruction indices into the
//! owning [`crate::Program`]'s `Vec<Inst>` rather than byte offsets.
//!
//! Greedy and lazy quantifiers are not a dedicated opcode: following the
//! source's own description of `Branch`/`BranchRev` ("greedy quantifiers use
//! Branch for the loop, lazy use BranchRev"), the compiler expands `*`, `+`,
//! `?` and `{n,m}` directly into `Branch`/`BranchRev`/`Jump` chains, so
//! greediness is encoded purely by which of the two branch opcodes got
//! emitted. Possessive quantifiers and atomic groups are the ones that need a
//! dedicated non-backtracking opcode, since they must commit on success; those
//! are `Atomic`/`If`/`While`/`Until`/`For` below.

use std::fmt;

/// Pseudo-infinity sentinel for unbounded repeat upper bounds. Any value that
/// cannot overflow further 16-bit arithmetic during compilation works; this
/// mirrors the source's `ONEINDIG`.
pub const ONEINDIG: u16 = 16384;

/// Number of capture slots, including whole-match capture 0.
pub const NSUBEXP: usize = 10;

/// Recursion depth cap for the backtracking matcher.
pub const MAX_RECURSION: u32 = 10_000;

/// Polarity of a lookaround assertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

/// A 256-bit set of byte values, used by `In`/`NotIn`.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteSet(pub [u8; 32]);

impl ByteSet {
    pub fn empty() -> Self {
        ByteSet([0u8; 32])
    }

    pub fn set(&mut self, byte: u8) {
        self.0[(byte >> 3) as usize] |= 1 << (byte & 7);
    }

    pub fn test(&self, byte: u8) -> bool {
        self.0[(byte >> 3) as usize] & (1 << (byte & 7)) != 0
    }

    pub fn union(&mut self, other: &ByteSet) {
        for i in 0..32 {
            self.0[i] |= other.0[i];
        }
    }

    pub fn set_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.set(b);
            if b == 255 {
                break;
            }
        }
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSet(<{} bytes set>)", (0..=255u16).filter(|&b| self.test(b as u8)).count())
    }
}

/// A predefined ASCII character class, usable in both its "plain" and
/// newline-permitting forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsciiClass {
    Upper,
    Lower,
    Space,
    Digit,
    Hex,
    Letter,
    Punct,
    Word,
}

impl AsciiClass {
    pub fn matches(self, b: u8) -> bool {
        let c = b as char;
        match self {
            AsciiClass::Upper => c.is_ascii_uppercase(),
            AsciiClass::Lower => c.is_ascii_lowercase(),
            AsciiClass::Space => c.is_ascii_whitespace(),
            AsciiClass::Digit => c.is_ascii_digit(),
            AsciiClass::Hex => c.is_ascii_hexdigit(),
            AsciiClass::Letter => c.is_ascii_alphabetic(),
            AsciiClass::Punct => c.is_ascii_punctuation(),
            AsciiClass::Word => c.is_ascii_alphanumeric() || c == b'_' as char,
        }
    }
}

/// The Unicode-aware analogue of [`AsciiClass`], evaluated on a full `char`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnicodeClass {
    Upper,
    Lower,
    Title,
    Space,
    Digit,
    Letter,
    Punct,
    Word,
}

impl UnicodeClass {
    pub fn matches(self, c: char) -> bool {
        match self {
            UnicodeClass::Upper => c.is_uppercase(),
            UnicodeClass::Lower => c.is_lowercase(),
            UnicodeClass::Title => c.is_uppercase() && c.to_lowercase().count() > 1,
            UnicodeClass::Space => c.is_whitespace(),
            UnicodeClass::Digit => c.is_numeric(),
            UnicodeClass::Letter => c.is_alphabetic(),
            UnicodeClass::Punct => c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()),
            UnicodeClass::Word => c.is_alphanumeric() || c == '_',
        }
    }
}

/// Whether a "non-class" predicate also refuses to cross a newline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NlPolicy {
    /// The predicate fails on `'\n'` regardless (i.e. newline never matches
    /// "not digit" etc. unless `Newline` mode is set).
    ExcludeNewline,
    /// Newline is permitted through like any other non-matching byte.
    IncludeNewline,
}

/// A single compiled instruction. Jump/branch targets and repeat bodies are
/// expressed as instruction indices relative to nothing (i.e. already
/// resolved to absolute indices in the owning `Vec<Inst>`) by the time
/// compilation finishes.
#[derive(Clone, Debug)]
pub enum Inst {
    Fail,
    Pass,
    Jump(usize),
    /// Try inline code (the following instruction) first; on failure jump to
    /// the alternative at the given index.
    Branch(usize),
    /// Try the jump target first; on failure fall through to the following
    /// instruction. Used for lazy quantifiers and alternation order reversal.
    BranchRev(usize),
    /// Match the subprogram `[pc+1, end)` atomically: once it matches, no
    /// backtracking may re-enter it. `end` is the index just past the group.
    Atomic(usize),
    /// Optionally match the subgroup once, no backtrack (possessive `?`).
    If(usize),
    /// Zero or more times, no backtrack (possessive `*`).
    While(usize),
    /// One or more times, no backtrack (possessive `+`).
    Until(usize),
    /// Between min and max times, no backtrack (possessive `{n,m}`).
    For { min: u16, max: u16, end: usize },

    NotEmpty,
    StrBeg,
    StrEnd,
    LineBeg,
    LineEnd,
    WordBeg,
    WordEnd,
    WordBnd,
    WordInt,
    UWordBeg,
    UWordEnd,
    UWordBnd,
    UWordInt,

    /// Literal byte run, case-sensitive.
    Chars(Box<[u8]>),
    /// Literal byte run, ASCII case-insensitive.
    CharsCi(Box<[u8]>),
    /// Literal `char` run (Unicode mode), case-sensitive.
    UChars(Box<[char]>),
    /// Literal `char` run (Unicode mode), full Unicode case folding.
    UCharsCi(Box<[char]>),

    Any,
    AnyNl,
    In(Box<ByteSet>),
    NotIn(Box<ByteSet>),
    AnyOf(Box<[u8]>),
    AnyBut(Box<[u8]>),
    AsciiPred(AsciiClass, bool /* negated */, NlPolicy),
    /// A single literal byte, case-sensitive.
    Char(u8),
    /// A single literal byte, ASCII-folded to lowercase at compile time.
    CharCi(u8),

    UAny,
    UAnyNl,
    UIn(Box<[(char, char)]>),
    UNotIn(Box<[(char, char)]>),
    UnicodePred(UnicodeClass, bool, NlPolicy),
    UChar(char),
    UCharCi(char),

    Lookaround {
        polarity: Polarity,
        behind: bool,
        end: usize,
    },

    SubBeg(u8),
    SubEnd(u8),
    Ref(u8),
    RefCi(u8),

    Zero(u8),
    Incr(u8),
    JumpLt(u8, usize),
    JumpGt(u8, usize),
}

/// Adds `by` to every jump/branch/group-end target in `insts`. Used when
/// splicing a locally-indexed subprogram (built standalone, indices counted
/// from 0) into a larger one at a nonzero base offset.
pub fn offset_targets(insts: &mut [Inst], by: usize) {
    for inst in insts.iter_mut() {
        match inst {
            Inst::Jump(t)
            | Inst::Branch(t)
            | Inst::BranchRev(t)
            | Inst::Atomic(t)
            | Inst::If(t)
            | Inst::While(t)
            | Inst::Until(t)
            | Inst::JumpLt(_, t)
            | Inst::JumpGt(_, t) => *t += by,
            Inst::For { end, .. } => *end += by,
            Inst::Lookaround { end, .. } => *end += by,
            _ => {}
        }
    }
}

/// Appends a locally-indexed subprogram onto `main`, offsetting its internal
/// targets so they remain correct at their new position.
pub fn append_sub(main: &mut Vec<Inst>, mut sub: Vec<Inst>) {
    let base = main.len();
    offset_targets(&mut sub, base);
    main.extend(sub);
}
