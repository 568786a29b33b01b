//! A small backtracking regular-expression engine: pattern compiler plus
//! matcher, independent of any particular text storage. `core-text` calls
//! into this crate for `find`/`replace`; nothing in here knows about gap
//! buffers, lines, or the editor model.
//!
//! Subjects are always `&str` (byte-offset positions, UTF-8 valid); modes
//! that ask for raw-byte semantics (`Mode::UNICODE` unset) still run over
//! valid UTF-8, they just decline to decode multi-byte sequences as single
//! characters for literals and classes.

pub mod compiler;
pub mod error;
pub mod matcher;
pub mod mode;
pub mod opcode;
mod serialize;

pub use error::Error;
pub use matcher::Captures;
pub use mode::Mode;
pub use opcode::Inst;

use opcode::NSUBEXP;

/// A compiled pattern, ready to match against any number of subjects.
#[derive(Clone, Debug)]
pub struct Program {
    insts: Vec<Inst>,
    ncap: u8,
}

impl Program {
    /// Compiles `pattern` under `mode`. Fails with a [`Error`] describing
    /// the first syntax problem encountered; never panics on malformed
    /// input.
    pub fn compile(pattern: &str, mode: Mode) -> Result<Program, Error> {
        let compiled = compiler::compile(pattern, mode)?;
        Ok(Program { insts: compiled.insts, ncap: compiled.ncap })
    }

    /// Compiles `pattern`, falling back to a program that never matches
    /// anything if compilation fails, alongside the error that caused the
    /// fallback. Useful for interactive callers (e.g. a live search box)
    /// that must always hold a usable `Program`, even mid-typo.
    pub fn compile_or_fallback(pattern: &str, mode: Mode) -> (Program, Option<Error>) {
        match Self::compile(pattern, mode) {
            Ok(p) => (p, None),
            Err(e) => (Program::fallback(), Some(e)),
        }
    }

    /// A program that matches nothing: `Fail` followed by the mandatory
    /// trailing `Pass`.
    pub fn fallback() -> Program {
        Program { insts: vec![Inst::Fail, Inst::Pass], ncap: 1 }
    }

    /// Number of capture groups, including the implicit whole-match group 0.
    pub fn capture_count(&self) -> u8 {
        self.ncap
    }

    /// Tries to match anchored at `pos` exactly (no scanning). `mode` is
    /// consulted only for `NOT_BOL`/`NOT_EOL`; everything else was already
    /// baked in at compile time.
    pub fn amatch(&self, subject: &str, pos: usize, mode: Mode) -> Option<Captures> {
        matcher::amatch(&self.insts, subject, pos, mode)
    }

    /// Scans for the first match in `[from, to]` (or `[to, from]` if
    /// `from > to`, walking backward — this is how reverse search is
    /// expressed without a byte-reversed program).
    pub fn search(&self, subject: &str, from: usize, to: usize, mode: Mode) -> Option<Captures> {
        matcher::search(&self.insts, subject, from, to, mode)
    }

    /// Expands a substitution template against `caps`: `&` stands for the
    /// whole match, `\1`-`\9` for a capture group, `\&` and `\\` are literal
    /// escapes. A reference to a group that didn't participate expands to
    /// nothing.
    pub fn substitute(&self, subject: &str, caps: &Captures, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '&' => {
                    if let Some((s, e)) = caps[0] {
                        out.push_str(&subject[s..e]);
                    }
                }
                '\\' => match chars.peek() {
                    Some(d) if d.is_ascii_digit() => {
                        let idx = d.to_digit(10).unwrap() as usize;
                        chars.next();
                        if idx < NSUBEXP {
                            if let Some(Some((s, e))) = caps.get(idx) {
                                out.push_str(&subject[*s..*e]);
                            }
                        }
                    }
                    Some('&') => {
                        out.push('&');
                        chars.next();
                    }
                    Some('\\') => {
                        out.push('\\');
                        chars.next();
                    }
                    _ => out.push('\\'),
                },
                other => out.push(other),
            }
        }
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serialize::to_bytes(&self.insts, self.ncap)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Program, Error> {
        let (insts, ncap) = serialize::from_bytes(bytes)?;
        Ok(Program { insts, ncap })
    }
}
