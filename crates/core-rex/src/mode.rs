//! Parse-time and match-time mode flags.

use bitflags::bitflags;

bitflags! {
    /// Flags controlling both pattern parsing and match execution; the same
    /// bitmask is threaded through both so a caller can build it once.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Mode: u16 {
        const NORMAL      = 0;
        const UNICODE     = 1;
        const SYNTAX      = 2;
        const VERBATIM    = 4;
        const CAPTURE     = 8;
        const IGNORE_CASE = 16;
        const NEWLINE     = 32;
        const EXACT       = 64;
        const NOT_EMPTY   = 128;
        const REVERSE     = 256;
        const WORDS       = 512;
        const NOT_BOL     = 1024;
        const NOT_EOL     = 2048;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_match_the_external_contract() {
        assert_eq!(Mode::NORMAL.bits(), 0);
        assert_eq!(Mode::UNICODE.bits(), 1);
        assert_eq!(Mode::CAPTURE.bits(), 8);
        assert_eq!(Mode::IGNORE_CASE.bits(), 16);
        assert_eq!(Mode::REVERSE.bits(), 256);
        assert_eq!(Mode::NOT_EOL.bits(), 2048);
    }
}
