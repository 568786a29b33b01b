//! REX-backed find/replace, wired through `core-config`'s `[search]` defaults.
//!
//! `find_in_active_buffer` is the controller entry point spec.md:35 describes
//! ("REX is a library consumed by the controller for find/replace
//! operations"): it resolves `core_config::SearchConfig` into `FindFlags`
//! and hands the active buffer's linear text to `core_text::search::find_text`.

use core_config::{RegexMode, SearchConfig};
use core_state::EditorState;
use core_text::search::{find_text, FindFlags};

#[derive(Debug, Clone)]
pub struct FindRequest<'a> {
    pub pattern: &'a str,
    pub start: usize,
    pub backward: bool,
    pub wrap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOutcome {
    pub start: usize,
    pub end: usize,
}

fn flags_from_config(cfg: &SearchConfig, backward: bool, wrap: bool) -> FindFlags {
    let mut flags = FindFlags::empty();
    if cfg.ignore_case {
        flags |= FindFlags::IGNORE_CASE;
    }
    if cfg.regex_or_verbatim == RegexMode::Verbatim {
        flags |= FindFlags::VERBATIM;
    }
    if backward {
        flags |= FindFlags::BACKWARD;
    }
    if wrap {
        flags |= FindFlags::WRAP;
    }
    flags
}

/// Search the active buffer for `req.pattern`, honoring `cfg`'s default
/// case-sensitivity and regex-vs-verbatim mode. Returns `Ok(None)` when the
/// pattern isn't found (not an error: a routine "no match" outcome), and
/// propagates malformed-pattern errors from the REX engine.
pub fn find_in_active_buffer(
    state: &EditorState,
    cfg: &SearchConfig,
    req: &FindRequest<'_>,
) -> Result<Option<FindOutcome>, core_rex::Error> {
    let flags = flags_from_config(cfg, req.backward, req.wrap);
    let buffer = state.active_buffer();
    let found = find_text(buffer, req.pattern, req.start, flags)?;
    Ok(found.map(|(start, end)| FindOutcome { start, end }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;

    fn state_with(text: &str) -> EditorState {
        EditorState::new(Buffer::from_str("t", text).unwrap())
    }

    #[test]
    fn finds_forward_with_default_config() {
        let state = state_with("the quick brown fox");
        let cfg = SearchConfig::default();
        let req = FindRequest {
            pattern: "quick",
            start: 0,
            backward: false,
            wrap: false,
        };
        let outcome = find_in_active_buffer(&state, &cfg, &req).unwrap().unwrap();
        assert_eq!((outcome.start, outcome.end), (4, 9));
    }

    #[test]
    fn ignore_case_config_matches_mixed_case() {
        let state = state_with("Quick Fox");
        let mut cfg = SearchConfig::default();
        cfg.ignore_case = true;
        let req = FindRequest {
            pattern: "quick",
            start: 0,
            backward: false,
            wrap: false,
        };
        let outcome = find_in_active_buffer(&state, &cfg, &req).unwrap().unwrap();
        assert_eq!((outcome.start, outcome.end), (0, 5));
    }

    #[test]
    fn verbatim_mode_treats_pattern_literally() {
        let state = state_with("a.b.c");
        let mut cfg = SearchConfig::default();
        cfg.regex_or_verbatim = RegexMode::Verbatim;
        let req = FindRequest {
            pattern: "a.b",
            start: 0,
            backward: false,
            wrap: false,
        };
        let outcome = find_in_active_buffer(&state, &cfg, &req).unwrap().unwrap();
        assert_eq!((outcome.start, outcome.end), (0, 3));
    }

    #[test]
    fn no_match_returns_none_not_error() {
        let state = state_with("hello world");
        let cfg = SearchConfig::default();
        let req = FindRequest {
            pattern: "xyz",
            start: 0,
            backward: false,
            wrap: false,
        };
        assert!(find_in_active_buffer(&state, &cfg, &req).unwrap().is_none());
    }
}
