use core_rex::{Mode, Program};

fn find(pattern: &str, mode: Mode, subject: &str) -> Option<(usize, usize)> {
    let program = Program::compile(pattern, mode).unwrap();
    program.search(subject, 0, subject.len(), mode).map(|c| c[0].unwrap())
}

#[test]
fn digit_run_search() {
    assert_eq!(find(r"\d+", Mode::NORMAL, "order #482 shipped"), Some((7, 10)));
}

#[test]
fn alternation_capture_group() {
    let program = Program::compile("(a|b)+", Mode::CAPTURE).unwrap();
    let caps = program.search("cabba", 0, 5, Mode::CAPTURE).unwrap();
    assert_eq!(caps[0], Some((1, 5)));
    assert_eq!(caps[1], Some((4, 5)));
}

#[test]
fn lazy_quantifier_stops_at_first_opportunity() {
    assert_eq!(find("a*?b", Mode::NORMAL, "aaab"), Some((0, 4)));
    assert_eq!(find("<.*?>", Mode::NORMAL, "<a><b>"), Some((0, 3)));
}

#[test]
fn possessive_quantifier_refuses_to_backtrack() {
    assert!(find("a*+b", Mode::NORMAL, "aaab").is_some());
    assert!(find("a*+a", Mode::NORMAL, "aaa").is_none());
}

#[test]
fn newline_mode_changes_dot_semantics() {
    assert!(find("a.b", Mode::NORMAL, "a\nb").is_none());
    assert!(find("a.b", Mode::NEWLINE, "a\nb").is_some());
}

#[test]
fn backreference_matches_a_repeated_word() {
    let program = Program::compile(r"(\w+)\s\1", Mode::CAPTURE).unwrap();
    assert!(program.search("la la land", 0, 10, Mode::CAPTURE).is_some());
    assert!(program.search("la land", 0, 7, Mode::CAPTURE).is_none());
}

#[test]
fn leftmost_match_wins_on_forward_scan() {
    assert_eq!(find("a", Mode::NORMAL, "banana"), Some((1, 2)));
}

#[test]
fn rightmost_match_wins_on_reverse_scan() {
    let program = Program::compile("a", Mode::NORMAL).unwrap();
    let subject = "banana";
    let caps = program.search(subject, subject.len(), 0, Mode::NORMAL).unwrap();
    assert_eq!(caps[0], Some((5, 6)));
}

#[test]
fn not_empty_mode_rejects_a_zero_width_match() {
    let program = Program::compile("x*", Mode::NOT_EMPTY).unwrap();
    assert!(program.search("yyy", 0, 3, Mode::NOT_EMPTY).is_none());
    assert!(program.search("yxxy", 0, 4, Mode::NOT_EMPTY).is_some());
}

#[test]
fn atomic_group_does_not_leak_backtracking() {
    assert!(find("(?>a*)a", Mode::NORMAL, "aaa").is_none());
    assert!(find("(?:a*)a", Mode::NORMAL, "aaa").is_some());
}

#[test]
fn lookahead_asserts_without_consuming() {
    assert_eq!(find(r"foo(?=bar)", Mode::NORMAL, "foobar"), Some((0, 3)));
    assert!(find(r"foo(?=bar)", Mode::NORMAL, "foobaz").is_none());
}

#[test]
fn lookbehind_asserts_without_consuming() {
    assert_eq!(find(r"(?<=foo)bar", Mode::NORMAL, "foobar"), Some((3, 6)));
    assert!(find(r"(?<=foo)bar", Mode::NORMAL, "bazbar").is_none());
}

#[test]
fn counted_repeat_bounds_are_honored() {
    assert!(find("a{2,3}", Mode::NORMAL, "a").is_none());
    assert_eq!(find("a{2,3}", Mode::NORMAL, "aaaa"), Some((0, 3)));
}

#[test]
fn ignore_case_folds_ascii_literals() {
    assert!(find("hello", Mode::IGNORE_CASE, "HELLO world").is_some());
}

#[test]
fn word_boundary_respects_underscore_as_word_char() {
    assert_eq!(find(r"\bcat\b", Mode::NORMAL, "concatenate cat"), Some((12, 15)));
}

#[test]
fn substitute_expands_whole_match_and_captures() {
    let program = Program::compile(r"(\d{4})-(\d{2})-(\d{2})", Mode::CAPTURE).unwrap();
    let subject = "seen on 2024-03-09 again";
    let caps = program.search(subject, 0, subject.len(), Mode::CAPTURE).unwrap();
    assert_eq!(program.substitute(subject, &caps, r"\3/\2/\1"), "09/03/2024");
}

#[test]
fn compile_or_fallback_never_panics_on_bad_syntax() {
    let (program, err) = Program::compile_or_fallback("a(b|", Mode::CAPTURE);
    assert!(err.is_some());
    assert!(program.search("a(b|", 0, 4, Mode::CAPTURE).is_none());
}
