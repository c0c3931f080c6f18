use std::sync::LazyLock;

use regex::Regex;

// Three or more newlines, possibly with blank-ish lines in between.
static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[^\S\n]*\n){2,}").expect("valid regex"));
static NEWLINE_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[^\S\n]+").expect("valid regex"));
static TRAILING_SPACE_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+\n").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Flatten an upstream answer onto a single line.
///
/// Literal `\n` escapes and real newlines become single spaces and runs of
/// whitespace collapse to one space. Leading and trailing whitespace is kept.
/// The output never contains a `'\n'`.
pub fn normalize(raw: &str) -> String {
    let s = raw.replace("\\n", " ");
    let s = NEWLINE_RUN.replace_all(&s, " ");
    let s = NEWLINE_INDENT.replace_all(&s, " ");
    let s = TRAILING_SPACE_NEWLINE.replace_all(&s, " ");
    let s = s.replace('\n', " ");
    WHITESPACE_RUN.replace_all(&s, " ").into_owned()
}
