use crate::config::{Delimiter, Grammar};
use crate::segment::RawSpan;

/// Split normalized text into text and math spans.
pub fn segment<'s>(text: &'s str, grammar: &Grammar) -> Vec<RawSpan<'s>> {
    let spans: Vec<RawSpan<'s>> = Scanner::new(text, grammar).collect();
    log::debug!("scanned {} bytes into {} spans", text.len(), spans.len());
    spans
}

/// Single left-to-right pass over the input yielding [`RawSpan`]s.
///
/// Text spans are maximal: two text spans are never yielded back to back.
/// Rejected math candidates (empty or unterminated delimiters) are folded
/// into the surrounding text.
pub struct Scanner<'g, 's> {
    grammar: &'g Grammar,
    input: &'s str,
    pos: usize,
    queued: Option<RawSpan<'s>>,
}

/// Outcome of trying the grammar at one offset.
struct Found {
    len: usize,
    math: Option<(String, bool)>,
}

impl Found {
    fn math(len: usize, expression: String, block: bool) -> Self {
        Self {
            len,
            math: Some((expression, block)),
        }
    }

    fn literal(len: usize) -> Self {
        Self { len, math: None }
    }
}

impl<'g, 's> Scanner<'g, 's> {
    pub fn new(input: &'s str, grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            input,
            pos: 0,
            queued: None,
        }
    }

    fn match_at(&self, pos: usize) -> Option<Found> {
        let rest = &self.input[pos..];

        for delimiter in &self.grammar.delimiters {
            if let Some(found) = match_delimited(rest, delimiter) {
                return Some(found);
            }
        }

        let first = rest.chars().next()?;
        if self.grammar.is_symbol(first) {
            return Some(Found::math(first.len_utf8(), first.to_string(), false));
        }
        if first == '\\' {
            return self.match_command(rest);
        }
        None
    }

    /// `\name` or `\name{arg}`, kept verbatim as the expression.
    fn match_command(&self, rest: &str) -> Option<Found> {
        let name_len = rest[1..]
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len() - 1);
        if name_len == 0 {
            return None;
        }
        let name = &rest[1..1 + name_len];
        if !self.grammar.allows_command(name) {
            return None;
        }

        let mut len = 1 + name_len;
        if self.grammar.command_arguments
            && rest[len..].starts_with('{')
            && let Some(close) = rest[len..].find('}')
        {
            len += close + 1;
        }
        Some(Found::math(len, rest[..len].to_string(), false))
    }
}

impl<'s> Iterator for Scanner<'_, 's> {
    type Item = RawSpan<'s>;

    fn next(&mut self) -> Option<RawSpan<'s>> {
        if let Some(span) = self.queued.take() {
            return Some(span);
        }

        let start = self.pos;
        while self.pos < self.input.len() {
            let at = self.pos;
            match self.match_at(at) {
                Some(Found {
                    len,
                    math: Some((expression, block)),
                }) => {
                    self.pos = at + len;
                    let span = RawSpan::math(&self.input[at..self.pos], expression, block);
                    if at > start {
                        self.queued = Some(span);
                        return Some(RawSpan::text(&self.input[start..at]));
                    }
                    return Some(span);
                }
                Some(Found { len, math: None }) => {
                    self.pos = at + len;
                }
                None => {
                    let step = self.input[at..].chars().next().map_or(1, char::len_utf8);
                    self.pos = at + step;
                }
            }
        }

        if self.pos > start {
            Some(RawSpan::text(&self.input[start..self.pos]))
        } else {
            None
        }
    }
}

fn match_delimited(rest: &str, delimiter: &Delimiter) -> Option<Found> {
    // An empty opener matches everywhere without consuming input
    if delimiter.open.is_empty() {
        return None;
    }
    let body = rest.strip_prefix(delimiter.open.as_str())?;
    let close = body.find(delimiter.close.as_str())?;
    let len = delimiter.open.len() + close + delimiter.close.len();

    let expression = clean_expression(&body[..close]);
    if expression.is_empty() {
        Some(Found::literal(len))
    } else {
        Some(Found::math(len, expression, delimiter.block))
    }
}

/// Tidy the content of a delimited math span.
///
/// Upstream answers often arrive double-escaped, so `\\` becomes `\`,
/// `\newline` and stray `\n` escapes are removed, and whitespace is collapsed.
/// A `\n` followed by a letter is a command (`\nu`, `\neq`) and is kept.
pub fn clean_expression(content: &str) -> String {
    let s = content.trim().replace("\\\\", "\\").replace("\\newline", "");
    let s = strip_newline_escapes(&s);
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_newline_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(idx) = rest.find("\\n") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 2..];
        if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.push_str("\\n");
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SpanKind;

    fn scan(text: &str) -> Vec<RawSpan<'_>> {
        segment(text, &Grammar::default())
    }

    fn math(expression: &str, block: bool) -> SpanKind {
        SpanKind::Math {
            expression: expression.to_string(),
            block,
        }
    }

    fn kinds(spans: &[RawSpan<'_>]) -> Vec<SpanKind> {
        spans.iter().map(|s| s.kind.clone()).collect()
    }

    fn rejoin(spans: &[RawSpan<'_>]) -> String {
        spans.iter().map(|s| s.source).collect()
    }

    #[test]
    fn empty_input() {
        assert!(scan("").is_empty());
    }

    #[test]
    fn plain_text() {
        let spans = scan("just words");
        assert_eq!(spans, vec![RawSpan::text("just words")]);
    }

    #[test]
    fn inline_math_between_text() {
        let spans = scan("a $x+y$ b");
        assert_eq!(
            spans,
            vec![
                RawSpan::text("a "),
                RawSpan::math("$x+y$", "x+y".to_string(), false),
                RawSpan::text(" b"),
            ]
        );
    }

    #[test]
    fn block_math() {
        assert_eq!(kinds(&scan("$$x^2$$")), vec![math("x^2", true)]);
        assert_eq!(kinds(&scan("$x^2$")), vec![math("x^2", false)]);
    }

    #[test]
    fn block_is_tried_before_inline() {
        let spans = scan("$$a$$ and $b$");
        assert_eq!(
            kinds(&spans),
            vec![math("a", true), SpanKind::Text, math("b", false)]
        );
    }

    #[test]
    fn block_math_may_contain_single_dollar() {
        assert_eq!(kinds(&scan("$$\\$5$$")), vec![math("\\$5", true)]);
    }

    #[test]
    fn empty_delimiters_stay_text() {
        assert_eq!(scan("$$ $$"), vec![RawSpan::text("$$ $$")]);
        assert_eq!(scan("$ $"), vec![RawSpan::text("$ $")]);
        assert_eq!(scan("a $$ b"), vec![RawSpan::text("a $$ b")]);
    }

    #[test]
    fn unterminated_dollar_is_text() {
        assert_eq!(scan("costs $5 total"), vec![RawSpan::text("costs $5 total")]);
    }

    #[test]
    fn unterminated_dollar_before_valid_math() {
        let spans = scan("$$a then $b$");
        // the unterminated `$$` degrades to literal text
        assert_eq!(
            spans,
            vec![
                RawSpan::text("$$a then "),
                RawSpan::math("$b$", "b".to_string(), false),
            ]
        );
    }

    #[test]
    fn whitelist_symbol() {
        let spans = scan("∫ f dx");
        assert_eq!(
            spans,
            vec![RawSpan::math("∫", "∫".to_string(), false), RawSpan::text(" f dx")]
        );
    }

    #[test]
    fn greek_letters_are_whole_code_points() {
        let spans = scan("let θ=π");
        assert_eq!(
            kinds(&spans),
            vec![SpanKind::Text, math("θ", false), SpanKind::Text, math("π", false)]
        );
        assert_eq!(spans[1].source, "θ");
        assert_eq!(rejoin(&spans), "let θ=π");
    }

    #[test]
    fn other_unicode_is_text() {
        assert_eq!(scan("naïve Ω ≈ 3"), vec![RawSpan::text("naïve Ω ≈ 3")]);
    }

    #[test]
    fn command_with_argument() {
        let spans = scan("take \\sqrt{2} now");
        assert_eq!(
            spans,
            vec![
                RawSpan::text("take "),
                RawSpan::math("\\sqrt{2}", "\\sqrt{2}".to_string(), false),
                RawSpan::text(" now"),
            ]
        );
    }

    #[test]
    fn command_argument_closes_at_first_brace() {
        let spans = scan("\\frac{a}{b}");
        assert_eq!(
            kinds(&spans),
            vec![math("\\frac{a}", false), SpanKind::Text]
        );
        assert_eq!(rejoin(&spans), "\\frac{a}{b}");
    }

    #[test]
    fn command_without_argument() {
        assert_eq!(
            kinds(&scan("x \\to y")),
            vec![SpanKind::Text, math("\\to", false), SpanKind::Text]
        );
        assert_eq!(
            kinds(&scan("\\alpha{ unclosed")),
            vec![math("\\alpha", false), SpanKind::Text]
        );
    }

    #[test]
    fn lone_backslash_is_text() {
        assert_eq!(scan("a \\ b \\1"), vec![RawSpan::text("a \\ b \\1")]);
    }

    #[test]
    fn delimited_content_is_cleaned() {
        assert_eq!(
            kinds(&scan("$$ a \\\\cdot b \\\\newline c $$")),
            vec![math("a \\cdot b c", true)]
        );
        assert_eq!(kinds(&scan("$x\\n + \\nu$")), vec![math("x + \\nu", false)]);
    }

    #[test]
    fn delimiter_with_only_a_newline_command_is_text() {
        assert_eq!(scan("$\\newline$"), vec![RawSpan::text("$\\newline$")]);
    }

    #[test]
    fn symbols_and_commands_inside_dollars_stay_in_one_span() {
        assert_eq!(
            kinds(&scan("$\\int_0^1 π x$")),
            vec![math("\\int_0^1 π x", false)]
        );
    }

    #[test]
    fn delimited_only_grammar_ignores_implicit_math() {
        let spans = segment("\\alpha + ∫ + $x$", &Grammar::delimited_only());
        assert_eq!(kinds(&spans), vec![SpanKind::Text, math("x", false)]);
    }

    #[test]
    fn symbol_grammar_ignores_commands() {
        let spans = segment("\\alpha + ∫", &Grammar::with_symbols());
        assert_eq!(kinds(&spans), vec![SpanKind::Text, math("∫", false)]);
    }

    #[test]
    fn command_whitelist() {
        let grammar = Grammar {
            command_whitelist: vec!["frac".to_string()],
            ..Grammar::default()
        };
        let spans = segment("\\textbf{hi} \\frac{1}", &grammar);
        assert_eq!(kinds(&spans), vec![SpanKind::Text, math("\\frac{1}", false)]);
    }

    #[test]
    fn custom_delimiters() {
        let grammar = Grammar {
            delimiters: vec![
                Delimiter::new("\\[", "\\]", true),
                Delimiter::new("\\(", "\\)", false),
            ],
            ..Grammar::delimited_only()
        };
        let spans = segment("a \\(x\\) b \\[y\\]", &grammar);
        assert_eq!(
            kinds(&spans),
            vec![SpanKind::Text, math("x", false), SpanKind::Text, math("y", true)]
        );
    }

    #[test]
    fn text_spans_are_never_adjacent() {
        let spans = scan("$ $ mid $$ $$ end $");
        assert_eq!(spans.len(), 1);
        assert!(spans[0].is_text());
    }

    #[test]
    fn spans_cover_the_input() {
        for input in [
            "a $x+y$ b",
            "$$x^2$$",
            "∫∑ \\alpha\\beta{x} $ $ $$ $$ tail $",
            "price: $5, $10 and $$",
            "θ",
        ] {
            assert_eq!(rejoin(&scan(input)), input);
        }
    }

    #[test]
    fn empty_opener_is_never_a_match() {
        let grammar = Grammar {
            delimiters: vec![Delimiter::new("", "", false), Delimiter::new("", "$", true)],
            ..Grammar::default()
        };
        assert_eq!(segment("ab", &grammar), vec![RawSpan::text("ab")]);
        assert_eq!(kinds(&segment("a π", &grammar)), vec![SpanKind::Text, math("π", false)]);
    }

    #[test]
    fn bare_newline_escapes_are_dropped() {
        assert_eq!(clean_expression("a\\n2"), "a2");
        assert_eq!(clean_expression("x^2\\n"), "x^2");
        assert_eq!(clean_expression("\\nabla f"), "\\nabla f");
    }

    #[test]
    fn iterator_is_lazy() {
        let grammar = Grammar::default();
        let mut scanner = Scanner::new("a $b$ c", &grammar);
        assert_eq!(scanner.next(), Some(RawSpan::text("a ")));
        assert_eq!(scanner.next().map(|s| s.source), Some("$b$"));
        assert_eq!(scanner.next(), Some(RawSpan::text(" c")));
        assert_eq!(scanner.next(), None);
    }
}
