//! Grouping of scanned spans and the markdown-to-markup rewriter.
//!
//! Text spans between two math spans are merged into one unit, then the unit
//! is rewritten by a fixed, ordered list of rules. Each rule is one global
//! substitution over the whole unit; later rules see the output of earlier
//! ones. Anything the rules do not recognise is left as literal text.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::segment::{RawSpan, Segment, SpanKind};

/// Tags that count as block-level structure for the paragraph rule.
const BLOCK_TAGS: [&str; 6] = ["<h1>", "<h2>", "<h3>", "<h4>", "<ul>", "<p>"];

enum Rewrite {
    /// Plain `regex` replacement template.
    Template(&'static str),
    /// Wrap capture 1 in the tag, unless that would cross a tag boundary.
    Wrap(&'static str),
}

struct Rule {
    pattern: Regex,
    rewrite: Rewrite,
}

impl Rule {
    fn new(pattern: &str, rewrite: Rewrite) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid markdown rule"),
            rewrite,
        }
    }

    fn apply(&self, text: &str) -> String {
        match self.rewrite {
            Rewrite::Template(template) => self.pattern.replace_all(text, template).into_owned(),
            Rewrite::Wrap(tag) => self
                .pattern
                .replace_all(text, |caps: &Captures| {
                    let whole = caps.get(0).map_or(0..0, |m| m.range());
                    let inner = &caps[1];
                    // A marker touching another asterisk is part of a longer run
                    let touches_marker = text[..whole.start].ends_with('*')
                        || text[whole.end..].starts_with('*');
                    if !touches_marker && tags_balanced(inner) {
                        format!("<{tag}>{inner}</{tag}>")
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned(),
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // **X**, shortest match. A third asterisk on either side is left
        // outside so `***X***` nests as emphasis around strong.
        Rule::new(
            r"\*\*(\*?)(.+?)(\*?)\*\*",
            Rewrite::Template("${1}<strong>${2}</strong>${3}"),
        ),
        // *X* where X has no asterisk and does not start or end with whitespace.
        Rule::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*", Rewrite::Wrap("em")),
        Rule::new(r"(?m)^[^\S\n]*#### (.*)$", Rewrite::Template("<h4>${1}</h4>")),
        Rule::new(r"(?m)^[^\S\n]*### (.*)$", Rewrite::Template("<h3>${1}</h3>")),
        Rule::new(r"(?m)^[^\S\n]*## (.*)$", Rewrite::Template("<h2>${1}</h2>")),
        Rule::new(r"(?m)^[^\S\n]*# (.*)$", Rewrite::Template("<h1>${1}</h1>")),
        Rule::new(r"(?m)^[^\S\n]*\* (\S.*)$", Rewrite::Template("<li>${1}</li>")),
        // One container around each run of consecutive list items
        Rule::new(
            r"(?m)^<li>.*</li>(?:\n<li>.*</li>)*",
            Rewrite::Template("<ul>${0}</ul>"),
        ),
    ]
});

/// Merge runs of text spans and translate each run to markup.
///
/// Math spans pass through untouched. A text run that is only whitespace is
/// dropped, so the output never holds an empty text segment and never holds
/// two text segments side by side.
pub fn group_and_translate<'a, I>(spans: I) -> Vec<Segment>
where
    I: IntoIterator<Item = RawSpan<'a>>,
{
    let mut segments = Vec::new();
    let mut buffer = String::new();

    for span in spans {
        match span.kind {
            SpanKind::Text => buffer.push_str(span.source),
            SpanKind::Math { expression, block } => {
                flush_text(&mut buffer, &mut segments);
                segments.push(Segment::Math { expression, block });
            }
        }
    }
    flush_text(&mut buffer, &mut segments);

    log::debug!("grouped spans into {} segments", segments.len());
    segments
}

fn flush_text(buffer: &mut String, segments: &mut Vec<Segment>) {
    if !buffer.trim().is_empty() {
        segments.push(Segment::Text {
            markup: translate(buffer),
        });
    }
    buffer.clear();
}

/// Translate one unit of markdown-flavoured text into markup.
pub fn translate(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    let mut out = escaped.into_owned();
    for rule in RULES.iter() {
        out = rule.apply(&out);
    }

    if BLOCK_TAGS.iter().any(|tag| out.starts_with(tag)) {
        out
    } else {
        format!("<p>{out}</p>")
    }
}

/// Whether every tag opened in `s` is closed in `s`, in order.
fn tags_balanced(s: &str) -> bool {
    let mut open = Vec::new();
    let mut rest = s;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            return false;
        };
        let tag = &rest[start + 1..start + len];
        if let Some(name) = tag.strip_prefix('/') {
            if open.pop() != Some(name) {
                return false;
            }
        } else {
            open.push(tag);
        }
        rest = &rest[start + len + 1..];
    }
    open.is_empty()
}
