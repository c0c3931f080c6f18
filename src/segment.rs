use serde::Serialize;

/// A render-ready unit of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    /// Prose with markdown already translated into structural markup.
    Text { markup: String },
    /// A math expression with its delimiters stripped.
    Math { expression: String, block: bool },
}

impl Segment {
    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text { .. })
    }
}

/// What the scanner decided a span of the normalized input is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Text,
    Math { expression: String, block: bool },
}

/// A classified slice of the normalized input.
///
/// `source` is the exact input text the span covers, delimiters included, so
/// concatenating every span's source reproduces the scanned string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpan<'a> {
    pub kind: SpanKind,
    pub source: &'a str,
}

impl<'a> RawSpan<'a> {
    pub fn text(source: &'a str) -> Self {
        Self {
            kind: SpanKind::Text,
            source,
        }
    }

    pub fn math(source: &'a str, expression: String, block: bool) -> Self {
        Self {
            kind: SpanKind::Math { expression, block },
            source,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == SpanKind::Text
    }
}
