mod config;
mod error;
mod markup;
mod normalize;
mod render;
mod scanner;
mod segment;

pub use config::{Config, DEFAULT_CONFIG, Delimiter, Grammar, RenderConfig};
pub use error::{ConfigError, RenderError};
pub use markup::{group_and_translate, translate};
pub use normalize::normalize;
pub use render::{MathRenderer, MathmlRenderer, segments_to_html};
pub use scanner::{Scanner, clean_expression, segment};
pub use segment::{RawSpan, Segment, SpanKind};

/// Body the answer service sends when the picture holds no math problem.
pub const NOT_A_MATH_PROBLEM: &str = "This is not a math problem";

/// A classified response from the answer service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    NotMath,
    Solution(Vec<Segment>),
}

/// Convert a raw answer into render-ready segments using the default grammar.
pub fn parse(raw: &str) -> Vec<Segment> {
    parse_with_config(raw, &Config::default())
}

/// Convert a raw answer into render-ready segments.
pub fn parse_with_config(raw: &str, config: &Config) -> Vec<Segment> {
    let normalized = normalize(raw);
    group_and_translate(segment(&normalized, &config.grammar))
}

/// Classify a response body and segment it if it is an answer.
pub fn process_response(body: &str, config: &Config) -> Answer {
    if body.trim() == NOT_A_MATH_PROBLEM {
        log::debug!("answer service reported a non-math image");
        return Answer::NotMath;
    }
    Answer::Solution(parse_with_config(body, config))
}

/// Convert a raw answer to an HTML fragment using default config.
pub fn answer_to_html(raw: &str) -> String {
    answer_to_html_with_config(raw, &Config::default())
}

/// Convert a raw answer to an HTML fragment with custom config.
pub fn answer_to_html_with_config(raw: &str, config: &Config) -> String {
    let segments = parse_with_config(raw, config);
    segments_to_html(&segments, &MathmlRenderer, &config.render)
}
