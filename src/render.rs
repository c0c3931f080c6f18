use html_escape::encode_text;
use pulldown_latex::config::DisplayMode;
use pulldown_latex::mathml::push_mathml;
use pulldown_latex::{Parser, Storage};

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::segment::Segment;

/// Turns a math expression into displayable output.
pub trait MathRenderer {
    fn render_math(&self, expression: &str, block: bool) -> Result<String, RenderError>;
}

/// Renders LaTeX to MathML.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathmlRenderer;

impl MathRenderer for MathmlRenderer {
    fn render_math(&self, expression: &str, block: bool) -> Result<String, RenderError> {
        let storage = Storage::new();
        let parser = Parser::new(expression, &storage);
        let mut config: pulldown_latex::RenderConfig = Default::default();
        config.display_mode = if block {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        };

        let mut mathml = String::new();
        push_mathml(&mut mathml, parser, config).map_err(|e| RenderError::Math {
            expression: expression.to_string(),
            message: e.to_string(),
        })?;

        // Parse errors are written into the output rather than returned
        if mathml.contains("<merror") || mathml.contains("parsing error") {
            return Err(RenderError::Math {
                expression: expression.to_string(),
                message: "invalid LaTeX".to_string(),
            });
        }
        Ok(mathml)
    }
}

/// Render segments to an HTML fragment.
///
/// Text markup is emitted as is. Math that fails to render is shown as its
/// original delimited source in the configured error color.
pub fn segments_to_html(
    segments: &[Segment],
    renderer: &dyn MathRenderer,
    config: &RenderConfig,
) -> String {
    let mut out = String::new();

    for segment in segments {
        match segment {
            Segment::Text { markup } => {
                out.push_str(markup);
                out.push('\n');
            }
            Segment::Math { expression, block } => {
                emit_math(expression, *block, renderer, config, &mut out);
            }
        }
    }

    out
}

fn emit_math(
    expression: &str,
    block: bool,
    renderer: &dyn MathRenderer,
    config: &RenderConfig,
    out: &mut String,
) {
    let (tag, class) = if block {
        ("div", config.block_math_class.as_str())
    } else {
        ("span", config.math_class.as_str())
    };

    match renderer.render_math(expression, block) {
        Ok(rendered) => {
            out.push_str(&format!("<{tag} class=\"{class}\">{rendered}</{tag}>"));
        }
        Err(e) => {
            log::warn!("{}", e);
            let delimiter = if block { "$$" } else { "$" };
            out.push_str(&format!(
                "<{tag} class=\"{class}\" style=\"color: {}\">{}{}{}</{tag}>",
                config.error_color,
                delimiter,
                encode_text(expression),
                delimiter
            ));
        }
    }

    if block {
        out.push('\n');
    }
}
