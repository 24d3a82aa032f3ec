//! Format string parsing
//!
//! A format string is literal text with `${ expr }` interpolations.
//! Parsing happens once; the discovery and substitution passes evaluate
//! the same parsed representation.

use crate::expr::Expr;

/// One segment of a parsed format string.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Literal text copied to the output verbatim.
    Literal(String),
    /// An interpolated expression.
    Expr(Expr),
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatString {
    raw: String,
    parts: Vec<Part>,
}

impl FormatString {
    /// Parse a format string, extracting `${ ... }` interpolations.
    ///
    /// The scanner is quote-aware inside interpolations so that braces
    /// within string literals do not terminate the expression.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = input.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c == '$' && chars.peek().map(|(_, next)| *next) == Some('{') {
                chars.next();
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                let expr_text = scan_interpolation(&mut chars)?;
                let expr = Expr::parse(&expr_text)?;
                parts.push(Part::Expr(expr));
            } else {
                literal.push(c);
            }
        }

        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Ok(Self {
            raw: input.to_string(),
            parts,
        })
    }

    /// The original format string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed segments in order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Whether this format string contains any interpolation.
    pub fn has_interpolations(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, Part::Expr(_)))
    }
}

/// Consume characters up to the closing `}` of an interpolation.
fn scan_interpolation(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Result<String, String> {
    let mut text = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (_, c) in chars.by_ref() {
        if let Some(q) = quote {
            text.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
        } else {
            match c {
                '}' => return Ok(text),
                '\'' | '"' => {
                    quote = Some(c);
                    text.push(c);
                }
                _ => text.push(c),
            }
        }
    }

    Err("unterminated interpolation, missing '}'".to_string())
}
