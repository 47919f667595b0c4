//! Formatting of embedded PHP fragments (directive arguments).
//!
//! Formatters never fail: when a fragment cannot be handled they
//! hand back the original text, trimmed.

use tracing::debug;

/// Best-effort reformatting of an embedded source fragment.
pub trait EmbeddedFormatter {
    /// Return `fragment` reformatted, or unchanged (trimmed) when it
    /// cannot be formatted.
    fn format(&self, fragment: &str) -> String;
}

/// Returns fragments untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl EmbeddedFormatter for Passthrough {
    fn format(&self, fragment: &str) -> String {
        fragment.to_string()
    }
}

/// Whitespace normalizer for PHP expressions.
///
/// Outside string literals, runs of whitespace collapse to one space
/// and every comma is followed by exactly one space. Fragments with
/// unterminated strings, unbalanced brackets, or `//` and `#` line
/// comments are returned trimmed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpFragmentFormatter;

impl EmbeddedFormatter for PhpFragmentFormatter {
    fn format(&self, fragment: &str) -> String {
        normalize(fragment).unwrap_or_else(|| {
            debug!(fragment, "embedded fragment left as is");
            fragment.trim().to_string()
        })
    }
}

fn normalize(fragment: &str) -> Option<String> {
    let mut out = String::with_capacity(fragment.len());
    let mut brackets = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    for ch in fragment.trim().chars() {
        if let Some(q) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }

        // Line comments end at a newline, which collapsing would drop.
        if ch == '#' || (ch == '/' && !pending_space && out.ends_with('/')) {
            return None;
        }

        let closes = matches!(ch, ',' | ')' | ']');
        if pending_space && !out.is_empty() && !out.ends_with(' ') && !closes {
            out.push(' ');
        }
        pending_space = false;

        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => brackets.push(ch),
            ')' | ']' | '}' => {
                let open = brackets.pop()?;
                if !matches!((open, ch), ('(', ')') | ('[', ']') | ('{', '}')) {
                    return None;
                }
            }
            _ => {}
        }

        out.push(ch);
        if ch == ',' {
            out.push(' ');
        }
    }

    if quote.is_some() || !brackets.is_empty() {
        return None;
    }
    Some(out.trim_end().to_string())
}
