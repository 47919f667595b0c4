//! Directive vocabulary and name/argument extraction.
//!
//! Both tree builders consult [`classify`] once per directive token
//! and read names and arguments through [`split`], so the two front
//! ends cannot disagree on what a directive is.

/// How a directive name behaves when it opens a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Always opens a block closed by `@end<name>`.
    Block,
    /// Opens a block only when called without an argument (`@php`).
    BareBlock,
    /// Opens a block only when called with an argument (`@empty(...)`).
    CallBlock,
    /// Opens a raw span closed by `@endverbatim`.
    Verbatim,
}

/// Resolved role of one directive occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveClass {
    Inline,
    Block,
    Verbatim,
}

const VOCABULARY: &[(&str, Shape)] = &[
    ("if", Shape::Block),
    ("for", Shape::Block),
    ("foreach", Shape::Block),
    ("forelse", Shape::Block),
    ("unless", Shape::Block),
    ("while", Shape::Block),
    ("isset", Shape::Block),
    ("empty", Shape::CallBlock),
    ("auth", Shape::Block),
    ("guest", Shape::Block),
    ("production", Shape::Block),
    ("env", Shape::Block),
    ("hasSection", Shape::Block),
    ("sectionMissing", Shape::Block),
    ("switch", Shape::Block),
    ("once", Shape::Block),
    ("verbatim", Shape::Verbatim),
    ("error", Shape::Block),
    ("push", Shape::Block),
    ("prepend", Shape::Block),
    ("php", Shape::BareBlock),
];

const CLOSING_PREFIX: &str = "end";

/// Look up the block shape of a directive name. Names are matched
/// case-sensitively; custom directives are never blocks.
#[must_use]
pub fn shape(name: &str) -> Option<Shape> {
    VOCABULARY
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(_, shape)| shape)
}

/// Decide whether a directive with the given name and argument opens
/// a block, a verbatim span, or stands alone.
///
/// An argument that is not paren-balanced on its own (a token that
/// folded two chained calls) never opens a block.
#[must_use]
pub fn classify(name: &str, argument: &str) -> DirectiveClass {
    let Some(shape) = shape(name) else {
        return DirectiveClass::Inline;
    };
    if !is_balanced(argument) {
        return DirectiveClass::Inline;
    }
    match shape {
        Shape::Block => DirectiveClass::Block,
        Shape::BareBlock if argument.is_empty() => DirectiveClass::Block,
        Shape::CallBlock if !argument.is_empty() => DirectiveClass::Block,
        Shape::Verbatim => DirectiveClass::Verbatim,
        Shape::BareBlock | Shape::CallBlock => DirectiveClass::Inline,
    }
}

/// Name of the directive that closes a block opened by `name`.
#[must_use]
pub fn closing_name(name: &str) -> String {
    format!("{CLOSING_PREFIX}{name}")
}

/// Whether `name` looks like a block closer (`endif`, `endforeach`).
#[must_use]
pub fn is_closing(name: &str) -> bool {
    name.starts_with(CLOSING_PREFIX)
}

/// Split a directive's raw text into its name and argument.
///
/// The name runs from after the first `@` to the first `(`, or to
/// the first whitespace when there is no `(`. The argument is the raw
/// text with `@name` removed, trimmed, and with one outer `(`/`)`
/// pair stripped when both are present.
#[must_use]
pub fn split(raw: &str) -> (String, String) {
    let after = raw.find('@').map_or(raw, |i| &raw[i + 1..]);
    let name = match after.find('(') {
        Some(i) => &after[..i],
        None => after
            .split(char::is_whitespace)
            .next()
            .unwrap_or_default(),
    }
    .trim()
    .to_string();

    let rest = raw.replacen(&format!("@{name}"), "", 1);
    let rest = rest.trim();
    let argument = rest
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(rest);

    (name, argument.to_string())
}

/// Whether parens in `text` balance, ignoring quoted strings.
#[must_use]
pub fn is_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }

    depth == 0 && quote.is_none()
}
