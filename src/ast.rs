use serde::Serialize;

use crate::directive;
use crate::token::Token;

/// Root of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Document {
    pub children: Vec<Node>,
}

/// One node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Literal(Literal),
    Comment(Comment),
    Echo(Echo),
    Directive(Directive),
    DirectivePair(DirectivePair),
    Verbatim(Verbatim),
}

/// Verbatim template text. `text` is `raw` trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Literal {
    pub raw: String,
    pub text: String,
}

/// `{{-- ... --}}`. `inner` is `raw` without the delimiters, untrimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub raw: String,
    pub inner: String,
}

/// Which echo delimiters were used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoKind {
    /// `{{ ... }}`
    Escaped,
    /// `{!! ... !!}`
    Raw,
}

/// `{{ expr }}` or `{!! expr !!}`. `expression` is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Echo {
    pub raw: String,
    pub expression: String,
    pub kind: EchoKind,
}

/// A single `@name` or `@name(argument)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub raw: String,
    pub name: String,
    pub argument: String,
    pub line: usize,
}

/// A block directive with its closer and everything between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectivePair {
    pub open: Directive,
    pub close: Directive,
    pub body: Vec<Node>,
}

/// Untouched source between `@verbatim` and `@endverbatim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verbatim {
    pub raw_code: String,
}

impl Literal {
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            text: raw.trim().to_string(),
        }
    }

    /// Whitespace-only literals carry no content for a printer.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

impl Comment {
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let inner = raw
            .strip_prefix("{{--")
            .and_then(|s| s.strip_suffix("--}}"))
            .unwrap_or(raw);
        Self {
            raw: raw.to_string(),
            inner: inner.to_string(),
        }
    }

    /// Rebuild the comment from its inner text.
    #[must_use]
    pub fn to_source(&self) -> String {
        format!("{{{{--{}--}}}}", self.inner)
    }
}

impl Echo {
    #[must_use]
    pub fn from_raw(raw: &str, kind: EchoKind) -> Self {
        let (open, close) = kind.delimiters();
        let inner = raw
            .strip_prefix(open)
            .and_then(|s| s.strip_suffix(close))
            .unwrap_or(raw);
        Self {
            raw: raw.to_string(),
            expression: inner.trim().to_string(),
            kind,
        }
    }

    /// Rebuild the echo in canonical `{{ expr }}` spacing.
    #[must_use]
    pub fn to_source(&self) -> String {
        let (open, close) = self.kind.delimiters();
        format!("{open} {} {close}", self.expression)
    }
}

impl EchoKind {
    #[must_use]
    pub const fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Self::Escaped => ("{{", "}}"),
            Self::Raw => ("{!!", "!!}"),
        }
    }
}

impl Directive {
    #[must_use]
    pub fn from_raw(raw: &str, line: usize) -> Self {
        let (name, argument) = directive::split(raw);
        Self {
            raw: raw.to_string(),
            name,
            argument,
            line,
        }
    }

    #[must_use]
    pub fn from_token(token: &Token) -> Self {
        Self::from_raw(&token.raw, token.line)
    }

    /// Whether the raw text carried a parenthesized argument list,
    /// even an empty one (`@else()`).
    #[must_use]
    pub fn has_parens(&self) -> bool {
        self.raw
            .split_once(&format!("@{}", self.name))
            .is_some_and(|(_, rest)| rest.trim_start().starts_with('('))
    }
}

impl Node {
    /// Child nodes, empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::DirectivePair(pair) => &pair.body,
            _ => &[],
        }
    }
}

impl Document {
    /// Total number of nodes in the tree, excluding the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes.iter().map(|n| 1 + count(n.children())).sum()
        }
        count(&self.children)
    }

    /// Nesting depth of directive pairs; zero for a flat document.
    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    Node::DirectivePair(pair) => 1 + depth(&pair.body),
                    _ => 0,
                })
                .max()
                .unwrap_or(0)
        }
        depth(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_inner_untrimmed() {
        let c = Comment::from_raw("{{-- $test --}}");
        assert_eq!(c.inner, " $test ");
        assert_eq!(c.to_source(), c.raw);
    }

    #[test]
    fn echo_expression_trimmed() {
        let e = Echo::from_raw("{{   $name  }}", EchoKind::Escaped);
        assert_eq!(e.expression, "$name");
        assert_eq!(e.to_source(), "{{ $name }}");
    }

    #[test]
    fn raw_echo() {
        let e = Echo::from_raw("{!! $html !!}", EchoKind::Raw);
        assert_eq!(e.expression, "$html");
        assert_eq!(e.to_source(), e.raw);
    }

    #[test]
    fn directive_parens() {
        assert!(Directive::from_raw("@else()", 1).has_parens());
        assert!(Directive::from_raw("@if (x)", 1).has_parens());
        assert!(!Directive::from_raw("@csrf", 1).has_parens());
    }

    #[test]
    fn literal_blank() {
        assert!(Literal::from_raw(" \n\t").is_blank());
        assert_eq!(Literal::from_raw(" hi ").text, "hi");
    }

    #[test]
    fn counts() {
        let leaf = Node::Directive(Directive::from_raw("@csrf", 1));
        let pair = Node::DirectivePair(DirectivePair {
            open: Directive::from_raw("@if(x)", 1),
            close: Directive::from_raw("@endif", 1),
            body: vec![leaf.clone()],
        });
        let doc = Document {
            children: vec![pair, leaf],
        };
        assert_eq!(doc.node_count(), 3);
        assert_eq!(doc.depth(), 1);
    }
}
