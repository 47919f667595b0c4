//! Concrete syntax tree over the token stream.
//!
//! Every token, including whitespace-only literals, survives in the
//! tree. Block pairing is resolved here with the same rules as
//! [`crate::parser`]; [`crate::visitor`] then lowers the tree into
//! the AST.

use serde::Serialize;
use tracing::debug;

use crate::directive::{self, DirectiveClass};
use crate::parser::{ParseError, ParseErrorKind, check_nesting, is_verbatim_end};
use crate::token::{Token, TokenKind};

/// Grammar production a [`CstNode`] was built by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rule {
    Document,
    Content,
    Literal,
    Comment,
    Echo,
    RawEcho,
    EscapedEcho,
    EscapedRawEcho,
    Directive,
    PairDirective,
    EndDirective,
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CstElement {
    Node(CstNode),
    Token(Token),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CstNode {
    pub rule: Rule,
    pub children: Vec<CstElement>,
}

impl CstNode {
    const fn new(rule: Rule, children: Vec<CstElement>) -> Self {
        Self { rule, children }
    }

    fn wrap(rule: Rule, token: &Token) -> Self {
        Self::new(rule, vec![CstElement::Token(token.clone())])
    }

    /// Child nodes, skipping bare tokens.
    pub fn nodes(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|c| match c {
            CstElement::Node(n) => Some(n),
            CstElement::Token(_) => None,
        })
    }

    /// Child tokens, skipping nodes.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|c| match c {
            CstElement::Token(t) => Some(t),
            CstElement::Node(_) => None,
        })
    }

    /// The first direct child token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        self.tokens().next()
    }

    /// Concatenated raw text of every token under this node.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                CstElement::Token(t) => out.push_str(&t.raw),
                CstElement::Node(n) => n.collect_text(out),
            }
        }
    }
}

/// Build a concrete syntax tree rooted at a [`Rule::Document`] node.
///
/// # Errors
///
/// Returns `ParseError` on the same pairing failures as
/// [`crate::parser::parse`], including its nesting limit.
pub fn parse_cst(tokens: &[Token]) -> Result<CstNode, ParseError> {
    let mut builder = CstBuilder {
        tokens,
        pos: 0,
        depth: 0,
    };
    let mut contents = Vec::new();
    while let Some(token) = builder.current() {
        contents.push(CstElement::Node(builder.content(token)?));
    }
    Ok(CstNode::new(Rule::Document, contents))
}

struct CstBuilder<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> CstBuilder<'a> {
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).filter(|t| !t.is_eof())
    }

    fn content(&mut self, token: &'a Token) -> Result<CstNode, ParseError> {
        self.pos += 1;
        let child = match token.kind {
            TokenKind::Literal => CstNode::wrap(Rule::Literal, token),
            TokenKind::Echo => CstNode::wrap(Rule::Echo, token),
            TokenKind::RawEcho => CstNode::wrap(Rule::RawEcho, token),
            TokenKind::EscapedEcho => CstNode::wrap(Rule::EscapedEcho, token),
            TokenKind::EscapedRawEcho => CstNode::wrap(Rule::EscapedRawEcho, token),
            TokenKind::Comment => CstNode::wrap(Rule::Comment, token),
            TokenKind::Directive => self.directive(token)?,
            TokenKind::EndOfInput => return Ok(CstNode::new(Rule::Content, Vec::new())),
        };
        Ok(CstNode::new(Rule::Content, vec![CstElement::Node(child)]))
    }

    fn directive(&mut self, token: &'a Token) -> Result<CstNode, ParseError> {
        let (name, argument) = directive::split(&token.raw);
        match directive::classify(&name, &argument) {
            DirectiveClass::Inline => Ok(CstNode::wrap(Rule::Directive, token)),
            DirectiveClass::Verbatim => self.verbatim(token, name),
            DirectiveClass::Block => self.pair(token, name),
        }
    }

    fn pair(&mut self, open: &'a Token, name: String) -> Result<CstNode, ParseError> {
        check_nesting(self.depth, open.line)?;
        self.depth += 1;
        let node = self.pair_body(open, name);
        self.depth -= 1;
        node
    }

    fn pair_body(&mut self, open: &'a Token, name: String) -> Result<CstNode, ParseError> {
        let expected = directive::closing_name(&name);
        let mut children = vec![CstElement::Node(CstNode::wrap(Rule::Directive, open))];

        while let Some(token) = self.current() {
            if token.kind == TokenKind::Directive {
                let (found, _) = directive::split(&token.raw);
                if found == expected {
                    self.pos += 1;
                    children.push(CstElement::Node(CstNode::wrap(Rule::EndDirective, token)));
                    return Ok(CstNode::new(Rule::PairDirective, children));
                }
                if directive::is_closing(&found) {
                    return Err(ParseError {
                        kind: ParseErrorKind::UnexpectedClosingDirective { found, expected },
                        line: token.line,
                    });
                }
            }
            children.push(CstElement::Node(self.content(token)?));
        }

        Err(ParseError {
            kind: ParseErrorKind::UnmatchedBlockDirective { name },
            line: open.line,
        })
    }

    fn verbatim(&mut self, open: &'a Token, name: String) -> Result<CstNode, ParseError> {
        let mut children = vec![CstElement::Token(open.clone())];
        while let Some(token) = self.current() {
            self.pos += 1;
            children.push(CstElement::Token(token.clone()));
            if is_verbatim_end(token) {
                debug!(line = open.line, tokens = children.len(), "captured verbatim");
                return Ok(CstNode::new(Rule::Verbatim, children));
            }
        }

        Err(ParseError {
            kind: ParseErrorKind::UnmatchedBlockDirective { name },
            line: open.line,
        })
    }
}
