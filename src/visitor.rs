//! Lowering a concrete syntax tree into the AST.
//!
//! [`CstVisitor`] has one method per grammar production and a
//! default [`CstVisitor::visit`] that dispatches on [`Rule`].
//! [`AstBuilder`] implements it to produce the same tree as
//! [`crate::parser::parse`].

use crate::ast::{
    Comment, Directive, DirectivePair, Document, Echo, EchoKind, Literal, Node, Verbatim,
};
use crate::cst::{CstNode, Rule};
use crate::parser::{ParseError, ParseErrorKind};
use crate::token::Token;

pub trait CstVisitor {
    fn document(&mut self, node: &CstNode) -> Result<Document, ParseError>;
    fn content(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn comment(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn directive(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn echo(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn literal(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn raw_echo(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn escaped_echo(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn escaped_raw_echo(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn pair_directive(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn end_directive(&mut self, node: &CstNode) -> Result<Node, ParseError>;
    fn verbatim(&mut self, node: &CstNode) -> Result<Node, ParseError>;

    /// Dispatch to the handler for `node.rule`.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns; a `Document` node below the
    /// root is [`ParseErrorKind::MisplacedRule`].
    fn visit(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        match node.rule {
            Rule::Content => self.content(node),
            Rule::Comment => self.comment(node),
            Rule::Directive => self.directive(node),
            Rule::Echo => self.echo(node),
            Rule::Literal => self.literal(node),
            Rule::RawEcho => self.raw_echo(node),
            Rule::EscapedEcho => self.escaped_echo(node),
            Rule::EscapedRawEcho => self.escaped_raw_echo(node),
            Rule::PairDirective => self.pair_directive(node),
            Rule::EndDirective => self.end_directive(node),
            Rule::Verbatim => self.verbatim(node),
            Rule::Document => Err(misplaced(node)),
        }
    }
}

/// Lower a [`Rule::Document`] tree into a [`Document`].
///
/// # Errors
///
/// Returns `ParseError` with an internal kind when the tree is not
/// shaped the way [`crate::cst::parse_cst`] builds it.
pub fn build_ast(cst: &CstNode) -> Result<Document, ParseError> {
    AstBuilder.document(cst)
}

/// Visitor that produces AST nodes. Whitespace-only literals are
/// dropped from document and block bodies.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstBuilder;

impl AstBuilder {
    fn contents<'a>(
        &mut self,
        nodes: impl Iterator<Item = &'a CstNode>,
    ) -> Result<Vec<Node>, ParseError> {
        let mut out = Vec::new();
        for node in nodes {
            match self.visit(node)? {
                Node::Literal(literal) if literal.is_blank() => {}
                child => out.push(child),
            }
        }
        Ok(out)
    }

    fn directive_of(&mut self, node: &CstNode) -> Result<Directive, ParseError> {
        match self.visit(node)? {
            Node::Directive(d) => Ok(d),
            _ => Err(misplaced(node)),
        }
    }
}

impl CstVisitor for AstBuilder {
    fn document(&mut self, node: &CstNode) -> Result<Document, ParseError> {
        if node.rule != Rule::Document {
            return Err(misplaced(node));
        }
        let children = self.contents(node.nodes())?;
        Ok(Document { children })
    }

    fn content(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        let child = node.nodes().next().ok_or_else(|| ParseError {
            kind: ParseErrorKind::EmptyContent,
            line: first_line(node),
        })?;
        self.visit(child)
    }

    fn comment(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        Ok(Node::Comment(Comment::from_raw(&leaf(node)?.raw)))
    }

    fn directive(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        Ok(Node::Directive(Directive::from_token(leaf(node)?)))
    }

    fn echo(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        Ok(Node::Echo(Echo::from_raw(&leaf(node)?.raw, EchoKind::Escaped)))
    }

    fn literal(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        let raw: String = node.tokens().map(|t| t.raw.as_str()).collect();
        Ok(Node::Literal(Literal::from_raw(&raw)))
    }

    fn raw_echo(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        Ok(Node::Echo(Echo::from_raw(&leaf(node)?.raw, EchoKind::Raw)))
    }

    fn escaped_echo(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        Ok(Node::Literal(Literal::from_raw(&leaf(node)?.raw)))
    }

    fn escaped_raw_echo(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        Ok(Node::Literal(Literal::from_raw(&leaf(node)?.raw)))
    }

    fn pair_directive(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        let mut open = None;
        let mut close = None;
        let mut contents = Vec::new();
        for child in node.nodes() {
            match child.rule {
                Rule::Directive => open = Some(self.directive_of(child)?),
                Rule::EndDirective => close = Some(self.directive_of(child)?),
                _ => contents.push(child),
            }
        }

        let (Some(open), Some(close)) = (open, close) else {
            return Err(misplaced(node));
        };
        let body = self.contents(contents.into_iter())?;
        Ok(Node::DirectivePair(DirectivePair { open, close, body }))
    }

    fn end_directive(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        self.directive(node)
    }

    fn verbatim(&mut self, node: &CstNode) -> Result<Node, ParseError> {
        let tokens: Vec<&Token> = node.tokens().collect();
        let inner = tokens.get(1..tokens.len().saturating_sub(1)).unwrap_or_default();
        let raw_code = inner.iter().map(|t| t.raw.as_str()).collect();
        Ok(Node::Verbatim(Verbatim { raw_code }))
    }
}

fn leaf(node: &CstNode) -> Result<&Token, ParseError> {
    node.token().ok_or_else(|| ParseError {
        kind: ParseErrorKind::EmptyContent,
        line: first_line(node),
    })
}

fn misplaced(node: &CstNode) -> ParseError {
    ParseError {
        kind: ParseErrorKind::MisplacedRule(node.rule),
        line: first_line(node),
    }
}

fn first_line(node: &CstNode) -> usize {
    node.token()
        .map(|t| t.line)
        .or_else(|| node.nodes().next().map(first_line))
        .unwrap_or(0)
}
