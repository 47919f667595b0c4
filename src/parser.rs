use std::fmt;

use tracing::debug;

use crate::ast::{
    Comment, Directive, DirectivePair, Document, Echo, EchoKind, Literal, Node, Verbatim,
};
use crate::cst::Rule;
use crate::directive::{self, DirectiveClass};
use crate::token::{Token, TokenKind};

/// Deepest block nesting either tree builder accepts.
pub const MAX_NESTING: usize = 64;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A block directive reached end of input without `@end<name>`.
    UnmatchedBlockDirective { name: String },
    /// An `@end*` directive that does not close the open block.
    UnexpectedClosingDirective { found: String, expected: String },
    /// Blocks nested deeper than [`MAX_NESTING`].
    NestingTooDeep { limit: usize },
    /// A content production had no child. Internal.
    EmptyContent,
    /// A syntax tree node appeared where its rule cannot. Internal.
    MisplacedRule(Rule),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedBlockDirective { name } => {
                write!(
                    f,
                    "could not find \"@{}\" directive for \"@{name}\"",
                    directive::closing_name(name)
                )
            }
            Self::UnexpectedClosingDirective { found, expected } => {
                write!(f, "unexpected directive @{found}, expected @{expected}")
            }
            Self::NestingTooDeep { limit } => {
                write!(f, "blocks nested deeper than {limit} levels")
            }
            Self::EmptyContent => write!(f, "content node has no child"),
            Self::MisplacedRule(rule) => write!(f, "misplaced {rule:?} node"),
        }
    }
}

/// Error produced while building the tree. `line` is the opening
/// directive's line for unmatched blocks, the offending directive's
/// line otherwise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
}

/// Build a `Document` from a token stream.
///
/// The stream should end with [`TokenKind::EndOfInput`]; running
/// off the end of the slice is treated the same way.
///
/// # Errors
///
/// Returns `ParseError` when a block directive has no matching
/// `@end...`, a closer appears that does not match the open block,
/// or blocks nest deeper than [`MAX_NESTING`].
pub fn parse(tokens: &[Token]) -> Result<Document, ParseError> {
    Parser::new(tokens).parse()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<Document, ParseError> {
        let mut children = Vec::new();
        while let Some(token) = self.current() {
            if let Some(node) = self.node(token)? {
                children.push(node);
            }
        }
        debug!(nodes = children.len(), "parsed document");
        Ok(Document { children })
    }

    /// Current token, or `None` at end of input.
    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).filter(|t| !t.is_eof())
    }

    /// Build one node from `token`, which must be current. Blank
    /// literals are consumed and yield `None`.
    fn node(&mut self, token: &'a Token) -> Result<Option<Node>, ParseError> {
        self.pos += 1;
        let node = match token.kind {
            TokenKind::Echo => Node::Echo(Echo::from_raw(&token.raw, EchoKind::Escaped)),
            TokenKind::RawEcho => Node::Echo(Echo::from_raw(&token.raw, EchoKind::Raw)),
            TokenKind::Comment => Node::Comment(Comment::from_raw(&token.raw)),
            TokenKind::Directive => return self.directive(Directive::from_token(token)).map(Some),
            TokenKind::Literal | TokenKind::EscapedEcho | TokenKind::EscapedRawEcho => {
                let literal = Literal::from_raw(&token.raw);
                if literal.is_blank() {
                    return Ok(None);
                }
                Node::Literal(literal)
            }
            TokenKind::EndOfInput => return Ok(None),
        };
        Ok(Some(node))
    }

    fn directive(&mut self, open: Directive) -> Result<Node, ParseError> {
        match directive::classify(&open.name, &open.argument) {
            DirectiveClass::Inline => Ok(Node::Directive(open)),
            DirectiveClass::Verbatim => self.verbatim(&open),
            DirectiveClass::Block => self.block(open),
        }
    }

    fn block(&mut self, open: Directive) -> Result<Node, ParseError> {
        check_nesting(self.depth, open.line)?;
        self.depth += 1;
        let node = self.block_body(open);
        self.depth -= 1;
        node
    }

    fn block_body(&mut self, open: Directive) -> Result<Node, ParseError> {
        let expected = directive::closing_name(&open.name);
        debug!(name = %open.name, line = open.line, "open block");

        let mut body = Vec::new();
        while let Some(token) = self.current() {
            if token.kind == TokenKind::Directive {
                let candidate = Directive::from_token(token);
                if candidate.name == expected {
                    self.pos += 1;
                    debug!(name = %open.name, line = candidate.line, "close block");
                    return Ok(Node::DirectivePair(DirectivePair {
                        open,
                        close: candidate,
                        body,
                    }));
                }
                if directive::is_closing(&candidate.name) {
                    return Err(ParseError {
                        kind: ParseErrorKind::UnexpectedClosingDirective {
                            found: candidate.name,
                            expected,
                        },
                        line: candidate.line,
                    });
                }
            }

            if let Some(node) = self.node(token)? {
                body.push(node);
            }
        }

        Err(ParseError {
            kind: ParseErrorKind::UnmatchedBlockDirective { name: open.name },
            line: open.line,
        })
    }

    /// Capture raw token text up to the `@endverbatim` token.
    fn verbatim(&mut self, open: &Directive) -> Result<Node, ParseError> {
        let mut raw_code = String::new();
        while let Some(token) = self.current() {
            self.pos += 1;
            if is_verbatim_end(token) {
                debug!(line = open.line, bytes = raw_code.len(), "captured verbatim");
                return Ok(Node::Verbatim(Verbatim { raw_code }));
            }
            raw_code.push_str(&token.raw);
        }

        Err(ParseError {
            kind: ParseErrorKind::UnmatchedBlockDirective {
                name: open.name.clone(),
            },
            line: open.line,
        })
    }
}

/// Fail when opening one more block at `depth` would exceed
/// [`MAX_NESTING`].
pub(crate) const fn check_nesting(depth: usize, line: usize) -> Result<(), ParseError> {
    if depth >= MAX_NESTING {
        return Err(ParseError {
            kind: ParseErrorKind::NestingTooDeep { limit: MAX_NESTING },
            line,
        });
    }
    Ok(())
}

/// The verbatim closer is matched on exact raw text.
pub(crate) fn is_verbatim_end(token: &Token) -> bool {
    token.kind == TokenKind::Directive && token.raw == "@endverbatim"
}
