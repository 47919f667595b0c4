//! Blade template lexer, parser, and syntax tree.
//!
//! Turns Laravel Blade source (`{{ }}` echoes, `{!! !!}` raw echoes,
//! `{{-- --}}` comments, and `@directive(...)` constructs) into a
//! nested tree where block directives such as `@if ... @endif` own
//! their bodies, ready for a pretty-printer.
//!
//! # Quick start
//!
//! ## Parse a template
//!
//! ```
//! use blade_parser::{Node, parse_str};
//!
//! let doc = parse_str("@if($user) Hello {{ $user->name }} @endif").unwrap();
//! let Node::DirectivePair(pair) = &doc.children[0] else { panic!() };
//! assert_eq!(pair.open.argument, "$user");
//! assert_eq!(pair.close.name, "endif");
//! assert_eq!(pair.body.len(), 2);
//! ```
//!
//! ## Re-format a template
//!
//! ```
//! use blade_parser::{PrintOptions, parse_str, print};
//!
//! let doc = parse_str("@foreach($items as $item) <li>{{$item}}</li> @endforeach").unwrap();
//! let output = print(&doc, &PrintOptions::default());
//! assert_eq!(
//!     output,
//!     "@foreach($items as $item)\n    <li>\n    {{ $item }}\n    </li>\n@endforeach\n"
//! );
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod cst;
pub mod directive;
pub mod embedded;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;
pub mod visitor;

pub use ast::{
    Comment, Directive, DirectivePair, Document, Echo, EchoKind, Literal, Node, Verbatim,
};
pub use cst::{CstElement, CstNode, Rule, parse_cst};
pub use embedded::{EmbeddedFormatter, Passthrough, PhpFragmentFormatter};
pub use lexer::tokenize;
pub use parser::{MAX_NESTING, ParseError, ParseErrorKind, parse};
pub use printer::{PrintOptions, print, print_with};
pub use token::{Token, TokenKind};
pub use visitor::{AstBuilder, CstVisitor, build_ast};

/// Unified error type for the one-step entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A tree-building error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Tokenize and parse a Blade source string in one step.
pub fn parse_str(input: &str) -> Result<Document, Error> {
    let tokens = tokenize(input);
    Ok(parse(&tokens)?)
}

/// Tokenize, build the concrete syntax tree, and lower it to the AST.
///
/// Produces the same tree as [`parse_str`].
pub fn parse_str_via_cst(input: &str) -> Result<Document, Error> {
    let tokens = tokenize(input);
    let cst = parse_cst(&tokens)?;
    Ok(build_ast(&cst)?)
}
