#![allow(dead_code)]

use blade_parser::{Document, Node, Token, TokenKind, build_ast, parse, parse_cst, tokenize};

/// Parse with both tree builders and assert they agree.
pub fn parse_both(input: &str) -> Document {
    let tokens = tokenize(input);
    let direct = parse(&tokens).unwrap_or_else(|e| panic!("parse failed on {input:?}: {e}"));
    let cst = parse_cst(&tokens).unwrap_or_else(|e| panic!("cst failed on {input:?}: {e}"));
    let lowered =
        build_ast(&cst).unwrap_or_else(|e| panic!("lowering failed on {input:?}: {e}"));
    assert_eq!(
        direct, lowered,
        "tree builders disagree:\n--- input ---\n{input}\n\
         --- direct ---\n{direct:#?}\n--- via cst ---\n{lowered:#?}"
    );
    direct
}

/// Concatenated raw text of every token.
pub fn rejoin(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.raw.as_str()).collect()
}

/// Tokens of `input` without the end-of-input marker.
pub fn significant(input: &str) -> Vec<Token> {
    tokenize(input)
        .into_iter()
        .filter(|t| t.kind != TokenKind::EndOfInput)
        .collect()
}

/// Short label per node, for shape assertions.
pub fn shape(nodes: &[Node]) -> Vec<&'static str> {
    nodes
        .iter()
        .map(|n| match n {
            Node::Literal(_) => "literal",
            Node::Comment(_) => "comment",
            Node::Echo(_) => "echo",
            Node::Directive(_) => "directive",
            Node::DirectivePair(_) => "pair",
            Node::Verbatim(_) => "verbatim",
        })
        .collect()
}
