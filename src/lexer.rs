use std::collections::HashSet;

use tracing::trace;

use crate::token::{Token, TokenKind};

/// Tokenize a Blade template into a sequence of tokens.
///
/// Never fails: text that does not form a complete delimiter
/// (an unterminated `{{`, a `@name(` with no closing paren) is
/// kept as literal text. Concatenating the `raw` text of every
/// token reproduces `input` exactly. The last token is always
/// [`TokenKind::EndOfInput`].
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

/// Result of scanning a parenthesized argument list.
struct ArgumentScan {
    /// Byte offset of the matching `)`.
    close: usize,
    /// Some string literal inside the list has unbalanced parens,
    /// like `')'`.
    unbalanced_string: bool,
}

/// Closing delimiters searched for after an opener.
#[derive(Debug, Clone, Copy)]
enum Closer {
    Comment,
    RawEcho,
    Echo,
}

impl Closer {
    const fn bytes(self) -> &'static [u8] {
        match self {
            Self::Comment => b"--}}",
            Self::RawEcho => b"!!}",
            Self::Echo => b"}}",
        }
    }
}

struct Lexer<'a> {
    source: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    literal: Option<(usize, usize)>,
    tokens: Vec<Token>,
    /// Per closer, the lowest offset a search has failed from.
    missing_from: [usize; 3],
    /// `(` offsets known to have no matching `)`.
    unclosed: HashSet<usize>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.as_bytes(),
            pos: 0,
            line: 1,
            literal: None,
            tokens: Vec::new(),
            missing_from: [usize::MAX; 3],
            unclosed: HashSet::new(),
        }
    }

    fn tokenize(mut self) -> Vec<Token> {
        while self.pos < self.input.len() {
            if let Some((kind, end)) = self.match_delimiter() {
                self.flush_literal();
                self.push(kind, self.pos, end);
                self.advance_to(end);
            } else {
                if self.literal.is_none() {
                    self.literal = Some((self.pos, self.line));
                }
                self.advance_to(self.pos + 1);
            }
        }

        self.flush_literal();
        self.tokens.push(Token::eof(self.line));
        self.tokens
    }

    /// Try every delimiter at the cursor, highest priority first.
    fn match_delimiter(&mut self) -> Option<(TokenKind, usize)> {
        let (input, pos) = (self.input, self.pos);
        let rest = &input[pos..];

        if rest.starts_with(b"{{--") {
            if let Some(end) = self.find_closer(pos + 4, Closer::Comment) {
                return Some((TokenKind::Comment, end));
            }
        }

        if matches!(rest.first(), Some(b'@' | b'\\')) {
            if rest[1..].starts_with(b"{!!") {
                if let Some(end) = self.find_closer(pos + 4, Closer::RawEcho) {
                    return Some((TokenKind::EscapedRawEcho, end));
                }
            } else if rest[1..].starts_with(b"{{") {
                if let Some(end) = self.find_closer(pos + 3, Closer::Echo) {
                    return Some((TokenKind::EscapedEcho, end));
                }
            }
        }

        if rest.starts_with(b"{!!") {
            if let Some(end) = self.find_closer(pos + 3, Closer::RawEcho) {
                return Some((TokenKind::RawEcho, end));
            }
        }

        if rest.starts_with(b"{{") {
            if let Some(end) = self.find_closer(pos + 2, Closer::Echo) {
                return Some((TokenKind::Echo, end));
            }
        }

        if rest.first() == Some(&b'@') {
            if let Some(end) = self.scan_directive(pos) {
                return Some((TokenKind::Directive, end));
            }
        }

        None
    }

    /// Byte offset just past the first `closer` at or after `from`.
    ///
    /// A closer missing after some offset is missing after every
    /// later one, so failed searches are not repeated.
    fn find_closer(&mut self, from: usize, closer: Closer) -> Option<usize> {
        let slot = closer as usize;
        if from >= self.missing_from[slot] {
            return None;
        }

        let needle = closer.bytes();
        let found = self.input.get(from..).and_then(|haystack| {
            haystack
                .windows(needle.len())
                .position(|w| w == needle)
                .map(|i| from + i + needle.len())
        });
        if found.is_none() {
            self.missing_from[slot] = from;
        }
        found
    }

    /// Scan a directive starting at the `@` at `at`, returning the
    /// end offset of its raw text.
    fn scan_directive(&mut self, at: usize) -> Option<usize> {
        // `@@name` escapes a directive; `user@host` is not one.
        if at > 0 && is_name_byte_or_at(self.input[at - 1]) {
            return None;
        }

        let name_end = self.scan_name(at + 1)?;
        let Some(scan) = self.scan_call(name_end) else {
            return Some(name_end);
        };

        let mut end = scan.close + 1;
        while let Some(next) = self.chained_call(end) {
            end = next;
        }
        Some(end)
    }

    /// End offset of an identifier starting at `start`, if any.
    fn scan_name(&self, start: usize) -> Option<usize> {
        let len = self.input[start..]
            .iter()
            .take_while(|&&b| is_name_byte(b))
            .count();
        (len > 0).then_some(start + len)
    }

    /// Scan an optional `(...)` after a directive name, allowing
    /// spaces and tabs before the opening paren.
    fn scan_call(&mut self, name_end: usize) -> Option<ArgumentScan> {
        let open = self.skip_blanks(name_end);
        if self.input.get(open) != Some(&b'(') {
            return None;
        }
        self.scan_arguments(open)
    }

    /// A directive call following a completed call, separated only by
    /// blanks, is folded into the same token when one of its string
    /// literals has unbalanced parens.
    fn chained_call(&mut self, from: usize) -> Option<usize> {
        let at = self.skip_blanks(from);
        if self.input.get(at) != Some(&b'@') {
            return None;
        }
        let name_end = self.scan_name(at + 1)?;
        let scan = self.scan_call(name_end)?;
        scan.unbalanced_string.then_some(scan.close + 1)
    }

    /// Match parens from the `(` at `open`, skipping over single- and
    /// double-quoted strings with backslash escapes.
    fn scan_arguments(&mut self, open: usize) -> Option<ArgumentScan> {
        if self.unclosed.contains(&open) {
            return None;
        }

        let mut opens = Vec::new();
        let mut quote: Option<u8> = None;
        let mut escaped = false;
        let mut string_depth = 0usize;
        let mut string_unbalanced = false;
        let mut unbalanced_string = false;

        for (offset, &b) in self.input[open..].iter().enumerate() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == q {
                    quote = None;
                    unbalanced_string |= string_unbalanced || string_depth != 0;
                } else if b == b'(' {
                    string_depth += 1;
                } else if b == b')' {
                    if string_depth == 0 {
                        string_unbalanced = true;
                    } else {
                        string_depth -= 1;
                    }
                }
                continue;
            }

            match b {
                b'\'' | b'"' => {
                    quote = Some(b);
                    string_depth = 0;
                    string_unbalanced = false;
                }
                b'(' => opens.push(open + offset),
                b')' => {
                    opens.pop();
                    if opens.is_empty() {
                        return Some(ArgumentScan {
                            close: open + offset,
                            unbalanced_string,
                        });
                    }
                }
                _ => {}
            }
        }

        // Every paren still open here stays open for a scan starting at it.
        self.unclosed.extend(opens);
        None
    }

    fn skip_blanks(&self, from: usize) -> usize {
        from + self.input[from..]
            .iter()
            .take_while(|&&b| b == b' ' || b == b'\t')
            .count()
    }

    fn flush_literal(&mut self) {
        if let Some((start, line)) = self.literal.take() {
            self.tokens.push(Token {
                kind: TokenKind::Literal,
                raw: self.source[start..self.pos].to_string(),
                line,
            });
            trace!(kind = "literal", line, "token");
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        trace!(kind = kind.label(), line = self.line, "token");
        self.tokens.push(Token {
            kind,
            raw: self.source[start..end].to_string(),
            line: self.line,
        });
    }

    fn advance_to(&mut self, end: usize) {
        self.line += self.input[self.pos..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.pos = end;
    }
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

const fn is_name_byte_or_at(b: u8) -> bool {
    is_name_byte(b) || b == b'@'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input() {
        let tokens = tokenize("");
        assert_eq!(kinds(&tokens), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn directive_without_arguments() {
        let tokens = tokenize("@csrf");
        assert_eq!(tokens[0].kind, TokenKind::Directive);
        assert_eq!(tokens[0].raw, "@csrf");
    }

    #[test]
    fn directive_with_arguments() {
        let tokens = tokenize("@if($user->isAdmin())");
        assert_eq!(tokens[0].raw, "@if($user->isAdmin())");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn space_before_paren() {
        let tokens = tokenize("@if  (true)");
        assert_eq!(tokens[0].raw, "@if  (true)");
    }

    #[test]
    fn paren_inside_string() {
        let tokens = tokenize("@lang(')')");
        assert_eq!(tokens[0].raw, "@lang(')')");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn escaped_quote_in_string() {
        let tokens = tokenize(r#"@lang("a \") b") rest"#);
        assert_eq!(tokens[0].raw, r#"@lang("a \") b")"#);
        assert_eq!(tokens[1].raw, " rest");
    }

    #[test]
    fn balanced_string_does_not_chain() {
        let tokens = tokenize("@if($a) @lang('Hello (world)')");
        assert_eq!(tokens[0].raw, "@if($a)");
        assert_eq!(tokens[2].raw, "@lang('Hello (world)')");
    }

    #[test]
    fn email_string_does_not_chain() {
        let tokens = tokenize("@if($a) @include('row', ['to' => 'a@b.c'])");
        assert_eq!(tokens[0].raw, "@if($a)");
        assert_eq!(tokens[2].raw, "@include('row', ['to' => 'a@b.c'])");
    }

    #[test]
    fn unbalanced_string_chains() {
        let tokens = tokenize("@if(a) @lang('(') x");
        assert_eq!(tokens[0].raw, "@if(a) @lang('(')");
        assert_eq!(tokens[1].raw, " x");
    }

    #[test]
    fn unclosed_outer_paren_leaves_inner_call() {
        let tokens = tokenize("@a(( @b(x)");
        let raws: Vec<&str> = tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(raws, vec!["@a", "(( ", "@b(x)", ""]);
    }

    #[test]
    fn many_unterminated_openers() {
        let input = format!("{}{}{}", "{{".repeat(50_000), "@x(".repeat(50_000), "{!!{{--");
        let tokens = tokenize(&input);
        let rejoined: String = tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(rejoined, input);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Directive).count(), 50_000);
    }

    #[test]
    fn unbalanced_call_keeps_name_only() {
        let tokens = tokenize("@if(true");
        assert_eq!(tokens[0].raw, "@if");
        assert_eq!(tokens[1].kind, TokenKind::Literal);
        assert_eq!(tokens[1].raw, "(true");
    }

    #[test]
    fn email_is_literal() {
        let tokens = tokenize("mail me@example.com");
        assert_eq!(kinds(&tokens), vec![TokenKind::Literal, TokenKind::EndOfInput]);
    }

    #[test]
    fn double_at_is_literal() {
        let tokens = tokenize("@@if(x)");
        assert_eq!(kinds(&tokens), vec![TokenKind::Literal, TokenKind::EndOfInput]);
    }

    #[test]
    fn echo_kinds() {
        let tokens = tokenize("{{ $a }}{!! $b !!}@{{ $c }}\\{!! $d !!}");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Echo,
                TokenKind::RawEcho,
                TokenKind::EscapedEcho,
                TokenKind::EscapedRawEcho,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn comment_wins_over_echo() {
        let tokens = tokenize("{{-- {{ $x }} --}}");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].raw, "{{-- {{ $x }} --}}");
    }

    #[test]
    fn unterminated_echo_is_literal() {
        let tokens = tokenize("a {{ b");
        assert_eq!(kinds(&tokens), vec![TokenKind::Literal, TokenKind::EndOfInput]);
        assert_eq!(tokens[0].raw, "a {{ b");
    }

    #[test]
    fn line_tracking() {
        let tokens = tokenize("a\n@if(x)\n\n{{ $y }}");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[3].line, 4);
        assert_eq!(tokens[4].line, 4);
    }

    #[test]
    fn multibyte_literal() {
        let tokens = tokenize("héllo @csrf wörld");
        assert_eq!(tokens[0].raw, "héllo ");
        assert_eq!(tokens[1].raw, "@csrf");
        assert_eq!(tokens[2].raw, " wörld");
    }
}
