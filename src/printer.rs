//! Pretty-printer that serializes a Blade AST back into normalized text.
//!
//! Every node starts on its own line and block bodies are indented
//! one level. Verbatim spans are written back untouched.

use crate::ast::{Comment, Directive, Document, Echo, Literal, Node, Verbatim};
use crate::directive;
use crate::embedded::{EmbeddedFormatter, PhpFragmentFormatter};

/// Printer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Spaces per indent level when `use_tabs` is off.
    pub indent_width: usize,
    pub use_tabs: bool,
    /// Pass directive arguments through the embedded formatter.
    pub format_arguments: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            use_tabs: false,
            format_arguments: true,
        }
    }
}

impl PrintOptions {
    fn indent(&self, depth: usize) -> String {
        if self.use_tabs {
            "\t".repeat(depth)
        } else {
            " ".repeat(self.indent_width * depth)
        }
    }
}

/// Format a `Document` using [`PhpFragmentFormatter`] for arguments.
#[must_use]
pub fn print(document: &Document, options: &PrintOptions) -> String {
    print_with(document, options, &PhpFragmentFormatter)
}

/// Format a `Document` with a caller-supplied embedded formatter.
#[must_use]
pub fn print_with(
    document: &Document,
    options: &PrintOptions,
    formatter: &dyn EmbeddedFormatter,
) -> String {
    let mut printer = Printer {
        out: String::new(),
        options,
        formatter,
    };
    printer.nodes(&document.children, 0);

    // Trailing newline
    if !printer.out.ends_with('\n') {
        printer.out.push('\n');
    }
    printer.out
}

struct Printer<'a> {
    out: String,
    options: &'a PrintOptions,
    formatter: &'a dyn EmbeddedFormatter,
}

impl Printer<'_> {
    fn nodes(&mut self, nodes: &[Node], depth: usize) {
        for node in nodes {
            self.node(node, depth);
        }
    }

    fn node(&mut self, node: &Node, depth: usize) {
        match node {
            Node::Literal(literal) => self.literal(literal, depth),
            Node::Comment(comment) => self.comment(comment, depth),
            Node::Echo(echo) => self.echo(echo, depth),
            Node::Directive(d) => {
                let text = self.directive(d);
                self.line(&text, depth);
            }
            Node::DirectivePair(pair) => {
                let open = self.directive(&pair.open);
                self.line(&open, depth);
                self.nodes(&pair.body, depth + 1);
                let close = self.directive(&pair.close);
                self.line(&close, depth);
            }
            Node::Verbatim(verbatim) => self.verbatim(verbatim, depth),
        }
    }

    fn line(&mut self, text: &str, depth: usize) {
        self.out.push_str(&self.options.indent(depth));
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Re-indent each line; runs of blank lines collapse to one.
    fn literal(&mut self, literal: &Literal, depth: usize) {
        let mut previous_blank = false;
        for line in literal.text.lines().map(str::trim) {
            if line.is_empty() {
                if !previous_blank {
                    self.out.push('\n');
                }
                previous_blank = true;
            } else {
                self.line(line, depth);
                previous_blank = false;
            }
        }
    }

    fn comment(&mut self, comment: &Comment, depth: usize) {
        self.line(&comment.to_source(), depth);
    }

    fn echo(&mut self, echo: &Echo, depth: usize) {
        self.line(&echo.to_source(), depth);
    }

    fn directive(&self, d: &Directive) -> String {
        // Chained calls folded into one token are kept as written.
        if !directive::is_balanced(&d.argument) {
            return d.raw.clone();
        }
        if !d.has_parens() {
            return format!("@{}", d.name);
        }
        let argument = if self.options.format_arguments {
            self.formatter.format(&d.argument)
        } else {
            d.argument.clone()
        };
        format!("@{}({argument})", d.name)
    }

    fn verbatim(&mut self, verbatim: &Verbatim, depth: usize) {
        self.out.push_str(&self.options.indent(depth));
        self.out.push_str("@verbatim");
        self.out.push_str(&verbatim.raw_code);
        self.out.push_str("@endverbatim\n");
    }
}
