//! Demonstrate error handling for malformed Blade templates.

use blade_parser::{Error, ParseErrorKind};

fn report(input: &str) {
    match blade_parser::parse_str(input) {
        Ok(doc) => println!("Parsed OK ({} node(s))", doc.node_count()),
        Err(Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Line: {}", e.line);
            if let ParseErrorKind::UnexpectedClosingDirective { expected, .. } = &e.kind {
                println!("  Hint: close the open block with @{expected} first");
            }
        }
    }
    println!();
}

fn main() {
    // Block never closed
    report("@if($user)\n    Hello\n");

    // Closed by the wrong directive
    report("@foreach($items as $item)\n    {{ $item }}\n@endif\n");

    // Unterminated echo is just text
    report("Price: {{ $price");
}
