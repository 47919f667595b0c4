//! Parse a Blade template, walk its tree, and print it back.

use blade_parser::{Node, PrintOptions};

fn describe(nodes: &[Node], depth: usize) {
    let pad = "  ".repeat(depth);
    for node in nodes {
        match node {
            Node::Literal(l) => println!("{pad}literal {:?}", l.text),
            Node::Comment(c) => println!("{pad}comment {:?}", c.inner),
            Node::Echo(e) => println!("{pad}echo {:?} ({:?})", e.expression, e.kind),
            Node::Directive(d) => println!("{pad}@{} {:?}", d.name, d.argument),
            Node::DirectivePair(pair) => {
                println!(
                    "{pad}@{} {:?} ... @{}",
                    pair.open.name, pair.open.argument, pair.close.name
                );
                describe(&pair.body, depth + 1);
            }
            Node::Verbatim(v) => println!("{pad}verbatim {:?}", v.raw_code),
        }
    }
}

fn main() {
    let input = "\
@extends('layouts.app')
@section('content')
    {{-- list every post --}}
    @forelse($posts as $post)
        <h2>{{$post->title}}</h2>
        {!! $post->body !!}
    @empty
        <p>No posts.</p>
    @endforelse
    @verbatim
        <div>{{ client.side }}</div>
    @endverbatim
@endsection
";

    let doc = blade_parser::parse_str(input).expect("parse failed");

    println!("Nodes: {}", doc.node_count());
    describe(&doc.children, 0);

    let output = blade_parser::print(&doc, &PrintOptions::default());
    println!("\nFormatted output:\n{output}");
}
