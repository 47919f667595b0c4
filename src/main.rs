//! CLI tool to inspect, validate, and format Blade templates.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blade_parser::{Document, PrintOptions};
use clap::{Parser, Subcommand};
use tracing::Level;

/// Inspect, validate, and format Blade templates
#[derive(Debug, Parser)]
#[command(name = "blade", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging on stderr
    #[arg(short = 'V', long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the token stream of each file
    Tokens {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the syntax tree of each file
    Tree {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print JSON instead of the debug representation
        #[arg(long)]
        json: bool,
    },

    /// Check that each file parses
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Build the tree through the concrete syntax tree
        #[arg(long)]
        via_cst: bool,
    },

    /// Format each file and print to stdout
    Fmt {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Spaces per indent level
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Indent with tabs
        #[arg(long)]
        tabs: bool,

        /// Leave directive arguments as written
        #[arg(long)]
        no_format_arguments: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Blade(#[from] blade_parser::Error),
    #[error("failed to serialize tree: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let files = match &args.command {
        Command::Tokens { files }
        | Command::Tree { files, .. }
        | Command::Check { files, .. }
        | Command::Fmt { files, .. } => files,
    };

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                had_error = true;
                continue;
            }
        };

        tracing::debug!(path = %path.display(), bytes = content.len(), "read template");
        if let Err(e) = run(&args.command, path, &content) {
            eprintln!("{}: {e}", path.display());
            had_error = true;
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(command: &Command, path: &Path, content: &str) -> Result<(), CliError> {
    match command {
        Command::Tokens { .. } => {
            for token in blade_parser::tokenize(content) {
                println!("{:>4} {:<16} {:?}", token.line, token.kind.label(), token.raw);
            }
        }
        Command::Tree { json, .. } => {
            let doc = blade_parser::parse_str(content)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("{doc:#?}");
            }
        }
        Command::Check { via_cst, .. } => {
            let doc: Document = if *via_cst {
                blade_parser::parse_str_via_cst(content)
            } else {
                blade_parser::parse_str(content)
            }?;
            eprintln!("{}: valid ({} node(s))", path.display(), doc.node_count());
        }
        Command::Fmt {
            indent,
            tabs,
            no_format_arguments,
            ..
        } => {
            let doc = blade_parser::parse_str(content)?;
            let options = PrintOptions {
                indent_width: *indent,
                use_tabs: *tabs,
                format_arguments: !*no_format_arguments,
            };
            print!("{}", blade_parser::print(&doc, &options));
        }
    }
    Ok(())
}
