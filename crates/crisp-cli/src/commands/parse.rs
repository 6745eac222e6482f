//! `crisp parse`: dump the lossless CST rowan builds over a source file.

use rowan::NodeOrToken;

use crate::cli::ParseArgs;
use crate::source_loader::load_source;
use crisp_syntax::parser::core::parse;

use super::{FAIL, OK};

pub fn run(args: ParseArgs) -> super::ExitCode {
    let source = match load_source(&args.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return FAIL;
        }
    };

    let result = parse(&source);
    for form in result.root.children() {
        dump(NodeOrToken::Node(form), 0, args.spans);
    }

    if !result.diagnostics.is_empty() {
        eprintln!("{} diagnostic(s) during parse:", result.diagnostics.len());
        for diag in result.diagnostics.iter() {
            eprintln!("  [{}] {}", diag.code, diag.message);
        }
    }

    if result.diagnostics.has_errors() {
        FAIL
    } else {
        OK
    }
}

fn dump(element: crisp_syntax::SyntaxElement, depth: usize, spans: bool) {
    let indent = "  ".repeat(depth);
    match element {
        NodeOrToken::Node(node) => {
            if spans {
                let range = node.text_range();
                println!("{indent}{:?} @{:?}..{:?}", node.kind(), range.start(), range.end());
            } else {
                println!("{indent}{:?}", node.kind());
            }
            for child in node.children_with_tokens() {
                dump(child, depth + 1, spans);
            }
        }
        NodeOrToken::Token(token) => {
            if spans {
                let range = token.text_range();
                println!("{indent}{:?} {:?} @{:?}..{:?}", token.kind(), token.text(), range.start(), range.end());
            } else {
                println!("{indent}{:?} {:?}", token.kind(), token.text());
            }
        }
    }
}
