//! CST-driven pretty printer (spec §4.10). Every node-shaped form in this
//! grammar is `(` + head atoms + child forms + `)`; a handful of leaf forms
//! (bare action calls, literals, member/blackboard paths, param refs) carry
//! no parens at all, a single token. The printer doesn't need per-kind
//! layout rules: it measures the flat width of a node against the budget
//! and, if it doesn't fit, puts the head atoms on their own line and each
//! remaining child on its own indented line, Lisp-style trailing parens.

use crate::config::FormatConfig;
use crisp_syntax::{parse, SyntaxElement, SyntaxKind, SyntaxNode};
use rowan::NodeOrToken;

pub fn format_source(source: &str, cfg: &FormatConfig) -> String {
    let result = parse(source);
    format_cst(&result.root, cfg)
}

pub fn format_cst(root: &SyntaxNode, cfg: &FormatConfig) -> String {
    let forms: Vec<SyntaxNode> = root.children().collect();
    let mut out = String::new();
    for (i, form) in forms.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            if cfg.blank_line_between_trees {
                out.push('\n');
            }
        }
        for comment in leading_comments(form) {
            out.push_str(comment.trim_end());
            out.push('\n');
        }
        out.push_str(&render(form, 0, cfg));
    }
    out.push('\n');
    out
}

fn leading_comments(node: &SyntaxNode) -> Vec<String> {
    let mut out = Vec::new();
    for child in node.children_with_tokens() {
        match &child {
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::Comment => out.push(t.text().to_string()),
            NodeOrToken::Token(t) if t.kind().is_trivia() => continue,
            _ => break,
        }
    }
    out
}

fn significant_children(node: &SyntaxNode) -> Vec<SyntaxElement> {
    node.children_with_tokens()
        .filter(|e| match e {
            NodeOrToken::Token(t) => !t.kind().is_trivia(),
            NodeOrToken::Node(_) => true,
        })
        .collect()
}

/// Strips the wrapping `(`/`)` tokens if present; returns `None` for a bare
/// leaf form (no parens at all, e.g. a literal or a dotless action call).
fn inner_parts(kids: &[SyntaxElement]) -> Option<&[SyntaxElement]> {
    match kids.first() {
        Some(NodeOrToken::Token(t)) if t.kind() == SyntaxKind::LParen => {
            let end = kids.len() - 1;
            Some(&kids[1..end])
        }
        _ => None,
    }
}

fn element_text(e: &SyntaxElement) -> String {
    match e {
        NodeOrToken::Token(t) => t.text().to_string(),
        NodeOrToken::Node(n) => render_flat(n),
    }
}

fn render_flat(node: &SyntaxNode) -> String {
    let kids = significant_children(node);
    match inner_parts(&kids) {
        None => kids.iter().map(element_text).collect::<Vec<_>>().join(""),
        Some(inner) => {
            let parts: Vec<String> = inner.iter().map(element_text).collect();
            format!("({})", parts.join(" "))
        }
    }
}

fn fits(flat: &str, indent: usize, cfg: &FormatConfig) -> bool {
    !flat.contains('\n') && indent * cfg.indent + flat.chars().count() <= cfg.max_width
}

fn pad(indent: usize, cfg: &FormatConfig) -> String {
    " ".repeat(indent * cfg.indent)
}

pub fn render(node: &SyntaxNode, indent: usize, cfg: &FormatConfig) -> String {
    let flat = render_flat(node);
    if fits(&flat, indent, cfg) {
        return flat;
    }
    let kids = significant_children(node);
    let Some(inner) = inner_parts(&kids) else {
        return flat;
    };

    let mut split = 0;
    let mut head_parts = Vec::new();
    while split < inner.len() {
        match &inner[split] {
            NodeOrToken::Token(t) => {
                head_parts.push(t.text().to_string());
                split += 1;
            }
            NodeOrToken::Node(_) => break,
        }
    }
    let rest = &inner[split..];

    if rest.is_empty() {
        return format!("({})", head_parts.join(" "));
    }

    let mut out = format!("({}", head_parts.join(" "));
    for (idx, child) in rest.iter().enumerate() {
        out.push('\n');
        out.push_str(&pad(indent + 1, cfg));
        match child {
            NodeOrToken::Node(n) => out.push_str(&render(n, indent + 1, cfg)),
            NodeOrToken::Token(t) => out.push_str(t.text()),
        }
        let is_last = idx == rest.len() - 1;
        if is_last {
            if cfg.align_close_paren {
                out.push('\n');
                out.push_str(&pad(indent, cfg));
                out.push(')');
            } else {
                out.push(')');
            }
        }
    }
    out
}

#[cfg(test)]
mod printer_tests {
    use super::*;

    #[test]
    fn a_tree_that_fits_the_default_width_stays_on_one_line() {
        let src = "(tree T (select (.Flee) (.Patrol)))";
        let cfg = FormatConfig::default();
        assert_eq!(format_source(src, &cfg).trim_end(), src);
    }

    #[test]
    fn a_tree_too_wide_for_the_budget_breaks_onto_multiple_lines() {
        let src = "(tree SimpleCombat (select (seq (check (< .Health 30)) (.Flee)) (.Patrol)))";
        let cfg = FormatConfig { max_width: 35, ..FormatConfig::default() };
        let formatted = format_source(src, &cfg);
        assert!(formatted.lines().count() > 1);
        assert!(formatted.contains("(tree SimpleCombat\n"));
    }

    #[test]
    fn formatting_twice_is_idempotent_at_a_narrow_width() {
        let src = "(tree SimpleCombat (select (seq (check (< .Health 30)) (.Flee)) (.Patrol)))";
        let cfg = FormatConfig { max_width: 35, ..FormatConfig::default() };
        let once = format_source(src, &cfg);
        let twice = format_source(&once, &cfg);
        assert_eq!(once, twice);
    }

    #[test]
    fn a_leading_comment_before_a_tree_is_preserved_above_it() {
        let src = ";; patrol behavior\n(tree T (select (.Patrol)))";
        let cfg = FormatConfig::default();
        let formatted = format_source(src, &cfg);
        assert!(formatted.starts_with(";; patrol behavior\n"));
    }

    #[test]
    fn blank_line_between_trees_can_be_disabled() {
        let src = "(tree A (select (.A))) (tree B (select (.B)))";
        let cfg = FormatConfig { blank_line_between_trees: false, ..FormatConfig::default() };
        let formatted = format_source(src, &cfg);
        assert!(!formatted.contains("\n\n"));
    }
}
