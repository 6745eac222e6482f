//! Top-level forms (spec §4.2): `(tree NAME [:blackboard TYPE] body...)`,
//! `(defdec NAME (params...) body)`, `(defmacro NAME (params...) body)`,
//! `(import "path")`.

use super::node_forms::node;
use crate::parser::core::Parser;
use crate::syntax_kind::SyntaxKind::{self, *};

/// Attempts to parse one top-level form. Returns false (consuming nothing)
/// if the current position isn't one of the recognized top-level heads.
pub(crate) fn top_level_form(p: &mut Parser) -> bool {
    if !p.at(LParen) {
        return false;
    }
    match p.nth_text(1) {
        Some("tree") => tree_form(p),
        Some("defdec") => defdec_form(p),
        Some("defmacro") => defmacro_form(p),
        Some("import") => import_form(p),
        _ => return false,
    }
    true
}

fn tree_form(p: &mut Parser) {
    p.start_node(Tree);
    p.bump(); // (
    p.bump(); // tree
    if p.at(Ident) {
        p.bump();
    } else {
        p.error_msg("expected a tree name");
    }
    if p.at(KeywordTok) {
        p.bump();
        if p.at(Ident) {
            p.bump();
        } else {
            p.error_msg("expected a blackboard type name");
        }
    }
    while !p.at(RParen) && !p.eof() {
        if !node(p) {
            p.error_and_bump("expected a node");
        }
    }
    p.expect(RParen);
    p.finish_node();
}

fn param_list(p: &mut Parser) {
    p.start_node(ParamList);
    if p.expect(LParen) {
        while p.at(Ident) {
            p.bump();
        }
        p.expect(RParen);
    }
    p.finish_node();
}

fn defdec_form(p: &mut Parser) {
    p.start_node(Defdec);
    p.bump(); // (
    p.bump(); // defdec
    if p.at(Ident) {
        p.bump();
    } else {
        p.error_msg("expected a decorator name");
    }
    param_list(p);
    if !p.at(RParen) && !node(p) {
        p.error_and_bump("expected a decorator body");
    }
    p.expect(RParen);
    p.finish_node();
}

fn defmacro_form(p: &mut Parser) {
    p.start_node(Defmacro);
    p.bump(); // (
    p.bump(); // defmacro
    if p.at(Ident) {
        p.bump();
    } else {
        p.error_msg("expected a macro name");
    }
    param_list(p);
    if !p.at(RParen) && !node(p) {
        p.error_and_bump("expected a macro body");
    }
    p.expect(RParen);
    p.finish_node();
}

fn import_form(p: &mut Parser) {
    p.start_node(Import);
    p.bump(); // (
    p.bump(); // import
    if p.at(StrLit) {
        p.bump();
    } else {
        p.error_msg("expected an import path string");
    }
    p.expect(RParen);
    p.finish_node();
}

#[cfg(test)]
mod top_level_tests {
    use crate::parser::core::parse;

    #[test]
    fn defmacro_with_body_placeholder_parses() {
        let src = "(defmacro retry () (repeat 3 <body>)) (tree Main (retry (.Attack)))";
        let result = parse(src);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn import_form_parses_a_quoted_path() {
        let result = parse("(import \"shared/combat.crisp\")");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn tree_with_blackboard_type_parses() {
        let result = parse("(tree Main :blackboard CombatBoard (select (.Flee)))");
        assert!(result.diagnostics.is_empty());
    }
}
