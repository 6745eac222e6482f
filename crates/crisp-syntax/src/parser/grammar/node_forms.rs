//! Node-position grammar (spec §4.2): `select`, `seq`, `parallel`, `check`,
//! `guard`, `if`, `invert`, `repeat`, `timeout`, `cooldown`, `while`,
//! `reactive`, `reactive-select`, `ref`, plus decorator/macro calls and bare
//! action calls.

use super::expr::expr;
use crate::parser::core::Parser;
use crate::syntax_kind::SyntaxKind::{self, *};

const RESERVED_FORMS: &[&str] = &[
    "select",
    "seq",
    "parallel",
    "check",
    "guard",
    "if",
    "invert",
    "repeat",
    "timeout",
    "cooldown",
    "while",
    "reactive",
    "reactive-select",
    "ref",
];

pub(crate) fn is_reserved(name: &str) -> bool {
    RESERVED_FORMS.contains(&name)
}

/// Parses one node-position form. Returns false if the current position is
/// not a recognizable node, in which case nothing was consumed.
pub(crate) fn node(p: &mut Parser) -> bool {
    if !p.enter_recursion() {
        p.error_and_bump("node nesting too deep");
        return true;
    }
    let ok = node_inner(p);
    p.exit_recursion();
    ok
}

fn node_inner(p: &mut Parser) -> bool {
    if p.at_body_placeholder() {
        p.bump_body_placeholder();
        return true;
    }
    match p.current() {
        MemberTok => {
            action_call_bare(p);
            true
        }
        LParen => {
            let Some(head) = p.nth_text(1) else {
                return false;
            };
            match head {
                "select" => simple_form(p, Select),
                "seq" => simple_form(p, Sequence),
                "parallel" => parallel_form(p),
                "check" => check_form(p),
                "guard" => guard_form(p),
                "if" => if_form(p),
                "invert" => simple_form(p, Invert),
                "repeat" => repeat_form(p),
                "timeout" => timeout_or_cooldown_form(p, Timeout),
                "cooldown" => timeout_or_cooldown_form(p, Cooldown),
                "while" => while_form(p),
                "reactive" => reactive_form(p),
                "reactive-select" => simple_form(p, ReactiveSelect),
                "ref" => ref_form(p),
                _ if head.starts_with('.') => {
                    action_call_paren(p);
                    true
                }
                _ => {
                    decorator_or_macro_call(p);
                    true
                }
            }
        }
        _ => false,
    }
}

fn bump_keyword(p: &mut Parser) {
    p.bump(); // (
    p.bump(); // keyword identifier
}

/// `select`/`seq`/`invert`/`reactive-select`: keyword then zero-or-more
/// children until the closing paren.
fn simple_form(p: &mut Parser, kind: SyntaxKind) -> bool {
    p.start_node(kind);
    bump_keyword(p);
    while !p.at(RParen) && !p.eof() {
        node_or_recover(p);
    }
    p.expect(RParen);
    p.finish_node();
    true
}

fn parallel_form(p: &mut Parser) -> bool {
    p.start_node(Parallel);
    bump_keyword(p);
    if p.at(KeywordTok) {
        p.bump();
    } else {
        p.error_msg("expected a parallel policy keyword (:any, :all, :n)");
    }
    if p.at(IntLit) {
        p.bump();
    }
    while !p.at(RParen) && !p.eof() {
        node_or_recover(p);
    }
    p.expect(RParen);
    p.finish_node();
    true
}

fn check_form(p: &mut Parser) -> bool {
    p.start_node(Check);
    bump_keyword(p);
    expr(p);
    p.expect(RParen);
    p.finish_node();
    true
}

fn guard_form(p: &mut Parser) -> bool {
    p.start_node(Guard);
    bump_keyword(p);
    expr(p);
    node_or_recover(p);
    p.expect(RParen);
    p.finish_node();
    true
}

fn if_form(p: &mut Parser) -> bool {
    p.start_node(If);
    bump_keyword(p);
    expr(p);
    node_or_recover(p);
    if !p.at(RParen) {
        node_or_recover(p);
    }
    p.expect(RParen);
    p.finish_node();
    true
}

fn repeat_form(p: &mut Parser) -> bool {
    p.start_node(Repeat);
    bump_keyword(p);
    if p.at(IntLit) {
        p.bump();
    } else {
        p.error_msg("repeat count must be an integer literal");
    }
    node_or_recover(p);
    p.expect(RParen);
    p.finish_node();
    true
}

fn timeout_or_cooldown_form(p: &mut Parser, kind: SyntaxKind) -> bool {
    p.start_node(kind);
    bump_keyword(p);
    if p.at(IntLit) || p.at(FloatLit) {
        p.bump();
    } else {
        p.error_msg("expected a numeric duration");
    }
    node_or_recover(p);
    p.expect(RParen);
    p.finish_node();
    true
}

fn while_form(p: &mut Parser) -> bool {
    p.start_node(While);
    bump_keyword(p);
    expr(p);
    node_or_recover(p);
    p.expect(RParen);
    p.finish_node();
    true
}

fn reactive_form(p: &mut Parser) -> bool {
    p.start_node(Reactive);
    bump_keyword(p);
    expr(p);
    node_or_recover(p);
    p.expect(RParen);
    p.finish_node();
    true
}

fn ref_form(p: &mut Parser) -> bool {
    p.start_node(Ref);
    bump_keyword(p);
    if p.at(Ident) {
        p.bump();
    } else {
        p.error_msg("expected a tree name");
    }
    p.expect(RParen);
    p.finish_node();
    true
}

/// `(.Method arg*)` or `(Type.Method arg*)` at node position: an action call.
fn action_call_paren(p: &mut Parser) -> bool {
    p.start_node(Call);
    p.bump(); // (
    p.bump(); // member token
    while !p.at(RParen) && !p.eof() {
        expr(p);
    }
    p.expect(RParen);
    p.finish_node();
    true
}

/// A bare `.Method` with no arguments and no parens at node position.
fn action_call_bare(p: &mut Parser) -> bool {
    p.start_node(Call);
    p.bump();
    p.finish_node();
    true
}

/// `(name arg*)` where `name` is neither a reserved keyword nor a dotted
/// member path: a decorator or macro call (resolved by a later stage).
fn decorator_or_macro_call(p: &mut Parser) -> bool {
    p.start_node(DefdecCall);
    p.bump(); // (
    p.bump(); // name identifier
    while !p.at(RParen) && !p.eof() {
        if p.at_body_placeholder() {
            p.bump_body_placeholder();
        } else if node_lookahead_is_node(p) {
            node_or_recover(p);
        } else {
            expr(p);
        }
    }
    p.expect(RParen);
    p.finish_node();
    true
}

const EXPR_FORM_HEADS: &[&str] = &["not", "and", "or"];

fn node_lookahead_is_node(p: &Parser) -> bool {
    match p.current() {
        MemberTok => true,
        LParen => match p.nth_text(1) {
            Some(name) if EXPR_FORM_HEADS.contains(&name) => false,
            Some(name) => is_reserved(name) || name.starts_with('.') || !is_operator_text(name),
            None => false,
        },
        _ => false,
    }
}

fn is_operator_text(name: &str) -> bool {
    matches!(name, "+" | "-" | "*" | "/" | "%" | "<" | ">" | "<=" | ">=" | "=" | "!=")
}

fn node_or_recover(p: &mut Parser) {
    if !node(p) {
        p.error_and_bump("expected a node");
    }
}

#[cfg(test)]
mod node_forms_tests {
    use crate::parser::core::parse;

    #[test]
    fn minimal_tree_parses_without_diagnostics() {
        let src = "(tree SimpleCombat (select (seq (check (< .Health 30)) (.Flee)) (.Patrol)))";
        let result = parse(src);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(result.root.text().to_string(), src);
    }

    #[test]
    fn repeat_requires_an_integer_count() {
        let result = parse("(tree T (repeat 3 (.Attack)))");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn parallel_with_n_policy_reads_the_count() {
        let result = parse("(tree T (parallel :n 2 (.A) (.B) (.C)))");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn if_without_else_is_accepted() {
        let result = parse("(tree T (if (< .Health 1) (.Die)))");
        assert!(result.diagnostics.is_empty());
    }
}
