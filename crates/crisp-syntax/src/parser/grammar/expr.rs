//! Expression-position grammar (spec §4.2): literal | member-access |
//! blackboard-access | `(OP lhs rhs)` | `(not x)` | `(- x)` | `(and ...)` |
//! `(or ...)` | `(.Method arg*)` call-in-expression.

use crate::parser::core::Parser;
use crate::syntax_kind::SyntaxKind::{self, *};

const COMPARISON_OPS: &[SyntaxKind] = &[Lt, Gt, Le, Ge, Eq, Ne];
const ARITHMETIC_OPS: &[SyntaxKind] = &[Plus, Minus, Star, Slash, Percent];

/// Parses one expression, wrapping it in the appropriate CST node.
pub(crate) fn expr(p: &mut Parser) {
    if !p.enter_recursion() {
        p.error_and_bump("expression nesting too deep");
        return;
    }
    expr_inner(p);
    p.exit_recursion();
}

fn expr_inner(p: &mut Parser) {
    match p.current() {
        IntLit => leaf(p, IntLiteral),
        FloatLit => leaf(p, FloatLiteral),
        StrLit => leaf(p, StringLiteral),
        KwTrue | KwFalse => leaf(p, BoolLiteral),
        KwNull => leaf(p, NullLiteral),
        EnumLit => leaf(p, EnumLiteral),
        MemberTok => leaf(p, MemberAccess),
        BlackboardTok => leaf(p, BlackboardAccess),
        LParen => paren_expr(p),
        Ident => leaf(p, ParamRef),
        _ => p.error_and_bump("expected an expression"),
    }
}

fn leaf(p: &mut Parser, kind: SyntaxKind) {
    p.start_node(kind);
    p.bump();
    p.finish_node();
}

fn paren_expr(p: &mut Parser) {
    let checkpoint = p.checkpoint();
    p.bump(); // (

    if p.nth_text(0) == Some("not") {
        p.bump();
        expr(p);
        expect_close(p);
        p.start_node_at(checkpoint, UnaryExpr);
        p.finish_node();
        return;
    }
    if matches!(p.nth_text(0), Some("and") | Some("or")) {
        p.bump();
        while !p.at(RParen) && !p.eof() {
            expr(p);
        }
        expect_close(p);
        p.start_node_at(checkpoint, LogicExpr);
        p.finish_node();
        return;
    }
    if p.at(Minus) {
        // `(- x)` unary negate vs `(- lhs rhs)` binary subtraction: decided
        // by whether a second operand follows the first.
        p.bump();
        expr(p);
        if p.at(RParen) {
            expect_close(p);
            p.start_node_at(checkpoint, UnaryExpr);
        } else {
            expr(p);
            expect_close(p);
            p.start_node_at(checkpoint, BinaryExpr);
        }
        p.finish_node();
        return;
    }
    if is_operator_head(p.current()) {
        p.bump();
        expr(p); // lhs
        expr(p); // rhs
        expect_close(p);
        p.start_node_at(checkpoint, BinaryExpr);
        p.finish_node();
        return;
    }
    if p.at(MemberTok) {
        p.bump();
        while !p.at(RParen) && !p.eof() {
            expr(p);
        }
        expect_close(p);
        p.start_node_at(checkpoint, Call);
        p.finish_node();
        return;
    }

    p.error_and_bump("unrecognized expression form");
}

fn is_operator_head(kind: SyntaxKind) -> bool {
    COMPARISON_OPS.contains(&kind) || ARITHMETIC_OPS.contains(&kind)
}

fn expect_close(p: &mut Parser) {
    if !p.expect(RParen) {
        // already reported; caller's checkpoint-based node still closes cleanly
    }
}

#[cfg(test)]
mod expr_tests {
    use crate::parser::core::parse;

    #[test]
    fn binary_comparison_parses_as_binary_expr() {
        let result = parse("(tree T (check (< .Health 30)))");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn negative_literal_is_a_literal_not_a_unary_expr() {
        let result = parse("(tree T (check (> .Health -1)))");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn and_or_accept_a_variable_argument_count() {
        let result = parse("(tree T (check (and (< .A 1) (< .B 2) (< .C 3))))");
        assert!(result.diagnostics.is_empty());
    }
}
