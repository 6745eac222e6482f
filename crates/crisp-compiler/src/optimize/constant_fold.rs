//! Pass 1: constant folding (spec §4.8). Division by zero is deliberately
//! left unfolded so runtime semantics decide it.

use crate::ir::{Ir, IrKind};
use crisp_core::TypeRef;
use crisp_syntax::ast_lower::{BinaryOp, Literal, UnaryOp};

pub fn fold(ir: &Ir) -> Ir {
    let kind = fold_children(&ir.kind);
    match &kind {
        IrKind::BinaryOp { op, lhs, rhs } => {
            if let (IrKind::Literal(l), IrKind::Literal(r)) = (&lhs.kind, &rhs.kind) {
                if let Some(folded) = fold_binary(*op, l, r) {
                    return Ir {
                        id: ir.id,
                        ty: literal_type(&folded),
                        span: ir.span,
                        kind: IrKind::Literal(folded),
                    };
                }
            }
            Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind }
        }
        IrKind::UnaryOp { op, operand } => {
            if let IrKind::Literal(v) = &operand.kind {
                if let Some(folded) = fold_unary(*op, v) {
                    return Ir {
                        id: ir.id,
                        ty: literal_type(&folded),
                        span: ir.span,
                        kind: IrKind::Literal(folded),
                    };
                }
            }
            Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind }
        }
        _ => Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind },
    }
}

fn fold_children(kind: &IrKind) -> IrKind {
    use IrKind::*;
    match kind {
        Selector(cs) => Selector(cs.iter().map(fold).collect()),
        Sequence(cs) => Sequence(cs.iter().map(fold).collect()),
        ReactiveSelect(cs) => ReactiveSelect(cs.iter().map(fold).collect()),
        Parallel { policy, children } => Parallel {
            policy: *policy,
            children: children.iter().map(fold).collect(),
        },
        Guard { cond, body } => Guard {
            cond: Box::new(fold(cond)),
            body: Box::new(fold(body)),
        },
        If { cond, then_branch, else_branch } => If {
            cond: Box::new(fold(cond)),
            then_branch: Box::new(fold(then_branch)),
            else_branch: else_branch.as_ref().map(|e| Box::new(fold(e))),
        },
        Invert(b) => Invert(Box::new(fold(b))),
        Repeat { count, body } => Repeat { count: *count, body: Box::new(fold(body)) },
        Timeout { seconds, body } => Timeout { seconds: *seconds, body: Box::new(fold(body)) },
        Cooldown { seconds, body } => Cooldown { seconds: *seconds, body: Box::new(fold(body)) },
        While { cond, body } => While { cond: Box::new(fold(cond)), body: Box::new(fold(body)) },
        Reactive { cond, body } => Reactive { cond: Box::new(fold(cond)), body: Box::new(fold(body)) },
        Condition(e) => Condition(Box::new(fold(e))),
        Action { declaring_type, name, args } => Action {
            declaring_type: declaring_type.clone(),
            name: name.clone(),
            args: args.iter().map(fold).collect(),
        },
        Call { declaring_type, name, args } => Call {
            declaring_type: declaring_type.clone(),
            name: name.clone(),
            args: args.iter().map(fold).collect(),
        },
        BinaryOp { op, lhs, rhs } => BinaryOp {
            op: *op,
            lhs: Box::new(fold(lhs)),
            rhs: Box::new(fold(rhs)),
        },
        UnaryOp { op, operand } => UnaryOp { op: *op, operand: Box::new(fold(operand)) },
        LogicOp { is_and, operands } => LogicOp {
            is_and: *is_and,
            operands: operands.iter().map(fold).collect(),
        },
        Convert(inner, to) => Convert(Box::new(fold(inner)), to.clone()),
        TreeRef(_) | Literal(_) | MemberLoad(_) | BlackboardLoad(_) => kind.clone(),
    }
}

fn fold_binary(op: BinaryOp, lhs: &Literal, rhs: &Literal) -> Option<Literal> {
    use Literal::*;
    match (lhs, rhs) {
        (Int(a), Int(b)) => {
            if op.is_comparison() {
                return Some(Bool(compare(*a as f64, *b as f64, op)));
            }
            match op {
                BinaryOp::Add => Some(Int(a.wrapping_add(*b))),
                BinaryOp::Sub => Some(Int(a.wrapping_sub(*b))),
                BinaryOp::Mul => Some(Int(a.wrapping_mul(*b))),
                BinaryOp::Div if *b != 0 => Some(Int(a.wrapping_div(*b))),
                BinaryOp::Mod if *b != 0 => Some(Int(a.wrapping_rem(*b))),
                _ => None,
            }
        }
        (Float(a), Float(b)) => {
            if op.is_comparison() {
                return Some(Bool(compare(*a as f64, *b as f64, op)));
            }
            match op {
                BinaryOp::Add => Some(Float(a + b)),
                BinaryOp::Sub => Some(Float(a - b)),
                BinaryOp::Mul => Some(Float(a * b)),
                BinaryOp::Div if *b != 0.0 => Some(Float(a / b)),
                BinaryOp::Mod if *b != 0.0 => Some(Float(a % b)),
                _ => None,
            }
        }
        (Bool(a), Bool(b)) => match op {
            BinaryOp::Eq => Some(Bool(a == b)),
            BinaryOp::Ne => Some(Bool(a != b)),
            _ => None,
        },
        (String(a), String(b)) => match op {
            BinaryOp::Eq => Some(Bool(a == b)),
            BinaryOp::Ne => Some(Bool(a != b)),
            _ => None,
        },
        (Null, Null) => match op {
            BinaryOp::Eq => Some(Bool(true)),
            BinaryOp::Ne => Some(Bool(false)),
            _ => None,
        },
        (Enum(t1, m1), Enum(t2, m2)) => match op {
            BinaryOp::Eq => Some(Bool(t1 == t2 && m1 == m2)),
            BinaryOp::Ne => Some(Bool(t1 != t2 || m1 != m2)),
            _ => None,
        },
        _ => None,
    }
}

fn compare(a: f64, b: f64, op: BinaryOp) -> bool {
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Gt => a > b,
        BinaryOp::Le => a <= b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        _ => unreachable!("non-comparison operator routed through compare()"),
    }
}

fn fold_unary(op: UnaryOp, operand: &Literal) -> Option<Literal> {
    match (op, operand) {
        (UnaryOp::Not, Literal::Bool(b)) => Some(Literal::Bool(!b)),
        (UnaryOp::Negate, Literal::Int(v)) => Some(Literal::Int(v.wrapping_neg())),
        (UnaryOp::Negate, Literal::Float(v)) => Some(Literal::Float(-v)),
        _ => None,
    }
}

fn literal_type(lit: &Literal) -> TypeRef {
    match lit {
        Literal::Int(_) => TypeRef::Int,
        Literal::Float(_) => TypeRef::Float,
        Literal::String(_) => TypeRef::String,
        Literal::Bool(_) => TypeRef::Bool,
        Literal::Null => TypeRef::Null,
        Literal::Enum(type_name, _) => TypeRef::Enum(type_name.clone()),
    }
}

#[cfg(test)]
mod constant_fold_tests {
    use super::*;
    use crisp_core::Span;

    fn lit(l: Literal) -> Ir {
        Ir { id: None, ty: literal_type(&l), span: Span::empty(0), kind: IrKind::Literal(l) }
    }

    #[test]
    fn int_addition_of_two_literals_folds_to_a_literal() {
        let ir = Ir {
            id: Some(0),
            ty: TypeRef::Int,
            span: Span::empty(0),
            kind: IrKind::BinaryOp {
                op: BinaryOp::Add,
                lhs: Box::new(lit(Literal::Int(2))),
                rhs: Box::new(lit(Literal::Int(3))),
            },
        };
        let folded = fold(&ir);
        assert!(matches!(folded.kind, IrKind::Literal(Literal::Int(5))));
    }

    #[test]
    fn division_by_zero_is_left_unfolded() {
        let ir = Ir {
            id: Some(0),
            ty: TypeRef::Int,
            span: Span::empty(0),
            kind: IrKind::BinaryOp {
                op: BinaryOp::Div,
                lhs: Box::new(lit(Literal::Int(10))),
                rhs: Box::new(lit(Literal::Int(0))),
            },
        };
        let folded = fold(&ir);
        assert!(matches!(folded.kind, IrKind::BinaryOp { .. }));
    }

    #[test]
    fn comparison_of_literals_folds_to_a_bool_literal() {
        let ir = Ir {
            id: Some(0),
            ty: TypeRef::Bool,
            span: Span::empty(0),
            kind: IrKind::BinaryOp {
                op: BinaryOp::Lt,
                lhs: Box::new(lit(Literal::Int(2))),
                rhs: Box::new(lit(Literal::Int(3))),
            },
        };
        let folded = fold(&ir);
        assert!(matches!(folded.kind, IrKind::Literal(Literal::Bool(true))));
    }
}
