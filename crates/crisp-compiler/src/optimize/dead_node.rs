//! Pass 2: dead-node elimination (spec §4.8). A `Condition(Literal(false))`
//! child inside a `Sequence` always fails the sequence; everything after it
//! can never run. A `Condition(Literal(true))` child inside a `Selector`
//! always succeeds; everything after it can never run.

use crate::ir::{Ir, IrKind};
use crisp_syntax::ast_lower::Literal;

pub fn eliminate(ir: &Ir) -> Ir {
    let kind = match &ir.kind {
        IrKind::Sequence(children) => {
            IrKind::Sequence(truncate_after_short_circuit(children, is_false_condition))
        }
        IrKind::Selector(children) => {
            IrKind::Selector(truncate_after_short_circuit(children, is_true_condition))
        }
        other => eliminate_children(other),
    };
    Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind }
}

fn truncate_after_short_circuit(
    children: &[Ir],
    is_short_circuit: impl Fn(&Ir) -> bool,
) -> Vec<Ir> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        let folded = eliminate(child);
        let stop = is_short_circuit(&folded);
        out.push(folded);
        if stop {
            break;
        }
    }
    out
}

fn is_false_condition(ir: &Ir) -> bool {
    matches!(&ir.kind, IrKind::Condition(e) if matches!(e.kind, IrKind::Literal(Literal::Bool(false))))
}

fn is_true_condition(ir: &Ir) -> bool {
    matches!(&ir.kind, IrKind::Condition(e) if matches!(e.kind, IrKind::Literal(Literal::Bool(true))))
}

fn eliminate_children(kind: &IrKind) -> IrKind {
    use IrKind::*;
    match kind {
        ReactiveSelect(cs) => ReactiveSelect(cs.iter().map(eliminate).collect()),
        Parallel { policy, children } => Parallel {
            policy: *policy,
            children: children.iter().map(eliminate).collect(),
        },
        Guard { cond, body } => Guard { cond: cond.clone(), body: Box::new(eliminate(body)) },
        If { cond, then_branch, else_branch } => If {
            cond: cond.clone(),
            then_branch: Box::new(eliminate(then_branch)),
            else_branch: else_branch.as_ref().map(|e| Box::new(eliminate(e))),
        },
        Invert(b) => Invert(Box::new(eliminate(b))),
        Repeat { count, body } => Repeat { count: *count, body: Box::new(eliminate(body)) },
        Timeout { seconds, body } => Timeout { seconds: *seconds, body: Box::new(eliminate(body)) },
        Cooldown { seconds, body } => Cooldown { seconds: *seconds, body: Box::new(eliminate(body)) },
        While { cond, body } => While { cond: cond.clone(), body: Box::new(eliminate(body)) },
        Reactive { cond, body } => Reactive { cond: cond.clone(), body: Box::new(eliminate(body)) },
        other => other.clone(),
    }
}

#[cfg(test)]
mod dead_node_tests {
    use super::*;
    use crisp_core::{Span, TypeRef};
    use crisp_syntax::ast_lower::Literal;

    fn bool_lit(v: bool) -> Ir {
        Ir { id: None, ty: TypeRef::Bool, span: Span::empty(0), kind: IrKind::Literal(Literal::Bool(v)) }
    }

    fn action(name: &str) -> Ir {
        Ir {
            id: None,
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Action { declaring_type: "this".to_string(), name: name.to_string(), args: vec![] },
        }
    }

    fn cond(v: bool) -> Ir {
        Ir { id: None, ty: TypeRef::Bool, span: Span::empty(0), kind: IrKind::Condition(Box::new(bool_lit(v))) }
    }

    #[test]
    fn false_condition_in_a_sequence_drops_everything_after_it() {
        let ir = Ir {
            id: Some(0),
            ty: TypeRef::Unknown,
            span: Span::empty(0),
            kind: IrKind::Sequence(vec![action("A"), cond(false), action("B")]),
        };
        let reduced = eliminate(&ir);
        let IrKind::Sequence(children) = reduced.kind else { panic!() };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn true_condition_in_a_selector_drops_everything_after_it() {
        let ir = Ir {
            id: Some(0),
            ty: TypeRef::Unknown,
            span: Span::empty(0),
            kind: IrKind::Selector(vec![action("A"), cond(true), action("B")]),
        };
        let reduced = eliminate(&ir);
        let IrKind::Selector(children) = reduced.kind else { panic!() };
        assert_eq!(children.len(), 2);
    }
}
