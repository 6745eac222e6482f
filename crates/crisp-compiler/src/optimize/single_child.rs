//! Pass 3: single-child collapse (spec §4.8). A `Selector`/`Sequence` with
//! exactly one child is redundant; a double `Invert(Invert(x))` is a no-op.

use crate::ir::{Ir, IrKind};

pub fn collapse(ir: &Ir) -> Ir {
    let kind = collapse_children(&ir.kind);
    match &kind {
        IrKind::Selector(cs) | IrKind::Sequence(cs) if cs.len() == 1 => cs[0].clone(),
        IrKind::Invert(inner) => {
            if let IrKind::Invert(innermost) = &inner.kind {
                return (**innermost).clone();
            }
            Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind }
        }
        _ => Ir { id: ir.id, ty: ir.ty.clone(), span: ir.span, kind },
    }
}

fn collapse_children(kind: &IrKind) -> IrKind {
    use IrKind::*;
    match kind {
        Selector(cs) => Selector(cs.iter().map(collapse).collect()),
        Sequence(cs) => Sequence(cs.iter().map(collapse).collect()),
        ReactiveSelect(cs) => ReactiveSelect(cs.iter().map(collapse).collect()),
        Parallel { policy, children } => Parallel {
            policy: *policy,
            children: children.iter().map(collapse).collect(),
        },
        Guard { cond, body } => Guard { cond: cond.clone(), body: Box::new(collapse(body)) },
        If { cond, then_branch, else_branch } => If {
            cond: cond.clone(),
            then_branch: Box::new(collapse(then_branch)),
            else_branch: else_branch.as_ref().map(|e| Box::new(collapse(e))),
        },
        Invert(b) => Invert(Box::new(collapse(b))),
        Repeat { count, body } => Repeat { count: *count, body: Box::new(collapse(body)) },
        Timeout { seconds, body } => Timeout { seconds: *seconds, body: Box::new(collapse(body)) },
        Cooldown { seconds, body } => Cooldown { seconds: *seconds, body: Box::new(collapse(body)) },
        While { cond, body } => While { cond: cond.clone(), body: Box::new(collapse(body)) },
        Reactive { cond, body } => Reactive { cond: cond.clone(), body: Box::new(collapse(body)) },
        other => other.clone(),
    }
}

#[cfg(test)]
mod single_child_tests {
    use super::*;
    use crisp_core::{Span, TypeRef};

    fn action(name: &str) -> Ir {
        Ir {
            id: None,
            ty: TypeRef::BtStatus,
            span: Span::empty(0),
            kind: IrKind::Action { declaring_type: "this".to_string(), name: name.to_string(), args: vec![] },
        }
    }

    #[test]
    fn single_child_selector_collapses_to_its_child() {
        let ir = Ir {
            id: Some(0),
            ty: TypeRef::Unknown,
            span: Span::empty(0),
            kind: IrKind::Selector(vec![action("A")]),
        };
        let reduced = collapse(&ir);
        assert!(matches!(reduced.kind, IrKind::Action { .. }));
    }

    #[test]
    fn double_invert_collapses_to_the_innermost_node() {
        let ir = Ir {
            id: Some(0),
            ty: TypeRef::Unknown,
            span: Span::empty(0),
            kind: IrKind::Invert(Box::new(Ir {
                id: Some(1),
                ty: TypeRef::Unknown,
                span: Span::empty(0),
                kind: IrKind::Invert(Box::new(action("A"))),
            })),
        };
        let reduced = collapse(&ir);
        assert!(matches!(reduced.kind, IrKind::Action { .. }));
    }
}
