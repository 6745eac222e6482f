//! The typed intermediate representation (spec §3): a single recursive sum
//! type, unlike the AST's node/expression split — composite control nodes
//! and expression nodes are unified so every subtree carries a `TypeRef`
//! and an optional stable id (spec §4.7).

use crisp_core::{Span, TypeRef};
use crisp_syntax::ast_lower::{BinaryOp, Literal, ParallelPolicy, UnaryOp};

/// One IR node: its stable id (assigned pre-order by lowering, spec §4.7),
/// inferred type, originating CST span (for diagnostic correlation), and
/// variant payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Ir {
    pub id: Option<u32>,
    pub ty: TypeRef,
    pub span: Span,
    pub kind: IrKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrKind {
    Selector(Vec<Ir>),
    Sequence(Vec<Ir>),
    Parallel {
        policy: ParallelPolicy,
        children: Vec<Ir>,
    },
    Guard {
        cond: Box<Ir>,
        body: Box<Ir>,
    },
    If {
        cond: Box<Ir>,
        then_branch: Box<Ir>,
        else_branch: Option<Box<Ir>>,
    },
    Invert(Box<Ir>),
    Repeat {
        count: i32,
        body: Box<Ir>,
    },
    Timeout {
        seconds: f32,
        body: Box<Ir>,
    },
    Cooldown {
        seconds: f32,
        body: Box<Ir>,
    },
    While {
        cond: Box<Ir>,
        body: Box<Ir>,
    },
    Reactive {
        cond: Box<Ir>,
        body: Box<Ir>,
    },
    ReactiveSelect(Vec<Ir>),
    TreeRef(String),
    Condition(Box<Ir>),
    Action {
        declaring_type: String,
        name: String,
        args: Vec<Ir>,
    },
    Call {
        declaring_type: String,
        name: String,
        args: Vec<Ir>,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: Box<Ir>,
        rhs: Box<Ir>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Ir>,
    },
    LogicOp {
        is_and: bool,
        operands: Vec<Ir>,
    },
    Literal(Literal),
    MemberLoad(Vec<String>),
    BlackboardLoad(Vec<String>),
    Convert(Box<Ir>, TypeRef),
}

impl Ir {
    pub fn children(&self) -> Vec<&Ir> {
        use IrKind::*;
        match &self.kind {
            Selector(cs) | Sequence(cs) | ReactiveSelect(cs) => cs.iter().collect(),
            Parallel { children, .. } => children.iter().collect(),
            Guard { cond, body } => vec![cond.as_ref(), body.as_ref()],
            If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut v = vec![cond.as_ref(), then_branch.as_ref()];
                if let Some(e) = else_branch {
                    v.push(e.as_ref());
                }
                v
            }
            Invert(b) | Repeat { body: b, .. } | Timeout { body: b, .. } | Cooldown { body: b, .. } => {
                vec![b.as_ref()]
            }
            While { cond, body } | Reactive { cond, body } => vec![cond.as_ref(), body.as_ref()],
            Condition(e) => vec![e.as_ref()],
            Action { args, .. } | Call { args, .. } => args.iter().collect(),
            BinaryOp { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            UnaryOp { operand, .. } => vec![operand.as_ref()],
            LogicOp { operands, .. } => operands.iter().collect(),
            Convert(inner, _) => vec![inner.as_ref()],
            TreeRef(_) | Literal(_) | MemberLoad(_) | BlackboardLoad(_) => vec![],
        }
    }
}
