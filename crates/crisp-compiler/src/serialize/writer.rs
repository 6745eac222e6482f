//! IR → S-expression text (spec §4.9). Block children (composite sub-trees)
//! get their own indented line; argument lists stay inline on the node's
//! own line, matching the external-interfaces example in spec §6.

use crate::ir::{Ir, IrKind};
use crate::lower::{IrProgram, IrTree};
use crisp_core::TypeRef;
use crisp_syntax::ast_lower::{BinaryOp, Literal, ParallelPolicy, UnaryOp};

pub fn serialize_program(program: &IrProgram) -> String {
    program
        .trees
        .iter()
        .map(serialize_tree)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn serialize_tree(tree: &IrTree) -> String {
    let mut out = format!("(ir-tree {}", quote(&tree.name));
    if let Some(bb) = &tree.blackboard_type {
        out.push_str(&format!(" :blackboard {}", quote(bb)));
    }
    out.push('\n');
    out.push_str(&write_block(&tree.body, 1));
    out.push(')');
    out
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

/// Every node's id (spec §4.7) and inferred type ride along as trailing
/// `:id`/`:type` keywords so a round trip through text reproduces both,
/// not just the tree shape (spec §3, §8).
fn meta_suffix(ir: &Ir) -> String {
    let mut s = String::new();
    if let Some(id) = ir.id {
        s.push_str(&format!(" :id {id}"));
    }
    if ir.ty != TypeRef::Unknown {
        s.push_str(&format!(" :type {}", quote(&type_wire_name(&ir.ty))));
    }
    s
}

/// `TypeRef::Enum` and `TypeRef::Named` share a display name, but only one
/// of the two should come back out of `extract_tail_meta` on the other end,
/// so enum types get a distinguishing wire prefix the two variants don't
/// otherwise need anywhere else.
fn type_wire_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Enum(name) => format!("enum:{name}"),
        other => other.name().to_string(),
    }
}

/// Inserts `meta_suffix` just before a rendered form's closing paren.
fn inject_meta(mut rendered: String, ir: &Ir) -> String {
    let suffix = meta_suffix(ir);
    if suffix.is_empty() {
        return rendered;
    }
    rendered.pop();
    rendered.push_str(&suffix);
    rendered.push(')');
    rendered
}

fn write_block(ir: &Ir, indent: usize) -> String {
    inject_meta(write_block_core(ir, indent), ir)
}

fn write_block_core(ir: &Ir, indent: usize) -> String {
    use IrKind::*;
    let p = pad(indent);
    match &ir.kind {
        Selector(cs) => wrap("ir-selector", &[], &refs(cs), indent),
        Sequence(cs) => wrap("ir-sequence", &[], &refs(cs), indent),
        ReactiveSelect(cs) => wrap("ir-reactive-select", &[], &refs(cs), indent),
        Parallel { policy, children } => {
            wrap("ir-parallel", &[policy_atom(*policy)], &refs(children), indent)
        }
        Guard { cond, body } => wrap("ir-guard", &[], &[cond.as_ref(), body.as_ref()], indent),
        If { cond, then_branch, else_branch } => {
            let mut kids = vec![cond.as_ref(), then_branch.as_ref()];
            if let Some(e) = else_branch {
                kids.push(e.as_ref());
            }
            wrap("ir-if", &[], &kids, indent)
        }
        Invert(b) => wrap("ir-invert", &[], &[b.as_ref()], indent),
        Repeat { count, body } => wrap("ir-repeat", &[count.to_string()], &[body.as_ref()], indent),
        Timeout { seconds, body } => wrap("ir-timeout", &[fmt_f32(*seconds)], &[body.as_ref()], indent),
        Cooldown { seconds, body } => wrap("ir-cooldown", &[fmt_f32(*seconds)], &[body.as_ref()], indent),
        While { cond, body } => wrap("ir-while", &[], &[cond.as_ref(), body.as_ref()], indent),
        Reactive { cond, body } => wrap("ir-reactive", &[], &[cond.as_ref(), body.as_ref()], indent),
        TreeRef(name) => format!("{p}(ir-tree-ref {})", quote(name)),
        Condition(e) => wrap("ir-condition", &[], &[e.as_ref()], indent),
        Action { declaring_type, name, args } => leaf_with_args("ir-action", declaring_type, name, args, indent),
        Call { declaring_type, name, args } => leaf_with_args("ir-call", declaring_type, name, args, indent),
        BinaryOp { op, lhs, rhs } => {
            wrap("ir-binary-op", &[binary_op_atom(*op)], &[lhs.as_ref(), rhs.as_ref()], indent)
        }
        UnaryOp { op, operand } => wrap("ir-unary-op", &[unary_op_atom(*op)], &[operand.as_ref()], indent),
        LogicOp { is_and, operands } => wrap("ir-logic-op", &[logic_atom(*is_and)], &refs(operands), indent),
        Literal(lit) => format!("{p}(ir-literal {})", literal_atom(lit)),
        MemberLoad(path) => format!("{p}(ir-member-load {})", path_list(path)),
        BlackboardLoad(path) => format!("{p}(ir-blackboard-load {})", path_list(path)),
        Convert(inner, _to) => wrap("ir-convert", &[], &[inner.as_ref()], indent),
    }
}

fn refs(cs: &[Ir]) -> Vec<&Ir> {
    cs.iter().collect()
}

fn wrap(tag: &str, head_atoms: &[String], children: &[&Ir], indent: usize) -> String {
    let mut s = format!("{}({tag}", pad(indent));
    for atom in head_atoms {
        s.push(' ');
        s.push_str(atom);
    }
    for child in children {
        s.push('\n');
        s.push_str(&write_block(child, indent + 1));
    }
    s.push(')');
    s
}

fn leaf_with_args(tag: &str, declaring_type: &str, name: &str, args: &[Ir], indent: usize) -> String {
    let args_inline = args.iter().map(write_inline).collect::<Vec<_>>().join(" ");
    format!(
        "{}({tag} {} {} ({args_inline}))",
        pad(indent),
        quote(declaring_type),
        quote(name)
    )
}

/// Single-line rendering used for argument lists: no indentation, children
/// joined by spaces rather than newlines.
fn write_inline(ir: &Ir) -> String {
    inject_meta(write_inline_core(ir), ir)
}

fn write_inline_core(ir: &Ir) -> String {
    use IrKind::*;
    match &ir.kind {
        Selector(cs) => inline_wrap("ir-selector", &[], cs),
        Sequence(cs) => inline_wrap("ir-sequence", &[], cs),
        ReactiveSelect(cs) => inline_wrap("ir-reactive-select", &[], cs),
        Parallel { policy, children } => inline_wrap("ir-parallel", &[policy_atom(*policy)], children),
        Guard { cond, body } => format!("(ir-guard {} {})", write_inline(cond), write_inline(body)),
        Invert(b) => format!("(ir-invert {})", write_inline(b)),
        Repeat { count, body } => format!("(ir-repeat {count} {})", write_inline(body)),
        Timeout { seconds, body } => format!("(ir-timeout {} {})", fmt_f32(*seconds), write_inline(body)),
        Cooldown { seconds, body } => format!("(ir-cooldown {} {})", fmt_f32(*seconds), write_inline(body)),
        While { cond, body } => format!("(ir-while {} {})", write_inline(cond), write_inline(body)),
        Reactive { cond, body } => format!("(ir-reactive {} {})", write_inline(cond), write_inline(body)),
        TreeRef(name) => format!("(ir-tree-ref {})", quote(name)),
        Condition(e) => format!("(ir-condition {})", write_inline(e)),
        If { cond, then_branch, else_branch } => {
            let mut s = format!("(ir-if {} {}", write_inline(cond), write_inline(then_branch));
            if let Some(e) = else_branch {
                s.push(' ');
                s.push_str(&write_inline(e));
            }
            s.push(')');
            s
        }
        Action { declaring_type, name, args } => {
            let args_inline = args.iter().map(write_inline).collect::<Vec<_>>().join(" ");
            format!("(ir-action {} {} ({args_inline}))", quote(declaring_type), quote(name))
        }
        Call { declaring_type, name, args } => {
            let args_inline = args.iter().map(write_inline).collect::<Vec<_>>().join(" ");
            format!("(ir-call {} {} ({args_inline}))", quote(declaring_type), quote(name))
        }
        BinaryOp { op, lhs, rhs } => {
            format!("(ir-binary-op {} {} {})", binary_op_atom(*op), write_inline(lhs), write_inline(rhs))
        }
        UnaryOp { op, operand } => format!("(ir-unary-op {} {})", unary_op_atom(*op), write_inline(operand)),
        LogicOp { is_and, operands } => inline_wrap("ir-logic-op", &[logic_atom(*is_and)], operands),
        Literal(lit) => format!("(ir-literal {})", literal_atom(lit)),
        MemberLoad(path) => format!("(ir-member-load {})", path_list(path)),
        BlackboardLoad(path) => format!("(ir-blackboard-load {})", path_list(path)),
        Convert(inner, _to) => format!("(ir-convert {})", write_inline(inner)),
    }
}

fn inline_wrap(tag: &str, head_atoms: &[String], children: &[Ir]) -> String {
    let mut s = format!("({tag}");
    for atom in head_atoms {
        s.push(' ');
        s.push_str(atom);
    }
    for child in children {
        s.push(' ');
        s.push_str(&write_inline(child));
    }
    s.push(')');
    s
}

fn literal_atom(lit: &Literal) -> String {
    match lit {
        Literal::Int(v) => format!("{v} :int"),
        Literal::Float(v) => format!("{} :float", fmt_f32(*v)),
        Literal::String(s) => format!("{} :string", quote(s)),
        Literal::Bool(b) => format!("{b} :bool"),
        Literal::Null => "null :null".to_string(),
        Literal::Enum(type_name, member_name) => format!("::{type_name}.{member_name} :enum"),
    }
}

fn path_list(path: &[String]) -> String {
    format!("({})", path.iter().map(|s| quote(s)).collect::<Vec<_>>().join(" "))
}

fn policy_atom(policy: ParallelPolicy) -> String {
    match policy {
        ParallelPolicy::Any => ":any".to_string(),
        ParallelPolicy::All => ":all".to_string(),
        ParallelPolicy::N(n) => format!(":n {n}"),
    }
}

fn binary_op_atom(op: BinaryOp) -> String {
    match op {
        BinaryOp::Lt => ":lt",
        BinaryOp::Gt => ":gt",
        BinaryOp::Le => ":le",
        BinaryOp::Ge => ":ge",
        BinaryOp::Eq => ":eq",
        BinaryOp::Ne => ":ne",
        BinaryOp::Add => ":add",
        BinaryOp::Sub => ":sub",
        BinaryOp::Mul => ":mul",
        BinaryOp::Div => ":div",
        BinaryOp::Mod => ":mod",
    }
    .to_string()
}

fn unary_op_atom(op: UnaryOp) -> String {
    match op {
        UnaryOp::Not => ":not",
        UnaryOp::Negate => ":negate",
    }
    .to_string()
}

fn logic_atom(is_and: bool) -> String {
    if is_and { ":and".to_string() } else { ":or".to_string() }
}

fn fmt_f32(v: f32) -> String {
    format!("{v}")
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
