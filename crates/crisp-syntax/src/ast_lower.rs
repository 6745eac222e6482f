//! CST→AST lowering (spec §4.3): strips trivia, parses literal texts into
//! values, decodes string escapes, resolves `parallel` policy, and performs
//! node-vs-expression disambiguation. `Missing`/`Error` CST nodes are
//! elided — their diagnostics were already recorded by the parser.

use crate::ast;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use crisp_core::diagnostics::DiagnosticCode;
use crisp_core::{Diagnostics, Span};

fn span_of(node: &SyntaxNode) -> Span {
    let range = node.text_range();
    Span::new(range.start().into(), range.end().into())
}

/// Parallel composite policy (spec §3): `Any`, `All`, or `N(count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelPolicy {
    Any,
    All,
    N(i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::Eq | Self::Ne)
    }

    fn from_kind(kind: SyntaxKind) -> Option<Self> {
        use SyntaxKind::*;
        Some(match kind {
            Lt => Self::Lt,
            Gt => Self::Gt,
            Le => Self::Le,
            Ge => Self::Ge,
            Eq => Self::Eq,
            Ne => Self::Ne,
            Plus => Self::Add,
            Minus => Self::Sub,
            Star => Self::Mul,
            Slash => Self::Div,
            Percent => Self::Mod,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Float(f32),
    String(String),
    Bool(bool),
    Null,
    Enum(String, String),
}

/// An expression-position AST node, with a back-pointer to its CST origin.
#[derive(Debug, Clone)]
pub struct AstExpr {
    pub kind: AstExprKind,
    pub origin: SyntaxNode,
}

#[derive(Debug, Clone)]
pub enum AstExprKind {
    Literal(Literal),
    MemberAccess(Vec<String>),
    BlackboardAccess(Vec<String>),
    BinaryExpr {
        op: BinaryOp,
        lhs: Box<AstExpr>,
        rhs: Box<AstExpr>,
    },
    UnaryExpr {
        op: UnaryOp,
        operand: Box<AstExpr>,
    },
    LogicExpr {
        is_and: bool,
        operands: Vec<AstExpr>,
    },
    CallExpr {
        member: Vec<String>,
        args: Vec<AstExpr>,
    },
    /// A macro/decorator parameter reference (spec §4.4/§4.5); substituted
    /// away during expansion. Surviving into IR lowering is a known
    /// limitation the source documents (spec §9) rather than a hard error.
    ParamRef(String),
    /// A malformed expression form the parser already diagnosed.
    Error,
}

/// A node-position AST node, with a back-pointer to its CST origin.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: AstNodeKind,
    pub origin: SyntaxNode,
}

/// An argument to a decorator/macro call, which may occupy either position
/// (spec §4.2's tie-break is resolved per-argument at parse time).
#[derive(Debug, Clone)]
pub enum AstArg {
    Node(AstNode),
    Expr(AstExpr),
}

#[derive(Debug, Clone)]
pub enum AstNodeKind {
    Select(Vec<AstNode>),
    Sequence(Vec<AstNode>),
    Parallel {
        policy: ParallelPolicy,
        children: Vec<AstNode>,
    },
    Check(AstExpr),
    Guard {
        cond: AstExpr,
        body: Box<AstNode>,
    },
    If {
        cond: AstExpr,
        then_branch: Box<AstNode>,
        else_branch: Option<Box<AstNode>>,
    },
    Invert(Box<AstNode>),
    Repeat {
        count: i32,
        body: Box<AstNode>,
    },
    Timeout {
        seconds: f32,
        body: Box<AstNode>,
    },
    Cooldown {
        seconds: f32,
        body: Box<AstNode>,
    },
    While {
        cond: AstExpr,
        body: Box<AstNode>,
    },
    Reactive {
        cond: AstExpr,
        body: Box<AstNode>,
    },
    ReactiveSelect(Vec<AstNode>),
    Ref {
        name: String,
        /// Populated by the reference resolver (spec §4.6, §9's note on the
        /// one place the design mutates a node after construction).
        resolved: std::cell::RefCell<Option<String>>,
    },
    ActionCall {
        member: Vec<String>,
        args: Vec<AstExpr>,
    },
    DefdecCall {
        name: String,
        args: Vec<AstArg>,
    },
    BodyPlaceholder,
    /// A parser-recovered `Missing`/`Error` form kept as an AST placeholder
    /// rather than silently dropped from its parent's child list.
    Error,
}

#[derive(Debug, Clone)]
pub struct AstTree {
    pub name: String,
    pub blackboard_type: Option<String>,
    pub body: AstNode,
    pub origin: SyntaxNode,
}

#[derive(Debug, Clone)]
pub struct AstDefdec {
    pub name: String,
    pub params: Vec<String>,
    pub body: AstNode,
    pub origin: SyntaxNode,
}

#[derive(Debug, Clone)]
pub struct AstDefmacro {
    pub name: String,
    pub params: Vec<String>,
    pub body: AstNode,
    pub origin: SyntaxNode,
}

#[derive(Debug, Clone)]
pub struct AstImport {
    pub path: String,
    pub origin: SyntaxNode,
}

#[derive(Debug, Clone, Default)]
pub struct AstProgram {
    pub trees: Vec<AstTree>,
    pub defdecs: Vec<AstDefdec>,
    pub defmacros: Vec<AstDefmacro>,
    pub imports: Vec<AstImport>,
}

/// Lowers a parsed `Program` CST node into an `AstProgram`.
pub fn lower(cst: &SyntaxNode) -> (AstProgram, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let Some(program) = ast::Program::cast(cst.clone()) else {
        return (AstProgram::default(), diagnostics);
    };

    let mut out = AstProgram::default();
    for tree in program.trees() {
        if let Some(lowered) = lower_tree(&tree, &mut diagnostics) {
            out.trees.push(lowered);
        }
    }
    for defdec in program.defdecs() {
        if let Some(lowered) = lower_defdec(&defdec, &mut diagnostics) {
            out.defdecs.push(lowered);
        }
    }
    for defmacro in program.defmacros() {
        if let Some(lowered) = lower_defmacro(&defmacro, &mut diagnostics) {
            out.defmacros.push(lowered);
        }
    }
    for import in program.imports() {
        if let Some(path) = import.path_token() {
            out.imports.push(AstImport {
                path: decode_string_literal(path.text()),
                origin: import.as_cst().clone(),
            });
        }
    }
    (out, diagnostics)
}

fn lower_tree(tree: &ast::Tree, diagnostics: &mut Diagnostics) -> Option<AstTree> {
    let name = tree.name_token()?.text().to_string();
    let blackboard_type = tree.blackboard_type_token().map(|t| t.text().to_string());
    let body_cst = tree.body()?;
    let body = lower_node(&body_cst, diagnostics)?;
    Some(AstTree {
        name,
        blackboard_type,
        body,
        origin: tree.as_cst().clone(),
    })
}

fn lower_defdec(defdec: &ast::Defdec, diagnostics: &mut Diagnostics) -> Option<AstDefdec> {
    let name = defdec.name_token()?.text().to_string();
    let params = defdec
        .params()
        .map(|p| p.param_tokens().map(|t| t.text().to_string()).collect())
        .unwrap_or_default();
    let body_cst = defdec.body()?;
    let body = lower_node(&body_cst, diagnostics)?;
    Some(AstDefdec {
        name,
        params,
        body,
        origin: defdec.as_cst().clone(),
    })
}

fn lower_defmacro(defmacro: &ast::Defmacro, diagnostics: &mut Diagnostics) -> Option<AstDefmacro> {
    let name = defmacro.name_token()?.text().to_string();
    let params = defmacro
        .params()
        .map(|p| p.param_tokens().map(|t| t.text().to_string()).collect())
        .unwrap_or_default();
    let body_cst = defmacro.body()?;
    let body = lower_node(&body_cst, diagnostics)?;
    Some(AstDefmacro {
        name,
        params,
        body,
        origin: defmacro.as_cst().clone(),
    })
}

const NODE_KINDS: &[SyntaxKind] = &[
    SyntaxKind::Select,
    SyntaxKind::Sequence,
    SyntaxKind::Parallel,
    SyntaxKind::Check,
    SyntaxKind::Guard,
    SyntaxKind::If,
    SyntaxKind::Invert,
    SyntaxKind::Repeat,
    SyntaxKind::Timeout,
    SyntaxKind::Cooldown,
    SyntaxKind::While,
    SyntaxKind::Reactive,
    SyntaxKind::ReactiveSelect,
    SyntaxKind::Ref,
    SyntaxKind::DefdecCall,
    SyntaxKind::BodyPlaceholder,
    SyntaxKind::Call,
    SyntaxKind::Error,
    SyntaxKind::Missing,
];

pub fn is_node_kind(kind: SyntaxKind) -> bool {
    NODE_KINDS.contains(&kind)
}

/// Lowers a node-position CST node. Returns `None` only when `cst` isn't a
/// recognized node kind at all (should not happen for a well-formed parse).
pub fn lower_node(cst: &SyntaxNode, diagnostics: &mut Diagnostics) -> Option<AstNode> {
    use SyntaxKind::*;
    let origin = cst.clone();
    let kind = match cst.kind() {
        Select => AstNodeKind::Select(lower_node_children(cst, diagnostics)),
        Sequence => AstNodeKind::Sequence(lower_node_children(cst, diagnostics)),
        Parallel => {
            let parallel = ast::Parallel::cast(cst.clone())?;
            let policy = resolve_parallel_policy(&parallel);
            let children = lower_node_children(cst, diagnostics);
            AstNodeKind::Parallel { policy, children }
        }
        Check => {
            let check = ast::Check::cast(cst.clone())?;
            let cond = check
                .condition()
                .map(|c| lower_expr(&c, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            AstNodeKind::Check(cond)
        }
        Guard => {
            let guard = ast::Guard::cast(cst.clone())?;
            let cond = guard
                .condition()
                .map(|c| lower_expr(&c, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            let body = guard
                .body()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            AstNodeKind::Guard { cond, body }
        }
        If => {
            let if_node = ast::If::cast(cst.clone())?;
            let cond = if_node
                .condition()
                .map(|c| lower_expr(&c, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            let then_branch = if_node
                .then_branch()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            let else_branch = if_node
                .else_branch()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new);
            AstNodeKind::If {
                cond,
                then_branch,
                else_branch,
            }
        }
        Invert => {
            let inner = cst.children().next();
            let body = inner
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            AstNodeKind::Invert(body)
        }
        Repeat => {
            let repeat = ast::Repeat::cast(cst.clone())?;
            let count = repeat
                .count_token()
                .and_then(|t| t.text().parse::<i32>().ok())
                .unwrap_or(0);
            let body = repeat
                .body()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            AstNodeKind::Repeat { count, body }
        }
        Timeout => {
            let timeout = ast::Timeout::cast(cst.clone())?;
            let seconds = parse_duration(&timeout.duration_token());
            let body = timeout
                .body()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            AstNodeKind::Timeout { seconds, body }
        }
        Cooldown => {
            let cooldown = ast::Cooldown::cast(cst.clone())?;
            let seconds = parse_duration(&cooldown.duration_token());
            let body = cooldown
                .body()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            AstNodeKind::Cooldown { seconds, body }
        }
        While => {
            let while_node = ast::While::cast(cst.clone())?;
            let cond = while_node
                .condition()
                .map(|c| lower_expr(&c, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            let body = while_node
                .body()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            AstNodeKind::While { cond, body }
        }
        Reactive => {
            let reactive = ast::Reactive::cast(cst.clone())?;
            let cond = reactive
                .condition()
                .map(|c| lower_expr(&c, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            let body = reactive
                .body()
                .and_then(|b| lower_node(&b, diagnostics))
                .map(Box::new)
                .unwrap_or_else(|| Box::new(error_node(cst)));
            AstNodeKind::Reactive { cond, body }
        }
        ReactiveSelect => AstNodeKind::ReactiveSelect(lower_node_children(cst, diagnostics)),
        Ref => {
            let reference = ast::Ref::cast(cst.clone())?;
            let name = reference
                .name_token()
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            AstNodeKind::Ref {
                name,
                resolved: std::cell::RefCell::new(None),
            }
        }
        Call => {
            let call = ast::Call::cast(cst.clone())?;
            let member = call
                .member_token()
                .map(|t| parse_member_path(t.text()))
                .unwrap_or_default();
            let args = call.args().map(|a| lower_expr(&a, diagnostics)).collect();
            AstNodeKind::ActionCall { member, args }
        }
        DefdecCall => {
            let call = ast::DefdecCall::cast(cst.clone())?;
            let name = call
                .name_token()
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            let args = call
                .args()
                .map(|arg| lower_arg(&arg, diagnostics))
                .collect();
            AstNodeKind::DefdecCall { name, args }
        }
        BodyPlaceholder => AstNodeKind::BodyPlaceholder,
        Error | Missing => AstNodeKind::Error,
        _ => {
            diagnostics
                .report(DiagnosticCode::SYNTAX_ERROR, span_of(cst))
                .message(format!("unexpected node in node position: {:?}", cst.kind()))
                .emit();
            AstNodeKind::Error
        }
    };
    Some(AstNode { kind, origin })
}

fn lower_node_children(cst: &SyntaxNode, diagnostics: &mut Diagnostics) -> Vec<AstNode> {
    cst.children()
        .filter_map(|child| lower_node(&child, diagnostics))
        .collect()
}

fn lower_arg(cst: &SyntaxNode, diagnostics: &mut Diagnostics) -> AstArg {
    if is_node_kind(cst.kind()) && cst.kind() != SyntaxKind::Call {
        return lower_node(cst, diagnostics)
            .map(AstArg::Node)
            .unwrap_or_else(|| AstArg::Expr(error_expr(cst)));
    }
    if cst.kind() == SyntaxKind::Call {
        // A parenthesized member-call argument is always parsed via the
        // node-position grammar rule for decorator/macro call arguments
        // (spec §4.2 node-position recognition), so it lowers as an
        // `ActionCall`, never a `CallExpr`, in this position.
        return lower_node(cst, diagnostics)
            .map(AstArg::Node)
            .unwrap_or_else(|| AstArg::Expr(error_expr(cst)));
    }
    AstArg::Expr(lower_expr(cst, diagnostics))
}

const EXPR_KINDS: &[SyntaxKind] = &[
    SyntaxKind::IntLiteral,
    SyntaxKind::FloatLiteral,
    SyntaxKind::StringLiteral,
    SyntaxKind::BoolLiteral,
    SyntaxKind::NullLiteral,
    SyntaxKind::EnumLiteral,
    SyntaxKind::MemberAccess,
    SyntaxKind::BlackboardAccess,
    SyntaxKind::BinaryExpr,
    SyntaxKind::UnaryExpr,
    SyntaxKind::LogicExpr,
    SyntaxKind::Call,
    SyntaxKind::ParamRef,
];

/// Lowers an expression-position CST node.
pub fn lower_expr(cst: &SyntaxNode, diagnostics: &mut Diagnostics) -> AstExpr {
    use SyntaxKind::*;
    let origin = cst.clone();
    if !EXPR_KINDS.contains(&cst.kind()) {
        diagnostics
            .report(DiagnosticCode::SYNTAX_ERROR, span_of(cst))
            .message(format!("unexpected node in expression position: {:?}", cst.kind()))
            .emit();
        return AstExpr {
            kind: AstExprKind::Error,
            origin,
        };
    }
    let kind = match cst.kind() {
        IntLiteral => {
            let text = ast::IntLiteral::cast(cst.clone())
                .and_then(|n| n.token())
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            AstExprKind::Literal(Literal::Int(text.parse().unwrap_or(0)))
        }
        FloatLiteral => {
            let text = ast::FloatLiteral::cast(cst.clone())
                .and_then(|n| n.token())
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            AstExprKind::Literal(Literal::Float(text.parse().unwrap_or(0.0)))
        }
        StringLiteral => {
            let text = ast::StringLiteral::cast(cst.clone())
                .and_then(|n| n.token())
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            AstExprKind::Literal(Literal::String(decode_string_literal(&text)))
        }
        BoolLiteral => {
            let is_true = ast::BoolLiteral::cast(cst.clone())
                .map(|n| n.is_true())
                .unwrap_or(false);
            AstExprKind::Literal(Literal::Bool(is_true))
        }
        NullLiteral => AstExprKind::Literal(Literal::Null),
        EnumLiteral => {
            let text = ast::EnumLiteral::cast(cst.clone())
                .and_then(|n| n.token())
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            let (type_name, member_name) = parse_enum_literal(&text);
            AstExprKind::Literal(Literal::Enum(type_name, member_name))
        }
        MemberAccess => {
            let text = ast::MemberAccess::cast(cst.clone())
                .and_then(|n| n.token())
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            AstExprKind::MemberAccess(parse_member_path(&text))
        }
        BlackboardAccess => {
            let text = ast::BlackboardAccess::cast(cst.clone())
                .and_then(|n| n.token())
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            AstExprKind::BlackboardAccess(parse_member_path(text.trim_start_matches('$')))
        }
        BinaryExpr => {
            let binary = ast::BinaryExpr::cast(cst.clone()).unwrap();
            let op = binary
                .operator_token()
                .and_then(|t| BinaryOp::from_kind(t.kind()))
                .unwrap_or(BinaryOp::Add);
            let mut operands = binary.operands();
            let lhs = operands
                .next()
                .map(|o| lower_expr(&o, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            let rhs = operands
                .next()
                .map(|o| lower_expr(&o, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            AstExprKind::BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }
        }
        UnaryExpr => {
            let unary = ast::UnaryExpr::cast(cst.clone()).unwrap();
            let op = match unary.operator_token().map(|t| t.kind()) {
                Some(SyntaxKind::Minus) => UnaryOp::Negate,
                _ => UnaryOp::Not,
            };
            let operand = unary
                .operands()
                .next()
                .map(|o| lower_expr(&o, diagnostics))
                .unwrap_or_else(|| error_expr(cst));
            AstExprKind::UnaryExpr {
                op,
                operand: Box::new(operand),
            }
        }
        LogicExpr => {
            let logic = ast::LogicExpr::cast(cst.clone()).unwrap();
            let is_and = logic
                .keyword_token()
                .map(|t| t.text() == "and")
                .unwrap_or(true);
            let operands = logic.operands().map(|o| lower_expr(&o, diagnostics)).collect();
            AstExprKind::LogicExpr { is_and, operands }
        }
        Call => {
            let call = ast::Call::cast(cst.clone()).unwrap();
            let member = call
                .member_token()
                .map(|t| parse_member_path(t.text()))
                .unwrap_or_default();
            let args = call.args().map(|a| lower_expr(&a, diagnostics)).collect();
            AstExprKind::CallExpr { member, args }
        }
        ParamRef => {
            let name = ast::ParamRef::cast(cst.clone())
                .and_then(|n| n.token())
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            AstExprKind::ParamRef(name)
        }
        _ => unreachable!("filtered by EXPR_KINDS check above"),
    };
    AstExpr { kind, origin }
}

fn error_expr(origin: &SyntaxNode) -> AstExpr {
    AstExpr {
        kind: AstExprKind::Error,
        origin: origin.clone(),
    }
}

fn error_node(origin: &SyntaxNode) -> AstNode {
    AstNode {
        kind: AstNodeKind::Error,
        origin: origin.clone(),
    }
}

fn resolve_parallel_policy(parallel: &ast::Parallel) -> ParallelPolicy {
    let Some(policy_token) = parallel.policy_token() else {
        return ParallelPolicy::All;
    };
    match policy_token.text().trim_start_matches(':') {
        "any" => ParallelPolicy::Any,
        "all" => ParallelPolicy::All,
        "n" => {
            let count = parallel
                .count_token()
                .and_then(|t| t.text().parse::<i32>().ok())
                .unwrap_or(0);
            ParallelPolicy::N(count)
        }
        _ => ParallelPolicy::All,
    }
}

fn parse_duration(token: &Option<crate::syntax_kind::SyntaxToken>) -> f32 {
    token
        .as_ref()
        .and_then(|t| t.text().parse::<f32>().ok())
        .unwrap_or(0.0)
}

fn parse_member_path(text: &str) -> Vec<String> {
    text.trim_start_matches('.')
        .split('.')
        .map(|s| s.to_string())
        .collect()
}

fn parse_enum_literal(text: &str) -> (String, String) {
    let rest = text.trim_start_matches("::");
    match rest.split_once('.') {
        Some((type_name, member_name)) => (type_name.to_string(), member_name.to_string()),
        None => (rest.to_string(), String::new()),
    }
}

/// Decodes `\"`, `\\`, `\n`, `\t`, `\r` escapes inside a quoted string token
/// (spec §3/§4.1); the surrounding quotes are stripped.
fn decode_string_literal(raw: &str) -> String {
    let inner = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(raw);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod ast_lower_tests {
    use super::*;
    use crate::parser::core::parse;

    fn lower_source(source: &str) -> AstProgram {
        let result = parse(source);
        let (ast, _) = lower(&result.root);
        ast
    }

    #[test]
    fn minimal_tree_lowers_to_nested_selector_and_sequence() {
        let ast = lower_source(
            "(tree SimpleCombat (select (seq (check (< .Health 30)) (.Flee)) (.Patrol)))",
        );
        let tree = &ast.trees[0];
        assert_eq!(tree.name, "SimpleCombat");
        let AstNodeKind::Select(children) = &tree.body.kind else {
            panic!("expected Select");
        };
        assert_eq!(children.len(), 2);
        let AstNodeKind::Sequence(seq_children) = &children[0].kind else {
            panic!("expected Sequence");
        };
        assert_eq!(seq_children.len(), 2);
    }

    #[test]
    fn negative_literal_lowers_to_an_int_literal_not_negate() {
        let ast = lower_source("(tree T (check (> .Health -1)))");
        let AstNodeKind::Check(cond) = &ast.trees[0].body.kind else {
            panic!()
        };
        let AstExprKind::BinaryExpr { rhs, .. } = &cond.kind else {
            panic!()
        };
        assert!(matches!(rhs.kind, AstExprKind::Literal(Literal::Int(-1))));
    }

    #[test]
    fn string_escapes_are_decoded() {
        let ast = lower_source(r#"(tree T (select (.Say "line one\nline two")))"#);
        let AstNodeKind::Select(children) = &ast.trees[0].body.kind else {
            panic!()
        };
        let AstNodeKind::ActionCall { args, .. } = &children[0].kind else {
            panic!()
        };
        let AstExprKind::Literal(Literal::String(s)) = &args[0].kind else {
            panic!()
        };
        assert_eq!(s, "line one\nline two");
    }

    #[test]
    fn macro_body_placeholder_round_trips_into_the_ast() {
        let ast = lower_source("(defmacro retry () (repeat 3 <body>)) (tree Main (retry (.Attack)))");
        let repeat_body = &ast.defmacros[0].body;
        let AstNodeKind::Repeat { count, body } = &repeat_body.kind else {
            panic!()
        };
        assert_eq!(*count, 3);
        assert!(matches!(body.kind, AstNodeKind::BodyPlaceholder));
    }
}
