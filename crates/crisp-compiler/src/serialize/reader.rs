//! S-expression text → IR (spec §4.9). A small two-phase reader mirroring
//! the surface pipeline's own lexer-then-parser shape: tokenize into a
//! generic s-expression tree first, then interpret tagged lists into `Ir`.
//! Unknown tags are a structured parse error carrying the failing span.

use crate::ir::{Ir, IrKind};
use crate::lower::{IrProgram, IrTree};
use crate::Error;
use crisp_core::{Span, TypeRef};
use crisp_syntax::ast_lower::{BinaryOp, Literal, ParallelPolicy, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
enum SExpr {
    List(Vec<SExpr>, Span),
    Atom(String, Span),
    Str(String, Span),
    Keyword(String, Span),
}

impl SExpr {
    fn span(&self) -> Span {
        match self {
            SExpr::List(_, s) | SExpr::Atom(_, s) | SExpr::Str(_, s) | SExpr::Keyword(_, s) => *s,
        }
    }
}

struct Tokenizer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    LParen,
    RParen,
    Atom(String),
    Str(String),
    Keyword(String),
}

struct Token {
    tok: Tok,
    span: Span,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0 }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            let start = self.pos;
            if self.pos >= self.bytes.len() {
                break;
            }
            let c = self.bytes[self.pos] as char;
            match c {
                '(' => {
                    self.pos += 1;
                    out.push(Token { tok: Tok::LParen, span: Span::new(start as u32, self.pos as u32) });
                }
                ')' => {
                    self.pos += 1;
                    out.push(Token { tok: Tok::RParen, span: Span::new(start as u32, self.pos as u32) });
                }
                '"' => {
                    let text = self.read_string()?;
                    out.push(Token { tok: Tok::Str(text), span: Span::new(start as u32, self.pos as u32) });
                }
                ':' => {
                    self.pos += 1;
                    let text = self.read_atom_text();
                    out.push(Token { tok: Tok::Keyword(text), span: Span::new(start as u32, self.pos as u32) });
                }
                _ => {
                    let text = self.read_atom_text();
                    out.push(Token { tok: Tok::Atom(text), span: Span::new(start as u32, self.pos as u32) });
                }
            }
        }
        Ok(out)
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && (self.bytes[self.pos] as char).is_whitespace() {
            self.pos += 1;
        }
    }

    fn read_string(&mut self) -> Result<String, Error> {
        self.pos += 1; // opening quote
        let mut out = String::new();
        loop {
            if self.pos >= self.bytes.len() {
                return Err(Error::DeserializeError(format!("unterminated string at byte {}", self.pos)));
            }
            let c = self.src[self.pos..].chars().next().unwrap();
            self.pos += c.len_utf8();
            match c {
                '"' => break,
                '\\' => {
                    let next = self.src[self.pos..].chars().next().unwrap_or('\\');
                    self.pos += next.len_utf8();
                    match next {
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }

    fn read_atom_text(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos] as char;
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }
}

struct Reader {
    tokens: Vec<Token>,
    pos: usize,
}

impl Reader {
    fn parse_one(&mut self) -> Result<SExpr, Error> {
        let tok = self.tokens.get(self.pos).ok_or_else(|| Error::DeserializeError("unexpected end of input".to_string()))?;
        match &tok.tok {
            Tok::LParen => {
                let start = tok.span;
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    match self.tokens.get(self.pos).map(|t| &t.tok) {
                        Some(Tok::RParen) => {
                            let end = self.tokens[self.pos].span;
                            self.pos += 1;
                            return Ok(SExpr::List(items, start.cover(end)));
                        }
                        None => return Err(Error::DeserializeError("unterminated list".to_string())),
                        _ => items.push(self.parse_one()?),
                    }
                }
            }
            Tok::RParen => Err(Error::DeserializeError(format!("unexpected ')' at byte {}", tok.span.start))),
            Tok::Atom(a) => {
                let s = (a.clone(), tok.span);
                self.pos += 1;
                Ok(SExpr::Atom(s.0, s.1))
            }
            Tok::Str(a) => {
                let s = (a.clone(), tok.span);
                self.pos += 1;
                Ok(SExpr::Str(s.0, s.1))
            }
            Tok::Keyword(a) => {
                let s = (a.clone(), tok.span);
                self.pos += 1;
                Ok(SExpr::Keyword(s.0, s.1))
            }
        }
    }
}

pub fn deserialize_program(text: &str) -> Result<IrProgram, Error> {
    let tokens = Tokenizer::new(text).tokenize()?;
    let mut reader = Reader { tokens, pos: 0 };
    let mut trees = Vec::new();
    while reader.pos < reader.tokens.len() {
        let sexpr = reader.parse_one()?;
        trees.push(interpret_tree(&sexpr)?);
    }
    Ok(IrProgram { trees })
}

pub fn deserialize_tree(text: &str) -> Result<IrTree, Error> {
    let tokens = Tokenizer::new(text).tokenize()?;
    let mut reader = Reader { tokens, pos: 0 };
    let sexpr = reader.parse_one()?;
    interpret_tree(&sexpr)
}

fn list_of(sexpr: &SExpr) -> Result<&[SExpr], Error> {
    match sexpr {
        SExpr::List(items, _) => Ok(items),
        other => Err(Error::DeserializeError(format!("expected a list at byte {}", other.span().start))),
    }
}

fn tag_of(items: &[SExpr], span: Span) -> Result<&str, Error> {
    match items.first() {
        Some(SExpr::Atom(tag, _)) => Ok(tag.as_str()),
        _ => Err(Error::DeserializeError(format!("expected a tag at byte {}", span.start))),
    }
}

fn interpret_tree(sexpr: &SExpr) -> Result<IrTree, Error> {
    let span = sexpr.span();
    let items = list_of(sexpr)?;
    let tag = tag_of(items, span)?;
    if tag != "ir-tree" {
        return Err(Error::DeserializeError(format!("expected ir-tree, found {tag} at byte {}", span.start)));
    }
    let name = expect_str(&items[1])?;
    let mut idx = 2;
    let mut blackboard_type = None;
    if let Some(SExpr::Keyword(kw, _)) = items.get(idx) {
        if kw == "blackboard" {
            blackboard_type = Some(expect_str(&items[idx + 1])?);
            idx += 2;
        }
    }
    let body_sexpr = items.get(idx).ok_or_else(|| Error::DeserializeError("ir-tree missing body".to_string()))?;
    let body = interpret_ir(body_sexpr)?;
    Ok(IrTree { name, blackboard_type, body })
}

fn expect_str(sexpr: &SExpr) -> Result<String, Error> {
    match sexpr {
        SExpr::Str(s, _) => Ok(s.clone()),
        other => Err(Error::DeserializeError(format!("expected a string at byte {}", other.span().start))),
    }
}

fn expect_atom(sexpr: &SExpr) -> Result<&str, Error> {
    match sexpr {
        SExpr::Atom(s, _) => Ok(s.as_str()),
        other => Err(Error::DeserializeError(format!("expected an atom at byte {}", other.span().start))),
    }
}

fn expect_keyword(sexpr: &SExpr) -> Result<&str, Error> {
    match sexpr {
        SExpr::Keyword(s, _) => Ok(s.as_str()),
        other => Err(Error::DeserializeError(format!("expected a keyword at byte {}", other.span().start))),
    }
}

/// Peels the trailing `:id N` and `:type "X"` keywords a node carries (in
/// that order, each optional) so both its stable id and inferred type
/// survive a round trip through text, not just its shape (spec §3, §8).
fn extract_tail_meta(items: &[SExpr]) -> Result<(Option<u32>, TypeRef), Error> {
    let mut id = None;
    let mut ty = TypeRef::Unknown;
    let mut end = items.len();

    if end >= 2 {
        if let SExpr::Keyword(kw, _) = &items[end - 2] {
            if kw == "type" {
                let name = expect_str(&items[end - 1])?;
                ty = type_ref_from_name(&name);
                end -= 2;
            }
        }
    }
    if end >= 2 {
        if let SExpr::Keyword(kw, _) = &items[end - 2] {
            if kw == "id" {
                let value = expect_atom(&items[end - 1])?;
                id = Some(value.parse().map_err(|_| Error::DeserializeError("bad id".to_string()))?);
            }
        }
    }
    Ok((id, ty))
}

fn type_ref_from_name(name: &str) -> TypeRef {
    if let Some(enum_name) = name.strip_prefix("enum:") {
        return TypeRef::Enum(enum_name.to_string());
    }
    match name {
        "Int" => TypeRef::Int,
        "Float" => TypeRef::Float,
        "Bool" => TypeRef::Bool,
        "String" => TypeRef::String,
        "Null" => TypeRef::Null,
        "BtStatus" => TypeRef::BtStatus,
        "unknown" => TypeRef::Unknown,
        other => TypeRef::Named(other.to_string()),
    }
}

fn interpret_ir(sexpr: &SExpr) -> Result<Ir, Error> {
    let span = sexpr.span();
    let items = list_of(sexpr)?;
    let tag = tag_of(items, span)?;
    let (id, ty) = extract_tail_meta(items)?;
    let rest = &items[1..];

    let kind = match tag {
        "ir-selector" => IrKind::Selector(interpret_many(rest)?),
        "ir-sequence" => IrKind::Sequence(interpret_many(rest)?),
        "ir-reactive-select" => IrKind::ReactiveSelect(interpret_many(rest)?),
        "ir-parallel" => {
            let (policy, child_start) = parse_policy(rest)?;
            IrKind::Parallel { policy, children: interpret_many(&rest[child_start..])? }
        }
        "ir-guard" => {
            let cond = interpret_ir(&rest[0])?;
            let body = interpret_ir(&rest[1])?;
            IrKind::Guard { cond: Box::new(cond), body: Box::new(body) }
        }
        "ir-if" => {
            let cond = interpret_ir(&rest[0])?;
            let then_branch = interpret_ir(&rest[1])?;
            // The optional else branch is the only variable-length slot here;
            // a trailing `:id`/`:type` pair at this position is a keyword, not
            // a list, so it's never mistaken for a branch.
            let else_branch = match rest.get(2) {
                Some(e @ SExpr::List(..)) => Some(Box::new(interpret_ir(e)?)),
                _ => None,
            };
            IrKind::If { cond: Box::new(cond), then_branch: Box::new(then_branch), else_branch }
        }
        "ir-invert" => IrKind::Invert(Box::new(interpret_ir(&rest[0])?)),
        "ir-repeat" => {
            let count: i32 = expect_atom(&rest[0])?.parse().map_err(|_| Error::DeserializeError("bad repeat count".to_string()))?;
            IrKind::Repeat { count, body: Box::new(interpret_ir(&rest[1])?) }
        }
        "ir-timeout" => {
            let seconds = parse_f32(&rest[0])?;
            IrKind::Timeout { seconds, body: Box::new(interpret_ir(&rest[1])?) }
        }
        "ir-cooldown" => {
            let seconds = parse_f32(&rest[0])?;
            IrKind::Cooldown { seconds, body: Box::new(interpret_ir(&rest[1])?) }
        }
        "ir-while" => {
            let cond = interpret_ir(&rest[0])?;
            let body = interpret_ir(&rest[1])?;
            IrKind::While { cond: Box::new(cond), body: Box::new(body) }
        }
        "ir-reactive" => {
            let cond = interpret_ir(&rest[0])?;
            let body = interpret_ir(&rest[1])?;
            IrKind::Reactive { cond: Box::new(cond), body: Box::new(body) }
        }
        "ir-tree-ref" => IrKind::TreeRef(expect_str(&rest[0])?),
        "ir-condition" => IrKind::Condition(Box::new(interpret_ir(&rest[0])?)),
        "ir-action" | "ir-call" => {
            let declaring_type = expect_str(&rest[0])?;
            let name = expect_str(&rest[1])?;
            let args = interpret_many(list_of(&rest[2])?)?;
            build_call_kind(tag, declaring_type, name, args)
        }
        "ir-binary-op" => {
            let op = parse_binary_op(&rest[0])?;
            let lhs = interpret_ir(&rest[1])?;
            let rhs = interpret_ir(&rest[2])?;
            IrKind::BinaryOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
        }
        "ir-unary-op" => {
            let op = parse_unary_op(&rest[0])?;
            IrKind::UnaryOp { op, operand: Box::new(interpret_ir(&rest[1])?) }
        }
        "ir-logic-op" => {
            let is_and = expect_keyword(&rest[0])? == "and";
            IrKind::LogicOp { is_and, operands: interpret_many(&rest[1..])? }
        }
        "ir-literal" => IrKind::Literal(parse_literal(rest)?),
        "ir-member-load" => IrKind::MemberLoad(parse_path(&rest[0])?),
        "ir-blackboard-load" => IrKind::BlackboardLoad(parse_path(&rest[0])?),
        "ir-convert" => {
            // The conversion target is never written separately: it's exactly
            // this node's own `:type`, the same field every other kind uses.
            let inner = interpret_ir(&rest[0])?;
            IrKind::Convert(Box::new(inner), ty.clone())
        }
        other => return Err(Error::DeserializeError(format!("unknown ir tag '{other}' at byte {}", span.start))),
    };

    Ok(Ir { id, ty, span, kind })
}

fn build_call_kind(tag: &str, declaring_type: String, name: String, args: Vec<Ir>) -> IrKind {
    if tag == "ir-action" {
        IrKind::Action { declaring_type, name, args }
    } else {
        IrKind::Call { declaring_type, name, args }
    }
}

fn interpret_many(items: &[SExpr]) -> Result<Vec<Ir>, Error> {
    items.iter().filter(|i| matches!(i, SExpr::List(..))).map(interpret_ir).collect()
}

/// Returns the policy and how many leading tokens it consumed: `:any`/`:all`
/// are one keyword, `:n N` is a keyword plus a count atom.
fn parse_policy(rest: &[SExpr]) -> Result<(ParallelPolicy, usize), Error> {
    match expect_keyword(&rest[0])? {
        "any" => Ok((ParallelPolicy::Any, 1)),
        "all" => Ok((ParallelPolicy::All, 1)),
        "n" => {
            let n: i32 = expect_atom(&rest[1])?
                .parse()
                .map_err(|_| Error::DeserializeError("bad parallel :n count".to_string()))?;
            Ok((ParallelPolicy::N(n), 2))
        }
        other => Err(Error::DeserializeError(format!("unknown parallel policy :{other}"))),
    }
}

fn parse_binary_op(sexpr: &SExpr) -> Result<BinaryOp, Error> {
    match expect_keyword(sexpr)? {
        "lt" => Ok(BinaryOp::Lt),
        "gt" => Ok(BinaryOp::Gt),
        "le" => Ok(BinaryOp::Le),
        "ge" => Ok(BinaryOp::Ge),
        "eq" => Ok(BinaryOp::Eq),
        "ne" => Ok(BinaryOp::Ne),
        "add" => Ok(BinaryOp::Add),
        "sub" => Ok(BinaryOp::Sub),
        "mul" => Ok(BinaryOp::Mul),
        "div" => Ok(BinaryOp::Div),
        "mod" => Ok(BinaryOp::Mod),
        other => Err(Error::DeserializeError(format!("unknown binary operator :{other}"))),
    }
}

fn parse_unary_op(sexpr: &SExpr) -> Result<UnaryOp, Error> {
    match expect_keyword(sexpr)? {
        "not" => Ok(UnaryOp::Not),
        "negate" => Ok(UnaryOp::Negate),
        other => Err(Error::DeserializeError(format!("unknown unary operator :{other}"))),
    }
}

fn parse_literal(rest: &[SExpr]) -> Result<Literal, Error> {
    let kind = expect_keyword(&rest[1])?;
    match kind {
        "int" => Ok(Literal::Int(expect_atom(&rest[0])?.parse().map_err(|_| Error::DeserializeError("bad int literal".to_string()))?)),
        "float" => Ok(Literal::Float(parse_f32(&rest[0])?)),
        "string" => Ok(Literal::String(expect_str(&rest[0])?)),
        "bool" => Ok(Literal::Bool(expect_atom(&rest[0])? == "true")),
        "null" => Ok(Literal::Null),
        "enum" => {
            let text = enum_atom_text(&rest[0])?;
            let trimmed = text.trim_start_matches("::");
            match trimmed.split_once('.') {
                Some((t, m)) => Ok(Literal::Enum(t.to_string(), m.to_string())),
                None => Ok(Literal::Enum(trimmed.to_string(), String::new())),
            }
        }
        other => Err(Error::DeserializeError(format!("unknown literal kind :{other}"))),
    }
}

/// The `::Type.Member` enum atom tokenizes as a keyword (the leading `::`
/// collides with the `:kind` keyword lexing), so reconstruct the original
/// text from either token shape.
fn enum_atom_text(sexpr: &SExpr) -> Result<String, Error> {
    match sexpr {
        SExpr::Atom(s, _) => Ok(s.clone()),
        SExpr::Keyword(s, _) => Ok(format!(":{s}")),
        other => Err(Error::DeserializeError(format!("expected an enum value at byte {}", other.span().start))),
    }
}

fn parse_path(sexpr: &SExpr) -> Result<Vec<String>, Error> {
    list_of(sexpr)?.iter().map(expect_str).collect()
}

fn parse_f32(sexpr: &SExpr) -> Result<f32, Error> {
    expect_atom(sexpr)?.parse().map_err(|_| Error::DeserializeError("bad float value".to_string()))
}

#[cfg(test)]
mod reader_tests {
    use super::*;

    #[test]
    fn unknown_tag_is_a_structured_parse_error() {
        let err = deserialize_tree("(ir-bogus \"x\")").unwrap_err();
        match err {
            Error::DeserializeError(msg) => assert!(msg.contains("ir-bogus")),
            _ => panic!("expected DeserializeError"),
        }
    }
}
