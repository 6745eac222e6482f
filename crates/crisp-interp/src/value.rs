//! Runtime values (spec §4.11): the dynamic counterpart of `Literal` plus
//! `BtStatus`, which flows through `Action`/`Call` returns.

use crisp_core::status::BtStatus;
use crisp_syntax::ast_lower::Literal;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
    String(String),
    Null,
    Enum(String, String),
    BtStatus(BtStatus),
}

impl Value {
    pub fn from_literal(lit: &Literal) -> Self {
        match lit {
            Literal::Int(v) => Value::Int(*v),
            Literal::Float(v) => Value::Float(*v),
            Literal::String(v) => Value::String(v.clone()),
            Literal::Bool(v) => Value::Bool(*v),
            Literal::Null => Value::Null,
            Literal::Enum(t, m) => Value::Enum(t.clone(), m.clone()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Bool(_) => "Bool",
            Value::String(_) => "String",
            Value::Null => "Null",
            Value::Enum(..) => "Enum",
            Value::BtStatus(_) => "BtStatus",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Null => write!(f, "null"),
            Value::Enum(t, m) => write!(f, "::{t}.{m}"),
            Value::BtStatus(s) => write!(f, "{s}"),
        }
    }
}
