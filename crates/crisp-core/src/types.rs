//! `TypeRef`: a string-named type reference attached to every IR expression
//! node (spec §3). Host types (the out-of-scope type resolver's domain) are
//! carried as opaque names; the core never needs to know their member layout.

use serde::{Deserialize, Serialize};

/// A type reference. Primitive kinds get their own variant so the optimizer
/// and lowering passes can match on them without string comparison; anything
/// else (enum types, opaque host types) is a named reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Int,
    Float,
    Bool,
    String,
    Null,
    BtStatus,
    /// An enum type, e.g. `TargetKind` in `::TargetKind.Player`.
    Enum(String),
    /// An opaque host type (a class/struct name the core never resolves).
    Named(String),
    /// A host type is not yet available (spec §3 invariants).
    Unknown,
}

impl TypeRef {
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeRef::Int | TypeRef::Float)
    }

    pub fn name(&self) -> &str {
        match self {
            TypeRef::Int => "Int",
            TypeRef::Float => "Float",
            TypeRef::Bool => "Bool",
            TypeRef::String => "String",
            TypeRef::Null => "Null",
            TypeRef::BtStatus => "BtStatus",
            TypeRef::Enum(name) | TypeRef::Named(name) => name,
            TypeRef::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod type_ref_tests {
    use super::*;

    #[test]
    fn numeric_types_are_int_and_float_only() {
        assert!(TypeRef::Int.is_numeric());
        assert!(TypeRef::Float.is_numeric());
        assert!(!TypeRef::Bool.is_numeric());
        assert!(!TypeRef::Unknown.is_numeric());
    }

    #[test]
    fn display_matches_the_wire_type_name() {
        assert_eq!(TypeRef::Named("this".to_string()).to_string(), "this");
        assert_eq!(TypeRef::Unknown.to_string(), "unknown");
    }
}
