//! Runtime errors (spec §7): the interpreter never panics on a well-typed
//! tree; every failure mode the host can hit is a structured `RuntimeError`.

use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("missing member '{0}'")]
    MissingMember(String),

    #[error("blackboard access attempted but no blackboard was supplied")]
    NoBlackboard,

    #[error("tree references are not supported by the interpreter: {0}")]
    UnsupportedTreeRef(String),

    #[error("'{0}' did not return a BtStatus (got {1})")]
    NonBtStatusReturn(String, Value),

    #[error("condition did not evaluate to a Bool (got {0})")]
    NonBoolCondition(Value),

    #[error("operand type mismatch: {op} over {lhs} and {rhs}")]
    TypeMismatch { op: String, lhs: Value, rhs: Value },

    #[error("unsupported conversion to {0} from {1}")]
    UnsupportedConversion(String, Value),

    #[error("division by zero")]
    DivisionByZero,

    #[error("exec fuel exhausted")]
    ExecFuelExhausted,

    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}
