//! The host seam (spec §4.11): member loads and action/call invocation are
//! the only points where the interpreter leaves pure tree evaluation.

use crate::error::RuntimeError;
use crate::value::Value;

/// The `this`-rooted context a tree executes against: member access and
/// action/call dispatch.
pub trait Context {
    fn member(&self, path: &[String]) -> Result<Value, RuntimeError>;

    fn invoke(
        &mut self,
        declaring_type: &str,
        name: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError>;
}

/// The optional `:blackboard`-typed side table a tree may declare.
pub trait Blackboard {
    fn member(&self, path: &[String]) -> Result<Value, RuntimeError>;
}
