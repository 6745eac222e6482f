//! Tree-walking interpreter for Crisp IR (spec §4.11).

mod context;
mod error;
mod interpreter;
mod state;
mod value;

pub use context::{Blackboard, Context};
pub use error::RuntimeError;
pub use interpreter::Interpreter;
pub use state::NodeState;
pub use value::Value;
