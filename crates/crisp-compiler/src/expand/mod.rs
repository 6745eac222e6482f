pub mod decorator_expander;
pub mod macro_expander;

pub use decorator_expander::expand_decorators;
pub use macro_expander::expand_macros;
