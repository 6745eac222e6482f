pub mod ast_to_ir;

pub use ast_to_ir::{lower_program, IrProgram, IrTree};
