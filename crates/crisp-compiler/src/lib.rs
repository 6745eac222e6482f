//! Macro expansion, decorator expansion, reference resolution, typed IR
//! lowering, IR optimization, and IR serialization (spec components 4-9).
//!
//! Each stage is a pure fold from one immutable tree to the next, receiving
//! and returning a [`crisp_core::Diagnostics`] bag. `PassResult` mirrors
//! that shape: `Ok((tree, diagnostics))` for recoverable problems, `Err`
//! only for the fatal conditions a pass cannot continue past.

pub mod expand;
pub mod ir;
pub mod lower;
pub mod optimize;
pub mod resolve;
pub mod serialize;

use crisp_core::{Diagnostics, FuelLimits};
use crisp_syntax::ast_lower::{lower as lower_ast, AstProgram};
use crisp_syntax::parser::core::parse;
use lower::IrProgram;

pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("macro expansion fuel exhausted")]
    ExecFuelExhausted,
    #[error("macro/decorator expansion recursion limit exceeded")]
    RecursionLimitExceeded,
    #[error("deserialization failed: {0}")]
    DeserializeError(String),
}

/// Runs every stage of the pipeline (spec §4) on `source`: parse, lower to
/// AST, expand macros, expand decorators, resolve references, lower to IR,
/// optimize. Returns the optimized program and every diagnostic collected
/// along the way; individual stage failures don't abort the pipeline since
/// they report through `Diagnostics`, not `Result`.
pub fn compile(source: &str, limits: FuelLimits) -> (IrProgram, Diagnostics) {
    let mut diagnostics = Diagnostics::new();

    let parsed = parse(source);
    let (ast, ast_diags) = lower_ast(&parsed.root);
    diagnostics.extend(parsed.diagnostics);
    diagnostics.extend(ast_diags);

    let program = expand_and_resolve(&ast, limits, &mut diagnostics);

    let (ir, ir_diags) = lower::lower_program(&program);
    diagnostics.extend(ir_diags);

    let optimized = optimize::optimize_program(&ir);
    (optimized, diagnostics)
}

fn expand_and_resolve(ast: &AstProgram, limits: FuelLimits, diagnostics: &mut Diagnostics) -> AstProgram {
    let (expanded_macros, macro_diags) = expand::expand_macros(ast, limits);
    diagnostics.extend(macro_diags);

    let (expanded_decorators, decorator_diags) = expand::expand_decorators(&expanded_macros, limits);
    diagnostics.extend(decorator_diags);

    let resolve_diags = resolve::resolve_references(&expanded_decorators);
    diagnostics.extend(resolve_diags);

    expanded_decorators
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[test]
    fn a_simple_tree_compiles_end_to_end_without_diagnostics() {
        let (ir, diagnostics) = compile("(tree T (select (.Flee) (.Patrol)))", FuelLimits::default());
        assert!(!diagnostics.has_errors());
        assert_eq!(ir.trees.len(), 1);
    }

    #[test]
    fn an_undefined_tree_reference_surfaces_as_a_diagnostic_not_a_panic() {
        let (_, diagnostics) = compile("(tree A (ref Missing))", FuelLimits::default());
        assert!(diagnostics.has_errors());
    }
}
