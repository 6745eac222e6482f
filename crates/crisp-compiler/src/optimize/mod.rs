//! IR optimizer (spec §4.8): four pure tree-rewrite passes run in a fixed
//! order until the tree stops changing, bounded by a fixpoint iteration cap
//! so a pathological input can't loop forever.

mod constant_fold;
mod convert_fusion;
mod dead_node;
mod single_child;

use crate::ir::Ir;
use crate::lower::IrProgram;

const FIXPOINT_CAP: u32 = 64;

pub fn optimize_program(program: &IrProgram) -> IrProgram {
    let trees = program
        .trees
        .iter()
        .map(|tree| {
            let mut body = tree.body.clone();
            for _ in 0..FIXPOINT_CAP {
                let next = run_passes(&body);
                if next == body {
                    break;
                }
                body = next;
            }
            crate::lower::IrTree {
                name: tree.name.clone(),
                blackboard_type: tree.blackboard_type.clone(),
                body,
            }
        })
        .collect();
    IrProgram { trees }
}

fn run_passes(ir: &Ir) -> Ir {
    let ir = constant_fold::fold(ir);
    let ir = dead_node::eliminate(&ir);
    let ir = single_child::collapse(&ir);
    convert_fusion::fuse(&ir)
}

#[cfg(test)]
mod optimizer_pipeline_tests {
    use super::*;
    use crisp_syntax::ast_lower::lower as lower_ast;
    use crisp_syntax::parser::core::parse;

    fn optimize_source(source: &str) -> IrProgram {
        let result = parse(source);
        let (ast, _) = lower_ast(&result.root);
        let (ir, _) = crate::lower::lower_program(&ast);
        optimize_program(&ir)
    }

    #[test]
    fn constant_condition_collapses_the_whole_selector_to_a_single_action() {
        let ir = optimize_source("(tree T (select (check true) (.Patrol)))");
        assert!(matches!(ir.trees[0].body.kind, crate::ir::IrKind::Condition(_)));
    }
}
