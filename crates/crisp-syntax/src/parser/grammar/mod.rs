//! Recursive-descent grammar (spec §4.2), split by the role tokens play:
//! top-level forms, node-position forms, and expression-position forms.

mod expr;
mod node_forms;
mod top_level;

pub(crate) use expr::expr;
pub(crate) use node_forms::node;

use crate::parser::core::Parser;
use crate::syntax_kind::SyntaxKind::*;

/// Entry point: `Program` wraps every top-level tree/defdec/defmacro/import.
pub(crate) fn program(p: &mut Parser) {
    p.start_node(Program);
    while !p.eof() {
        if !top_level::top_level_form(p) {
            p.error_msg("expected a tree, defdec, defmacro, or import form");
            p.start_node(Error);
            p.skip_balanced_form();
            p.finish_node();
        }
    }
    p.finish_node();
}
