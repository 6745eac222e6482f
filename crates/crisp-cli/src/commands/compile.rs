//! `crisp compile`: run the full pipeline and report diagnostics.

use crate::cli::CompileArgs;
use crate::diagnostics_printer::DiagnosticsPrinter;
use crate::source_loader::load_source;
use crisp_compiler::compile;
use crisp_core::{FuelLimits, Severity};

use super::{FAIL, OK};

pub fn run(args: CompileArgs) -> super::ExitCode {
    let source = match load_source(&args.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return FAIL;
        }
    };

    let (_ir, diagnostics) = compile(&source, FuelLimits::default());

    let path = args.path.display().to_string();
    let printer = DiagnosticsPrinter::new(&diagnostics).source(&source).path(&path).colored(args.color.should_colorize());
    print!("{}", printer.render());

    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);
    if diagnostics.has_errors() || (args.strict && has_warnings) {
        FAIL
    } else {
        OK
    }
}
