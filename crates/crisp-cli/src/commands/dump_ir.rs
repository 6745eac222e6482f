//! `crisp dump-ir`: compile and print the optimized IR's S-expression form.

use crate::cli::DumpIrArgs;
use crate::diagnostics_printer::DiagnosticsPrinter;
use crate::source_loader::load_source;
use crisp_compiler::{compile, serialize::serialize_program};
use crisp_core::FuelLimits;

use super::{FAIL, OK};

pub fn run(args: DumpIrArgs) -> super::ExitCode {
    let source = match load_source(&args.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return FAIL;
        }
    };

    let (ir, diagnostics) = compile(&source, FuelLimits::default());

    if !diagnostics.is_empty() {
        let path = args.path.display().to_string();
        let printer =
            DiagnosticsPrinter::new(&diagnostics).source(&source).path(&path).colored(args.color.should_colorize());
        eprint!("{}", printer.render());
    }

    if diagnostics.has_errors() {
        return FAIL;
    }

    print!("{}", serialize_program(&ir));
    OK
}
