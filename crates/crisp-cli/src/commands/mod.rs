//! One module per subcommand, each exposing a `run(args) -> ExitCode`.

pub mod compile;
pub mod dump_ir;
pub mod fmt;
pub mod parse;
pub mod run;

/// Process exit codes shared by every subcommand: 0 success, 1 failure.
pub type ExitCode = i32;

pub const OK: ExitCode = 0;
pub const FAIL: ExitCode = 1;
