//! Argument definitions (spec SPEC_FULL §2): `clap` derive macros, matching
//! every example repo in the pack that ships a CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crisp", about = "Compiler and interpreter for the Crisp behavior-tree language")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a source file and print its lossless CST
    Parse(ParseArgs),
    /// Format a source file
    Fmt(FmtArgs),
    /// Run the full pipeline and report diagnostics
    Compile(CompileArgs),
    /// Compile and print the optimized IR as S-expressions
    DumpIr(DumpIrArgs),
    /// Compile a tree and tick it against a stub host
    Run(RunArgs),
}

#[derive(clap::Args)]
pub struct ParseArgs {
    /// Source file to parse, or `-` for stdin
    pub path: PathBuf,
    /// Show token spans alongside each CST node
    #[arg(long)]
    pub spans: bool,
}

#[derive(clap::Args)]
pub struct FmtArgs {
    /// Source file to format, or `-` for stdin
    pub path: PathBuf,
    /// Write the result back to `path` instead of stdout (no-op on stdin)
    #[arg(short, long)]
    pub write: bool,
    /// Formatter configuration file (TOML); falls back to defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Check that the file is already formatted; exits 1 if not, writes nothing
    #[arg(long)]
    pub check: bool,
}

#[derive(clap::Args)]
pub struct CompileArgs {
    /// Source file to compile, or `-` for stdin
    pub path: PathBuf,
    /// Colorize diagnostic output
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args)]
pub struct DumpIrArgs {
    /// Source file to compile, or `-` for stdin
    pub path: PathBuf,
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Source file to compile, or `-` for stdin
    pub path: PathBuf,
    /// Which tree to run; defaults to the first tree in the file
    #[arg(long)]
    pub tree: Option<String>,
    /// Number of ticks to run
    #[arg(long, default_value_t = 1)]
    pub ticks: u32,
    /// Simulated seconds elapsed between ticks
    #[arg(long, default_value_t = 0.1)]
    pub dt: f32,
    /// `KEY=VALUE` pairs exposed to `.Member`/`:blackboard.Member` loads; every
    /// action invocation against the stub host returns Success
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::io::IsTerminal::is_terminal(&std::io::stdout())
                    && std::io::IsTerminal::is_terminal(&std::io::stderr())
            }
        }
    }
}
