//! `crisp`: command-line front end for the compiler and interpreter crates.

mod cli;
mod commands;
mod diagnostics_printer;
mod source_loader;

use clap::Parser;
use cli::{Cli, Command};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Parse(args) => commands::parse::run(args),
        Command::Fmt(args) => commands::fmt::run(args),
        Command::Compile(args) => commands::compile::run(args),
        Command::DumpIr(args) => commands::dump_ir::run(args),
        Command::Run(args) => commands::run::run(args),
    };

    std::process::exit(code);
}
