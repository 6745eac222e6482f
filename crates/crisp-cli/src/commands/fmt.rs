//! `crisp fmt`: run the CST-driven pretty printer, matching `cargo fmt`'s
//! `--write`/`--check` split.

use std::fs;

use crate::cli::FmtArgs;
use crate::source_loader::load_source;
use crisp_fmt::{format_source, FormatConfig};

use super::{FAIL, OK};

pub fn run(args: FmtArgs) -> super::ExitCode {
    let source = match load_source(&args.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return FAIL;
        }
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return FAIL;
        }
    };

    let formatted = format_source(&source, &config);

    if args.check {
        if formatted == source {
            return OK;
        }
        eprintln!("{} is not formatted", args.path.display());
        return FAIL;
    }

    if args.write {
        if let Err(e) = fs::write(&args.path, &formatted) {
            eprintln!("failed to write '{}': {e}", args.path.display());
            return FAIL;
        }
        return OK;
    }

    print!("{formatted}");
    OK
}

fn load_config(path: Option<&std::path::Path>) -> Result<FormatConfig, String> {
    let Some(path) = path else {
        return Ok(FormatConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
    toml::from_str(&text).map_err(|e| format!("invalid formatter config '{}': {e}", path.display()))
}
