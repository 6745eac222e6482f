//! CST-driven pretty printer for the Crisp surface language (spec §4.10).

mod config;
mod printer;

pub use config::FormatConfig;
pub use printer::{format_cst, format_source};
