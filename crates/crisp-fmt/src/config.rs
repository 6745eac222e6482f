//! Formatter configuration (spec §6). Plain `serde`-derived struct so the
//! CLI can load it from a TOML file, mirroring the teacher's convention of
//! using `serde` for every config/IR-adjacent structure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub indent: usize,
    pub max_width: usize,
    pub align_close_paren: bool,
    pub blank_line_between_trees: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            max_width: 80,
            align_close_paren: false,
            blank_line_between_trees: true,
        }
    }
}
