use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::types::NameStyle;

/// Run-wide switches, read from a TOML file. Missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 0 is silent; above 1 prints search counters; above 2 traces every
    /// fragment's usefulness.
    pub verbose: u8,
    pub mine_fragments: bool,
    pub angelic_conditions: bool,
    pub name_style: NameStyle,
    pub log_timing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbose: 0,
            mine_fragments: true,
            angelic_conditions: true,
            name_style: NameStyle::Qualified,
            log_timing: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// What the search loop was asked to solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisTask {
    pub name: String,
    pub group: Option<String>,
    pub num_examples: usize,
    pub num_components: usize,
    pub tags: BTreeSet<String>,
    pub sypet: bool,
}
