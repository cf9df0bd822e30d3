//! Optional TOML run settings: configuration overrides and a custom layout.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use neon_conquest_core::{CellSpec, Config};
use serde::Deserialize;

const SUPPORTED_SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    version: u32,
    #[serde(default)]
    config: Config,
    #[serde(default)]
    cells: Vec<CellSpec>,
}

/// Validated settings ready to be submitted to the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Settings {
    pub(crate) config: Config,
    /// Replacement layout; `None` keeps the default scenario.
    pub(crate) cells: Option<Vec<CellSpec>>,
}

pub(crate) fn load(path: &Path) -> Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid settings file {}", path.display()))
}

fn parse(contents: &str) -> Result<Settings> {
    let file: SettingsFile =
        toml::from_str(contents).context("failed to parse settings toml contents")?;
    if file.version != SUPPORTED_SETTINGS_VERSION {
        bail!(
            "unsupported settings version {}; expected {}",
            file.version,
            SUPPORTED_SETTINGS_VERSION
        );
    }
    file.config
        .validate()
        .context("settings contain an invalid configuration")?;

    let cells = (!file.cells.is_empty()).then_some(file.cells);
    Ok(Settings {
        config: file.config,
        cells,
    })
}
