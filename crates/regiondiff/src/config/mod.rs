pub mod resolve;

use std::path::Path;

use anyhow::{Context, Result};
use regiondiff::ComparisonSettings;
use serde::{Deserialize, Serialize};

pub use self::resolve::{CliOverrides, ResolvedRunConfig};

/// Looked up in the working directory when `--config` is not given.
pub(crate) const CONFIG_FILE: &str = "regiondiff.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compare: ComparisonSettings,
}

pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config
        .compare
        .validate()
        .map_err(|e| anyhow::anyhow!("compare.{e}"))?;
    Ok(config)
}

/// Load `explicit` if given (must exist), else the default file if present,
/// else built-in defaults.
pub fn load_layer(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load(path),
        None => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                load(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

pub fn to_toml(settings: &ComparisonSettings) -> Result<String> {
    let config = Config {
        compare: settings.clone(),
    };
    toml::to_string_pretty(&config).context("Failed to serialize settings")
}
