use anyhow::Result;

use crate::config::{self, ResolvedRunConfig};

/// `regiondiff config`: show the settings a compare run would use.
pub fn config(resolved: ResolvedRunConfig) -> Result<()> {
    print!("{}", config::to_toml(&resolved.settings)?);
    Ok(())
}
