pub mod terminal;

use std::path::Path;

use anyhow::{Context, Result};
use regiondiff::{ComparisonResult, MetadataComparison};
use serde::Serialize;

/// Machine-readable record of one completed run (`compare --json`).
#[derive(Serialize)]
pub struct RunReport<'a> {
    #[serde(flatten)]
    pub result: &'a ComparisonResult,
    pub width: u32,
    pub height: u32,
    pub region: bool,
    pub elapsed_ms: u64,
    pub metadata: &'a MetadataComparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_map: Option<&'a Path>,
}

impl RunReport<'_> {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize result")
    }
}
