use std::path::PathBuf;

use anyhow::{Context, Result};
use regiondiff::settings::validate_threshold;
use regiondiff::{ComparisonSettings, Region, Rgb, SizingPolicy};

use super::load_layer;

fn parse_threshold(s: &str) -> Result<u8, String> {
    let v: i64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_threshold(v).map_err(|e| e.to_string())
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    s.parse().map_err(|e: regiondiff::CompareError| e.to_string())
}

/// `x1,y1,x2,y2` in percent.
fn parse_region(s: &str) -> Result<Region, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("region values must be numbers: {e}"))?;
    match parts[..] {
        [x1, y1, x2, y2] => Ok(Region::new(x1, y1, x2, y2)),
        _ => Err(format!("expected 4 comma-separated values, got {}", parts.len())),
    }
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("batch size must be greater than zero".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("{e}")),
    }
}

/// Settings flags shared by every subcommand. `None` means "not given".
#[derive(Clone, Debug, Default, clap::Args)]
pub struct CliOverrides {
    /// Settings file (default: ./regiondiff.toml if present)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Max summed RGB delta still counted as a match, in percent of 765 (0-100)
    #[arg(long, short = 't', value_parser = parse_threshold)]
    pub threshold: Option<u8>,

    /// Diff-map colour for differing pixels (#rrggbb)
    #[arg(long, value_parser = parse_color)]
    pub diff_color: Option<Rgb>,

    /// Diff-map colour for matching pixels (#rrggbb)
    #[arg(long, value_parser = parse_color)]
    pub match_color: Option<Rgb>,

    /// How images smaller than the shared canvas are placed
    #[arg(long, value_enum)]
    pub sizing: Option<SizingPolicy>,

    /// Comparison region as percentages: x1,y1,x2,y2 (corner order is irrelevant)
    #[arg(long, short = 'r', value_parser = parse_region, allow_hyphen_values = true)]
    pub region: Option<Region>,

    /// Pixels per batch between progress updates and cancellation checks
    #[arg(long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,
}

/// Values read from `REGIONDIFF_*` environment variables.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    pub threshold: Option<u8>,
    pub diff_color: Option<Rgb>,
    pub match_color: Option<Rgb>,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let threshold = lookup("REGIONDIFF_THRESHOLD")
            .map(|v| parse_threshold(v.trim()))
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("REGIONDIFF_THRESHOLD must be an integer between 0 and 100")?;
        let diff_color = lookup("REGIONDIFF_DIFF_COLOR")
            .map(|v| parse_color(&v))
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("REGIONDIFF_DIFF_COLOR is not a valid colour")?;
        let match_color = lookup("REGIONDIFF_MATCH_COLOR")
            .map(|v| parse_color(&v))
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("REGIONDIFF_MATCH_COLOR is not a valid colour")?;
        Ok(Self {
            threshold,
            diff_color,
            match_color,
        })
    }
}

/// Fully resolved settings after CLI > env > file > defaults merge.
pub struct ResolvedRunConfig {
    pub settings: ComparisonSettings,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        // 1. File layer (falls back to defaults)
        let file = load_layer(cli.config.as_deref())?;
        // 2. Env layer
        let env = EnvOverrides::from_env()?;
        // 3. Merge
        Ok(Self {
            settings: merge(file.compare, env, cli)?,
        })
    }
}

/// Overlay env and CLI values onto the file settings, highest priority last.
pub fn merge(
    file: ComparisonSettings,
    env: EnvOverrides,
    cli: CliOverrides,
) -> Result<ComparisonSettings> {
    let mut settings = file;

    if let Some(t) = cli.threshold.or(env.threshold) {
        settings.threshold = t;
    }
    if let Some(c) = cli.diff_color.or(env.diff_color) {
        settings.diff_color = c;
    }
    if let Some(c) = cli.match_color.or(env.match_color) {
        settings.match_color = c;
    }
    if let Some(s) = cli.sizing {
        settings.sizing = s;
    }
    if let Some(r) = cli.region {
        settings.region = r;
    }
    if let Some(b) = cli.batch_size {
        settings.batch_size = b;
    }

    settings.validate()?;
    Ok(settings)
}
