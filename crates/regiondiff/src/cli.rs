use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CliOverrides;

#[derive(Parser)]
#[command(
    name = "regiondiff",
    about = "Pixel similarity of a selected region of two images"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two images and report their similarity (exit 0 identical / 1 different)
    Compare {
        /// Left / reference image
        #[arg(long)]
        left: PathBuf,
        /// Right / current image
        #[arg(long)]
        right: PathBuf,
        /// Write the diff map as PNG to this path
        #[arg(long, short = 'o')]
        diff_out: Option<PathBuf>,
        /// Print the result as JSON instead of the summary
        #[arg(long)]
        json: bool,
        /// Show a live progress line while comparing
        #[arg(long)]
        progress: bool,
        #[command(flatten)]
        settings: CliOverrides,
    },

    /// Print the resolved comparison settings as TOML
    Config {
        #[command(flatten)]
        settings: CliOverrides,
    },
}
