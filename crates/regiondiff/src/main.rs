mod cli;
mod commands;
mod config;
mod report;
mod store;

use clap::Parser;
use commands::CompareArgs;
use config::ResolvedRunConfig;
use tracing_subscriber::EnvFilter;

/// Exit code for configuration, input and I/O failures.
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("regiondiff=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}

async fn run(cli: cli::Cli) -> anyhow::Result<i32> {
    match cli.command {
        cli::Command::Compare {
            left,
            right,
            diff_out,
            json,
            progress,
            settings,
        } => {
            let config = ResolvedRunConfig::new(settings)?;
            let args = CompareArgs {
                left,
                right,
                diff_out,
                json,
                progress,
            };
            commands::compare(config, args).await
        }
        cli::Command::Config { settings } => {
            let config = ResolvedRunConfig::new(settings)?;
            commands::config(config)?;
            Ok(0)
        }
    }
}
