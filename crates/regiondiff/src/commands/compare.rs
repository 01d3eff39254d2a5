use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use regiondiff::{
    CancelToken, Comparison, FileInfo, MetadataComparison, Outcome, Progress, ProgressSink, input,
    region,
};
use tracing::{debug, info};

use crate::config::ResolvedRunConfig;
use crate::report::{RunReport, terminal};
use crate::store;

/// Exit code for a run stopped with Ctrl-C.
const EXIT_CANCELLED: i32 = 130;

pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub diff_out: Option<PathBuf>,
    pub json: bool,
    pub progress: bool,
}

/// `regiondiff compare`: extract the region, compare, report.
/// Returns exit code: 0 = identical, 1 = differences, 130 = cancelled.
pub async fn compare(config: ResolvedRunConfig, args: CompareArgs) -> Result<i32> {
    let settings = config.settings;
    let (left, left_info) = load(&args.left, "left")?;
    let (right, right_info) = load(&args.right, "right")?;
    let metadata = MetadataComparison::new(left_info, right_info);
    if !args.json {
        terminal::print_metadata(&metadata);
    }
    info!(
        left = %args.left.display(),
        right = %args.right.display(),
        threshold = settings.threshold,
        "comparing"
    );

    let run_start = Instant::now();
    let (left, right) = region::extract(&left, &right, &settings)?;
    let (width, height) = left.dimensions();
    let comparison = Comparison::new(left, right, &settings)?;

    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, cancelling");
                cancel.cancel();
            }
        })
    };

    let mut sink: Box<dyn ProgressSink> = if args.progress && !args.json {
        Box::new(|p: &Progress| terminal::show_progress(p))
    } else {
        Box::new(())
    };
    let outcome = comparison.run_async(sink.as_mut(), &cancel).await;
    watcher.abort();

    let (result, diff_map) = match outcome {
        Outcome::Completed { result, diff_map } => (result, diff_map),
        Outcome::Cancelled => {
            terminal::print_cancelled();
            return Ok(EXIT_CANCELLED);
        }
    };
    let elapsed = run_start.elapsed();
    info!(
        similarity = result.similarity,
        different = result.different_pixels,
        elapsed_ms = elapsed.as_millis() as u64,
        "comparison finished"
    );

    // Identical runs produce no diff map.
    let diff_out = args.diff_out.as_deref().filter(|_| !result.is_identical());
    if let Some(path) = diff_out {
        store::write_diff_map(path, &diff_map)?;
    } else if let Some(path) = &args.diff_out {
        info!(path = %path.display(), "images identical, diff map not written");
    }

    let is_region = !settings.region.is_full();
    if args.json {
        let report = RunReport {
            result: &result,
            width,
            height,
            region: is_region,
            elapsed_ms: elapsed.as_millis() as u64,
            metadata: &metadata,
            diff_map: diff_out,
        };
        println!("{}", report.to_json()?);
    } else {
        terminal::print_summary(&result, width, height, is_region, elapsed);
        if let Some(path) = diff_out {
            terminal::print_diff_map_saved(path);
        }
    }

    Ok(if result.is_identical() { 0 } else { 1 })
}

fn load(path: &Path, side: &str) -> Result<(image::RgbaImage, FileInfo)> {
    input::load_with_info(path).with_context(|| format!("Failed to load {side} image"))
}
