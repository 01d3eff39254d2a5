use std::io::Write;
use std::path::Path;
use std::time::Duration;

use regiondiff::{ComparisonResult, MetadataComparison, Progress};

/// Clear the current terminal line (wipes progress indicator).
pub fn clear_line() {
    print!("\r\x1b[2K");
}

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_dimensions(width: u32, height: u32, is_region: bool) -> String {
    if is_region {
        format!("{width} × {height} (Region)")
    } else {
        format!("{width} × {height}")
    }
}

/// Human file size with up to two decimals: `0 Bytes`, `512 Bytes`, `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Property table for the two input files, one row per property.
pub fn format_metadata(m: &MetadataComparison) -> String {
    let format_name = |f: &Option<String>| f.clone().unwrap_or_else(|| "unknown".to_string());
    let size_note = if m.same_size {
        String::new()
    } else {
        format!("  Δ {}", format_file_size(m.size_delta))
    };
    let rows = [
        ("File Name", m.left.name.clone(), m.right.name.clone(), m.same_name, String::new()),
        (
            "File Type",
            format_name(&m.left.format),
            format_name(&m.right.format),
            m.same_format,
            String::new(),
        ),
        (
            "File Size",
            format_file_size(m.left.size_bytes),
            format_file_size(m.right.size_bytes),
            m.same_size,
            size_note,
        ),
        (
            "Dimensions",
            format_dimensions(m.left.width, m.left.height, false),
            format_dimensions(m.right.width, m.right.height, false),
            m.same_dimensions,
            String::new(),
        ),
    ];

    let left_w = rows.iter().map(|r| r.1.chars().count()).max().unwrap_or(0).max(5);
    let right_w = rows.iter().map(|r| r.2.chars().count()).max().unwrap_or(0).max(5);
    let mut out = format!("{:<12}{:<left_w$}  {:<right_w$}  Status\n", "Property", "Left", "Right");
    for (label, left, right, same, note) in rows {
        let status = if same {
            "\x1b[32msame\x1b[0m"
        } else {
            "\x1b[33mdiffers\x1b[0m"
        };
        out.push_str(&format!("{label:<12}{left:<left_w$}  {right:<right_w$}  {status}{note}\n"));
    }
    out
}

pub fn print_metadata(m: &MetadataComparison) {
    println!("{}", format_metadata(m));
}

/// Overwrite the progress line with the latest batch snapshot.
pub fn show_progress(p: &Progress) {
    clear_line();
    print!(
        "  Comparing  {:>5.1}%  row {} col {}  {} px  {:.2}% match",
        p.percent,
        p.row,
        p.col,
        format_count(p.processed),
        p.match_percent
    );
    let _ = std::io::stdout().flush();
}

/// Print the results panel.
pub fn print_summary(
    result: &ComparisonResult,
    width: u32,
    height: u32,
    is_region: bool,
    elapsed: Duration,
) {
    clear_line();
    let colour = if result.is_identical() { 32 } else { 31 };
    println!(
        "Similarity:  \x1b[{colour}m{:.2}%\x1b[0m",
        result.similarity
    );
    println!("Total:       {} px", format_count(result.total_pixels));
    println!("Matching:    {} px", format_count(result.matching_pixels));
    println!("Different:   {} px", format_count(result.different_pixels));
    println!("Dimensions:  {}", format_dimensions(width, height, is_region));
    println!("Time:        {}", format_duration(elapsed));
}

pub fn print_diff_map_saved(path: &Path) {
    println!("Diff map:    {}", path.display());
}

pub fn print_cancelled() {
    clear_line();
    println!("Comparison cancelled, no result.");
}
