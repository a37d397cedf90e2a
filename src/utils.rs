//! Helpers shared by the CLI and the report output.

use crate::constants::PROGRESS_SPINNER_TEMPLATE;
use crate::console_info;
use crate::result::CompressionStats;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress spinner with consistent styling
///
/// Hidden in quiet mode. Falls back to the default spinner style if the
/// template cannot be parsed.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = if crate::logger::is_quiet() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    let style = ProgressStyle::default_spinner()
        .template(PROGRESS_SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

pub fn format_dimensions(width: u32, height: u32) -> String {
    format!("{}x{}", width, height)
}

/// Print the statistics of one stored result
pub fn print_statistics(label: &str, stats: &CompressionStats) {
    console_info!("📊 {}", label);
    console_info!(
        "  📈 Compressed size: {} ({})",
        stats.size_bytes,
        format_file_size(stats.size_bytes)
    );
    if let Some((width, height)) = stats.dimensions {
        console_info!("  📏 Dimensions: {}", format_dimensions(width, height));
    }
    console_info!("  🎯 Compression ratio: {}", stats.ratio_label());

    if stats.reduction_percent > 0.0 {
        console_info!("  ✅ Size reduction: {}", stats.reduction_label());
    } else {
        console_info!(
            "  ⚠️  File size increased by {:.1}%",
            stats.reduction_percent.abs()
        );
    }
}
