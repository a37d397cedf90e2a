//! Settings sweep: one encoder, one source, several settings, one report.

use crate::encoder::{EncodeRequest, Encoder};
use crate::error::Result;
use crate::formats::OutputFormat;
use crate::result::{compression_ratio, size_reduction_percent};
use crate::settings::CompressionSettings;
use crate::source::SourceImage;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// One successful run of a sweep.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub settings: CompressionSettings,
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl SweepEntry {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginalInfo {
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub settings: CompressionSettings,
    pub size: u64,
    pub compression_ratio: f64,
    /// One decimal place followed by `%`, e.g. `"42.5%"`
    pub size_reduction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionReport {
    pub original: OriginalInfo,
    pub compressions: Vec<ReportEntry>,
}

impl CompressionReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs `encoder` once per settings entry, in order. Failed runs are logged
/// and left out of the returned entries.
pub async fn sweep_settings(
    encoder: &dyn Encoder,
    source: Arc<SourceImage>,
    settings: &[CompressionSettings],
) -> Vec<SweepEntry> {
    let start_time = Instant::now();
    let progress = if crate::logger::is_quiet() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(settings.len() as u64)
    };
    progress.set_style(ProgressStyle::default_bar());

    let mut entries = Vec::with_capacity(settings.len());
    for setting in settings {
        let request = EncodeRequest::new(Arc::clone(&source), *setting);
        match encoder.encode(request).await {
            Ok(encoded) if encoded.bytes.is_empty() => {
                warn!(encoder = encoder.name(), ?setting, "sweep run produced no output, skipping");
            }
            Ok(encoded) => {
                debug!(encoder = encoder.name(), quality = setting.quality, bytes = encoded.bytes.len(), "sweep run finished");
                entries.push(SweepEntry {
                    settings: *setting,
                    bytes: encoded.bytes,
                    format: encoded.format,
                });
            }
            Err(e) => {
                warn!(encoder = encoder.name(), ?setting, error = %e, "sweep run failed, skipping");
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    debug!(
        runs = settings.len(),
        succeeded = entries.len(),
        elapsed = ?start_time.elapsed(),
        "sweep finished"
    );
    entries
}

/// Builds the comparison report for a sweep.
pub fn generate_report(source: &SourceImage, entries: &[SweepEntry]) -> CompressionReport {
    let compressions = entries
        .iter()
        .map(|entry| ReportEntry {
            settings: entry.settings,
            size: entry.size(),
            compression_ratio: compression_ratio(source.size(), entry.size()).unwrap_or(0.0),
            size_reduction: format!("{:.1}%", size_reduction_percent(source.size(), entry.size())),
        })
        .collect();

    CompressionReport {
        original: OriginalInfo {
            size: source.size(),
            mime_type: source.mime_type().to_string(),
        },
        compressions,
    }
}
