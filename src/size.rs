//! Pure size-computation over yt-dlp's parsed `formats[]` metadata. Not
//! resilience logic — present only so `/api/v1/size` has a real body to
//! return once the core admits and runs a request.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeComputationError {
    #[error("yt-dlp metadata is missing a duration")]
    MissingDuration,
    #[error("yt-dlp metadata contains no usable formats")]
    NoUsableFormats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeEstimate {
    /// Resolution label (e.g. `"720p"`) to estimated byte count, largest
    /// format observed at that resolution.
    pub bytes: BTreeMap<String, u64>,
    pub human: BTreeMap<String, String>,
    pub duration: u64,
}

/// Computes an approximate byte size per resolution from yt-dlp's
/// `formats[]` array: prefers the reported `filesize`, falls back to
/// `filesize_approx`, and as a last resort derives a size from bitrate
/// (`tbr`, in kbps) times duration.
pub fn compute_sizes(
    metadata: &serde_json::Value,
    duration_hint: Option<u64>,
) -> Result<SizeEstimate, SizeComputationError> {
    let duration = metadata
        .get("duration")
        .and_then(|v| v.as_f64())
        .map(|secs| secs.round() as u64)
        .or(duration_hint)
        .ok_or(SizeComputationError::MissingDuration)?;

    let formats = metadata
        .get("formats")
        .and_then(|v| v.as_array())
        .ok_or(SizeComputationError::NoUsableFormats)?;

    let mut bytes: BTreeMap<String, u64> = BTreeMap::new();

    for format in formats {
        let Some(height) = format.get("height").and_then(|v| v.as_u64()) else {
            continue;
        };
        let label = format!("{height}p");

        let size = format
            .get("filesize")
            .and_then(|v| v.as_u64())
            .or_else(|| format.get("filesize_approx").and_then(|v| v.as_u64()))
            .or_else(|| {
                format
                    .get("tbr")
                    .and_then(|v| v.as_f64())
                    .map(|kbps| ((kbps * 1000.0 / 8.0) * duration as f64) as u64)
            });

        if let Some(size) = size {
            bytes
                .entry(label)
                .and_modify(|existing| *existing = (*existing).max(size))
                .or_insert(size);
        }
    }

    if bytes.is_empty() {
        return Err(SizeComputationError::NoUsableFormats);
    }

    let human = bytes
        .iter()
        .map(|(label, size)| (label.clone(), human_readable(*size)))
        .collect();

    Ok(SizeEstimate { bytes, human, duration })
}

fn human_readable(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit_index = 0;
    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }
    format!("{value:.2} {}", UNITS[unit_index])
}
