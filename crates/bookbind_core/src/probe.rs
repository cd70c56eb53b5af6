//! Audio probing using ffprobe.
//!
//! Each input file is probed once for its container duration and the sample
//! rate and channel count of its first audio stream. ffprobe reports these
//! as JSON; numeric fields arrive as strings in some builds, so parsing
//! accepts both forms.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timeline::MAX_DURATION_SECS;

/// Error types for probing a single input file.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// ffprobe could not be started.
    #[error("Failed to run ffprobe")]
    Launch(#[source] std::io::Error),

    /// ffprobe ran but exited with a failure status.
    #[error("ffprobe failed with exit code {exit_code}: {message}")]
    CommandFailed { exit_code: i32, message: String },

    /// ffprobe output was not valid JSON.
    #[error("ffprobe output is not valid JSON")]
    InvalidJson(#[from] serde_json::Error),

    /// The file has no audio stream.
    #[error("No audio stream found")]
    NoAudioStream,

    /// A required field was absent or not numeric.
    #[error("Missing or non-numeric '{field}' in ffprobe output")]
    MissingField { field: &'static str },

    /// The duration is non-positive, non-finite, or too large to place on
    /// the nanosecond timeline.
    #[error("Reported duration {value} is not a playable number of seconds")]
    InvalidDuration { value: f64 },
}

/// Type alias for probe results.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Audio characteristics of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Sample rate of the first audio stream, in hertz.
    pub sample_rate_hz: u32,
    /// Channel count of the first audio stream.
    pub channels: u32,
}

/// Boundary seam for audio probing.
///
/// The pipeline only depends on this trait, so it can be exercised in tests
/// without spawning ffprobe.
pub trait AudioProber {
    /// Probe one file for duration and first-audio-stream properties.
    fn probe(&self, path: &Path) -> ProbeResult<AudioInfo>;
}

/// ffprobe-backed prober.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: PathBuf,
}

impl Ffprobe {
    /// Create a prober that invokes the given ffprobe executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl AudioProber for Ffprobe {
    fn probe(&self, path: &Path) -> ProbeResult<AudioInfo> {
        tracing::debug!("Probing file: {}", path.display());

        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-select_streams",
                "a:0",
                "-show_entries",
                "stream=sample_rate,channels",
                "-show_entries",
                "format=duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(ProbeError::Launch)?;

        if !output.status.success() {
            return Err(ProbeError::CommandFailed {
                exit_code: output.status.code().unwrap_or(-1),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_probe_output(&output.stdout)
    }
}

/// Parse the JSON document ffprobe prints for one file.
pub fn parse_probe_output(stdout: &[u8]) -> ProbeResult<AudioInfo> {
    let json: Value = serde_json::from_slice(stdout)?;

    let duration_secs = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(number_as_f64)
        .ok_or(ProbeError::MissingField { field: "duration" })?;

    // `-select_streams a:0` leaves the streams array empty when the file
    // has no audio stream at all.
    let stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .ok_or(ProbeError::NoAudioStream)?;

    let sample_rate_hz = stream
        .get("sample_rate")
        .and_then(number_as_u32)
        .ok_or(ProbeError::MissingField {
            field: "sample_rate",
        })?;

    let channels = stream
        .get("channels")
        .and_then(number_as_u32)
        .ok_or(ProbeError::MissingField { field: "channels" })?;

    // Corrupt containers can report wildly wrong durations; a value that
    // cannot index the nanosecond timeline is not playable.
    if !duration_secs.is_finite() || duration_secs <= 0.0 || duration_secs >= MAX_DURATION_SECS {
        return Err(ProbeError::InvalidDuration {
            value: duration_secs,
        });
    }

    Ok(AudioInfo {
        duration_secs,
        sample_rate_hz,
        channels,
    })
}

/// ffprobe encodes duration and sample_rate as JSON strings; accept both.
fn number_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
