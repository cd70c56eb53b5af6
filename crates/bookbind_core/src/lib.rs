//! bookbind core - joins ordered audio segments into a single chaptered
//! MP4-family container without re-encoding.
//!
//! This crate contains all pipeline logic with zero CLI dependencies: it
//! probes every input with ffprobe, validates that all inputs share the
//! first file's sample rate and channel count, folds the durations into a
//! contiguous nanosecond chapter timeline, renders the concat manifest and
//! chapter metadata, and finally invokes ffmpeg to copy the audio into the
//! output container.

pub mod compat;
pub mod concat;
pub mod join;
pub mod metadata;
pub mod order;
pub mod pipeline;
pub mod probe;
pub mod timeline;
pub mod tools;

pub use pipeline::{JoinReport, JoinRequest, PipelineError, ProgressEvent};
pub use tools::{DependencyError, Toolchain};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
