//! End-to-end join pipeline.
//!
//! Strictly sequential: parse the order file, probe and validate each entry
//! in order while folding the chapter timeline, render the concat manifest
//! and chapter metadata, then hand everything to the muxer. Both
//! intermediate artifacts are written into the input directory only after
//! every input has validated, and are removed again on every exit path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::compat::{CompatCheck, ReferenceProfile, StreamField};
use crate::concat::render_concat_list;
use crate::join::{FfmpegMuxer, JoinError, JoinJob, Muxer};
use crate::metadata::render_metadata;
use crate::order::parse_order;
use crate::probe::{AudioProber, Ffprobe, ProbeError};
use crate::timeline::TimelineBuilder;
use crate::tools::Toolchain;

/// Name of the concat manifest written next to the inputs.
pub const CONCAT_LIST_NAME: &str = "files_to_concat.txt";
/// Name of the chapter metadata document written next to the inputs.
pub const METADATA_NAME: &str = "metadata.txt";

/// Error types for a pipeline run. All of these abort the whole run; a
/// missing input file is the only recoverable condition and is handled by
/// skipping, not by an error.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The order file could not be read.
    #[error("Failed to read order file '{}'", .path.display())]
    OrderFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every order entry was blank or pointed at a missing file.
    #[error("No valid files found to process")]
    NoValidFiles,

    /// Probing one input failed.
    #[error("Failed to probe '{file}'")]
    Probe {
        file: String,
        #[source]
        source: ProbeError,
    },

    /// One input does not match the first input's stream profile.
    #[error(
        "{field} mismatch in '{file}': expected {expected}{unit}, found {actual}{unit}",
        unit = .field.unit_suffix()
    )]
    IncompatibleStream {
        file: String,
        field: StreamField,
        expected: u32,
        actual: u32,
    },

    /// An intermediate artifact could not be written.
    #[error("Failed to write '{}'", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The final mux failed.
    #[error(transparent)]
    Join(#[from] JoinError),
}

/// Type alias for pipeline results.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Inputs of one pipeline run.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    /// Directory holding the source audio files.
    pub input_dir: PathBuf,
    /// Order file listing filenames and chapter titles.
    pub order_file: PathBuf,
    /// Output container path.
    pub output: PathBuf,
    /// Optional cover image to embed.
    pub cover: Option<PathBuf>,
}

/// Progress notifications emitted while the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The order file parsed into `total_files` entries.
    Start { total_files: usize },
    /// Entry `index` (zero-based) was probed and validated.
    Analyzed { index: usize, filename: String },
    /// An entry was skipped because its file is missing from the input
    /// directory.
    SkippedMissing { filename: String },
    /// Artifacts are on disk; the muxer is about to run.
    Joining,
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct JoinReport {
    /// Number of chapters in the final container.
    pub chapters: usize,
    /// Filenames skipped because they were missing, in order.
    pub skipped: Vec<String>,
    /// Path of the written container.
    pub output: PathBuf,
}

/// Run the full pipeline with the resolved system toolchain.
pub fn run(
    request: &JoinRequest,
    tools: &Toolchain,
    progress: impl FnMut(ProgressEvent),
) -> PipelineResult<JoinReport> {
    let prober = Ffprobe::new(&tools.ffprobe);
    let muxer = FfmpegMuxer::new(&tools.ffmpeg);
    run_with(request, &prober, &muxer, progress)
}

/// Run the full pipeline against explicit probe and mux implementations.
pub fn run_with(
    request: &JoinRequest,
    prober: &dyn AudioProber,
    muxer: &dyn Muxer,
    mut progress: impl FnMut(ProgressEvent),
) -> PipelineResult<JoinReport> {
    let text =
        fs::read_to_string(&request.order_file).map_err(|source| PipelineError::OrderFileRead {
            path: request.order_file.clone(),
            source,
        })?;
    let entries = parse_order(&text);

    progress(ProgressEvent::Start {
        total_files: entries.len(),
    });

    let mut reference: Option<ReferenceProfile> = None;
    let mut builder = TimelineBuilder::new();
    let mut sources: Vec<PathBuf> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let path = request.input_dir.join(&entry.filename);
        if !path.is_file() {
            tracing::warn!(
                "File '{}' not found in input directory. Skipping.",
                entry.filename
            );
            skipped.push(entry.filename.clone());
            progress(ProgressEvent::SkippedMissing {
                filename: entry.filename.clone(),
            });
            continue;
        }

        let info = prober.probe(&path).map_err(|source| PipelineError::Probe {
            file: entry.filename.clone(),
            source,
        })?;
        tracing::debug!(
            "{}: {:.3}s, {} Hz, {} channel(s)",
            entry.filename,
            info.duration_secs,
            info.sample_rate_hz,
            info.channels
        );

        match &reference {
            None => {
                let profile = ReferenceProfile::from_info(&info);
                tracing::debug!(
                    "Reference profile: {} Hz, {} channel(s)",
                    profile.sample_rate_hz,
                    profile.channels
                );
                reference = Some(profile);
            }
            Some(profile) => {
                if let CompatCheck::Mismatch {
                    field,
                    expected,
                    actual,
                } = profile.check(&info)
                {
                    return Err(PipelineError::IncompatibleStream {
                        file: entry.filename.clone(),
                        field,
                        expected,
                        actual,
                    });
                }
            }
        }

        builder.push(entry.title.clone(), info.duration_secs);
        sources.push(path);
        progress(ProgressEvent::Analyzed {
            index,
            filename: entry.filename.clone(),
        });
    }

    if builder.is_empty() {
        return Err(PipelineError::NoValidFiles);
    }

    let timeline = builder.finish();
    let chapters = timeline.len();
    let metadata_text = render_metadata(&timeline);
    let concat_text = render_concat_list(&sources);

    // Artifacts exist from here on; the guard removes them on every exit
    // path, including a failed mux.
    let concat_list = request.input_dir.join(CONCAT_LIST_NAME);
    let metadata = request.input_dir.join(METADATA_NAME);
    let _guard = ArtifactGuard::new(vec![concat_list.clone(), metadata.clone()]);

    write_artifact(&concat_list, &concat_text)?;
    write_artifact(&metadata, &metadata_text)?;

    progress(ProgressEvent::Joining);

    let job = JoinJob {
        concat_list,
        metadata,
        cover: request.cover.clone(),
        output: request.output.clone(),
    };
    muxer.join(&job)?;

    Ok(JoinReport {
        chapters,
        skipped,
        output: request.output.clone(),
    })
}

fn write_artifact(path: &Path, contents: &str) -> PipelineResult<()> {
    fs::write(path, contents).map_err(|source| PipelineError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Removes intermediate artifacts when dropped, regardless of how the
/// enclosing scope exits.
struct ArtifactGuard {
    paths: Vec<PathBuf>,
}

impl ArtifactGuard {
    fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove '{}': {}", path.display(), e);
                }
            }
        }
    }
}
