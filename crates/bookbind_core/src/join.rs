//! Final join invocation.
//!
//! Builds and runs the single ffmpeg command that concatenates the inputs,
//! applies the chapter metadata, optionally embeds cover art, and writes
//! the MP4-family output. The audio stream is copied, never re-encoded.

use std::path::PathBuf;
use std::process::Command;

/// Error types for the join step.
#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    /// ffmpeg could not be started.
    #[error("Failed to run ffmpeg")]
    Launch(#[source] std::io::Error),

    /// ffmpeg ran but exited with a failure status. The output file must
    /// not be trusted after this.
    #[error("ffmpeg failed with exit code {exit_code}: {message}")]
    CommandFailed { exit_code: i32, message: String },
}

/// Type alias for join results.
pub type JoinResult<T> = Result<T, JoinError>;

/// Inputs of one join invocation.
#[derive(Debug, Clone)]
pub struct JoinJob {
    /// Concat manifest listing the source files in order.
    pub concat_list: PathBuf,
    /// Chapter metadata document.
    pub metadata: PathBuf,
    /// Optional cover image to embed as attached cover art.
    pub cover: Option<PathBuf>,
    /// Output container path.
    pub output: PathBuf,
}

/// Build the ffmpeg argument vector for a join job.
///
/// Input 0 is the concat manifest, input 1 the metadata document whose tags
/// override the first input's, and input 2 the optional cover image whose
/// single video stream is copied and flagged as attached cover art. The
/// audio codec is copied unchanged and the output container is forced to
/// MP4, overwriting any existing file.
pub fn build_args(job: &JoinJob) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    args.push("-f".to_string());
    args.push("concat".to_string());
    args.push("-safe".to_string());
    args.push("0".to_string());
    args.push("-i".to_string());
    args.push(job.concat_list.to_string_lossy().to_string());
    args.push("-i".to_string());
    args.push(job.metadata.to_string_lossy().to_string());

    if let Some(cover) = &job.cover {
        args.push("-i".to_string());
        args.push(cover.to_string_lossy().to_string());
    }

    args.push("-map_metadata".to_string());
    args.push("1".to_string());
    args.push("-c".to_string());
    args.push("copy".to_string());
    args.push("-map".to_string());
    args.push("0:a".to_string());

    if job.cover.is_some() {
        args.push("-map".to_string());
        args.push("2:v".to_string());
        args.push("-c:v".to_string());
        args.push("copy".to_string());
        args.push("-disposition:v:0".to_string());
        args.push("attached_pic".to_string());
        args.push("-metadata:s:v".to_string());
        args.push("title=\"Album cover\"".to_string());
        args.push("-metadata:s:v".to_string());
        args.push("comment=\"Cover (front)\"".to_string());
    }

    args.push("-f".to_string());
    args.push("mp4".to_string());
    args.push("-y".to_string());
    args.push(job.output.to_string_lossy().to_string());

    args
}

/// Boundary seam for the final mux.
///
/// Lets pipeline behavior around join failures be tested without ffmpeg.
pub trait Muxer {
    /// Run the join and wait for it to finish.
    fn join(&self, job: &JoinJob) -> JoinResult<()>;
}

/// ffmpeg-backed muxer.
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl FfmpegMuxer {
    /// Create a muxer that invokes the given ffmpeg executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Muxer for FfmpegMuxer {
    fn join(&self, job: &JoinJob) -> JoinResult<()> {
        let args = build_args(job);
        tracing::debug!("Running ffmpeg {}", args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(JoinError::Launch)?;

        if !output.status.success() {
            return Err(JoinError::CommandFailed {
                exit_code: output.status.code().unwrap_or(-1),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
