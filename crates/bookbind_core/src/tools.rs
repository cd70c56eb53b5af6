//! External tool discovery and pre-flight verification.
//!
//! All media work is delegated to ffmpeg and ffprobe, so both are located
//! on PATH and smoke-tested before any pipeline starts. A tool that is
//! installed but cannot start (for example a shared build with missing
//! libraries) is reported up front instead of mid-run.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Error types for dependency checks.
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    /// The tool is not present in any PATH directory.
    #[error("Required tool '{tool}' not found in PATH")]
    Missing { tool: String },

    /// The tool exists but `<tool> -version` did not run cleanly.
    #[error("Tool '{tool}' was found but failed to run: {message}")]
    NotRunnable { tool: String, message: String },
}

/// Type alias for dependency check results.
pub type DependencyResult<T> = Result<T, DependencyError>;

/// Resolved paths of the external tools the pipeline invokes.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Path to the ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// Path to the ffprobe executable.
    pub ffprobe: PathBuf,
}

impl Toolchain {
    /// Locate ffmpeg and ffprobe on PATH and verify that both run.
    pub fn locate() -> DependencyResult<Self> {
        let ffmpeg = locate_tool("ffmpeg")?;
        let ffprobe = locate_tool("ffprobe")?;
        Ok(Self { ffmpeg, ffprobe })
    }
}

fn locate_tool(tool: &str) -> DependencyResult<PathBuf> {
    let path_var = env::var_os("PATH").unwrap_or_default();
    let path = find_in_dirs(tool, env::split_paths(&path_var)).ok_or_else(|| {
        DependencyError::Missing {
            tool: tool.to_string(),
        }
    })?;

    verify_runs(tool, &path)?;
    tracing::debug!("Resolved {} to {}", tool, path.display());
    Ok(path)
}

/// Search the given directories for an executable with the tool's name.
fn find_in_dirs(tool: &str, dirs: impl Iterator<Item = PathBuf>) -> Option<PathBuf> {
    for dir in dirs {
        let candidate = dir.join(tool);
        if candidate.is_file() {
            return Some(candidate);
        }

        #[cfg(windows)]
        {
            let candidate = dir.join(format!("{tool}.exe"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Run `<tool> -version` with suppressed output to confirm the binary starts.
fn verify_runs(tool: &str, path: &Path) -> DependencyResult<()> {
    let status = Command::new(path)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(DependencyError::NotRunnable {
            tool: tool.to_string(),
            message: format!("exit status {status}"),
        }),
        Err(e) => Err(DependencyError::NotRunnable {
            tool: tool.to_string(),
            message: e.to_string(),
        }),
    }
}
