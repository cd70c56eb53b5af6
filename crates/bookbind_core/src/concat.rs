//! Concat manifest serialization.
//!
//! ffmpeg's concat demuxer reads a text manifest of `file '<path>'` lines
//! and plays the listed inputs back to back. Backslashes are normalized to
//! forward slashes so a manifest written on Windows still parses.

use std::path::Path;

/// Render the concat manifest for the ordered source files.
///
/// One line per file, in join order.
pub fn render_concat_list<P: AsRef<Path>>(paths: &[P]) -> String {
    let mut out = String::new();
    for path in paths {
        let normalized = path.as_ref().to_string_lossy().replace('\\', "/");
        out.push_str(&format!("file '{normalized}'\n"));
    }
    out
}
