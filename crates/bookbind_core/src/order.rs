//! Order file parsing.
//!
//! The order file lists one source file per line, optionally followed by a
//! `|`-separated chapter title:
//!
//! ```text
//! 01-intro.mp3|Introduction
//! 02-chapter-one.mp3
//! 03-chapter-two.mp3 | Chapter Two
//! ```
//!
//! Blank lines are skipped. A line without a `|` takes the filename stem
//! (the name minus its extension) as the chapter title. Entry order defines
//! the chapter sequence of the final container.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// One entry of the order file: a source filename and its chapter title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    /// Source filename, relative to the input directory.
    pub filename: String,
    /// Chapter title for this segment.
    pub title: String,
}

/// Parse order file text into the ordered entry list.
///
/// Lines are trimmed first; blank lines are dropped. The first `|` splits
/// filename from title and both halves are trimmed again, so a title may
/// itself contain `|` characters.
pub fn parse_order(text: &str) -> Vec<OrderEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> OrderEntry {
    match line.split_once('|') {
        Some((filename, title)) => OrderEntry {
            filename: filename.trim().to_string(),
            title: title.trim().to_string(),
        },
        None => OrderEntry {
            filename: line.to_string(),
            title: default_title(line),
        },
    }
}

/// Default chapter title: the filename without its extension.
fn default_title(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}
