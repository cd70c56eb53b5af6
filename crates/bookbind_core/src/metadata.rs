//! FFMETADATA chapter serialization.
//!
//! The muxer consumes chapters as an FFMETADATA1 text document: a header
//! line followed by one `[CHAPTER]` block per chapter, all on a fixed
//! nanosecond time base. Reserved characters in titles are
//! backslash-escaped. A parser for the same shape is provided so a written
//! document can be read back and verified.

use crate::timeline::{Chapter, Timeline};

/// Header token opening every FFMETADATA document.
pub const FFMETADATA_HEADER: &str = ";FFMETADATA1";

/// Time base declaration written into every chapter block.
const TIMEBASE_LINE: &str = "TIMEBASE=1/1000000000";

/// Error types for reading a chapter metadata document back.
#[derive(Debug, thiserror::Error)]
pub enum MetadataParseError {
    /// The document does not start with the FFMETADATA1 header.
    #[error("Missing ;FFMETADATA1 header")]
    MissingHeader,

    /// A chapter block line did not have the expected shape.
    #[error("Malformed chapter block at line {line}: expected {expected}")]
    Malformed { line: usize, expected: &'static str },

    /// The document ended in the middle of a chapter block.
    #[error("Unexpected end of document: expected {expected}")]
    UnexpectedEof { expected: &'static str },
}

/// Escape a chapter title for use as an FFMETADATA value.
///
/// Backslash must be escaped first; escaping it later would corrupt the
/// escapes inserted for `=`, `;` and `#`.
pub fn escape_title(title: &str) -> String {
    title
        .replace('\\', "\\\\")
        .replace('=', "\\=")
        .replace(';', "\\;")
        .replace('#', "\\#")
}

/// Undo [`escape_title`]: a backslash makes the following character literal.
pub fn unescape_title(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Render the chapter metadata document for a timeline.
pub fn render_metadata(timeline: &Timeline) -> String {
    let mut out = String::new();
    out.push_str(FFMETADATA_HEADER);
    out.push('\n');

    for chapter in timeline.iter() {
        out.push_str("[CHAPTER]\n");
        out.push_str(TIMEBASE_LINE);
        out.push('\n');
        out.push_str(&format!("START={}\n", chapter.start_ns));
        out.push_str(&format!("END={}\n", chapter.end_ns));
        out.push_str(&format!("title={}\n", escape_title(&chapter.title)));
    }

    out
}

/// Parse a document produced by [`render_metadata`] back into a timeline.
pub fn parse_metadata(text: &str) -> Result<Timeline, MetadataParseError> {
    let mut lines = text.lines().enumerate();

    match lines.next() {
        Some((_, line)) if line == FFMETADATA_HEADER => {}
        _ => return Err(MetadataParseError::MissingHeader),
    }

    let mut chapters = Vec::new();
    while let Some((n, line)) = lines.next() {
        if line.is_empty() {
            continue;
        }
        if line != "[CHAPTER]" {
            return Err(MetadataParseError::Malformed {
                line: n + 1,
                expected: "[CHAPTER]",
            });
        }

        expect_line(&mut lines, TIMEBASE_LINE)?;
        let start_ns = expect_int_field(&mut lines, "START=")?;
        let end_ns = expect_int_field(&mut lines, "END=")?;
        let (_, raw_title) = expect_prefixed(&mut lines, "title=")?;
        let title = unescape_title(&raw_title);

        chapters.push(Chapter {
            title,
            start_ns,
            end_ns,
        });
    }

    Ok(Timeline::from_chapters(chapters))
}

fn expect_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    expected: &'static str,
) -> Result<(), MetadataParseError> {
    match lines.next() {
        Some((_, line)) if line == expected => Ok(()),
        Some((n, _)) => Err(MetadataParseError::Malformed {
            line: n + 1,
            expected,
        }),
        None => Err(MetadataParseError::UnexpectedEof { expected }),
    }
}

fn expect_prefixed<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    prefix: &'static str,
) -> Result<(usize, String), MetadataParseError> {
    match lines.next() {
        Some((n, line)) if line.starts_with(prefix) => Ok((n, line[prefix.len()..].to_string())),
        Some((n, _)) => Err(MetadataParseError::Malformed {
            line: n + 1,
            expected: prefix,
        }),
        None => Err(MetadataParseError::UnexpectedEof { expected: prefix }),
    }
}

fn expect_int_field<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    prefix: &'static str,
) -> Result<i64, MetadataParseError> {
    let (n, value) = expect_prefixed(lines, prefix)?;
    value.parse().map_err(|_| MetadataParseError::Malformed {
        line: n + 1,
        expected: prefix,
    })
}
