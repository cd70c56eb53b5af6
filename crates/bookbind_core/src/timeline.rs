//! Chapter timeline construction.
//!
//! Probed durations fold into a contiguous sequence of chapters on a
//! nanosecond timeline: the first chapter starts at zero and each chapter
//! starts exactly where the previous one ended, so gaps and overlaps cannot
//! be produced by construction.

use serde::{Deserialize, Serialize};

/// Nanoseconds per second; the timeline's fixed time base is 1/1e9.
pub const NS_PER_SEC: f64 = 1_000_000_000.0;

/// Upper bound on a single duration in seconds. Values at or above this
/// do not fit in an `i64` of nanoseconds.
pub const MAX_DURATION_SECS: f64 = i64::MAX as f64 / NS_PER_SEC;

/// A named, time-bounded segment of the final container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter display title.
    pub title: String,
    /// Chapter start time in nanoseconds.
    pub start_ns: i64,
    /// Chapter end time in nanoseconds.
    pub end_ns: i64,
}

impl Chapter {
    /// Chapter length in nanoseconds.
    pub fn duration_ns(&self) -> i64 {
        self.end_ns - self.start_ns
    }
}

/// Ordered chapter sequence spanning the whole output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    chapters: Vec<Chapter>,
}

impl Timeline {
    /// Get the chapters in playback order.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Get the number of chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Check if there are no chapters.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Get an iterator over chapters.
    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    /// End of the last chapter in nanoseconds, or 0 when empty.
    pub fn total_duration_ns(&self) -> i64 {
        self.chapters.last().map(|c| c.end_ns).unwrap_or(0)
    }

    pub(crate) fn from_chapters(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }
}

/// Convert a duration in seconds to nanoseconds.
///
/// Truncates toward zero and saturates at `i64::MAX` when the product does
/// not fit. The same rule applies to every file in a run, so rounding can
/// never reintroduce a gap or an overlap between chapters.
pub fn duration_to_ns(duration_secs: f64) -> i64 {
    (duration_secs * NS_PER_SEC) as i64
}

/// One fold step: place a chapter of `duration_secs` at `cursor_ns`.
///
/// Returns the advanced cursor and the chapter. The new cursor equals the
/// chapter's end, which makes the timeline contiguous by induction. The
/// advance saturates at `i64::MAX`, so a degenerate duration can pin the
/// cursor but never wrap it backwards.
pub fn extend(cursor_ns: i64, title: impl Into<String>, duration_secs: f64) -> (i64, Chapter) {
    let chapter = Chapter {
        title: title.into(),
        start_ns: cursor_ns,
        end_ns: cursor_ns.saturating_add(duration_to_ns(duration_secs)),
    };
    (chapter.end_ns, chapter)
}

/// Incremental timeline accumulator used while inputs are probed in order.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    cursor_ns: i64,
    chapters: Vec<Chapter>,
}

impl TimelineBuilder {
    /// Create an empty builder with the cursor at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next segment; its chapter starts exactly at the cursor.
    pub fn push(&mut self, title: impl Into<String>, duration_secs: f64) {
        let (cursor_ns, chapter) = extend(self.cursor_ns, title, duration_secs);
        self.cursor_ns = cursor_ns;
        self.chapters.push(chapter);
    }

    /// Current end of the timeline in nanoseconds.
    pub fn cursor_ns(&self) -> i64 {
        self.cursor_ns
    }

    /// Check if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Finish building and return the timeline.
    pub fn finish(self) -> Timeline {
        Timeline {
            chapters: self.chapters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_segments_fold_contiguously() {
        let mut builder = TimelineBuilder::new();
        builder.push("One", 10.0);
        builder.push("Two", 2.0);
        builder.push("Three", 7.0);
        assert_eq!(builder.cursor_ns(), 19_000_000_000);
        let timeline = builder.finish();

        let spans: Vec<_> = timeline
            .iter()
            .map(|c| (c.start_ns, c.end_ns))
            .collect();
        assert_eq!(
            spans,
            vec![
                (0, 10_000_000_000),
                (10_000_000_000, 12_000_000_000),
                (12_000_000_000, 19_000_000_000),
            ]
        );
        assert_eq!(timeline.total_duration_ns(), 19_000_000_000);
    }

    #[test]
    fn first_chapter_starts_at_zero() {
        let mut builder = TimelineBuilder::new();
        builder.push("Intro", 0.001);
        let timeline = builder.finish();
        assert_eq!(timeline.chapters()[0].start_ns, 0);
    }

    #[test]
    fn every_chapter_starts_where_previous_ended() {
        let durations = [600.0, 123.456, 0.04, 3599.999, 1.0];
        let mut builder = TimelineBuilder::new();
        for (i, d) in durations.iter().enumerate() {
            builder.push(format!("Chapter {}", i + 1), *d);
        }
        let timeline = builder.finish();

        for pair in timeline.chapters().windows(2) {
            assert_eq!(pair[0].end_ns, pair[1].start_ns);
        }
    }

    #[test]
    fn fractional_durations_truncate() {
        // 1.9999999996 s is 1_999_999_999.6 ns; truncation drops the .6.
        assert_eq!(duration_to_ns(1.9999999996), 1_999_999_999);
        assert_eq!(duration_to_ns(0.5), 500_000_000);
    }

    #[test]
    fn oversized_duration_saturates_the_cursor() {
        // 1e12 seconds does not fit in an i64 nanosecond count.
        assert_eq!(duration_to_ns(1.0e12), i64::MAX);

        let mut builder = TimelineBuilder::new();
        builder.push("Junk", 1.0e12);
        builder.push("After", 10.0);
        assert_eq!(builder.cursor_ns(), i64::MAX);
        let timeline = builder.finish();

        // The cursor pins at the maximum instead of wrapping negative, so
        // the chapters stay contiguous and monotonic.
        let spans: Vec<_> = timeline.iter().map(|c| (c.start_ns, c.end_ns)).collect();
        assert_eq!(spans, vec![(0, i64::MAX), (i64::MAX, i64::MAX)]);
        assert_eq!(timeline.total_duration_ns(), i64::MAX);
    }

    #[test]
    fn extend_advances_cursor_to_chapter_end() {
        let (cursor, chapter) = extend(5_000_000_000, "Five", 2.5);
        assert_eq!(chapter.start_ns, 5_000_000_000);
        assert_eq!(chapter.end_ns, 7_500_000_000);
        assert_eq!(cursor, chapter.end_ns);
    }

    #[test]
    fn empty_builder_yields_empty_timeline() {
        let builder = TimelineBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.cursor_ns(), 0);
        let timeline = builder.finish();
        assert!(timeline.is_empty());
        assert_eq!(timeline.total_duration_ns(), 0);
    }

    #[test]
    fn chapter_duration_is_span_length() {
        let (_, chapter) = extend(1_000, "X", 1.0);
        assert_eq!(chapter.duration_ns(), 1_000_000_000);
    }
}
