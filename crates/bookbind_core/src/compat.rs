//! Stream compatibility validation.
//!
//! The join copies audio bit-for-bit, so every input must share the first
//! input's sample rate and channel count; a container mixing profiles would
//! be corrupt or unplayable. The comparison is a pure function over probed
//! values and never touches the filesystem.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::probe::AudioInfo;

/// Stream property compared across inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamField {
    SampleRate,
    Channels,
}

impl StreamField {
    /// Unit suffix used when printing a value of this field.
    pub fn unit_suffix(&self) -> &'static str {
        match self {
            StreamField::SampleRate => "Hz",
            StreamField::Channels => " channels",
        }
    }
}

impl fmt::Display for StreamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamField::SampleRate => write!(f, "Sample rate"),
            StreamField::Channels => write!(f, "Channel count"),
        }
    }
}

/// Outcome of comparing one input against the reference profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatCheck {
    /// The input matches the reference profile exactly.
    Compatible,
    /// The input differs in one field; the first differing field wins.
    Mismatch {
        field: StreamField,
        expected: u32,
        actual: u32,
    },
}

/// Sample rate and channel profile established by the first probed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    /// Sample rate every input must match, in hertz.
    pub sample_rate_hz: u32,
    /// Channel count every input must match.
    pub channels: u32,
}

impl ReferenceProfile {
    /// Snapshot the reference fields of the first probed input.
    pub fn from_info(info: &AudioInfo) -> Self {
        Self {
            sample_rate_hz: info.sample_rate_hz,
            channels: info.channels,
        }
    }

    /// Compare a later input field-by-field against this profile.
    ///
    /// Exact equality only; there is no tolerance and no resampling
    /// fallback. Sample rate is checked before channel count, so an input
    /// that differs in both reports the sample rate.
    pub fn check(&self, info: &AudioInfo) -> CompatCheck {
        if info.sample_rate_hz != self.sample_rate_hz {
            return CompatCheck::Mismatch {
                field: StreamField::SampleRate,
                expected: self.sample_rate_hz,
                actual: info.sample_rate_hz,
            };
        }

        if info.channels != self.channels {
            return CompatCheck::Mismatch {
                field: StreamField::Channels,
                expected: self.channels,
                actual: info.channels,
            };
        }

        CompatCheck::Compatible
    }
}
