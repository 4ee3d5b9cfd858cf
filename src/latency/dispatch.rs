//! Classify a raw log line as single-trace or dual-trace ExtLatency output.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::error::ParseError;

/// `ExtLatency: <front> == <back>[url]`. Checked first: a dual-trace line also
/// matches the single-trace pattern.
static DUAL_TRACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:ExtLatency: )(.*)(?: == )(.*)\[(.*)\]$").expect("valid dual-trace regex")
});

/// `ExtLatency: <segment>[url]`
static SINGLE_TRACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:ExtLatency: )(.*)\[(.*)\]$").expect("valid single-trace regex")
});

/// Which of the two ExtLatency shapes a line has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TraceLayout {
    /// One segment spanning the whole transaction
    SingleTrace,
    /// Front side and back side segments separated by ` == `
    DualTrace,
}

/// The raw segments of a classified line, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segments<'a> {
    Single {
        segment: &'a str,
        url: &'a str,
    },
    Dual {
        front: &'a str,
        back: &'a str,
        url: &'a str,
    },
}

impl<'a> Segments<'a> {
    pub fn layout(&self) -> TraceLayout {
        match self {
            Segments::Single { .. } => TraceLayout::SingleTrace,
            Segments::Dual { .. } => TraceLayout::DualTrace,
        }
    }

    pub fn url(&self) -> &'a str {
        match self {
            Segments::Single { url, .. } | Segments::Dual { url, .. } => url,
        }
    }
}

/// Split an ExtLatency line into its segments.
///
/// Text before `ExtLatency: ` (syslog prefixes and the like) is ignored, as is
/// trailing whitespace. Segments are trimmed of surrounding commas and
/// whitespace.
pub fn classify(line: &str) -> Result<Segments<'_>, ParseError> {
    let trimmed = line.trim_end();

    if let Some(caps) = DUAL_TRACE.captures(trimmed) {
        return Ok(Segments::Dual {
            front: trim_segment(caps.get(1).map_or("", |m| m.as_str())),
            back: trim_segment(caps.get(2).map_or("", |m| m.as_str())),
            url: caps.get(3).map_or("", |m| m.as_str()),
        });
    }

    if let Some(caps) = SINGLE_TRACE.captures(trimmed) {
        return Ok(Segments::Single {
            segment: trim_segment(caps.get(1).map_or("", |m| m.as_str())),
            url: caps.get(2).map_or("", |m| m.as_str()),
        });
    }

    Err(ParseError::format_mismatch(line))
}

fn trim_segment(segment: &str) -> &str {
    segment.trim_matches(|c: char| c == ',' || c.is_whitespace())
}
