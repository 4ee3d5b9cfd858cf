//! ExtLatency log parsing and latency analysis.
//!
//! Gateways write one `ExtLatency` line per transaction: a comma-separated list
//! of `KEYWORD=elapsed` tokens, optionally split into front side and back side
//! halves by ` == `. This module turns such a line into a tree that mirrors the
//! processing pipeline's nesting, so the time spent in each stage and
//! processing rule is visible at a glance.
//!
//! # Usage
//!
//! ```ignore
//! use extlatency::latency::{self, Descriptions, ParseOptions};
//!
//! let descriptions = Descriptions::builtin();
//! let record = latency::parse_line(line, &descriptions, &ParseOptions::default())?;
//! println!("{}", latency::render_tree(&record, false));
//! ```

pub mod action;
pub mod analyze;
pub mod annotate;
pub mod decode;
pub mod descriptions;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod nest;

use serde::Serialize;

use crate::config::{Labels, LatencyConfig};

// Re-export main types for convenience
pub use action::{AnnotatedAction, RawToken};
pub use analyze::{KeywordStats, LatencyAnalysis, SlowAction, analyze};
pub use descriptions::{DescriptionResolver, Descriptions};
pub use dispatch::{Segments, TraceLayout, classify};
pub use display::{render_summary, render_tree};
pub use error::ParseError;
pub use nest::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT, NestingEngine};

/// Marker every ExtLatency line carries.
pub const EXTLATENCY_MARKER: &str = "ExtLatency:";

/// Knobs for the nesting engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub labels: Labels,
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&LatencyConfig> for ParseOptions {
    fn from(config: &LatencyConfig) -> Self {
        Self {
            labels: config.labels.clone(),
            max_depth: config.max_depth,
        }
    }
}

/// A parsed ExtLatency line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatencyRecord {
    pub layout: TraceLayout,
    /// Request URL from the trailing `[...]`, brackets removed
    pub url: String,
    pub root: AnnotatedAction,
}

/// Parse one line into its transaction tree.
pub fn parse(
    line: &str,
    descriptions: &impl DescriptionResolver,
) -> Result<AnnotatedAction, ParseError> {
    parse_line(line, descriptions, &ParseOptions::default()).map(|record| record.root)
}

/// Parse one line, keeping its layout and URL alongside the tree.
pub fn parse_line(
    line: &str,
    descriptions: &impl DescriptionResolver,
    options: &ParseOptions,
) -> Result<LatencyRecord, ParseError> {
    let segments = classify(line)?;
    let engine = NestingEngine::new(&options.labels, options.max_depth);

    let root = match segments {
        Segments::Single { segment, .. } => {
            let tokens = decode::decode_segment(segment)?;
            engine.nest_single(annotate::annotate(tokens, descriptions))?
        }
        Segments::Dual { front, back, .. } => {
            let mut tokens = decode::decode_segment(front)?;
            let front_len = tokens.len();
            tokens.extend(decode::decode_segment(back)?);

            // Annotate across the seam so the first back side action's
            // duration is relative to the last front side action
            let mut front = annotate::annotate(tokens, descriptions);
            let back = front.split_off(front_len);
            engine.nest_dual(front, back)?
        }
    };

    Ok(LatencyRecord {
        layout: segments.layout(),
        url: segments.url().to_string(),
        root,
    })
}
