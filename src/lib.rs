pub mod config;
pub mod latency;
pub mod styling;

pub use latency::{AnnotatedAction, LatencyRecord, ParseError, parse, parse_line};
