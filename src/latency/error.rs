//! ExtLatency parse errors
//!
//! **`ParseError`** is a typed enum that can be pattern-matched and tested.
//! Use `.into()` to convert to `anyhow::Error` while preserving the type; the
//! binary recovers it with `downcast_ref` for styled display.

use crate::styling::{ERROR, ERROR_BOLD, ERROR_EMOJI, HINT, HINT_EMOJI};

/// Longest excerpt of an offending line kept in a `FormatMismatch` error.
const MAX_LINE_EXCERPT: usize = 80;

/// Reasons a line cannot be turned into a latency tree.
///
/// # Usage
///
/// ```ignore
/// match extlatency::latency::parse_line(line, &descriptions, &options) {
///     Err(ParseError::UnbalancedProcessingRules { index }) => { /* ... */ }
///     other => { /* ... */ }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line matches neither the single-trace nor the dual-trace shape
    #[error("line is not an ExtLatency log: {line}")]
    FormatMismatch { line: String },

    /// A fragment is not `KEYWORD=integer`
    #[error("malformed token '{fragment}' for keyword '{keyword}'")]
    MalformedToken { keyword: String, fragment: String },

    /// First/last keyword is not the transaction start/end marker
    #[error("log does not start with TS and end with TC")]
    MissingTransactionBounds {
        first: Option<String>,
        last: Option<String>,
    },

    /// A transaction boundary appears inside the transaction
    #[error("log contains more than one transaction, {keyword} found at index {index}")]
    MultipleTransactions { keyword: String, index: usize },

    /// PS/PC do not balance
    #[error("unbalanced processing rules at index {index}")]
    UnbalancedProcessingRules { index: usize },

    /// Processing rules nest deeper than the configured limit
    #[error("processing rules nested deeper than {limit} at index {index}")]
    NestingTooDeep { index: usize, limit: usize },
}

impl ParseError {
    pub(crate) fn format_mismatch(line: &str) -> Self {
        let line = line.trim();
        let line = match line.char_indices().nth(MAX_LINE_EXCERPT) {
            Some((cut, _)) => format!("{}...", &line[..cut]),
            None => line.to_string(),
        };
        ParseError::FormatMismatch { line }
    }

    /// Returns the styled error message with emoji, colors and a hint.
    pub fn styled(&self) -> String {
        match self {
            ParseError::FormatMismatch { line } => {
                format!(
                    "{ERROR_EMOJI} {ERROR}Not an ExtLatency log line: {ERROR_BOLD}{line}{ERROR_BOLD:#}{ERROR:#}\n\n{HINT_EMOJI} {HINT}Expected 'ExtLatency: KEY=n,... [url]' or 'ExtLatency: KEY=n,... == KEY=n,... [url]'{HINT:#}"
                )
            }

            ParseError::MalformedToken { keyword, fragment } => {
                format!(
                    "{ERROR_EMOJI} {ERROR}Malformed token {ERROR_BOLD}{fragment}{ERROR_BOLD:#}{ERROR} for keyword {ERROR_BOLD}{keyword}{ERROR_BOLD:#}{ERROR:#}\n\n{HINT_EMOJI} {HINT}Tokens must be KEYWORD=integer (decimal or 0x-prefixed hex){HINT:#}"
                )
            }

            ParseError::MissingTransactionBounds { first, last } => {
                let first = first.as_deref().unwrap_or("nothing");
                let last = last.as_deref().unwrap_or("nothing");
                format!(
                    "{ERROR_EMOJI} {ERROR}Log does not start with TS and end with TC{ERROR:#}\n\n{HINT_EMOJI} {HINT}Found {first} at the start and {last} at the end{HINT:#}"
                )
            }

            ParseError::MultipleTransactions { keyword, index } => {
                format!(
                    "{ERROR_EMOJI} {ERROR}Log contains more than one transaction: {ERROR_BOLD}{keyword}{ERROR_BOLD:#}{ERROR} found at index {index}{ERROR:#}\n\n{HINT_EMOJI} {HINT}Split the log so each line holds a single TS...TC transaction{HINT:#}"
                )
            }

            ParseError::UnbalancedProcessingRules { index } => {
                format!(
                    "{ERROR_EMOJI} {ERROR}Unbalanced processing rules at index {index}{ERROR:#}\n\n{HINT_EMOJI} {HINT}Every PS must be closed by a PC within the same side of the transaction{HINT:#}"
                )
            }

            ParseError::NestingTooDeep { index, limit } => {
                format!(
                    "{ERROR_EMOJI} {ERROR}Processing rules nest deeper than {limit} at index {index}{ERROR:#}\n\n{HINT_EMOJI} {HINT}Raise max-depth in the config file if this nesting is expected{HINT:#}"
                )
            }
        }
    }
}
