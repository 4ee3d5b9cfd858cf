//! Decode a raw segment into ordered `KEYWORD=elapsed` tokens.

use super::action::RawToken;
use super::error::ParseError;

/// Split a comma-separated segment into tokens, preserving order.
///
/// An empty segment yields no tokens.
pub fn decode_segment(segment: &str) -> Result<Vec<RawToken>, ParseError> {
    if segment.trim().is_empty() {
        return Ok(Vec::new());
    }
    segment.split(',').map(decode_fragment).collect()
}

fn decode_fragment(fragment: &str) -> Result<RawToken, ParseError> {
    let fragment = fragment.trim();
    let malformed = |keyword: &str| ParseError::MalformedToken {
        keyword: keyword.to_string(),
        fragment: fragment.to_string(),
    };

    let mut parts = fragment.split('=');
    let (Some(keyword), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        let keyword = fragment.split('=').next().unwrap_or_default();
        return Err(malformed(keyword));
    };

    let elapsed = parse_elapsed(value).ok_or_else(|| malformed(keyword))?;
    Ok(RawToken::new(keyword, elapsed))
}

/// Decimal or `0x`-prefixed hexadecimal, never negative.
fn parse_elapsed(value: &str) -> Option<i64> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u64>().ok()?,
    };
    i64::try_from(parsed).ok()
}
