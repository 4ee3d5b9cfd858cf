//! Attach descriptions and per-step durations to decoded tokens.

use super::action::{AnnotatedAction, RawToken};
use super::descriptions::DescriptionResolver;

/// Annotate tokens in order.
///
/// Each token's duration is its elapsed time minus the previous token's; the
/// first token's duration is always zero. For dual-trace lines pass the front
/// and back tokens concatenated so the seam is treated as contiguous time.
pub fn annotate(
    tokens: Vec<RawToken>,
    descriptions: &impl DescriptionResolver,
) -> Vec<AnnotatedAction> {
    let mut previous: Option<i64> = None;

    tokens
        .into_iter()
        .enumerate()
        .map(|(index, token)| {
            let duration = match previous {
                Some(prev) => {
                    if token.elapsed < prev {
                        log::debug!(
                            "Elapsed time decreases at index {index} ({} -> {})",
                            prev,
                            token.elapsed
                        );
                    }
                    token.elapsed - prev
                }
                None => 0,
            };
            previous = Some(token.elapsed);

            let description = descriptions
                .describe(&token.keyword)
                .unwrap_or_default()
                .to_string();
            AnnotatedAction::leaf(token, description, duration)
        })
        .collect()
}
