//! Nest a flat action sequence into a transaction tree.
//!
//! Two reserved keyword pairs carry the structure: `TS`/`TC` delimit the
//! transaction and `PS`/`PC` delimit (possibly nested) processing rules.
//! Grouping never reorders actions, it only nests them, so sibling order
//! always equals input order.
//!
//! Every index reported in an error is the absolute position of the action in
//! the sequence handed to the engine (for dual-trace lines, the concatenation
//! of front and back side).

use super::action::{
    AnnotatedAction, BACK_SIDE_NODE, FRONT_SIDE_NODE, PROCESSING_RULE_NODE, RULE_END, RULE_START,
    TRANSACTION_END, TRANSACTION_NODE, TRANSACTION_START,
};
use super::error::ParseError;
use crate::config::Labels;

/// Default limit on processing rule nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Highest nesting limit accepted. Rendering, analysis and serialization walk
/// the tree recursively, so deeper trees could exhaust the stack.
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// Builds trees from annotated action sequences.
#[derive(Debug, Clone)]
pub struct NestingEngine<'a> {
    labels: &'a Labels,
    max_depth: usize,
}

impl<'a> NestingEngine<'a> {
    /// `max_depth` above [`MAX_DEPTH_LIMIT`] is lowered to it.
    pub fn new(labels: &'a Labels, max_depth: usize) -> Self {
        Self {
            labels,
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
        }
    }

    /// Wrap a single-trace sequence (`TS ... TC`) in a transaction node.
    pub fn nest_single(
        &self,
        mut actions: Vec<AnnotatedAction>,
    ) -> Result<AnnotatedAction, ParseError> {
        let (start, end) = match (actions.first(), actions.last()) {
            (Some(first), Some(last))
                if actions.len() >= 2
                    && first.keyword == TRANSACTION_START
                    && last.keyword == TRANSACTION_END =>
            {
                (first.elapsed, last.elapsed)
            }
            _ => return Err(missing_bounds(&actions, &actions)),
        };

        let end_index = actions.len() - 1;
        let interior: Vec<_> = actions.drain(1..end_index).collect();
        ensure_single_transaction(&interior, 1)?;

        let children = self.group_rules(interior, 1)?;
        Ok(AnnotatedAction::span(
            TRANSACTION_NODE,
            &self.labels.transaction,
            end,
            end - start,
            children,
        ))
    }

    /// Wrap front side (`TS ...`) and back side (`... TC`) sequences in one
    /// transaction node with a child per side.
    pub fn nest_dual(
        &self,
        front: Vec<AnnotatedAction>,
        mut back: Vec<AnnotatedAction>,
    ) -> Result<AnnotatedAction, ParseError> {
        let (start, end) = match (front.first(), back.last()) {
            (Some(first), Some(last))
                if first.keyword == TRANSACTION_START && last.keyword == TRANSACTION_END =>
            {
                (first.elapsed, last.elapsed)
            }
            _ => return Err(missing_bounds(&front, &back)),
        };

        // The front side ends where its last action (possibly TS itself) ends
        let front_end = front.last().map_or(start, |action| action.elapsed);
        let back_offset = front.len();

        let front_interior: Vec<_> = front.into_iter().skip(1).collect();
        back.pop();
        let back_interior = back;
        ensure_single_transaction(&front_interior, 1)?;
        ensure_single_transaction(&back_interior, back_offset)?;

        let front_side = AnnotatedAction::span(
            FRONT_SIDE_NODE,
            &self.labels.front_side,
            front_end,
            front_end - start,
            self.group_rules(front_interior, 1)?,
        );
        let back_side = AnnotatedAction::span(
            BACK_SIDE_NODE,
            &self.labels.back_side,
            end,
            end - front_end,
            self.group_rules(back_interior, back_offset)?,
        );

        Ok(AnnotatedAction::span(
            TRANSACTION_NODE,
            &self.labels.transaction,
            end,
            end - start,
            vec![front_side, back_side],
        ))
    }

    /// Group `PS ... PC` spans into processing rule nodes, nesting inner spans
    /// inside outer ones.
    ///
    /// `offset` is the absolute index of `actions[0]`, used for error reporting.
    /// A sequence without rule boundaries is returned unchanged.
    pub fn group_rules(
        &self,
        actions: Vec<AnnotatedAction>,
        offset: usize,
    ) -> Result<Vec<AnnotatedAction>, ParseError> {
        let mut top = Vec::new();
        // Spans still waiting for their PC, outermost first
        let mut open: Vec<OpenRule> = Vec::new();

        for (i, action) in actions.into_iter().enumerate() {
            let index = offset + i;
            if action.keyword == RULE_START {
                if open.len() + 1 > self.max_depth {
                    return Err(ParseError::NestingTooDeep {
                        index,
                        limit: self.max_depth,
                    });
                }
                open.push(OpenRule {
                    index,
                    start: action.elapsed,
                    children: Vec::new(),
                });
            } else if action.keyword == RULE_END {
                let Some(rule) = open.pop() else {
                    return Err(ParseError::UnbalancedProcessingRules { index });
                };
                let node = AnnotatedAction::span(
                    PROCESSING_RULE_NODE,
                    &self.labels.processing_rule,
                    action.elapsed,
                    action.elapsed - rule.start,
                    rule.children,
                );
                open.last_mut().map_or(&mut top, |parent| &mut parent.children).push(node);
            } else {
                open.last_mut().map_or(&mut top, |parent| &mut parent.children).push(action);
            }
        }

        if let Some(outermost) = open.first() {
            return Err(ParseError::UnbalancedProcessingRules {
                index: outermost.index,
            });
        }
        Ok(top)
    }
}

/// A `PS` whose `PC` has not been seen yet.
struct OpenRule {
    /// Absolute index of the `PS`
    index: usize,
    start: i64,
    children: Vec<AnnotatedAction>,
}

fn missing_bounds(front: &[AnnotatedAction], back: &[AnnotatedAction]) -> ParseError {
    ParseError::MissingTransactionBounds {
        first: front.first().map(|a| a.keyword.clone()),
        last: back.last().map(|a| a.keyword.clone()),
    }
}

fn ensure_single_transaction(actions: &[AnnotatedAction], offset: usize) -> Result<(), ParseError> {
    match actions
        .iter()
        .position(AnnotatedAction::is_transaction_boundary)
    {
        Some(i) => Err(ParseError::MultipleTransactions {
            keyword: actions[i].keyword.clone(),
            index: offset + i,
        }),
        None => Ok(()),
    }
}
