//! Action types shared by every stage of the pipeline.

use serde::Serialize;

/// Keyword that opens a transaction.
pub const TRANSACTION_START: &str = "TS";
/// Keyword that closes a transaction.
pub const TRANSACTION_END: &str = "TC";
/// Keyword that opens a processing rule.
pub const RULE_START: &str = "PS";
/// Keyword that closes a processing rule.
pub const RULE_END: &str = "PC";

/// Keyword of the synthesized root node.
pub const TRANSACTION_NODE: &str = "Transaction";
/// Keyword of the synthesized front side node (dual-trace only).
pub const FRONT_SIDE_NODE: &str = "Front Side Processing";
/// Keyword of the synthesized back side node (dual-trace only).
pub const BACK_SIDE_NODE: &str = "Back Side Processing";
/// Keyword of a synthesized processing rule node.
pub const PROCESSING_RULE_NODE: &str = "Processing Rule";

/// A decoded `KEYWORD=elapsed` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub keyword: String,
    /// Cumulative time since the trace started.
    pub elapsed: i64,
}

impl RawToken {
    pub fn new(keyword: impl Into<String>, elapsed: i64) -> Self {
        Self {
            keyword: keyword.into(),
            elapsed,
        }
    }
}

/// A node of the latency tree.
///
/// Leaves are decoded tokens; interior nodes are synthesized by the nesting
/// engine (transaction, front/back side, processing rules). Both share this
/// shape so consumers can walk the tree uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedAction {
    pub keyword: String,
    /// Cumulative time when the action (or span) ended.
    pub elapsed: i64,
    pub description: String,
    /// Time attributed to this action. Negative when the input was not monotonic.
    pub duration: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AnnotatedAction>,
    /// Set on nodes built by the nesting engine, never on decoded tokens
    #[serde(skip)]
    synthesized: bool,
}

impl AnnotatedAction {
    /// A leaf built from a decoded token.
    pub fn leaf(token: RawToken, description: impl Into<String>, duration: i64) -> Self {
        Self {
            keyword: token.keyword,
            elapsed: token.elapsed,
            description: description.into(),
            duration,
            children: Vec::new(),
            synthesized: false,
        }
    }

    /// A synthesized node covering a span that ends at `elapsed`.
    pub fn span(
        keyword: &str,
        description: &str,
        elapsed: i64,
        duration: i64,
        children: Vec<AnnotatedAction>,
    ) -> Self {
        Self {
            keyword: keyword.to_string(),
            elapsed,
            description: description.to_string(),
            duration,
            children,
            synthesized: true,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Nodes created by the nesting engine rather than decoded from input.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub fn is_processing_rule(&self) -> bool {
        self.synthesized && self.keyword == PROCESSING_RULE_NODE
    }

    pub(crate) fn is_transaction_boundary(&self) -> bool {
        self.keyword == TRANSACTION_START || self.keyword == TRANSACTION_END
    }

    /// Visit every node depth-first, parents before children.
    ///
    /// The callback receives the node's depth (root is 0).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a AnnotatedAction, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a AnnotatedAction, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }
}
