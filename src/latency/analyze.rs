//! Analyze a latency tree to find where the time went.

use indexmap::IndexMap;

use super::LatencyRecord;
use super::action::AnnotatedAction;
use super::dispatch::TraceLayout;

/// Number of entries in the slowest-actions list.
const SLOWEST_COUNT: usize = 10;

/// Summary statistics for one leaf keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordStats {
    pub keyword: String,
    pub description: String,
    pub count: usize,
    pub total: i64,
    pub max: i64,
}

/// A leaf action and where it sits in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlowAction {
    pub duration: i64,
    pub keyword: String,
    pub description: String,
    /// Keywords of the enclosing nodes, root first
    pub path: Vec<String>,
}

/// Complete analysis of one latency record.
#[derive(Debug)]
pub struct LatencyAnalysis {
    pub layout: TraceLayout,
    pub url: String,
    /// Duration of the whole transaction
    pub total_duration: i64,
    pub leaf_count: usize,
    pub rule_count: usize,
    /// Deepest processing rule nesting (0 when there are no rules)
    pub max_rule_depth: usize,
    /// Stats grouped by leaf keyword, highest total first
    pub keyword_stats: Vec<KeywordStats>,
    /// Slowest individual leaf actions
    pub slowest_actions: Vec<SlowAction>,
}

/// Analyze a record and produce a complete summary.
pub fn analyze(record: &LatencyRecord) -> LatencyAnalysis {
    let leaves = collect_leaves(&record.root);
    let (rule_count, max_rule_depth) = count_rules(&record.root, 0);

    LatencyAnalysis {
        layout: record.layout,
        url: record.url.clone(),
        total_duration: record.root.duration,
        leaf_count: leaves.len(),
        rule_count,
        max_rule_depth,
        keyword_stats: compute_keyword_stats(&leaves),
        slowest_actions: compute_slowest(&leaves, SLOWEST_COUNT),
    }
}

/// A decoded action with its ancestors' keywords.
struct Leaf<'a> {
    action: &'a AnnotatedAction,
    path: Vec<&'a str>,
}

/// Leaves in input order. Empty processing rules are not leaves.
fn collect_leaves(root: &AnnotatedAction) -> Vec<Leaf<'_>> {
    fn visit<'a>(node: &'a AnnotatedAction, path: &mut Vec<&'a str>, out: &mut Vec<Leaf<'a>>) {
        path.push(&node.keyword);
        for child in &node.children {
            if child.is_synthesized() {
                visit(child, path, out);
            } else {
                out.push(Leaf {
                    action: child,
                    path: path.clone(),
                });
            }
        }
        path.pop();
    }

    let mut leaves = Vec::new();
    visit(root, &mut Vec::new(), &mut leaves);
    leaves
}

/// Returns (rule count, deepest rule nesting) below `node`.
fn count_rules(node: &AnnotatedAction, depth: usize) -> (usize, usize) {
    node.children
        .iter()
        .filter(|child| child.is_synthesized())
        .fold((0, depth), |(count, deepest), child| {
            let child_depth = depth + usize::from(child.is_processing_rule());
            let (below, below_deepest) = count_rules(child, child_depth);
            (
                count + usize::from(child.is_processing_rule()) + below,
                deepest.max(below_deepest),
            )
        })
}

/// Group leaves by keyword and compute statistics for each group.
fn compute_keyword_stats(leaves: &[Leaf<'_>]) -> Vec<KeywordStats> {
    // IndexMap keeps first-seen order, so equal totals stay in input order
    let mut groups: IndexMap<&str, KeywordStats> = IndexMap::new();

    for leaf in leaves {
        let action = leaf.action;
        let stats = groups
            .entry(action.keyword.as_str())
            .or_insert_with(|| KeywordStats {
                keyword: action.keyword.clone(),
                description: action.description.clone(),
                count: 0,
                total: 0,
                max: action.duration,
            });
        stats.count += 1;
        stats.total += action.duration;
        stats.max = stats.max.max(action.duration);
    }

    let mut stats: Vec<KeywordStats> = groups.into_values().collect();
    stats.sort_by(|a, b| b.total.cmp(&a.total));
    stats
}

/// Get the N slowest leaves; ties keep input order.
fn compute_slowest(leaves: &[Leaf<'_>], n: usize) -> Vec<SlowAction> {
    let mut sorted: Vec<&Leaf<'_>> = leaves.iter().collect();
    sorted.sort_by(|a, b| b.action.duration.cmp(&a.action.duration));
    sorted
        .into_iter()
        .take(n)
        .map(|leaf| SlowAction {
            duration: leaf.action.duration,
            keyword: leaf.action.keyword.clone(),
            description: leaf.action.description.clone(),
            path: leaf.path.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}
