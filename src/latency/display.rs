//! Display formatting for latency trees and analyses.

use std::fmt::Write as _;

use super::LatencyRecord;
use super::action::AnnotatedAction;
use super::analyze::LatencyAnalysis;
use crate::styling::{DIM, SPAN, StyledLine};

/// One rendered tree node before column alignment.
struct Row<'a> {
    name: StyledLine,
    duration: i64,
    description: &'a str,
}

/// Render the tree, one node per line, with aligned duration and
/// description columns.
///
/// With `styled` set, synthesized nodes and descriptions carry ANSI styles;
/// print through `anstream` so they are dropped when unsupported.
pub fn render_tree(record: &LatencyRecord, styled: bool) -> String {
    let mut rows = vec![row(&record.root, String::new())];
    collect_rows(&record.root, "", &mut rows);

    let name_width = rows.iter().map(|r| r.name.width()).max().unwrap_or(0);
    let duration_width = rows
        .iter()
        .map(|r| r.duration.to_string().len())
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    writeln!(out, "{} [{}]", record.layout, record.url).unwrap();

    for Row {
        mut name,
        duration,
        description,
    } in rows
    {
        name.pad_to(name_width);
        name.push_raw(format!("  {duration:>duration_width$}"));
        if !description.is_empty() {
            name.push_raw("  ");
            name.push_styled(description, DIM);
        }
        let line = if styled { name.render() } else { name.plain() };
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn row(node: &AnnotatedAction, connector: String) -> Row<'_> {
    let mut name = StyledLine::new();
    if !connector.is_empty() {
        name.push_styled(connector, DIM);
    }
    if node.is_synthesized() {
        name.push_styled(node.keyword.as_str(), SPAN);
    } else {
        name.push_raw(node.keyword.as_str());
    }
    Row {
        name,
        duration: node.duration,
        description: &node.description,
    }
}

/// Rows for `node`'s descendants; `prefix` is the indentation of its children.
fn collect_rows<'a>(node: &'a AnnotatedAction, prefix: &str, rows: &mut Vec<Row<'a>>) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let (connector, continuation) = if i + 1 == count {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        rows.push(row(child, format!("{prefix}{connector}")));
        collect_rows(child, &format!("{prefix}{continuation}"), rows);
    }
}

/// Render the complete analysis to a string.
pub fn render_summary(analysis: &LatencyAnalysis) -> String {
    let mut out = String::new();

    render_header(&mut out, analysis);
    render_keyword_breakdown(&mut out, analysis);
    render_slowest(&mut out, analysis);

    out
}

fn render_header(out: &mut String, analysis: &LatencyAnalysis) {
    out.push_str("============================================================\n");
    out.push_str("                 EXTLATENCY ANALYSIS\n");
    out.push_str("============================================================\n");
    writeln!(out, "Layout:    {}", analysis.layout).unwrap();
    writeln!(out, "URL:       {}", analysis.url).unwrap();
    writeln!(out, "Total:     {}", analysis.total_duration).unwrap();
    writeln!(
        out,
        "Actions:   {} in {} processing rules (max depth {})",
        analysis.leaf_count, analysis.rule_count, analysis.max_rule_depth
    )
    .unwrap();
}

fn render_keyword_breakdown(out: &mut String, analysis: &LatencyAnalysis) {
    out.push_str("\nKEYWORD BREAKDOWN\n");
    out.push_str("-----------------\n");
    writeln!(
        out,
        "{:<10} {:>6} {:>7} {:>7} {:>8}  {}",
        "Keyword", "Count", "Total", "Max", "% Total", "Description"
    )
    .unwrap();
    writeln!(
        out,
        "{:<10} {:>6} {:>7} {:>7} {:>8}  {}",
        "----------", "------", "-------", "-------", "--------", "-----------"
    )
    .unwrap();

    let transaction = analysis.total_duration as f64;
    for stat in &analysis.keyword_stats {
        let percent = if transaction > 0.0 {
            stat.total as f64 / transaction * 100.0
        } else {
            0.0
        };
        let line = format!(
            "{:<10} {:>6} {:>7} {:>7} {:>7.1}%  {}",
            truncate(&stat.keyword, 10),
            stat.count,
            stat.total,
            stat.max,
            percent,
            stat.description
        );
        writeln!(out, "{}", line.trim_end()).unwrap();
    }
}

fn render_slowest(out: &mut String, analysis: &LatencyAnalysis) {
    out.push_str("\nTOP 10 SLOWEST ACTIONS\n");
    out.push_str("----------------------\n");

    for action in &analysis.slowest_actions {
        writeln!(
            out,
            "{:>7}  {:<10} {}",
            action.duration,
            truncate(&action.keyword, 10),
            truncate(&action.path.join(" > "), 60)
        )
        .unwrap();
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
