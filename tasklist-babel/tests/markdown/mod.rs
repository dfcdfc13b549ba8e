//! Markdown format tests
//!
//! Task list items through the whole pipeline: Markdown → tree, tree → Markdown, the
//! round-trip between them, and agreement with comrak's tasklist extension.

mod conformance;
mod export;
mod import;
mod round_trip;

use tasklist_babel::{parse_from_markdown, Checked, Node, ParseOptions};

/// Parse with default options and drop positions.
pub(crate) fn parse(md: &str) -> Node {
    parse_from_markdown(md, &ParseOptions::default())
        .expect("markdown to parse")
        .without_positions()
}

/// `checked` of every list item, in document order.
pub(crate) fn checked_states(node: &Node) -> Vec<Checked> {
    let mut states = Vec::new();
    collect_checked(node, &mut states);
    states
}

fn collect_checked(node: &Node, states: &mut Vec<Checked>) {
    if let Node::ListItem(item) = node {
        states.push(item.checked);
    }
    for child in node.children().into_iter().flatten() {
        collect_checked(child, states);
    }
}
