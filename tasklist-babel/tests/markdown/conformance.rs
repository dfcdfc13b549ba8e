//! Agreement with comrak's tasklist extension on which list items are tasks.

use super::{checked_states, parse};
use comrak::nodes::NodeValue;
use comrak::{parse_document, Arena, ComrakOptions};
use tasklist_babel::Checked;

fn comrak_checked_states(md: &str) -> Vec<Checked> {
    let arena = Arena::new();
    let mut options = ComrakOptions::default();
    options.extension.tasklist = true;
    let root = parse_document(&arena, md, &options);
    root.descendants()
        .filter_map(|node| match &node.data.borrow().value {
            NodeValue::Item(_) => Some(Checked::Unset),
            NodeValue::TaskItem(symbol) => Some(Checked::from(symbol.is_some())),
            _ => None,
        })
        .collect()
}

const CASES: &[&str] = &[
    "* [x] a\n",
    "* [ ] a\n",
    "- [X] a\n",
    "* a\n",
    "* [x] a\n* [ ] b\n* c\n",
    "1. [x] one\n2. two\n3. [ ] three\n",
    "* [x] a\n\n* [ ] b\n",
    "* [x] a\n\n  b\n",
    "* a\n\n  [x] b\n",
    "* [x] a\n  * [ ] b\n  * c\n* d\n",
    "* [x] *b*\n",
    "[x] tasklist\n",
];

#[test]
fn test_checked_states_match_comrak() {
    for case in CASES {
        assert_eq!(
            checked_states(&parse(case)),
            comrak_checked_states(case),
            "checked states differ for {case:?}"
        );
    }
}
