//! Round-trip law: serializing a parsed task list and parsing it again keeps every `checked`
//! state and every paragraph's text.

use super::{checked_states, parse};
use proptest::prelude::*;
use tasklist_babel::ir::nodes::{List, ListItem, Paragraph, Root};
use tasklist_babel::transforms::format_markdown_source;
use tasklist_babel::{serialize_to_markdown, Checked, Node, SerializeOptions};

#[derive(Debug, Clone)]
struct Item {
    checked: Checked,
    upper: bool,
    tab: bool,
    text: String,
}

fn item_strategy() -> impl Strategy<Value = Item> {
    (
        checked_strategy(),
        any::<bool>(),
        any::<bool>(),
        "[a-z]{1,8}( [a-z]{1,8}){0,2}",
    )
        .prop_map(|(checked, upper, tab, text)| Item {
            checked,
            upper,
            tab,
            text,
        })
}

fn checked_strategy() -> impl Strategy<Value = Checked> {
    prop_oneof![
        Just(Checked::Unset),
        Just(Checked::Checked),
        Just(Checked::Unchecked)
    ]
}

/// Item text built from characters the serializer has to escape, often opening with something
/// that looks like a checkbox, a list marker or a definition.
fn tricky_text_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["", "[x] ", "[X] ", "[ ] ", "- ", "+ ", "1. ", "2) ", "[a]: "]),
        r"[a-z0-9\[\]\\*_`.-]{1,6}( [a-z0-9\[\]\\*_`.-]{1,6}){0,2}",
    )
        .prop_map(|(lead, body)| format!("{lead}{body}"))
}

fn tree_of(items: &[(Checked, String)]) -> Node {
    Node::Root(Root {
        children: vec![Node::List(List {
            ordered: false,
            start: None,
            spread: Some(false),
            children: items
                .iter()
                .map(|(checked, text)| {
                    Node::ListItem(ListItem {
                        checked: *checked,
                        spread: Some(false),
                        children: vec![Node::Paragraph(Paragraph::with_text(text.as_str()))],
                        position: None,
                    })
                })
                .collect(),
            position: None,
        })],
        position: None,
    })
}

/// Plain text of every list item, in document order.
fn item_texts(node: &Node) -> Vec<String> {
    let mut texts = Vec::new();
    collect_item_texts(node, &mut texts);
    texts
}

fn collect_item_texts(node: &Node, texts: &mut Vec<String>) {
    if let Node::ListItem(_) = node {
        texts.push(node.to_plain_text());
        return;
    }
    for child in node.children().into_iter().flatten() {
        collect_item_texts(child, texts);
    }
}

fn render(bullet: char, spread: bool, items: &[Item]) -> String {
    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            let checkbox = match (item.checked, item.upper) {
                (Checked::Unset, _) => String::new(),
                (Checked::Checked, true) => "[X]".to_string(),
                (Checked::Checked, false) => "[x]".to_string(),
                (Checked::Unchecked, _) => "[ ]".to_string(),
            };
            let separator = if checkbox.is_empty() {
                ""
            } else if item.tab {
                "\t"
            } else {
                " "
            };
            format!("{bullet} {checkbox}{separator}{}\n", item.text)
        })
        .collect();
    lines.join(if spread { "\n" } else { "" })
}

proptest! {
    #[test]
    fn prop_round_trip_keeps_checked_and_text(
        bullet in prop::sample::select(vec!['*', '-', '+']),
        spread in any::<bool>(),
        items in prop::collection::vec(item_strategy(), 1..6),
    ) {
        let source = render(bullet, spread, &items);
        let tree = parse(&source);

        let expected: Vec<Checked> = items.iter().map(|item| item.checked).collect();
        prop_assert_eq!(checked_states(&tree), expected);
        let text: String = items.iter().map(|item| item.text.as_str()).collect();
        prop_assert_eq!(tree.to_plain_text(), text);

        let formatted = format_markdown_source(&source).unwrap();
        prop_assert_eq!(parse(&formatted), tree);
        prop_assert_eq!(format_markdown_source(&formatted).unwrap(), formatted);
    }

    #[test]
    fn prop_escaped_text_keeps_checked_and_text(
        items in prop::collection::vec((checked_strategy(), tricky_text_strategy()), 1..6),
    ) {
        let tree = tree_of(&items);
        let formatted = serialize_to_markdown(&tree, &SerializeOptions::default()).unwrap();
        let reparsed = parse(&formatted);

        let expected_states: Vec<Checked> = items.iter().map(|(checked, _)| *checked).collect();
        prop_assert_eq!(checked_states(&reparsed), expected_states);
        let expected_texts: Vec<String> = items.iter().map(|(_, text)| text.clone()).collect();
        prop_assert_eq!(item_texts(&reparsed), expected_texts);
        prop_assert_eq!(format_markdown_source(&formatted).unwrap(), formatted);
    }

    #[test]
    fn prop_checkbox_markers_are_canonical(
        items in prop::collection::vec(item_strategy(), 1..6),
    ) {
        let formatted = format_markdown_source(&render('-', false, &items)).unwrap();
        for (line, item) in formatted.lines().zip(&items) {
            let expected = match item.checked {
                Checked::Unset => format!("* {}", item.text),
                Checked::Checked => format!("* [x] {}", item.text),
                Checked::Unchecked => format!("* [ ] {}", item.text),
            };
            prop_assert_eq!(line, expected);
        }
    }
}

#[test]
fn test_blank_line_separated_items_round_trip() {
    let source = "* [x] a\n\n* [ ] b\n\n  c\n";
    let formatted = format_markdown_source(source).unwrap();
    assert_eq!(formatted, source);
    assert_eq!(
        checked_states(&parse(&formatted)),
        vec![Checked::Checked, Checked::Unchecked]
    );
}

#[test]
fn test_escaped_checkbox_stays_plain_item() {
    let source = "* \\[x] a\n";
    let tree = parse(source);
    assert_eq!(checked_states(&tree), vec![Checked::Unset]);

    let formatted = format_markdown_source(source).unwrap();
    assert_eq!(formatted, source);
    assert_eq!(parse(&formatted), tree);
}

#[test]
fn test_escaped_checkbox_after_definition_stays_plain_item() {
    let source = "* [a]: b\n  \\[ ] c\n";
    let tree = parse(source);
    assert_eq!(checked_states(&tree), vec![Checked::Unset]);

    let formatted = format_markdown_source(source).unwrap();
    assert_eq!(checked_states(&parse(&formatted)), vec![Checked::Unset]);
    assert_eq!(parse(&formatted), tree);
}

#[test]
fn test_unset_item_with_checkbox_text_round_trips() {
    let tree = tree_of(&[(Checked::Unset, "[ ] a".to_string())]);
    let formatted = serialize_to_markdown(&tree, &SerializeOptions::default()).unwrap();
    assert_eq!(formatted, "* \\[ ] a\n");
    assert_eq!(checked_states(&parse(&formatted)), vec![Checked::Unset]);
}
