//! Export tests for Markdown format (tree → Markdown)

use insta::assert_snapshot;
use std::collections::HashMap;
use tasklist_babel::format::Format;
use tasklist_babel::formats::markdown::serializer::to_markdown;
use tasklist_babel::formats::markdown::MarkdownFormat;
use tasklist_babel::ir::nodes::{Definition, List, ListItem, Paragraph, Root, Text};
use tasklist_babel::{
    parse_from_markdown, serialize_to_markdown, Checked, ListItemIndent, Node, ParseOptions,
    SerializeOptions,
};

fn paragraph(value: &str) -> Node {
    Node::Paragraph(Paragraph {
        children: vec![Node::Text(Text {
            value: value.to_string(),
            position: None,
        })],
        position: None,
    })
}

fn definition(label: &str, url: &str) -> Node {
    Node::Definition(Definition {
        identifier: label.to_lowercase(),
        label: label.to_string(),
        url: url.to_string(),
        title: None,
        position: None,
    })
}

fn item(checked: Checked, children: Vec<Node>) -> Node {
    Node::ListItem(ListItem {
        checked,
        spread: None,
        children,
        position: None,
    })
}

fn tab_indent() -> SerializeOptions {
    SerializeOptions {
        list_item_indent: ListItemIndent::Tab,
        ..SerializeOptions::default()
    }
}

fn md(node: &Node) -> String {
    serialize_to_markdown(node, &SerializeOptions::default()).expect("tree to serialize")
}

#[test]
fn test_serialize_checked_item() {
    let node = item(Checked::Checked, vec![paragraph("a")]);
    assert_eq!(serialize_to_markdown(&node, &tab_indent()).unwrap(), "*   [x] a\n");
}

#[test]
fn test_serialize_unchecked_item() {
    let node = item(Checked::Unchecked, vec![paragraph("b")]);
    assert_eq!(serialize_to_markdown(&node, &tab_indent()).unwrap(), "*   [ ] b\n");
}

#[test]
fn test_checkbox_outside_list_renders_as_text() {
    let tree = parse_from_markdown("[x] tasklist", &ParseOptions::default()).unwrap();
    assert_eq!(md(&tree), "[x] tasklist\n");
}

#[test]
fn test_serialize_normal_item() {
    let node = item(Checked::Unset, vec![paragraph("c")]);
    assert_eq!(serialize_to_markdown(&node, &tab_indent()).unwrap(), "*   c\n");
}

#[test]
fn test_checked_ignored_when_head_is_not_a_paragraph() {
    let node = item(
        Checked::Checked,
        vec![definition("d", "definition"), paragraph("e")],
    );
    assert_eq!(
        serialize_to_markdown(&node, &tab_indent()).unwrap(),
        "*   [d]: definition\n\n    e\n"
    );
    assert_eq!(md(&node), "* [d]: definition\n\n  e\n");
}

#[test]
fn test_emit_does_not_mutate_the_tree() {
    let node = item(Checked::Checked, vec![paragraph("a"), paragraph("b")]);
    let before = node.clone();
    md(&node);
    assert_eq!(node, before);
}

#[test]
fn test_extension_is_required_for_checkboxes() {
    let node = item(Checked::Checked, vec![paragraph("a")]);
    assert_eq!(
        to_markdown(&node, &SerializeOptions::default(), &[]).unwrap(),
        "* a\n"
    );

    let options = SerializeOptions {
        gfm_task_list_items: false,
        ..SerializeOptions::default()
    };
    assert_eq!(serialize_to_markdown(&node, &options).unwrap(), "* a\n");
}

#[test]
fn test_checkbox_alignment_in_spread_list() {
    let list = Node::List(List {
        ordered: false,
        start: None,
        spread: Some(true),
        children: vec![
            Node::ListItem(ListItem {
                checked: Checked::Checked,
                spread: Some(true),
                children: vec![paragraph("first\nline"), paragraph("second")],
                position: None,
            }),
            Node::ListItem(ListItem {
                checked: Checked::Unchecked,
                spread: Some(false),
                children: vec![paragraph("other")],
                position: None,
            }),
        ],
        position: None,
    });
    let root = Node::Root(Root {
        children: vec![list],
        position: None,
    });

    assert_snapshot!(md(&root), @r"
    * [x] first
          line

      second

    * [ ] other
    ");
}

#[test]
fn test_normalizes_source_spelling() {
    let source = "- [X] done\n-  [ ]\ttodo\n- plain\n";
    let tree = parse_from_markdown(source, &ParseOptions::default()).unwrap();
    assert_snapshot!(md(&tree), @r"
    * [x] done
    * [ ] todo
    * plain
    ");
}

#[test]
fn test_format_extras() {
    let tree = parse_from_markdown("1. [x] a\n2. [ ] b\n", &ParseOptions::default()).unwrap();
    let mut extras = HashMap::new();
    extras.insert("bullet-ordered".to_string(), ")".to_string());
    extras.insert("list-item-indent".to_string(), "tab".to_string());

    let out = MarkdownFormat::default()
        .serialize_with_options(&tree, &extras)
        .unwrap();
    assert_eq!(out, "1)  [x] a\n2)  [ ] b\n");
}
