//! Import tests for Markdown format (Markdown → tree)
//!
//! Trees are compared as JSON values so the expected shapes read like the mdast they model.

use super::{checked_states, parse};
use insta::assert_snapshot;
use serde_json::{json, Value};
use tasklist_babel::format::Format;
use tasklist_babel::formats::markdown::MarkdownFormat;
use tasklist_babel::{parse_from_markdown, Checked, Node, ParseOptions};

fn to_value(node: &Node) -> Value {
    serde_json::to_value(node).expect("tree to serialize")
}

/// A bullet list with one item holding `children`.
fn single_item(checked: Option<bool>, spread: bool, children: Value) -> Value {
    let mut item = json!({"type": "listItem", "spread": spread, "children": children});
    if let Some(checked) = checked {
        item["checked"] = json!(checked);
    }
    json!({
        "type": "root",
        "children": [{
            "type": "list",
            "ordered": false,
            "start": null,
            "spread": false,
            "children": [item]
        }]
    })
}

fn text_paragraph(value: &str) -> Value {
    json!({"type": "paragraph", "children": [{"type": "text", "value": value}]})
}

#[test]
fn test_task_list_item_with_positions() {
    let tree = parse_from_markdown("* [x] a", &ParseOptions::default()).unwrap();
    let point = |line: usize, column: usize, offset: usize| {
        json!({"line": line, "column": column, "offset": offset})
    };
    let span = |start: Value, end: Value| json!({"start": start, "end": end});
    let whole = span(point(1, 1, 0), point(1, 8, 7));
    let content = span(point(1, 7, 6), point(1, 8, 7));

    assert_eq!(
        to_value(&tree),
        json!({
            "type": "root",
            "children": [{
                "type": "list",
                "ordered": false,
                "start": null,
                "spread": false,
                "children": [{
                    "type": "listItem",
                    "spread": false,
                    "checked": true,
                    "children": [{
                        "type": "paragraph",
                        "children": [{"type": "text", "value": "a", "position": content}],
                        "position": content
                    }],
                    "position": whole
                }],
                "position": whole
            }],
            "position": whole
        })
    );
}

#[test]
fn test_unchecked_item() {
    assert_eq!(
        to_value(&parse("* [ ] a")),
        single_item(Some(false), false, json!([text_paragraph("a")]))
    );
}

#[test]
fn test_uppercase_x_is_checked() {
    assert_eq!(checked_states(&parse("- [X] a")), vec![Checked::Checked]);
}

#[test]
fn test_task_list_item_after_blank_line() {
    assert_eq!(
        to_value(&parse("*\n  [x] after a blank line")),
        single_item(Some(true), false, json!([text_paragraph("after a blank line")]))
    );
}

#[test]
fn test_task_list_item_followed_by_tab() {
    assert_eq!(
        to_value(&parse("* [x]\ttab")),
        single_item(Some(true), false, json!([text_paragraph("tab")]))
    );
}

#[test]
fn test_tab_and_space_give_the_same_text() {
    assert_eq!(parse("* [x]\ttab"), parse("* [x] tab"));
}

#[test]
fn test_task_list_item_after_definition() {
    assert_eq!(
        to_value(&parse("* [x]: definition\n  [x] tasklist")),
        single_item(
            Some(true),
            false,
            json!([
                {
                    "type": "definition",
                    "identifier": "x",
                    "label": "x",
                    "title": null,
                    "url": "definition"
                },
                text_paragraph("tasklist")
            ])
        )
    );
}

#[test]
fn test_no_task_list_item_outside_list() {
    assert_eq!(
        to_value(&parse("[x] tasklist")),
        json!({"type": "root", "children": [text_paragraph("[x] tasklist")]})
    );
}

#[test]
fn test_text_construct_after_checkbox() {
    assert_eq!(
        to_value(&parse("* [x] *b*")),
        single_item(
            Some(true),
            false,
            json!([{
                "type": "paragraph",
                "children": [{"type": "emphasis", "children": [{"type": "text", "value": "b"}]}]
            }])
        )
    );
}

#[test]
fn test_further_paragraphs_after_checkbox() {
    assert_eq!(
        to_value(&parse("* [x] a\n\n  b")),
        single_item(
            Some(true),
            true,
            json!([text_paragraph("a"), text_paragraph("b")])
        )
    );
}

#[test]
fn test_only_first_paragraph_is_trimmed() {
    assert_eq!(
        to_value(&parse("* [ ] a\n\n  bc")),
        single_item(
            Some(false),
            true,
            json!([text_paragraph("a"), text_paragraph("bc")])
        )
    );
}

#[test]
fn test_spread_task_list() {
    let tree = parse("* [x] a\n\n* [ ] b\n");
    let Node::Root(root) = &tree else {
        panic!("Expected root");
    };
    let Node::List(list) = &root.children[0] else {
        panic!("Expected list");
    };
    assert_eq!(list.spread, Some(true));
    assert_eq!(
        checked_states(&tree),
        vec![Checked::Checked, Checked::Unchecked]
    );
    assert_eq!(tree.to_plain_text(), "ab");
}

#[test]
fn test_checkbox_without_content_is_text() {
    assert_eq!(checked_states(&parse("* [x]")), vec![Checked::Unset]);
    assert_eq!(checked_states(&parse("* [x]a")), vec![Checked::Unset]);
}

#[test]
fn test_checkbox_in_later_paragraph_is_text() {
    assert_eq!(
        to_value(&parse("* a\n\n  [x] b")),
        single_item(None, true, json!([text_paragraph("a"), text_paragraph("[x] b")]))
    );
}

#[test]
fn test_only_first_checkbox_counts() {
    assert_eq!(
        to_value(&parse("* [x] [ ] a")),
        single_item(Some(true), false, json!([text_paragraph("[ ] a")]))
    );
}

#[test]
fn test_mixed_list() {
    let tree = parse("1. [x] one\n2. two\n3. [ ] three\n");
    assert_eq!(
        checked_states(&tree),
        vec![Checked::Checked, Checked::Unset, Checked::Unchecked]
    );
}

#[test]
fn test_nested_task_lists() {
    let tree = parse("* [x] a\n  * [ ] b\n  * c\n* d\n");
    assert_eq!(
        checked_states(&tree),
        vec![
            Checked::Checked,
            Checked::Unchecked,
            Checked::Unset,
            Checked::Unset
        ]
    );
}

#[test]
fn test_disabled_task_list_items() {
    let options = ParseOptions {
        gfm_task_list_items: false,
    };
    let tree = parse_from_markdown("* [x] a", &options)
        .unwrap()
        .without_positions();
    assert_eq!(
        to_value(&tree),
        single_item(None, false, json!([text_paragraph("[x] a")]))
    );
}

#[test]
fn test_json_snapshot_through_format() {
    let tree = MarkdownFormat::default()
        .parse("- [ ] write tests\n- [x] ship\n")
        .unwrap()
        .without_positions();
    let json = serde_json::to_string_pretty(&tree).unwrap();
    assert_snapshot!(json, @r#"
    {
      "type": "root",
      "children": [
        {
          "type": "list",
          "ordered": false,
          "start": null,
          "spread": false,
          "children": [
            {
              "type": "listItem",
              "checked": false,
              "spread": false,
              "children": [
                {
                  "type": "paragraph",
                  "children": [
                    {
                      "type": "text",
                      "value": "write tests"
                    }
                  ]
                }
              ]
            },
            {
              "type": "listItem",
              "checked": true,
              "spread": false,
              "children": [
                {
                  "type": "paragraph",
                  "children": [
                    {
                      "type": "text",
                      "value": "ship"
                    }
                  ]
                }
              ]
            }
          ]
        }
      ]
    }
    "#);
}
