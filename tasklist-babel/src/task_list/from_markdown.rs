use crate::common::flat_to_nested::{FromMarkdownExtension, Hook, ParseContext};
use crate::ir::events::{Token, TokenType};
use crate::ir::nodes::{Checked, Node, Position};
use tracing::{debug, trace};

/// Tree builder hooks for task list checkboxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListItemFromMarkdown;

impl FromMarkdownExtension for TaskListItemFromMarkdown {
    fn exit(&self, ctx: &mut ParseContext<'_>, token: &Token) -> Hook {
        match token.kind {
            kind if kind.is_task_list_check_value() => {
                exit_check(ctx, kind);
                Hook::Handled
            }
            TokenType::Paragraph => {
                exit_paragraph_with_task_list_item(ctx);
                Hook::Continue
            }
            _ => Hook::Continue,
        }
    }
}

/// The checkbox sits in the item's paragraph, so the item is one level up.
fn exit_check(ctx: &mut ParseContext<'_>, kind: TokenType) {
    let checked = Checked::from(kind == TokenType::TaskListCheckValueChecked);
    match ctx.enclosing_list_item_mut() {
        Some(item) => {
            item.checked = checked;
            debug!(?checked, "recorded task list item state");
        }
        None => trace!("checkbox value outside a list item"),
    }
}

fn exit_paragraph_with_task_list_item(ctx: &mut ParseContext<'_>) {
    let first_paragraph_of_task = match ctx.enclosing_list_item() {
        Some(item) => {
            !item.checked.is_unset()
                && !item
                    .children
                    .iter()
                    .any(|child| matches!(child, Node::Paragraph(_)))
        }
        None => false,
    };
    if !first_paragraph_of_task {
        return;
    }

    let Some(Node::Paragraph(paragraph)) = ctx.current_mut() else {
        return;
    };
    let Some(Node::Text(head)) = paragraph.children.first_mut() else {
        trace!("task list paragraph does not start with text");
        return;
    };
    let Some(separator) = head.value.chars().next() else {
        return;
    };

    head.value.drain(..separator.len_utf8());
    trace!(?separator, "trimmed task list separator");

    if head.value.is_empty() {
        paragraph.children.remove(0);
    } else if let Some(position) = head.position.as_mut() {
        position.start.column += 1;
        position.start.offset += separator.len_utf8();
    }

    // The paragraph now starts where its content starts.
    let start = paragraph
        .children
        .first()
        .and_then(Node::position)
        .map(|position: &Position| position.start);
    if let (Some(start), Some(position)) = (start, paragraph.position.as_mut()) {
        position.start = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::flat_to_nested::events_to_tree;
    use crate::ir::nodes::{ListItem, Point};
    use crate::tokenizer::{tokenize, TokenizeOptions};

    fn parse(source: &str) -> Node {
        let events = tokenize(source, TokenizeOptions::default());
        events_to_tree(source, &events, &[&TaskListItemFromMarkdown]).unwrap()
    }

    fn first_item(tree: &Node) -> &ListItem {
        match tree.children().and_then(|children| children.first()) {
            Some(Node::List(list)) => match list.children.first() {
                Some(Node::ListItem(item)) => item,
                other => panic!("Expected list item, got {other:?}"),
            },
            other => panic!("Expected list, got {other:?}"),
        }
    }

    #[test]
    fn records_checked_and_unchecked() {
        let tree = parse("* [x] a\n* [ ] b");
        let Some(Node::List(list)) = tree.children().and_then(|c| c.first()) else {
            panic!("Expected list");
        };
        let states: Vec<Checked> = list
            .children
            .iter()
            .map(|child| match child {
                Node::ListItem(item) => item.checked,
                _ => Checked::Unset,
            })
            .collect();
        assert_eq!(states, vec![Checked::Checked, Checked::Unchecked]);
    }

    #[test]
    fn trims_separator_and_moves_positions() {
        let tree = parse("* [x] a");
        let item = first_item(&tree);
        let Node::Paragraph(paragraph) = &item.children[0] else {
            panic!("Expected paragraph");
        };
        assert_eq!(paragraph.children[0].to_plain_text(), "a");

        let text = paragraph.children[0].position().copied().unwrap();
        assert_eq!(text.start, Point::new(1, 7, 6));
        assert_eq!(text.end, Point::new(1, 8, 7));
        let position = paragraph.position.unwrap();
        assert_eq!(position.start, Point::new(1, 7, 6));
        assert_eq!(position.end, Point::new(1, 8, 7));
    }

    #[test]
    fn removes_text_emptied_by_trim() {
        let tree = parse("* [x] *b*");
        let item = first_item(&tree);
        let Node::Paragraph(paragraph) = &item.children[0] else {
            panic!("Expected paragraph");
        };
        assert_eq!(paragraph.children.len(), 1);
        assert!(matches!(paragraph.children[0], Node::Emphasis(_)));
        let position = paragraph.position.unwrap();
        assert_eq!(position.start, Point::new(1, 7, 6));
    }

    #[test]
    fn trims_tab_separator() {
        let tree = parse("* [x]\ttab");
        assert_eq!(first_item(&tree).children[0].to_plain_text(), "tab");
    }

    #[test]
    fn only_first_paragraph_is_trimmed() {
        let tree = parse("* [x] a\n\n  b");
        let item = first_item(&tree);
        assert_eq!(item.children[0].to_plain_text(), "a");
        assert_eq!(item.children[1].to_plain_text(), "b");
    }

    #[test]
    fn checkbox_outside_list_item_is_text() {
        let tree = parse("[x] tasklist");
        assert_eq!(tree.to_plain_text(), "[x] tasklist");
    }

    #[test]
    fn plain_items_keep_their_text() {
        let tree = parse("* a");
        let item = first_item(&tree);
        assert_eq!(item.checked, Checked::Unset);
        assert_eq!(item.children[0].to_plain_text(), "a");
    }
}
