use crate::error::FormatError;
use crate::formats::markdown::serializer::{indent_lines, State, ToMarkdownExtension};
use crate::ir::nodes::{Checked, List, ListItem, Node};
use tracing::{debug, trace};

/// Serializer hook that writes task list checkboxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskListItemToMarkdown;

impl ToMarkdownExtension for TaskListItemToMarkdown {
    fn list_item(
        &self,
        node: &ListItem,
        parent: Option<&List>,
        index: usize,
        state: &State<'_>,
    ) -> Result<Option<String>, FormatError> {
        let marker = match node.checked {
            Checked::Checked => "[x] ",
            Checked::Unchecked => "[ ] ",
            Checked::Unset => return Ok(None),
        };
        let Some(Node::Paragraph(head)) = node.children.first() else {
            trace!("task list item does not start with a paragraph");
            return Ok(None);
        };

        let head_value = state.container_phrasing(&head.children)?;
        if head_value.trim().is_empty() {
            // `* [ ]` alone does not read back as a checkbox
            trace!("task list item has an empty head paragraph");
            return Ok(None);
        }

        let prefix = state.list_item_prefix(node, parent, index);
        let head_lines = head_value.split('\n').count();
        let flow = state.container_flow(&node.children, node.spread)?;

        let first = prefix.first_line();
        let head_indent = " ".repeat(prefix.size + marker.len());
        let rest_indent = " ".repeat(prefix.size);
        let value = indent_lines(&flow, |line, line_index, blank| {
            if line_index == 0 {
                format!("{first}{marker}{line}")
            } else if blank {
                String::new()
            } else if line_index < head_lines {
                format!("{head_indent}{line}")
            } else {
                // Blocks after the head paragraph stay at the content column; at the marker
                // column they would read back as indented code.
                format!("{rest_indent}{line}")
            }
        });

        debug!(checked = ?node.checked, "rendered task list item");
        Ok(Some(value))
    }
}
