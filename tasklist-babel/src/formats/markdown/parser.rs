//! Markdown parsing (Markdown → tree)
//!
//! Pipeline: Markdown string → tokenizer events → tree builder (+ extensions) → tree

use crate::common::flat_to_nested::{events_to_tree, FromMarkdownExtension};
use crate::error::FormatError;
use crate::ir::nodes::Node;
use crate::task_list::TaskListItemFromMarkdown;
use crate::tokenizer::{tokenize, TokenizeOptions};
use tracing::debug;

/// Knobs of the Markdown parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Recognize `[ ]` / `[x]` at the start of list items.
    pub gfm_task_list_items: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            gfm_task_list_items: true,
        }
    }
}

impl From<&ParseOptions> for TokenizeOptions {
    fn from(options: &ParseOptions) -> Self {
        TokenizeOptions {
            gfm_task_list_item: options.gfm_task_list_items,
        }
    }
}

/// Parse a Markdown string into a tree rooted at [`Node::Root`].
pub fn parse_from_markdown(source: &str, options: &ParseOptions) -> Result<Node, FormatError> {
    // Step 1: Markdown string → events
    let events = tokenize(source, options.into());
    debug!(events = events.len(), "tokenized markdown");

    // Step 2: events → tree
    let task_list_item = TaskListItemFromMarkdown;
    let mut extensions: Vec<&dyn FromMarkdownExtension> = Vec::new();
    if options.gfm_task_list_items {
        extensions.push(&task_list_item);
    }
    let tree = events_to_tree(source, &events, &extensions)?;
    Ok(tree)
}
