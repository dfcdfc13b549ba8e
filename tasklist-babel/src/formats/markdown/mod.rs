//! Markdown format implementation
//!
//! Bidirectional conversion between Markdown text and the syntax tree, with GFM task list
//! items enabled by default.
//!
//! # Supported Syntax
//!
//! | Construct          | Markdown                  | Tree                                 |
//! |--------------------|---------------------------|--------------------------------------|
//! | Paragraph          | lines of text             | `paragraph`                          |
//! | Bullet list        | `*`, `-`, `+`             | `list` (`ordered: false`)            |
//! | Ordered list       | `1.`, `1)`                | `list` (`ordered: true`, `start`)    |
//! | Task list item     | `* [x] a`, `* [ ] a`      | `listItem` with `checked`            |
//! | Definition         | `[label]: url "title"`    | `definition`                         |
//! | Emphasis / strong  | `*a*` `_a_` / `**a**`     | `emphasis` / `strong`                |
//! | Code               | `` `a` ``                 | `inlineCode`                         |
//! | Escapes            | `\*`                      | literal text                         |
//!
//! Everything else is read as paragraph text.
//!
//! # Normalization
//!
//! Serialization is not byte-preserving:
//! - bullets become the configured bullet (`*` by default), alternating for adjacent lists
//! - checkboxes become `[x] ` or `[ ] ` (`[X]` is written as `[x]`)
//! - emphasis is written with `*`, strong with `**`
//! - item content is re-indented according to `list_item_indent`
//!
//! # Extra Parameters
//!
//! `serialize_with_options` accepts `bullet`, `bullet-ordered`, `list-item-indent`
//! (`one`, `tab`, `mixed`), `increment-list-marker` and `gfm-task-list-items`.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::{parse_bool_flag, Format};
use crate::ir::nodes::Node;
use parser::ParseOptions;
use serializer::{ListItemIndent, SerializeOptions};
use std::collections::HashMap;

/// Format implementation for Markdown
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormat {
    parse_options: ParseOptions,
    serialize_options: SerializeOptions,
}

impl MarkdownFormat {
    pub fn new(parse_options: ParseOptions, serialize_options: SerializeOptions) -> Self {
        MarkdownFormat {
            parse_options,
            serialize_options,
        }
    }

    fn options_with_extras(
        &self,
        extras: &HashMap<String, String>,
    ) -> Result<SerializeOptions, FormatError> {
        let mut options = self.serialize_options.clone();
        for (key, value) in extras {
            match key.as_str() {
                "bullet" => {
                    options.bullet = single_char(key, value, &['*', '-', '+'])?;
                }
                "bullet-ordered" => {
                    options.bullet_ordered = single_char(key, value, &['.', ')'])?;
                }
                "list-item-indent" => {
                    options.list_item_indent = match value.as_str() {
                        "one" => ListItemIndent::One,
                        "tab" => ListItemIndent::Tab,
                        "mixed" => ListItemIndent::Mixed,
                        other => {
                            return Err(FormatError::SerializationError(format!(
                                "Invalid value '{other}' for --extra-{key} (expected one, tab or mixed)"
                            )))
                        }
                    };
                }
                "increment-list-marker" => {
                    options.increment_list_marker =
                        parse_bool_flag(extras, key, options.increment_list_marker)?;
                }
                "gfm-task-list-items" => {
                    options.gfm_task_list_items =
                        parse_bool_flag(extras, key, options.gfm_task_list_items)?;
                }
                other => {
                    return Err(FormatError::NotSupported(format!(
                        "Format 'markdown' does not support extra parameter '{other}'"
                    )))
                }
            }
        }
        Ok(options)
    }
}

fn single_char(key: &str, value: &str, allowed: &[char]) -> Result<char, FormatError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if allowed.contains(&ch) => Ok(ch),
        _ => Err(FormatError::SerializationError(format!(
            "Invalid value '{value}' for --extra-{key} (expected one of {})",
            allowed.iter().collect::<String>()
        ))),
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark subset with GFM task list items"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        parser::parse_from_markdown(source, &self.parse_options)
    }

    fn serialize(&self, node: &Node) -> Result<String, FormatError> {
        serializer::serialize_to_markdown(node, &self.serialize_options)
    }

    fn serialize_with_options(
        &self,
        node: &Node,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let options = self.options_with_extras(options)?;
        serializer::serialize_to_markdown(node, &options)
    }
}
