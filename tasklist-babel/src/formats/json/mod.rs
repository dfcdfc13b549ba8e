//! JSON tree format
//!
//! The syntax tree as mdast-shaped JSON: every node has a `type`, containers have `children`,
//! list items have `checked` only when they are task items.
//!
//! ## Example
//!
//! ```text
//! {"type":"root","children":[{"type":"list","ordered":false,"start":null,"spread":false,
//!  "children":[{"type":"listItem","checked":true,"spread":false,"children":[...]}]}]}
//! ```
//!
//! ## Extra Parameters
//!
//! - `pretty`: indent the output (default `true`)
//! - `positions`: include source positions (default `true`)

use crate::error::FormatError;
use crate::format::{parse_bool_flag, Format};
use crate::ir::nodes::Node;
use std::collections::HashMap;

/// Format implementation for the JSON tree
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

fn to_json(node: &Node, pretty: bool, positions: bool) -> Result<String, FormatError> {
    let stripped;
    let node = if positions {
        node
    } else {
        stripped = node.clone().without_positions();
        &stripped
    };
    let result = if pretty {
        serde_json::to_string_pretty(node)
    } else {
        serde_json::to_string(node)
    };
    result
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|e| FormatError::SerializationError(format!("JSON serialization failed: {e}")))
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Syntax tree as JSON"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Node, FormatError> {
        serde_json::from_str(source)
            .map_err(|e| FormatError::ParseError(format!("Invalid JSON tree: {e}")))
    }

    fn serialize(&self, node: &Node) -> Result<String, FormatError> {
        to_json(node, true, true)
    }

    fn serialize_with_options(
        &self,
        node: &Node,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if let Some(key) = options
            .keys()
            .find(|key| !matches!(key.as_str(), "pretty" | "positions"))
        {
            return Err(FormatError::NotSupported(format!(
                "Format 'json' does not support extra parameter '{key}'"
            )));
        }
        let pretty = parse_bool_flag(options, "pretty", true)?;
        let positions = parse_bool_flag(options, "positions", true)?;
        to_json(node, pretty, positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::nodes::{Checked, List, ListItem, Paragraph, Root};

    fn task_tree() -> Node {
        Node::Root(Root {
            children: vec![Node::List(List {
                ordered: false,
                start: None,
                spread: Some(false),
                children: vec![Node::ListItem(ListItem {
                    checked: Checked::Unchecked,
                    spread: Some(false),
                    children: vec![Node::Paragraph(Paragraph::with_text("a"))],
                    position: None,
                })],
                position: None,
            })],
            position: None,
        })
    }

    #[test]
    fn compact_output() {
        let mut options = HashMap::new();
        options.insert("pretty".to_string(), "false".to_string());
        let json = JsonFormat
            .serialize_with_options(&task_tree(), &options)
            .unwrap();
        insta::assert_snapshot!(json.trim_end(), @r#"{"type":"root","children":[{"type":"list","ordered":false,"start":null,"spread":false,"children":[{"type":"listItem","checked":false,"spread":false,"children":[{"type":"paragraph","children":[{"type":"text","value":"a"}]}]}]}]}"#);
    }

    #[test]
    fn parse_reads_serialized_tree() {
        let json = JsonFormat.serialize(&task_tree()).unwrap();
        assert_eq!(JsonFormat.parse(&json).unwrap(), task_tree());
    }

    #[test]
    fn positions_can_be_dropped() {
        let tree = crate::formats::markdown::MarkdownFormat::default()
            .parse("* [x] a\n")
            .unwrap();
        let mut options = HashMap::new();
        options.insert("positions".to_string(), "false".to_string());
        let json = JsonFormat.serialize_with_options(&tree, &options).unwrap();
        assert!(!json.contains("position"));
        assert!(json.contains("\"checked\": true"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            JsonFormat.parse("{"),
            Err(FormatError::ParseError(_))
        ));
    }
}
