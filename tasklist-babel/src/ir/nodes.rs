//! Core data structures for the markdown syntax tree.
//!
//! The shape follows mdast: every node is tagged with its `type` when serialized, containers
//! hold `children`, and every node may carry a source `position`.

use serde::{Deserialize, Serialize};

/// A single node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Root(Root),
    List(List),
    ListItem(ListItem),
    Paragraph(Paragraph),
    Definition(Definition),
    Text(Text),
    Emphasis(Emphasis),
    Strong(Strong),
    InlineCode(InlineCode),
}

/// Discriminant of a [`Node`], used where only the shape matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    List,
    ListItem,
    Paragraph,
    Definition,
    Text,
    Emphasis,
    Strong,
    InlineCode,
}

/// The root of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// An ordered or unordered list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    /// First number of an ordered list; `None` for bullet lists.
    #[serde(default)]
    pub start: Option<u32>,
    /// Whether blank lines separate the items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<bool>,
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// One entry of a [`List`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Task state. Unset means the item is not a task item.
    #[serde(default, skip_serializing_if = "Checked::is_unset")]
    pub checked: Checked,
    /// Whether blank lines separate the children. The parser always sets this; hand-built
    /// trees may leave it unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<bool>,
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Tri-state task marker of a list item.
///
/// Serialized as JSON `true`, `false`, or an absent field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Checked {
    #[default]
    Unset,
    Checked,
    Unchecked,
}

impl Checked {
    pub fn is_unset(&self) -> bool {
        matches!(self, Checked::Unset)
    }

    /// The boolean view: `Some(true)` for checked, `Some(false)` for unchecked.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Checked::Unset => None,
            Checked::Checked => Some(true),
            Checked::Unchecked => Some(false),
        }
    }
}

impl From<bool> for Checked {
    fn from(value: bool) -> Self {
        if value {
            Checked::Checked
        } else {
            Checked::Unchecked
        }
    }
}

impl From<Option<bool>> for Checked {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Checked::Unset, Checked::from)
    }
}

impl From<Checked> for Option<bool> {
    fn from(value: Checked) -> Self {
        value.as_bool()
    }
}

/// A paragraph of inline content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// A link reference definition: `[label]: url "title"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Normalized label used for matching (case-folded, whitespace collapsed).
    pub identifier: String,
    /// The label as written.
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Literal text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emphasis {
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Strong {
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineCode {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// A span in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

/// A place in the source document.
///
/// `line` and `column` are 1-based; `column` counts characters. `offset` is a 0-based byte
/// offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Point {
            line,
            column,
            offset,
        }
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::List(_) => NodeKind::List,
            Node::ListItem(_) => NodeKind::ListItem,
            Node::Paragraph(_) => NodeKind::Paragraph,
            Node::Definition(_) => NodeKind::Definition,
            Node::Text(_) => NodeKind::Text,
            Node::Emphasis(_) => NodeKind::Emphasis,
            Node::Strong(_) => NodeKind::Strong,
            Node::InlineCode(_) => NodeKind::InlineCode,
        }
    }

    /// Children of a container node; `None` for leaves.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Root(n) => Some(&n.children),
            Node::List(n) => Some(&n.children),
            Node::ListItem(n) => Some(&n.children),
            Node::Paragraph(n) => Some(&n.children),
            Node::Emphasis(n) => Some(&n.children),
            Node::Strong(n) => Some(&n.children),
            Node::Definition(_) | Node::Text(_) | Node::InlineCode(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(n) => Some(&mut n.children),
            Node::List(n) => Some(&mut n.children),
            Node::ListItem(n) => Some(&mut n.children),
            Node::Paragraph(n) => Some(&mut n.children),
            Node::Emphasis(n) => Some(&mut n.children),
            Node::Strong(n) => Some(&mut n.children),
            Node::Definition(_) | Node::Text(_) | Node::InlineCode(_) => None,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            Node::Root(n) => n.position.as_ref(),
            Node::List(n) => n.position.as_ref(),
            Node::ListItem(n) => n.position.as_ref(),
            Node::Paragraph(n) => n.position.as_ref(),
            Node::Definition(n) => n.position.as_ref(),
            Node::Text(n) => n.position.as_ref(),
            Node::Emphasis(n) => n.position.as_ref(),
            Node::Strong(n) => n.position.as_ref(),
            Node::InlineCode(n) => n.position.as_ref(),
        }
    }

    pub fn position_mut(&mut self) -> &mut Option<Position> {
        match self {
            Node::Root(n) => &mut n.position,
            Node::List(n) => &mut n.position,
            Node::ListItem(n) => &mut n.position,
            Node::Paragraph(n) => &mut n.position,
            Node::Definition(n) => &mut n.position,
            Node::Text(n) => &mut n.position,
            Node::Emphasis(n) => &mut n.position,
            Node::Strong(n) => &mut n.position,
            Node::InlineCode(n) => &mut n.position,
        }
    }

    /// Drop every `position` in this subtree.
    ///
    /// Useful to compare parsed trees against hand-built ones.
    pub fn strip_positions(&mut self) {
        *self.position_mut() = None;
        if let Some(children) = self.children_mut() {
            for child in children {
                child.strip_positions();
            }
        }
    }

    /// Owned variant of [`Node::strip_positions`].
    pub fn without_positions(mut self) -> Self {
        self.strip_positions();
        self
    }

    /// Concatenated text of this subtree (text and inline code values).
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        collect_plain_text(self, &mut out);
        out
    }
}

fn collect_plain_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::InlineCode(code) => out.push_str(&code.value),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_plain_text(child, out);
                }
            }
        }
    }
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Text {
            value: value.into(),
            position: None,
        }
    }
}

impl Paragraph {
    /// A paragraph holding a single text node.
    pub fn with_text(value: impl Into<String>) -> Self {
        Paragraph {
            children: vec![Node::Text(Text::new(value))],
            position: None,
        }
    }
}
