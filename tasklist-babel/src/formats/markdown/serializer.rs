//! Markdown serialization (tree → Markdown)
//!
//! A handler per node kind renders the node to a string; containers join their rendered
//! children. Block children are joined by [`State::container_flow`], inline children by
//! [`State::container_phrasing`]. List items re-indent their content with [`indent_lines`].
//!
//! Extensions implement [`ToMarkdownExtension`] and are asked first when a list item is
//! rendered; returning `Ok(None)` falls back to the default renderer.

use crate::error::FormatError;
use crate::ir::nodes::*;
use serde::Deserialize;

/// How list item content is indented relative to the bullet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListItemIndent {
    /// Content starts one space after the bullet.
    #[default]
    One,
    /// Content starts at the next tab stop (multiple of four).
    Tab,
    /// `tab` for spread lists and items, `one` otherwise.
    Mixed,
}

/// Knobs of the Markdown serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Bullet of unordered lists: `*`, `-` or `+`.
    pub bullet: char,
    /// Delimiter after the number of ordered list items: `.` or `)`.
    pub bullet_ordered: char,
    pub list_item_indent: ListItemIndent,
    /// Number ordered items `start`, `start + 1`, ... instead of repeating `start`.
    pub increment_list_marker: bool,
    /// Render the `checked` state of list items as `[x]` / `[ ]`.
    pub gfm_task_list_items: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            bullet: '*',
            bullet_ordered: '.',
            list_item_indent: ListItemIndent::One,
            increment_list_marker: true,
            gfm_task_list_items: true,
        }
    }
}

/// Hooks a syntax extension registers with the serializer.
pub trait ToMarkdownExtension {
    /// Render a list item, or `Ok(None)` to use the default renderer.
    fn list_item(
        &self,
        _node: &ListItem,
        _parent: Option<&List>,
        _index: usize,
        _state: &State<'_>,
    ) -> Result<Option<String>, FormatError> {
        Ok(None)
    }
}

/// The bullet of a list item and the width of its content indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemPrefix {
    pub bullet: String,
    pub size: usize,
}

impl ListItemPrefix {
    /// The first-line prefix: bullet plus padding up to the content column.
    pub fn first_line(&self) -> String {
        let padding = self.size.saturating_sub(self.bullet.len());
        format!("{}{}", self.bullet, " ".repeat(padding))
    }
}

/// Serializer state handed to handlers and extensions.
pub struct State<'a> {
    pub options: &'a SerializeOptions,
    extensions: &'a [&'a dyn ToMarkdownExtension],
}

impl<'a> State<'a> {
    pub fn new(
        options: &'a SerializeOptions,
        extensions: &'a [&'a dyn ToMarkdownExtension],
    ) -> Self {
        State {
            options,
            extensions,
        }
    }

    /// Render a block node.
    ///
    /// `parent` is the list containing `node` when `node` is a list item, and `index` its
    /// position there. `other_bullet` asks lists to use the alternative bullet, which keeps
    /// adjacent lists apart.
    fn block(
        &self,
        node: &Node,
        parent: Option<&List>,
        index: usize,
        other_bullet: bool,
    ) -> Result<String, FormatError> {
        match node {
            Node::Paragraph(paragraph) => self.container_phrasing(&paragraph.children),
            Node::List(list) => self.list(list, other_bullet),
            Node::ListItem(item) => self.list_item(item, parent, index),
            Node::Definition(definition) => Ok(definition_to_markdown(definition)),
            Node::Root(_) => Err(FormatError::SerializationError(
                "Root node cannot be nested".to_string(),
            )),
            Node::Text(_) | Node::Emphasis(_) | Node::Strong(_) | Node::InlineCode(_) => {
                Err(FormatError::SerializationError(format!(
                    "Inline node {:?} cannot appear in block content",
                    node.kind()
                )))
            }
        }
    }

    /// Render block children separated by line endings.
    ///
    /// `spread` is the parent's `spread` field; `None` for containers without one.
    pub fn container_flow(
        &self,
        children: &[Node],
        spread: Option<bool>,
    ) -> Result<String, FormatError> {
        self.flow(children, spread, false)
    }

    /// Render the children of a list item written without a checkbox.
    ///
    /// Like [`State::container_flow`], but the item's first paragraph (definitions may come
    /// before it) never starts with text that reads back as a checkbox.
    pub fn list_item_flow(
        &self,
        children: &[Node],
        spread: Option<bool>,
    ) -> Result<String, FormatError> {
        self.flow(children, spread, true)
    }

    fn flow(
        &self,
        children: &[Node],
        spread: Option<bool>,
        item_head: bool,
    ) -> Result<String, FormatError> {
        let mut out = String::new();
        for (index, child) in children.iter().enumerate() {
            let previous = index.checked_sub(1).and_then(|i| children.get(i));
            let other_bullet = matches!(
                (previous, child),
                (Some(Node::List(left)), Node::List(right)) if left.ordered == right.ordered
            );
            let mut value = self.block(child, None, index, other_bullet)?;
            let head_paragraph = item_head
                && matches!(child, Node::Paragraph(_))
                && children[..index]
                    .iter()
                    .all(|node| matches!(node, Node::Definition(_)));
            if head_paragraph {
                value = escape_checkbox(&value);
            }
            if let Some(previous) = previous {
                out.push_str(&"\n".repeat(1 + blank_lines_between(previous, child, spread)));
            }
            out.push_str(&value);
        }
        Ok(out)
    }

    /// Render inline children.
    pub fn container_phrasing(&self, children: &[Node]) -> Result<String, FormatError> {
        let mut out = String::new();
        for child in children {
            let at_break = out.is_empty() || out.ends_with('\n');
            out.push_str(&self.inline(child, at_break)?);
        }
        Ok(out)
    }

    fn inline(&self, node: &Node, at_break: bool) -> Result<String, FormatError> {
        match node {
            Node::Text(text) => Ok(escape(&text.value, at_break)),
            Node::Emphasis(emphasis) => Ok(format!(
                "*{}*",
                self.container_phrasing(&emphasis.children)?
            )),
            Node::Strong(strong) => Ok(format!(
                "**{}**",
                self.container_phrasing(&strong.children)?
            )),
            Node::InlineCode(code) => Ok(inline_code_to_markdown(&code.value)),
            other => Err(FormatError::SerializationError(format!(
                "Block node {:?} cannot appear in inline content",
                other.kind()
            ))),
        }
    }

    fn list(&self, list: &List, other_bullet: bool) -> Result<String, FormatError> {
        let mut out = String::new();
        for (index, child) in list.children.iter().enumerate() {
            let Node::ListItem(item) = child else {
                return Err(FormatError::SerializationError(format!(
                    "List children must be list items, found {:?}",
                    child.kind()
                )));
            };
            if index > 0 {
                let blank = usize::from(list.spread.unwrap_or(true));
                out.push_str(&"\n".repeat(1 + blank));
            }
            let value = if other_bullet {
                let options = self.options_with_other_bullet();
                let state = State {
                    options: &options,
                    extensions: self.extensions,
                };
                state.list_item(item, Some(list), index)?
            } else {
                self.list_item(item, Some(list), index)?
            };
            out.push_str(&value);
        }
        Ok(out)
    }

    fn options_with_other_bullet(&self) -> SerializeOptions {
        let bullet = if self.options.bullet == '*' { '-' } else { '*' };
        let bullet_ordered = if self.options.bullet_ordered == '.' {
            ')'
        } else {
            '.'
        };
        SerializeOptions {
            bullet,
            bullet_ordered,
            ..self.options.clone()
        }
    }

    fn list_item(
        &self,
        node: &ListItem,
        parent: Option<&List>,
        index: usize,
    ) -> Result<String, FormatError> {
        for extension in self.extensions {
            if let Some(value) = extension.list_item(node, parent, index, self)? {
                return Ok(value);
            }
        }
        list_item_to_markdown(node, parent, index, self)
    }

    /// Bullet and content width of a list item.
    pub fn list_item_prefix(
        &self,
        node: &ListItem,
        parent: Option<&List>,
        index: usize,
    ) -> ListItemPrefix {
        let bullet = match parent {
            Some(list) if list.ordered => {
                let start = list.start.unwrap_or(1) as usize;
                let number = if self.options.increment_list_marker {
                    start + index
                } else {
                    start
                };
                format!("{number}{}", self.options.bullet_ordered)
            }
            _ => self.options.bullet.to_string(),
        };

        let mut size = bullet.len() + 1;
        let spread = parent.and_then(|list| list.spread) == Some(true) || node.spread == Some(true);
        let round = match self.options.list_item_indent {
            ListItemIndent::One => false,
            ListItemIndent::Tab => true,
            ListItemIndent::Mixed => spread,
        };
        if round {
            size = size.div_ceil(4) * 4;
        }
        ListItemPrefix { bullet, size }
    }
}

/// Default list item renderer.
pub fn list_item_to_markdown(
    node: &ListItem,
    parent: Option<&List>,
    index: usize,
    state: &State<'_>,
) -> Result<String, FormatError> {
    let prefix = state.list_item_prefix(node, parent, index);
    let flow = state.list_item_flow(&node.children, node.spread)?;
    let first = prefix.first_line();
    let rest = " ".repeat(prefix.size);
    Ok(indent_lines(&flow, |line, index, blank| match (index, blank) {
        (0, true) => prefix.bullet.clone(),
        (0, false) => format!("{first}{line}"),
        (_, true) => String::new(),
        (_, false) => format!("{rest}{line}"),
    }))
}

/// Rewrite every line of `value` through `map(line, index, blank)`.
pub fn indent_lines<F>(value: &str, mut map: F) -> String
where
    F: FnMut(&str, usize, bool) -> String,
{
    value
        .split('\n')
        .enumerate()
        .map(|(index, line)| map(line, index, line.trim().is_empty()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Blank lines between two adjacent block siblings.
fn blank_lines_between(left: &Node, right: &Node, spread: Option<bool>) -> usize {
    match spread {
        Some(spread) => {
            let paragraph_follows_paragraph = matches!(left, Node::Paragraph(_))
                && matches!(right, Node::Paragraph(_) | Node::Definition(_));
            if paragraph_follows_paragraph {
                1
            } else {
                usize::from(spread)
            }
        }
        None => 1,
    }
}

fn definition_to_markdown(definition: &Definition) -> String {
    let label = if definition.label.is_empty() {
        &definition.identifier
    } else {
        &definition.label
    };
    let url = if definition.url.is_empty() || definition.url.contains(char::is_whitespace) {
        format!("<{}>", definition.url)
    } else {
        definition.url.clone()
    };
    let mut out = format!("[{label}]: {url}");
    if let Some(title) = &definition.title {
        let (open, close) = if !title.contains('"') {
            ('"', '"')
        } else if !title.contains('\'') {
            ('\'', '\'')
        } else {
            ('(', ')')
        };
        out.push_str(&format!(" {open}{title}{close}"));
    }
    out
}

fn inline_code_to_markdown(value: &str) -> String {
    let value = value.replace('\n', " ");
    let mut longest = 0;
    let mut run = 0;
    for ch in value.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest + 1);
    let pad = value.starts_with('`')
        || value.ends_with('`')
        || (value.starts_with(' ') && value.ends_with(' ') && !value.trim().is_empty());
    if pad {
        format!("{fence} {value} {fence}")
    } else {
        format!("{fence}{value}{fence}")
    }
}

/// Escape text so it reads back as the same text.
///
/// `at_break` tells whether the text starts at the beginning of a line.
fn escape(value: &str, at_break: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for (index, line) in value.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let line_start = index > 0 || at_break;
        let mut escaped = String::with_capacity(line.len());
        for ch in line.chars() {
            if matches!(ch, '\\' | '*' | '_' | '`') {
                escaped.push('\\');
            }
            escaped.push(ch);
        }
        if line_start {
            escaped = escape_line_start(&escaped);
        }
        out.push_str(&escaped);
    }
    out
}

/// Escape constructs that only have meaning at the start of a line.
fn escape_line_start(line: &str) -> String {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - trimmed.len()];
    let bytes = trimmed.as_bytes();

    let ends_marker = |at: usize| matches!(bytes.get(at), None | Some(b' ' | b'\t'));

    if matches!(bytes.first(), Some(b'-' | b'+')) && ends_marker(1) {
        return format!("{indent}\\{trimmed}");
    }

    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if (1..=9).contains(&digits) && matches!(bytes.get(digits), Some(b'.' | b')')) && ends_marker(digits + 1) {
        return format!("{indent}{}\\{}", &trimmed[..digits], &trimmed[digits..]);
    }

    if bytes.first() == Some(&b'[') && trimmed.contains("]:") {
        return format!("{indent}\\{trimmed}");
    }

    line.to_string()
}

/// Escape a leading `[ ]`, `[x]` or `[X]` followed by a space or tab.
fn escape_checkbox(value: &str) -> String {
    let trimmed = value.trim_start_matches([' ', '\t']);
    let indent = &value[..value.len() - trimmed.len()];
    let bytes = trimmed.as_bytes();
    let checkbox = bytes.first() == Some(&b'[')
        && matches!(bytes.get(1), Some(b' ' | b'x' | b'X'))
        && bytes.get(2) == Some(&b']')
        && matches!(bytes.get(3), Some(b' ' | b'\t'));
    if checkbox {
        format!("{indent}\\{trimmed}")
    } else {
        value.to_string()
    }
}

/// Serialize a tree to Markdown with the given extensions.
///
/// Non-empty output ends with exactly one newline.
pub fn to_markdown(
    node: &Node,
    options: &SerializeOptions,
    extensions: &[&dyn ToMarkdownExtension],
) -> Result<String, FormatError> {
    let state = State::new(options, extensions);
    let mut out = match node {
        Node::Root(root) => state.container_flow(&root.children, None)?,
        Node::Text(_) | Node::Emphasis(_) | Node::Strong(_) | Node::InlineCode(_) => {
            state.container_phrasing(std::slice::from_ref(node))?
        }
        other => state.block(other, None, 0, false)?,
    };
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Serialize a tree to Markdown, enabling the extensions the options ask for.
pub fn serialize_to_markdown(
    node: &Node,
    options: &SerializeOptions,
) -> Result<String, FormatError> {
    let task_list_item = crate::task_list::TaskListItemToMarkdown;
    let mut extensions: Vec<&dyn ToMarkdownExtension> = Vec::new();
    if options.gfm_task_list_items {
        extensions.push(&task_list_item);
    }
    to_markdown(node, options, &extensions)
}
