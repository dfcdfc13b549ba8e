//! Converts a flat event stream into a nested syntax tree.
//!
//! # The High-Level Concept
//!
//! The core challenge is to reconstruct a tree structure from a linear sequence of events.
//! The algorithm uses a stack to keep track of the current nesting level. The stack acts as
//! a memory of "open" nodes. When we encounter an `Enter` event for a container token (a list,
//! a paragraph, an emphasis), we push a fresh node onto the stack, making it the new "current"
//! node. When we see the matching `Exit`, we pop it off and append it to its parent.
//!
//! Leaf tokens (data, line endings, definition strings) are handled on `Exit` by writing into
//! the current node. Adjacent text is merged into one text node.
//!
//! # Extensions
//!
//! Syntax extensions plug in through [`FromMarkdownExtension`]. Every event is offered to the
//! extensions first; an extension returning [`Hook::Handled`] replaces the default handling for
//! that event, [`Hook::Continue`] lets it run afterwards. Extensions see the open nodes through
//! [`ParseContext`], which names ancestors instead of exposing raw stack indices.
//!
//! # The Algorithm
//!
//! 1. **Initialization:** push an empty `Root` spanning the whole source.
//! 2. **`Enter` of a container token:** push a new node positioned at the token's span.
//! 3. **`Exit` of a leaf token:** write the token's text or value into the current node.
//! 4. **`Exit` of a container token:** pop the node, check it matches the token, settle
//!    derived fields (`spread`, inline code padding) and append it to the new top.
//! 5. **Completion:** the stack must hold only the root.

use crate::ir::events::{Event, EventKind, LineIndex, Token, TokenType};
use crate::ir::nodes::*;
use thiserror::Error;
use tracing::trace;

/// Error type for event-to-tree conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An exit event with only the root left open
    #[error("Unexpected exit of {0:?}: no open node")]
    UnexpectedExit(TokenType),
    /// Exit event does not close the node on top of the stack
    #[error("Mismatched events: expected {expected:?}, found {found:?}")]
    MismatchedEvents { expected: NodeKind, found: NodeKind },
    /// Inline content where no inline container is open
    #[error("Unexpected inline content in {0:?}")]
    UnexpectedInline(NodeKind),
    /// Stack not empty at end (unclosed nodes)
    #[error("Unclosed nodes: {0} nodes remain on stack")]
    UnclosedNodes(usize),
}

/// What an extension did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Run the next extension, then the default handling.
    Continue,
    /// The event is fully handled.
    Handled,
}

/// Hooks a syntax extension registers with the tree builder.
pub trait FromMarkdownExtension {
    fn enter(&self, _ctx: &mut ParseContext<'_>, _token: &Token) -> Hook {
        Hook::Continue
    }

    fn exit(&self, _ctx: &mut ParseContext<'_>, _token: &Token) -> Hook {
        Hook::Continue
    }
}

/// Tree-building state shared with extensions.
pub struct ParseContext<'s> {
    source: &'s str,
    lines: LineIndex<'s>,
    stack: Vec<Node>,
}

impl<'s> ParseContext<'s> {
    fn new(source: &'s str) -> Self {
        let lines = LineIndex::new(source);
        let root = Node::Root(Root {
            children: Vec::new(),
            position: Some(Position {
                start: lines.point(0),
                end: lines.point(source.len()),
            }),
        });
        ParseContext {
            source,
            lines,
            stack: vec![root],
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn slice(&self, token: &Token) -> &'s str {
        token.slice(self.source)
    }

    pub fn position(&self, token: &Token) -> Position {
        Position {
            start: self.lines.point(token.start),
            end: self.lines.point(token.end),
        }
    }

    /// The innermost open node.
    pub fn current(&self) -> Option<&Node> {
        self.ancestor(0)
    }

    pub fn current_mut(&mut self) -> Option<&mut Node> {
        self.ancestor_mut(0)
    }

    /// The open node `depth` levels above the current one; `ancestor(0)` is the current node.
    pub fn ancestor(&self, depth: usize) -> Option<&Node> {
        let index = self.stack.len().checked_sub(depth + 1)?;
        self.stack.get(index)
    }

    pub fn ancestor_mut(&mut self, depth: usize) -> Option<&mut Node> {
        let index = self.stack.len().checked_sub(depth + 1)?;
        self.stack.get_mut(index)
    }

    /// The list item directly containing the current node.
    pub fn enclosing_list_item(&self) -> Option<&ListItem> {
        match self.ancestor(1)? {
            Node::ListItem(item) => Some(item),
            _ => None,
        }
    }

    pub fn enclosing_list_item_mut(&mut self) -> Option<&mut ListItem> {
        match self.ancestor_mut(1)? {
            Node::ListItem(item) => Some(item),
            _ => None,
        }
    }

    /// The nearest open node of `kind` above the current one.
    pub fn parent_of_kind(&self, kind: NodeKind) -> Option<&Node> {
        self.stack
            .iter()
            .rev()
            .skip(1)
            .find(|node| node.kind() == kind)
    }

    pub fn parent_of_kind_mut(&mut self, kind: NodeKind) -> Option<&mut Node> {
        self.stack
            .iter_mut()
            .rev()
            .skip(1)
            .find(|node| node.kind() == kind)
    }

    fn open(&mut self, node: Node) {
        self.stack.push(node);
    }

    /// Pop the current node, check it is a `kind`, and append it to its parent.
    fn close(&mut self, token: &Token, kind: NodeKind) -> Result<(), BuildError> {
        if self.stack.len() < 2 {
            return Err(BuildError::UnexpectedExit(token.kind));
        }
        let mut node = self
            .stack
            .pop()
            .ok_or(BuildError::UnexpectedExit(token.kind))?;
        if node.kind() != kind {
            return Err(BuildError::MismatchedEvents {
                expected: kind,
                found: node.kind(),
            });
        }

        settle(&mut node);

        let parent = self
            .stack
            .last_mut()
            .ok_or(BuildError::UnexpectedExit(token.kind))?;
        let parent_kind = parent.kind();
        parent
            .children_mut()
            .ok_or(BuildError::UnexpectedInline(parent_kind))?
            .push(node);
        Ok(())
    }

    /// Append text to the current inline container, merging with a trailing text node.
    fn push_text(&mut self, value: &str, position: Position) -> Result<(), BuildError> {
        let current = self
            .stack
            .last_mut()
            .ok_or(BuildError::UnexpectedInline(NodeKind::Root))?;

        if let Node::InlineCode(code) = current {
            code.value.push_str(value);
            return Ok(());
        }

        let kind = current.kind();
        if !matches!(
            kind,
            NodeKind::Paragraph | NodeKind::Emphasis | NodeKind::Strong
        ) {
            return Err(BuildError::UnexpectedInline(kind));
        }
        let children = current
            .children_mut()
            .ok_or(BuildError::UnexpectedInline(kind))?;

        if let Some(Node::Text(text)) = children.last_mut() {
            text.value.push_str(value);
            if let Some(existing) = text.position.as_mut() {
                existing.end = position.end;
            }
        } else {
            children.push(Node::Text(Text {
                value: value.to_string(),
                position: Some(position),
            }));
        }
        Ok(())
    }
}

/// Node kind a container token opens, if any.
fn container_kind(kind: TokenType) -> Option<NodeKind> {
    match kind {
        TokenType::ListUnordered | TokenType::ListOrdered => Some(NodeKind::List),
        TokenType::ListItem => Some(NodeKind::ListItem),
        TokenType::Paragraph => Some(NodeKind::Paragraph),
        TokenType::Definition => Some(NodeKind::Definition),
        TokenType::Emphasis => Some(NodeKind::Emphasis),
        TokenType::Strong => Some(NodeKind::Strong),
        TokenType::CodeText => Some(NodeKind::InlineCode),
        _ => None,
    }
}

/// Build a syntax tree from the events of `source`.
pub fn events_to_tree(
    source: &str,
    events: &[Event],
    extensions: &[&dyn FromMarkdownExtension],
) -> Result<Node, BuildError> {
    let mut ctx = ParseContext::new(source);

    for event in events {
        let token = &event.token;
        let handled = extensions.iter().any(|extension| {
            let hook = match event.kind {
                EventKind::Enter => extension.enter(&mut ctx, token),
                EventKind::Exit => extension.exit(&mut ctx, token),
            };
            hook == Hook::Handled
        });
        if handled {
            continue;
        }

        match event.kind {
            EventKind::Enter => enter(&mut ctx, token),
            EventKind::Exit => exit(&mut ctx, token)?,
        }
    }

    if ctx.stack.len() != 1 {
        return Err(BuildError::UnclosedNodes(ctx.stack.len() - 1));
    }
    ctx.stack
        .pop()
        .ok_or(BuildError::UnclosedNodes(0))
}

fn enter(ctx: &mut ParseContext<'_>, token: &Token) {
    let position = Some(ctx.position(token));
    let node = match token.kind {
        TokenType::ListUnordered | TokenType::ListOrdered => Node::List(List {
            ordered: token.kind == TokenType::ListOrdered,
            position,
            ..List::default()
        }),
        TokenType::ListItem => Node::ListItem(ListItem {
            position,
            ..ListItem::default()
        }),
        TokenType::Paragraph => Node::Paragraph(Paragraph {
            children: Vec::new(),
            position,
        }),
        TokenType::Definition => Node::Definition(Definition {
            position,
            ..Definition::default()
        }),
        TokenType::Emphasis => Node::Emphasis(Emphasis {
            children: Vec::new(),
            position,
        }),
        TokenType::Strong => Node::Strong(Strong {
            children: Vec::new(),
            position,
        }),
        TokenType::CodeText => Node::InlineCode(InlineCode {
            value: String::new(),
            position,
        }),
        _ => return,
    };
    ctx.open(node);
}

fn exit(ctx: &mut ParseContext<'_>, token: &Token) -> Result<(), BuildError> {
    if let Some(kind) = container_kind(token.kind) {
        return ctx.close(token, kind);
    }

    match token.kind {
        TokenType::Data | TokenType::CodeTextData => {
            let value = ctx.slice(token);
            let position = ctx.position(token);
            ctx.push_text(value, position)?;
        }
        TokenType::LineEnding => {
            let position = ctx.position(token);
            if matches!(ctx.current(), Some(Node::InlineCode(_))) {
                ctx.push_text(" ", position)?;
            } else {
                ctx.push_text("\n", position)?;
            }
        }
        TokenType::ListItemValue => {
            let value = ctx.slice(token).parse::<u32>().ok();
            if let Some(Node::List(list)) = ctx.parent_of_kind_mut(NodeKind::List) {
                if list.children.is_empty() {
                    list.start = value;
                }
            }
        }
        TokenType::DefinitionLabelString => {
            let label = ctx.slice(token);
            if let Some(Node::Definition(definition)) = ctx.current_mut() {
                definition.label = label.to_string();
                definition.identifier = normalize_identifier(label);
            }
        }
        TokenType::DefinitionDestinationString => {
            let url = ctx.slice(token);
            if let Some(Node::Definition(definition)) = ctx.current_mut() {
                definition.url = url.to_string();
            }
        }
        TokenType::DefinitionTitleString => {
            let title = ctx.slice(token);
            if let Some(Node::Definition(definition)) = ctx.current_mut() {
                definition.title = Some(title.to_string());
            }
        }
        other => trace!(token = ?other, "no default exit handling"),
    }
    Ok(())
}

/// Case-fold a label and collapse its inner whitespace.
pub fn normalize_identifier(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fill in fields that depend on the finished node.
fn settle(node: &mut Node) {
    match node {
        Node::List(list) => {
            list.spread = Some(has_gap(&list.children));
        }
        Node::ListItem(item) => {
            item.spread = Some(has_gap(&item.children));
        }
        Node::InlineCode(code) => {
            let value = &code.value;
            if value.len() >= 2
                && value.starts_with(' ')
                && value.ends_with(' ')
                && !value.bytes().all(|byte| byte == b' ')
            {
                code.value = value[1..value.len() - 1].to_string();
            }
        }
        _ => {}
    }
}

/// Whether a blank line separates any two consecutive nodes.
fn has_gap(children: &[Node]) -> bool {
    children.windows(2).any(|pair| {
        match (pair[0].position(), pair[1].position()) {
            (Some(before), Some(after)) => after.start.line > before.end.line + 1,
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{tokenize, TokenizeOptions};

    fn build(source: &str) -> Node {
        let events = tokenize(source, TokenizeOptions::default());
        events_to_tree(source, &events, &[]).unwrap()
    }

    fn root_children(node: &Node) -> &[Node] {
        node.children().map(Vec::as_slice).unwrap_or_default()
    }

    #[test]
    fn test_empty_document() {
        let tree = build("");
        assert_eq!(tree, Node::Root(Root {
            children: vec![],
            position: tree.position().copied(),
        }));
    }

    #[test]
    fn test_simple_paragraph() {
        let tree = build("Hello world").without_positions();
        assert_eq!(
            tree,
            Node::Root(Root {
                children: vec![Node::Paragraph(Paragraph::with_text("Hello world"))],
                position: None,
            })
        );
    }

    #[test]
    fn test_line_endings_and_escapes_merge_into_one_text() {
        let tree = build("a\\*b\nc").without_positions();
        assert_eq!(
            root_children(&tree),
            [Node::Paragraph(Paragraph::with_text("a*b\nc"))]
        );
    }

    #[test]
    fn test_text_positions() {
        let tree = build("* a");
        let Node::List(list) = &root_children(&tree)[0] else {
            panic!("Expected list");
        };
        let Node::ListItem(item) = &list.children[0] else {
            panic!("Expected list item");
        };
        let Node::Paragraph(paragraph) = &item.children[0] else {
            panic!("Expected paragraph");
        };
        let position = paragraph.children[0].position().copied().unwrap();
        assert_eq!(position.start, Point::new(1, 3, 2));
        assert_eq!(position.end, Point::new(1, 4, 3));
    }

    #[test]
    fn test_list_spread() {
        let tree = build("* a\n\n  b\n* c").without_positions();
        let Node::List(list) = &root_children(&tree)[0] else {
            panic!("Expected list");
        };
        assert_eq!(list.spread, Some(false));
        assert_eq!(list.children.len(), 2);
        let Node::ListItem(first) = &list.children[0] else {
            panic!("Expected list item");
        };
        assert_eq!(first.spread, Some(true));
        let Node::ListItem(second) = &list.children[1] else {
            panic!("Expected list item");
        };
        assert_eq!(second.spread, Some(false));
    }

    #[test]
    fn test_blank_line_between_items_spreads_list() {
        let tree = build("* a\n\n* b");
        let Node::List(list) = &root_children(&tree)[0] else {
            panic!("Expected list");
        };
        assert_eq!(list.spread, Some(true));
    }

    #[test]
    fn test_ordered_list_start() {
        let tree = build("7. a\n8. b");
        let Node::List(list) = &root_children(&tree)[0] else {
            panic!("Expected list");
        };
        assert!(list.ordered);
        assert_eq!(list.start, Some(7));
    }

    #[test]
    fn test_definition_fields() {
        let tree = build("[Foo  Bar]: /url 'title'").without_positions();
        assert_eq!(
            root_children(&tree),
            [Node::Definition(Definition {
                identifier: "foo bar".to_string(),
                label: "Foo  Bar".to_string(),
                url: "/url".to_string(),
                title: Some("title".to_string()),
                position: None,
            })]
        );
    }

    #[test]
    fn test_inline_code_padding_is_trimmed() {
        let tree = build("` a `").without_positions();
        assert_eq!(tree.to_plain_text(), "a");
    }

    #[test]
    fn test_emphasis_nesting() {
        let tree = build("*a **b***").without_positions();
        let Node::Paragraph(paragraph) = &root_children(&tree)[0] else {
            panic!("Expected paragraph");
        };
        assert!(matches!(paragraph.children[0], Node::Emphasis(_)));
        assert_eq!(tree.to_plain_text(), "a b");
    }

    #[test]
    fn test_checkbox_tokens_are_ignored_without_extension() {
        let tree = build("* [x] a").without_positions();
        let Node::List(list) = &root_children(&tree)[0] else {
            panic!("Expected list");
        };
        let Node::ListItem(item) = &list.children[0] else {
            panic!("Expected list item");
        };
        assert_eq!(item.checked, Checked::Unset);
        assert_eq!(item.children[0].to_plain_text(), " a");
    }

    #[test]
    fn test_mismatched_exit() {
        let events = vec![
            Event::enter(Token::new(TokenType::Paragraph, 0, 1)),
            Event::exit(Token::new(TokenType::Emphasis, 0, 1)),
        ];
        assert_eq!(
            events_to_tree("a", &events, &[]),
            Err(BuildError::MismatchedEvents {
                expected: NodeKind::Emphasis,
                found: NodeKind::Paragraph,
            })
        );
    }

    #[test]
    fn test_unclosed_nodes() {
        let events = vec![Event::enter(Token::new(TokenType::Paragraph, 0, 1))];
        assert_eq!(
            events_to_tree("a", &events, &[]),
            Err(BuildError::UnclosedNodes(1))
        );
    }

    #[test]
    fn test_exit_without_open_node() {
        let events = vec![Event::exit(Token::new(TokenType::Paragraph, 0, 1))];
        assert_eq!(
            events_to_tree("a", &events, &[]),
            Err(BuildError::UnexpectedExit(TokenType::Paragraph))
        );
    }

    #[test]
    fn test_data_at_root_is_rejected() {
        let events = vec![
            Event::enter(Token::new(TokenType::Data, 0, 1)),
            Event::exit(Token::new(TokenType::Data, 0, 1)),
        ];
        assert_eq!(
            events_to_tree("a", &events, &[]),
            Err(BuildError::UnexpectedInline(NodeKind::Root))
        );
    }

    struct Counter(std::cell::Cell<usize>);

    impl FromMarkdownExtension for Counter {
        fn exit(&self, ctx: &mut ParseContext<'_>, token: &Token) -> Hook {
            if token.kind == TokenType::Data {
                self.0.set(self.0.get() + 1);
                assert!(matches!(ctx.current(), Some(Node::Paragraph(_))));
                return Hook::Handled;
            }
            Hook::Continue
        }
    }

    #[test]
    fn test_handled_hook_replaces_default() {
        let source = "a";
        let events = tokenize(source, TokenizeOptions::default());
        let counter = Counter(std::cell::Cell::new(0));
        let tree = events_to_tree(source, &events, &[&counter]).unwrap();
        assert_eq!(counter.0.get(), 1);
        assert_eq!(tree.to_plain_text(), "");
    }
}
