//! Defines the flat event stream produced by the tokenizer.
//!
//! A document is a sequence of `Enter`/`Exit` pairs around typed tokens. Tokens nest: every
//! `Enter` is closed by an `Exit` of the same token before its parent is exited. Tokens carry
//! byte spans into the source, so consumers slice the source for values instead of copying.

use serde::Serialize;
use std::ops::Range;

/// Kinds of tokens emitted by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    /// A line holding only whitespace.
    BlankLine,
    ListUnordered,
    ListOrdered,
    ListItem,
    /// Bullet or number plus delimiter, with the whitespace after it.
    ListItemPrefix,
    ListItemMarker,
    /// The digits of an ordered list marker.
    ListItemValue,
    Paragraph,
    /// Literal characters inside a paragraph.
    Data,
    /// A soft line ending inside a paragraph.
    LineEnding,
    /// A backslash escape; only the escaped character is data.
    CharacterEscape,
    Emphasis,
    Strong,
    /// A delimiter run (`*`, `_`, `**`, `__`) opening or closing emphasis.
    AttentionSequence,
    CodeText,
    CodeTextSequence,
    CodeTextData,
    Definition,
    DefinitionLabelString,
    DefinitionDestinationString,
    DefinitionTitleString,
    /// A whole checkbox: `[`, value, `]`.
    TaskListCheck,
    TaskListCheckMarker,
    TaskListCheckValueChecked,
    TaskListCheckValueUnchecked,
}

impl TokenType {
    /// Whether this token closes a checkbox value.
    pub fn is_task_list_check_value(self) -> bool {
        matches!(
            self,
            TokenType::TaskListCheckValueChecked | TokenType::TaskListCheckValueUnchecked
        )
    }
}

/// A typed span of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenType,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenType, start: usize, end: usize) -> Self {
        Token { kind, start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The source text covered by this token.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.range()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Enter,
    Exit,
}

/// A single event in the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub token: Token,
}

impl Event {
    pub fn enter(token: Token) -> Self {
        Event {
            kind: EventKind::Enter,
            token,
        }
    }

    pub fn exit(token: Token) -> Self {
        Event {
            kind: EventKind::Exit,
            token,
        }
    }
}

/// Converts byte offsets into line/column points.
#[derive(Debug, Clone)]
pub struct LineIndex<'s> {
    source: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        LineIndex {
            source,
            line_starts,
        }
    }

    /// The point at `offset`, with a 1-based line and character column.
    pub fn point(&self, offset: usize) -> crate::ir::nodes::Point {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count() + 1;
        crate::ir::nodes::Point::new(line + 1, column, offset)
    }
}
