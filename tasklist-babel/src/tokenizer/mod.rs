//! Markdown tokenizer (Markdown string → event stream)
//!
//! A line-based block scanner in front of an inline scanner. Containers (list items) are
//! handled recursively: the lines of an item are cut down to the item's content column and fed
//! back into the same flow scanner, so nesting needs no explicit container stack.
//!
//! Supported blocks: blank lines, bullet and ordered lists, single-line definitions and
//! paragraphs with lazy continuation. Anything else is paragraph text.
//!
//! # Task list checkboxes
//!
//! With [`TokenizeOptions::gfm_task_list_item`] on, `[ ]`, `[x]` or `[X]` is tokenized as a
//! checkbox when all of the following hold:
//!
//! - it opens the first paragraph of a list item (definitions may come before it),
//! - it is followed by a space or a tab,
//! - something other than whitespace follows on the same line.
//!
//! Only the brackets and the value are part of the checkbox tokens. The separating whitespace
//! stays in the paragraph text; removing it is the tree builder's business.

mod inline;

use crate::ir::events::{Event, Token, TokenType};
use inline::Segment;

/// Switches for optional constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Recognize GFM task list checkboxes.
    pub gfm_task_list_item: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            gfm_task_list_item: true,
        }
    }
}

/// Tokenize a Markdown source into a flat event stream.
pub fn tokenize(source: &str, options: TokenizeOptions) -> Vec<Event> {
    let lines = split_lines(source);
    let mut tokenizer = Tokenizer {
        source,
        options,
        events: Vec::new(),
    };
    tokenizer.flow(&lines, false);
    tokenizer.events
}

/// A line, or the part of a line that lies inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    /// End of the content, before the line ending.
    end: usize,
    /// End including the line ending.
    eol: usize,
}

fn split_lines(source: &str) -> Vec<Span> {
    let bytes = source.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'\n' {
            let end = if index > start && bytes[index - 1] == b'\r' {
                index - 1
            } else {
                index
            };
            spans.push(Span {
                start,
                end,
                eol: index + 1,
            });
            start = index + 1;
        }
    }
    if start < source.len() {
        spans.push(Span {
            start,
            end: source.len(),
            eol: source.len(),
        });
    }
    spans
}

fn is_space_or_tab(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Column reached after `byte` when starting at `column`. Tabs stop every four columns.
fn advance_column(column: usize, byte: u8) -> usize {
    if byte == b'\t' {
        column + 4 - column % 4
    } else {
        column + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet(u8),
    Ordered(u8),
}

#[derive(Debug, Clone, Copy)]
struct ListMarker {
    kind: ListKind,
    /// Offset of the bullet or the first digit.
    start: usize,
    /// End of the digits of an ordered marker; equals `start` for bullets.
    value_end: usize,
    /// Offset after the bullet or delimiter.
    end: usize,
    /// Offset where the item's content starts on the marker line.
    content: usize,
    /// Columns from the container edge to the content.
    content_indent: usize,
    /// Nothing follows the marker on its line.
    empty: bool,
}

struct Tokenizer<'s> {
    source: &'s str,
    options: TokenizeOptions,
    events: Vec<Event>,
}

impl<'s> Tokenizer<'s> {
    fn bytes(&self, span: Span) -> &'s [u8] {
        &self.source.as_bytes()[span.start..span.end]
    }

    fn is_blank(&self, span: Span) -> bool {
        self.bytes(span).iter().all(|byte| is_space_or_tab(*byte))
    }

    fn indent(&self, span: Span) -> usize {
        self.bytes(span)
            .iter()
            .take_while(|byte| is_space_or_tab(**byte))
            .fold(0, |column, byte| advance_column(column, *byte))
    }

    /// Cut `columns` of indentation off the front of `span`.
    fn strip(&self, span: Span, columns: usize) -> Span {
        let mut column = 0;
        let mut start = span.start;
        for byte in self.bytes(span) {
            if column >= columns || !is_space_or_tab(*byte) {
                break;
            }
            column = advance_column(column, *byte);
            start += 1;
        }
        Span { start, ..span }
    }

    /// The span without leading and trailing spaces and tabs.
    fn trim(&self, span: Span) -> Span {
        let bytes = self.bytes(span);
        let leading = bytes.iter().take_while(|b| is_space_or_tab(**b)).count();
        let trailing = bytes[leading..]
            .iter()
            .rev()
            .take_while(|b| is_space_or_tab(**b))
            .count();
        Span {
            start: span.start + leading,
            end: span.end - trailing,
            eol: span.eol,
        }
    }

    fn push_leaf(&mut self, kind: TokenType, start: usize, end: usize) {
        let token = Token::new(kind, start, end);
        self.events.push(Event::enter(token));
        self.events.push(Event::exit(token));
    }

    fn list_marker(&self, span: Span) -> Option<ListMarker> {
        let bytes = self.bytes(span);
        let leading = bytes.iter().take_while(|b| is_space_or_tab(**b)).count();
        let indent = bytes[..leading]
            .iter()
            .fold(0, |column, byte| advance_column(column, *byte));
        if indent >= 4 {
            return None;
        }

        let rest = &bytes[leading..];
        let (kind, value_len) = match rest.first()? {
            bullet @ (b'*' | b'-' | b'+') => (ListKind::Bullet(*bullet), 0),
            b'0'..=b'9' => {
                let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > 9 {
                    return None;
                }
                match rest.get(digits)? {
                    delimiter @ (b'.' | b')') => (ListKind::Ordered(*delimiter), digits),
                    _ => return None,
                }
            }
            _ => return None,
        };

        let after = leading + value_len + 1;
        let marker_columns = indent + value_len + 1;
        let start = span.start + leading;
        let end = span.start + after;

        match bytes.get(after) {
            None => {
                return Some(ListMarker {
                    kind,
                    start,
                    value_end: start + value_len,
                    end,
                    content: span.end,
                    content_indent: marker_columns + 1,
                    empty: true,
                })
            }
            Some(byte) if is_space_or_tab(*byte) => {}
            Some(_) => return None,
        }

        let whitespace = bytes[after..]
            .iter()
            .take_while(|b| is_space_or_tab(**b))
            .count();
        if after + whitespace == bytes.len() {
            return Some(ListMarker {
                kind,
                start,
                value_end: start + value_len,
                end,
                content: span.end,
                content_indent: marker_columns + 1,
                empty: true,
            });
        }

        let padding = bytes[after..after + whitespace]
            .iter()
            .fold(marker_columns, |column, byte| advance_column(column, *byte))
            - marker_columns;
        let (content, content_indent) = if padding > 4 {
            // Content indented this far is code inside the item; keep one column of padding.
            (end + 1, marker_columns + 1)
        } else {
            (end + whitespace, marker_columns + padding)
        };

        Some(ListMarker {
            kind,
            start,
            value_end: start + value_len,
            end,
            content,
            content_indent,
            empty: false,
        })
    }

    /// Scan a run of lines at one container level.
    fn flow(&mut self, spans: &[Span], item_content: bool) {
        let mut first_content = item_content;
        let mut index = 0;

        while index < spans.len() {
            let span = spans[index];

            if self.is_blank(span) {
                self.push_leaf(TokenType::BlankLine, span.start, span.end);
                index += 1;
                continue;
            }

            if let Some(marker) = self.list_marker(span) {
                index = self.list(spans, index, marker);
                first_content = false;
                continue;
            }

            let end = self.paragraph_end(spans, index);
            self.content(&spans[index..end], first_content);
            first_content = false;
            index = end;
        }
    }

    /// Index one past the last line of the paragraph-like chunk starting at `index`.
    fn paragraph_end(&self, spans: &[Span], index: usize) -> usize {
        let mut end = index + 1;
        while end < spans.len() {
            let span = spans[end];
            if self.is_blank(span) {
                break;
            }
            if let Some(marker) = self.list_marker(span) {
                let interrupts = !marker.empty
                    && match marker.kind {
                        ListKind::Bullet(_) => true,
                        ListKind::Ordered(_) => {
                            &self.source[marker.start..marker.value_end] == "1"
                        }
                    };
                if interrupts {
                    break;
                }
            }
            end += 1;
        }
        end
    }

    /// Scan a list starting at `index`; returns the index after its last item line.
    fn list(&mut self, spans: &[Span], index: usize, marker: ListMarker) -> usize {
        let mut items: Vec<(ListMarker, Vec<Span>)> = Vec::new();
        let mut index = index;
        let mut marker = marker;

        let next = loop {
            let (content, next) = self.item_lines(spans, index, &marker);
            items.push((marker, content));

            let mut look = next;
            while look < spans.len() && self.is_blank(spans[look]) {
                look += 1;
            }
            match spans.get(look).and_then(|span| self.list_marker(*span)) {
                Some(sibling) if sibling.kind == marker.kind => {
                    marker = sibling;
                    index = look;
                }
                _ => break next,
            }
        };

        self.emit_list(items);
        next
    }

    /// Lines of the item opened by `marker` at `index`, cut to its content column.
    ///
    /// Returns the content spans and the index after the item's last non-blank line.
    fn item_lines(&self, spans: &[Span], index: usize, marker: &ListMarker) -> (Vec<Span>, usize) {
        let first = spans[index];
        let mut content = vec![Span {
            start: marker.content,
            ..first
        }];
        let mut last = index;

        // An item may start with at most one blank line.
        if marker.empty && spans.get(index + 1).is_some_and(|span| self.is_blank(*span)) {
            return (content, index + 1);
        }

        let mut cursor = index + 1;
        while cursor < spans.len() {
            let span = spans[cursor];
            if self.is_blank(span) {
                cursor += 1;
                continue;
            }

            let belongs = if self.indent(span) >= marker.content_indent {
                true
            } else {
                // Lazy continuation of a paragraph still open in the item.
                let previous_open = last == cursor - 1
                    && content
                        .last()
                        .is_some_and(|previous| !self.is_blank(*previous));
                previous_open && self.list_marker(span).is_none()
            };
            if !belongs {
                break;
            }

            for blank in &spans[last + 1..cursor] {
                content.push(self.strip(*blank, marker.content_indent));
            }
            content.push(self.strip(span, marker.content_indent));
            last = cursor;
            cursor += 1;
        }

        (content, last + 1)
    }

    fn item_end(&self, marker: &ListMarker, content: &[Span]) -> usize {
        content
            .iter()
            .rev()
            .find(|span| !self.is_blank(**span))
            .map_or(marker.end, |span| self.trim(*span).end)
    }

    fn emit_list(&mut self, items: Vec<(ListMarker, Vec<Span>)>) {
        let Some((first, _)) = items.first() else {
            return;
        };
        let ordered = matches!(first.kind, ListKind::Ordered(_));
        let list_start = first.start;
        let list_end = items
            .last()
            .map_or(first.end, |(marker, content)| self.item_end(marker, content));

        let list = Token::new(
            if ordered {
                TokenType::ListOrdered
            } else {
                TokenType::ListUnordered
            },
            list_start,
            list_end,
        );
        self.events.push(Event::enter(list));

        for (marker, content) in items {
            let item = Token::new(TokenType::ListItem, marker.start, self.item_end(&marker, &content));
            self.events.push(Event::enter(item));

            let prefix_end = if marker.empty {
                marker.end
            } else {
                marker.content
            };
            let prefix = Token::new(TokenType::ListItemPrefix, marker.start, prefix_end);
            self.events.push(Event::enter(prefix));
            if ordered {
                self.push_leaf(TokenType::ListItemValue, marker.start, marker.value_end);
            }
            self.push_leaf(TokenType::ListItemMarker, marker.value_end, marker.end);
            self.events.push(Event::exit(prefix));

            self.flow(&content, true);
            self.events.push(Event::exit(item));
        }

        self.events.push(Event::exit(list));
    }

    /// Definitions, then a paragraph with the rest of the chunk.
    fn content(&mut self, spans: &[Span], first_of_item: bool) {
        let mut index = 0;
        while index < spans.len() && self.definition(spans[index]) {
            index += 1;
        }
        if index < spans.len() {
            self.paragraph(&spans[index..], first_of_item);
        }
    }

    /// Tokenize `[label]: destination "title"` on a single line.
    fn definition(&mut self, span: Span) -> bool {
        let line = self.trim(span);
        let bytes = self.bytes(line);
        if bytes.first() != Some(&b'[') {
            return false;
        }

        let mut cursor = 1;
        while cursor < bytes.len() {
            match bytes[cursor] {
                b'\\' => cursor += 2,
                b'[' => return false,
                b']' => break,
                _ => cursor += 1,
            }
        }
        if cursor >= bytes.len() || bytes.get(cursor + 1) != Some(&b':') {
            return false;
        }
        let label = (line.start + 1, line.start + cursor);
        if self.source[label.0..label.1].trim().is_empty() {
            return false;
        }

        cursor += 2;
        cursor += bytes[cursor..]
            .iter()
            .take_while(|b| is_space_or_tab(**b))
            .count();

        let destination = if bytes.get(cursor) == Some(&b'<') {
            let Some(close) = bytes[cursor + 1..].iter().position(|b| *b == b'>') else {
                return false;
            };
            let range = (line.start + cursor + 1, line.start + cursor + 1 + close);
            cursor += close + 2;
            range
        } else {
            let length = bytes[cursor..]
                .iter()
                .take_while(|b| !is_space_or_tab(**b))
                .count();
            if length == 0 {
                return false;
            }
            let range = (line.start + cursor, line.start + cursor + length);
            cursor += length;
            range
        };

        let whitespace = bytes[cursor..]
            .iter()
            .take_while(|b| is_space_or_tab(**b))
            .count();
        cursor += whitespace;

        let title = if cursor < bytes.len() {
            if whitespace == 0 {
                return false;
            }
            let close = match bytes[cursor] {
                b'"' => b'"',
                b'\'' => b'\'',
                b'(' => b')',
                _ => return false,
            };
            // The title must run to the end of the line.
            if bytes.len() - cursor < 2 || bytes[bytes.len() - 1] != close {
                return false;
            }
            Some((line.start + cursor + 1, line.end - 1))
        } else {
            None
        };

        let definition = Token::new(TokenType::Definition, line.start, line.end);
        self.events.push(Event::enter(definition));
        self.push_leaf(TokenType::DefinitionLabelString, label.0, label.1);
        self.push_leaf(
            TokenType::DefinitionDestinationString,
            destination.0,
            destination.1,
        );
        if let Some((start, end)) = title {
            self.push_leaf(TokenType::DefinitionTitleString, start, end);
        }
        self.events.push(Event::exit(definition));
        true
    }

    fn paragraph(&mut self, spans: &[Span], first_of_item: bool) {
        let lines: Vec<Span> = spans.iter().map(|span| self.trim(*span)).collect();
        let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
            return;
        };

        let paragraph = Token::new(TokenType::Paragraph, first.start, last.end);
        self.events.push(Event::enter(paragraph));

        let mut text_start = first.start;
        if first_of_item && self.options.gfm_task_list_item {
            if let Some(check_end) = self.task_list_check(*first) {
                text_start = check_end;
            }
        }

        let segments: Vec<Segment> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| Segment {
                start: if index == 0 { text_start } else { line.start },
                end: line.end,
                line_ending: (index + 1 < lines.len()).then(|| {
                    let raw = spans[index];
                    (raw.end, raw.eol)
                }),
            })
            .collect();
        inline::tokenize(self.source, &segments, &mut self.events);

        self.events.push(Event::exit(paragraph));
    }

    /// Tokenize a checkbox at the start of `line`; returns the offset after `]`.
    fn task_list_check(&mut self, line: Span) -> Option<usize> {
        let bytes = self.bytes(line);
        let value = match bytes {
            [b'[', value @ (b' ' | b'x' | b'X'), b']', separator, rest @ ..]
                if is_space_or_tab(*separator)
                    && rest.iter().any(|byte| !is_space_or_tab(*byte)) =>
            {
                *value
            }
            _ => return None,
        };

        let start = line.start;
        let check = Token::new(TokenType::TaskListCheck, start, start + 3);
        self.events.push(Event::enter(check));
        self.push_leaf(TokenType::TaskListCheckMarker, start, start + 1);
        let kind = if value == b' ' {
            TokenType::TaskListCheckValueUnchecked
        } else {
            TokenType::TaskListCheckValueChecked
        };
        self.push_leaf(kind, start + 1, start + 2);
        self.push_leaf(TokenType::TaskListCheckMarker, start + 2, start + 3);
        self.events.push(Event::exit(check));

        Some(start + 3)
    }
}
