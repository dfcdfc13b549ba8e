//! Inline tokenization of paragraph content.
//!
//! Works in two passes over the characters of a paragraph:
//!
//! 1. Scan into atoms: literal runs, backslash escapes, code spans, line endings, and delimiter
//!    runs of `*` / `_`.
//! 2. Match delimiter runs with the usual opener stack: each closer looks back for the nearest
//!    compatible opener; two characters are used when both sides have them (strong), otherwise
//!    one (emphasis). Openers skipped over by a match fall back to literal text.
//!
//! Events are then written in source order so that every emphasis/strong token properly nests.

use crate::ir::events::{Event, Token, TokenType};

/// One line of paragraph content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub start: usize,
    pub end: usize,
    /// The line ending that follows this segment, if another segment follows.
    pub line_ending: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy)]
enum Piece {
    Char { start: usize, ch: char },
    LineEnding { start: usize, end: usize },
}

impl Piece {
    fn start(&self) -> usize {
        match self {
            Piece::Char { start, .. } | Piece::LineEnding { start, .. } => *start,
        }
    }

    fn end(&self) -> usize {
        match self {
            Piece::Char { start, ch } => start + ch.len_utf8(),
            Piece::LineEnding { end, .. } => *end,
        }
    }

    fn char(&self) -> Option<char> {
        match self {
            Piece::Char { ch, .. } => Some(*ch),
            Piece::LineEnding { .. } => None,
        }
    }
}

#[derive(Debug)]
enum Atom {
    Text { start: usize, end: usize },
    Escape { start: usize, end: usize },
    LineEnding { start: usize, end: usize },
    Code {
        open: (usize, usize),
        close: (usize, usize),
        inner: Vec<Piece>,
    },
    Delimiter(usize),
}

#[derive(Debug, Clone, Copy)]
struct Match {
    kind: TokenType,
    opener_seq: (usize, usize),
    closer_seq: (usize, usize),
}

#[derive(Debug)]
struct Delimiter {
    ch: char,
    length: usize,
    /// Unmatched part of the run, shrinking from the right as an opener and from the left as
    /// a closer.
    lo: usize,
    hi: usize,
    can_open: bool,
    can_close: bool,
    opens: Vec<Match>,
    closes: Vec<Match>,
}

impl Delimiter {
    fn remaining(&self) -> usize {
        self.hi - self.lo
    }
}

/// Tokenize the inline content of a paragraph into `events`.
pub(crate) fn tokenize(source: &str, segments: &[Segment], events: &mut Vec<Event>) {
    let pieces = pieces(source, segments);
    let (atoms, mut delimiters) = scan(&pieces);
    match_delimiters(&atoms, &mut delimiters);
    emit(&atoms, &delimiters, events);
}

fn pieces(source: &str, segments: &[Segment]) -> Vec<Piece> {
    let mut pieces = Vec::new();
    for segment in segments {
        for (index, ch) in source[segment.start..segment.end].char_indices() {
            pieces.push(Piece::Char {
                start: segment.start + index,
                ch,
            });
        }
        if let Some((start, end)) = segment.line_ending {
            pieces.push(Piece::LineEnding { start, end });
        }
    }
    pieces
}

fn is_whitespace(ch: Option<char>) -> bool {
    ch.map_or(true, char::is_whitespace)
}

fn is_punctuation(ch: Option<char>) -> bool {
    ch.is_some_and(|c| c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace()))
}

fn run_length(pieces: &[Piece], from: usize, ch: char) -> usize {
    pieces[from..]
        .iter()
        .take_while(|piece| piece.char() == Some(ch))
        .count()
}

fn scan(pieces: &[Piece]) -> (Vec<Atom>, Vec<Delimiter>) {
    let mut atoms = Vec::new();
    let mut delimiters = Vec::new();
    let mut index = 0;

    while index < pieces.len() {
        let piece = pieces[index];
        match piece {
            Piece::LineEnding { start, end } => {
                atoms.push(Atom::LineEnding { start, end });
                index += 1;
            }
            Piece::Char { start, ch: '\\' } => {
                let escaped = pieces
                    .get(index + 1)
                    .filter(|next| next.char().is_some_and(|c| c.is_ascii_punctuation()));
                match escaped {
                    Some(next) => {
                        atoms.push(Atom::Escape {
                            start,
                            end: next.end(),
                        });
                        index += 2;
                    }
                    None => {
                        push_text(&mut atoms, start, piece.end());
                        index += 1;
                    }
                }
            }
            Piece::Char { start, ch: '`' } => {
                let length = run_length(pieces, index, '`');
                let open_end = pieces[index + length - 1].end();
                match find_closing_backticks(pieces, index + length, length) {
                    Some(close_at) => {
                        let close_end = pieces[close_at + length - 1].end();
                        atoms.push(Atom::Code {
                            open: (start, open_end),
                            close: (pieces[close_at].start(), close_end),
                            inner: pieces[index + length..close_at].to_vec(),
                        });
                        index = close_at + length;
                    }
                    None => {
                        push_text(&mut atoms, start, open_end);
                        index += length;
                    }
                }
            }
            Piece::Char {
                start,
                ch: ch @ ('*' | '_'),
            } => {
                let length = run_length(pieces, index, ch);
                let end = pieces[index + length - 1].end();
                let before = index.checked_sub(1).and_then(|i| pieces[i].char());
                let after = pieces.get(index + length).and_then(Piece::char);

                let left_flanking = !is_whitespace(after)
                    && (!is_punctuation(after) || is_whitespace(before) || is_punctuation(before));
                let right_flanking = !is_whitespace(before)
                    && (!is_punctuation(before) || is_whitespace(after) || is_punctuation(after));
                let (can_open, can_close) = if ch == '*' {
                    (left_flanking, right_flanking)
                } else {
                    (
                        left_flanking && (!right_flanking || is_punctuation(before)),
                        right_flanking && (!left_flanking || is_punctuation(after)),
                    )
                };

                atoms.push(Atom::Delimiter(delimiters.len()));
                delimiters.push(Delimiter {
                    ch,
                    length,
                    lo: start,
                    hi: end,
                    can_open,
                    can_close,
                    opens: Vec::new(),
                    closes: Vec::new(),
                });
                index += length;
            }
            Piece::Char { start, .. } => {
                push_text(&mut atoms, start, piece.end());
                index += 1;
            }
        }
    }

    (atoms, delimiters)
}

/// Extend the previous text atom when contiguous, otherwise start a new one.
fn push_text(atoms: &mut Vec<Atom>, start: usize, end: usize) {
    if let Some(Atom::Text { end: last_end, .. }) = atoms.last_mut() {
        if *last_end == start {
            *last_end = end;
            return;
        }
    }
    atoms.push(Atom::Text { start, end });
}

fn find_closing_backticks(pieces: &[Piece], from: usize, length: usize) -> Option<usize> {
    let mut index = from;
    while index < pieces.len() {
        if pieces[index].char() == Some('`') {
            let run = run_length(pieces, index, '`');
            if run == length {
                return Some(index);
            }
            index += run;
        } else {
            index += 1;
        }
    }
    None
}

fn match_delimiters(atoms: &[Atom], delimiters: &mut [Delimiter]) {
    let mut openers: Vec<usize> = Vec::new();

    for atom in atoms {
        let Atom::Delimiter(closer) = *atom else {
            continue;
        };

        if delimiters[closer].can_close {
            while delimiters[closer].remaining() > 0 {
                let Some(position) = openers
                    .iter()
                    .rposition(|&opener| compatible(&delimiters[opener], &delimiters[closer]))
                else {
                    break;
                };
                let opener = openers[position];

                let used = if delimiters[opener].remaining() >= 2
                    && delimiters[closer].remaining() >= 2
                {
                    2
                } else {
                    1
                };
                let kind = if used == 2 {
                    TokenType::Strong
                } else {
                    TokenType::Emphasis
                };

                let opener_seq = (delimiters[opener].hi - used, delimiters[opener].hi);
                let closer_seq = (delimiters[closer].lo, delimiters[closer].lo + used);
                delimiters[opener].hi -= used;
                delimiters[closer].lo += used;

                let found = Match {
                    kind,
                    opener_seq,
                    closer_seq,
                };
                delimiters[opener].opens.push(found);
                delimiters[closer].closes.push(found);

                // Openers between the pair can no longer match anything.
                openers.truncate(position + 1);
                if delimiters[opener].remaining() == 0 {
                    openers.pop();
                }
            }
        }

        if delimiters[closer].can_open && delimiters[closer].remaining() > 0 {
            openers.push(closer);
        }
    }
}

fn compatible(opener: &Delimiter, closer: &Delimiter) -> bool {
    if opener.ch != closer.ch || opener.remaining() == 0 || !opener.can_open {
        return false;
    }
    // Rule of three.
    if (opener.can_close || closer.can_open)
        && (opener.length + closer.length) % 3 == 0
        && !(opener.length % 3 == 0 && closer.length % 3 == 0)
    {
        return false;
    }
    true
}

fn push_leaf(events: &mut Vec<Event>, kind: TokenType, start: usize, end: usize) {
    let token = Token::new(kind, start, end);
    events.push(Event::enter(token));
    events.push(Event::exit(token));
}

fn emit(atoms: &[Atom], delimiters: &[Delimiter], events: &mut Vec<Event>) {
    for atom in atoms {
        match atom {
            Atom::Text { start, end } => push_leaf(events, TokenType::Data, *start, *end),
            Atom::Escape { start, end } => {
                let token = Token::new(TokenType::CharacterEscape, *start, *end);
                events.push(Event::enter(token));
                push_leaf(events, TokenType::Data, start + 1, *end);
                events.push(Event::exit(token));
            }
            Atom::LineEnding { start, end } => {
                push_leaf(events, TokenType::LineEnding, *start, *end)
            }
            Atom::Code { open, close, inner } => {
                let token = Token::new(TokenType::CodeText, open.0, close.1);
                events.push(Event::enter(token));
                push_leaf(events, TokenType::CodeTextSequence, open.0, open.1);
                emit_code_inner(inner, events);
                push_leaf(events, TokenType::CodeTextSequence, close.0, close.1);
                events.push(Event::exit(token));
            }
            Atom::Delimiter(index) => {
                let delimiter = &delimiters[*index];
                for found in &delimiter.closes {
                    push_leaf(
                        events,
                        TokenType::AttentionSequence,
                        found.closer_seq.0,
                        found.closer_seq.1,
                    );
                    events.push(Event::exit(Token::new(
                        found.kind,
                        found.opener_seq.0,
                        found.closer_seq.1,
                    )));
                }
                if delimiter.remaining() > 0 {
                    push_leaf(events, TokenType::Data, delimiter.lo, delimiter.hi);
                }
                for found in delimiter.opens.iter().rev() {
                    events.push(Event::enter(Token::new(
                        found.kind,
                        found.opener_seq.0,
                        found.closer_seq.1,
                    )));
                    push_leaf(
                        events,
                        TokenType::AttentionSequence,
                        found.opener_seq.0,
                        found.opener_seq.1,
                    );
                }
            }
        }
    }
}

fn emit_code_inner(inner: &[Piece], events: &mut Vec<Event>) {
    let mut run: Option<(usize, usize)> = None;
    for piece in inner {
        match piece {
            Piece::Char { .. } => {
                run = match run {
                    Some((start, _)) => Some((start, piece.end())),
                    None => Some((piece.start(), piece.end())),
                };
            }
            Piece::LineEnding { start, end } => {
                if let Some((run_start, run_end)) = run.take() {
                    push_leaf(events, TokenType::CodeTextData, run_start, run_end);
                }
                push_leaf(events, TokenType::LineEnding, *start, *end);
            }
        }
    }
    if let Some((start, end)) = run {
        push_leaf(events, TokenType::CodeTextData, start, end);
    }
}
