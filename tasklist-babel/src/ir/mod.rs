//! Intermediate representations shared by the parser and the serializer.
//!
//! `events` is the flat token stream the tokenizer produces; `nodes` is the syntax tree the
//! tree builder reconstructs from it and the serializer consumes.

pub mod events;
pub mod nodes;
