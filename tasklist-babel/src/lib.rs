//! Markdown with GFM task list items, in both directions
//!
//!     This crate parses Markdown into an mdast-shaped syntax tree and serializes trees back to
//!     Markdown. Its reason to exist is the task list item: `* [x] done` becomes a list item with
//!     `checked: true`, and a list item with `checked` set is written back with its checkbox.
//!
//! Architecture
//!
//!     Parsing is a two-stage pipeline. The tokenizer (./tokenizer) turns text into a flat
//!     stream of enter/exit events over typed tokens (./ir/events.rs). The tree builder
//!     (./common/flat_to_nested.rs) replays the events onto a stack and produces the tree
//!     (./ir/nodes.rs). Serialization (./formats/markdown/serializer.rs) walks the tree with one
//!     handler per node kind.
//!
//!     Syntax extensions hook into both sides without touching the generic code:
//!     `FromMarkdownExtension` for the tree builder, `ToMarkdownExtension` for the serializer.
//!     The task list support (./task_list) is such an extension pair.
//!
//!     This is a pure lib: no printing, no environment lookups. Logging goes through `tracing`
//!     and is only visible when the host installs a subscriber.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── transforms.rs           # text → text helpers
//!     ├── tokenizer               # Markdown → events
//!     ├── common                  # events → tree
//!     ├── task_list               # checkbox adapters (tree builder + serializer hooks)
//!     ├── formats
//!     │   ├── markdown
//!     │   │   ├── parser.rs
//!     │   │   ├── serializer.rs
//!     │   │   └── mod.rs
//!     │   └── json
//!     └── ir                      # events and tree types
//!
//! Testing
//!     tests
//!     └── markdown
//!         ├── <testname>.rs
//!         └── mod.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.

pub mod common;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod registry;
pub mod task_list;
pub mod tokenizer;
pub mod transforms;

pub use error::FormatError;
pub use format::Format;
pub use formats::markdown::parser::{parse_from_markdown, ParseOptions};
pub use formats::markdown::serializer::{serialize_to_markdown, ListItemIndent, SerializeOptions};
pub use ir::nodes::{Checked, Node};
pub use registry::FormatRegistry;
