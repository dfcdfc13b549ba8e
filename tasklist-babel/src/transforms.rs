//! Transform-style helpers over the Markdown format
//!
//! Small functional entry points for pipelines that only need text in, text out.

use crate::error::FormatError;
use crate::formats::markdown::parser::{parse_from_markdown, ParseOptions};
use crate::formats::markdown::serializer::{serialize_to_markdown, SerializeOptions};

/// Round-trip transformation: parse and re-serialize Markdown with default options
///
/// # Example
///
/// ```
/// use tasklist_babel::transforms::format_markdown_source;
///
/// let formatted = format_markdown_source("- [X] done\n").unwrap();
/// assert_eq!(formatted, "* [x] done\n");
/// ```
pub fn format_markdown_source(source: &str) -> Result<String, FormatError> {
    format_markdown_source_with_options(
        source,
        &ParseOptions::default(),
        &SerializeOptions::default(),
    )
}

/// Round-trip transformation with explicit parser and serializer options
pub fn format_markdown_source_with_options(
    source: &str,
    parse_options: &ParseOptions,
    serialize_options: &SerializeOptions,
) -> Result<String, FormatError> {
    let tree = parse_from_markdown(source, parse_options)?;
    serialize_to_markdown(&tree, serialize_options)
}
