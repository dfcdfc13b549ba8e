//! CLI-specific transforms
//!
//! The `inspect` command shows the two intermediate stages of the Markdown pipeline:
//!
//! 1. **Tokenization** - Markdown text → event stream
//!    - `tokens`: one indented line per event, with the covered source text
//!    - `tokens-json`: the events as JSON
//!
//! 2. **Tree building** - events → syntax tree
//!    - `tree`: the tree as JSON (default)
//!
//! ## Extra Parameters
//!
//! - `pretty`: indent JSON output (`true` by default)
//! - `positions`: keep source positions in `tree` output (`true` by default)
//! - `gfm-task-list-items`: recognize checkboxes (`true` by default)
//!
//! Example: `tasklist inspect todo.md tree --extra-positions false`

use std::collections::HashMap;
use tasklist_babel::formats::markdown::parser::{parse_from_markdown, ParseOptions};
use tasklist_babel::ir::events::{Event, EventKind};
use tasklist_babel::tokenizer::{tokenize, TokenizeOptions};

/// All available CLI transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["tokens", "tokens-json", "tree"];

/// Execute a named transform on Markdown source with optional extra parameters
///
/// Returns the transformed output, or an error message.
pub fn execute_transform(
    source: &str,
    transform_name: &str,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    let pretty = bool_param(extra_params, "pretty", true)?;
    let positions = bool_param(extra_params, "positions", true)?;
    let gfm_task_list_items = bool_param(extra_params, "gfm-task-list-items", true)?;

    match transform_name {
        "tokens" => {
            let events = tokenize(
                source,
                TokenizeOptions {
                    gfm_task_list_item: gfm_task_list_items,
                },
            );
            Ok(events_to_simple(source, &events))
        }
        "tokens-json" => {
            let events = tokenize(
                source,
                TokenizeOptions {
                    gfm_task_list_item: gfm_task_list_items,
                },
            );
            to_json(&events, pretty)
        }
        "tree" => {
            let options = ParseOptions {
                gfm_task_list_items,
            };
            let tree = parse_from_markdown(source, &options).map_err(|e| e.to_string())?;
            let tree = if positions {
                tree
            } else {
                tree.without_positions()
            };
            to_json(&tree, pretty)
        }
        other => Err(format!(
            "Unknown transform '{other}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map(|mut out| {
        out.push('\n');
        out
    })
    .map_err(|e| format!("JSON serialization failed: {e}"))
}

/// One line per event, indented by nesting depth.
fn events_to_simple(source: &str, events: &[Event]) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for event in events {
        if event.kind == EventKind::Exit {
            depth = depth.saturating_sub(1);
        }
        let kind = match event.kind {
            EventKind::Enter => "enter",
            EventKind::Exit => "exit",
        };
        let token = &event.token;
        out.push_str(&format!(
            "{}{kind} {:?} {}..{} {:?}\n",
            "  ".repeat(depth),
            token.kind,
            token.start,
            token.end,
            token.slice(source)
        ));
        if event.kind == EventKind::Enter {
            depth += 1;
        }
    }
    out
}

fn bool_param(params: &HashMap<String, String>, key: &str, default: bool) -> Result<bool, String> {
    match params.get(key).map(|value| value.to_lowercase()) {
        None => Ok(default),
        Some(value) => match value.as_str() {
            "" | "true" | "1" | "yes" | "y" => Ok(true),
            "false" | "0" | "no" | "n" => Ok(false),
            other => Err(format!("Invalid boolean value '{other}' for --extra-{key}")),
        },
    }
}
