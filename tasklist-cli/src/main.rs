// Command-line interface for tasklist
//
// This binary reads and writes Markdown task lists through the tasklist-babel library.
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the file extension, while being overwrittable by an explicit --from flag.
// Usage:
//  tasklist <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  tasklist convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  tasklist format <input>                - Normalize a Markdown file (stdout)
//  tasklist inspect <path> [<transform>]  - Show tokens or the tree (defaults to "tree")
//  tasklist --list-formats                - List formats and transforms
//
// Extra Parameters:
//
// Parameters can be passed using --extra-<parameter-name> <value>.
// Keys that name a configuration knob (bullet, list-item-indent, pretty, ...) override the loaded
// configuration; the rest are passed to the target format.
// Example:
//  tasklist todo.md --to markdown --extra-bullet - --extra-list-item-indent tab

use tasklist_cli::transforms;

use clap::{Arg, ArgAction, Command, ValueHint};
use std::collections::HashMap;
use std::fs;
use tasklist_babel::formats::markdown::MarkdownFormat;
use tasklist_babel::FormatRegistry;
use tasklist_config::{Loader, TasklistConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// `--extra-*` keys that map onto configuration keys, and whether they hold booleans.
const CONFIG_OVERRIDES: &[(&str, &str, bool)] = &[
    ("bullet", "markdown.bullet", false),
    ("bullet-ordered", "markdown.bullet_ordered", false),
    ("list-item-indent", "markdown.list_item_indent", false),
    ("increment-list-marker", "markdown.increment_list_marker", true),
    ("gfm-task-list-items", "markdown.gfm_task_list_items", true),
    ("pretty", "json.pretty", true),
    ("positions", "json.positions", true),
];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key {
            // A following arg is the value unless it is another flag. A lone `-` is a value
            // (`--extra-bullet -`).
            let value = args
                .get(i + 1)
                .filter(|next| next.as_str() == "-" || !next.starts_with('-'));

            match value {
                Some(value) => {
                    extra_params.insert(key.to_string(), value.clone());
                    i += 2;
                }
                None => {
                    extra_params.insert(key.to_string(), "true".to_string());
                    i += 1;
                }
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("tasklist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and normalizing Markdown task lists")
        .long_about(
            "tasklist reads Markdown with GFM task list items (`* [x] done`) and writes it back.\n\n\
            Commands:\n  \
            - convert: Transform between formats (markdown, json)\n  \
            - format:  Normalize a Markdown file\n  \
            - inspect: View tokens or the syntax tree\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            tasklist todo.md --to json                      # Syntax tree as JSON\n  \
            tasklist todo.json --to markdown -o todo.md     # Back to Markdown\n  \
            tasklist format todo.md --extra-bullet -        # Normalize with '-' bullets\n  \
            tasklist inspect todo.md tokens                 # Token stream",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and inspect transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a tasklist.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log pipeline details to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the tokens or the syntax tree of a Markdown file")
                .long_about(
                    "View a Markdown file at different processing stages.\n\n\
                    Transforms:\n  \
                    - tree:        Syntax tree as JSON (default)\n  \
                    - tokens:      Event stream, one line per event\n  \
                    - tokens-json: Event stream as JSON\n\n\
                    Extra Parameters:\n  \
                    --extra-positions false   Drop source positions from the tree\n  \
                    --extra-pretty false      Compact JSON\n\n\
                    Examples:\n  \
                    tasklist inspect todo.md                  # Tree (default)\n  \
                    tasklist inspect todo.md tokens           # Token stream",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'tree'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between formats (default command)")
                .long_about(
                    "Convert documents between formats.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown with task list items (.md, .markdown)\n  \
                    - json:     Syntax tree as JSON (.json)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    tasklist convert todo.md --to json           # Tree as JSON (stdout)\n  \
                    tasklist convert todo.json --to markdown     # JSON back to Markdown\n  \
                    tasklist todo.md --to json                   # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("format")
                .about("Normalize a Markdown file")
                .long_about(
                    "Parse a Markdown file and serialize it again with the configured\n\
                    bullet, indentation and numbering. Checkboxes are normalized to\n\
                    `[ ]` and `[x]`.\n\n\
                    Output is always written to stdout.\n\n\
                    Examples:\n  \
                    tasklist format todo.md                 # Format to stdout\n  \
                    tasklist format todo.md > clean.md      # Redirect to file",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A first arg that is not a flag or a known subcommand is an input file
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["inspect", "convert", "format", "help"].contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_tracing(matches.get_flag("verbose"));

    let overrides = take_config_overrides(&mut extra_params);
    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &overrides,
    );
    debug!(?config, "configuration loaded");

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&config);
        return;
    }

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or("tree");
            handle_inspect_command(path, transform, &extra_params, &config);
        }
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let from_arg = sub_matches.get_one::<String>("from");
            let to = sub_matches.get_one::<String>("to").expect("to is required");

            // Auto-detect --from if not provided
            let from = if let Some(f) = from_arg {
                f.to_string()
            } else {
                match build_registry(&config).detect_format_from_filename(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect format from filename '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                }
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("format", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            // Format command always outputs to stdout (no -o flag)
            handle_convert_command(input, "markdown", "markdown", None, &extra_params, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Default registry with the Markdown format replaced by one built from the configuration.
fn build_registry(config: &TasklistConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::default();
    registry.register(MarkdownFormat::new(
        (&config.markdown).into(),
        (&config.markdown).into(),
    ));
    registry
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    transform: &str,
    extra_params: &HashMap<String, String>,
    config: &TasklistConfig,
) {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let params = build_inspect_params(config, extra_params);

    let output = transforms::execute_transform(&source, transform, &params).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });

    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &TasklistConfig,
) {
    let registry = build_registry(config);

    // Validate formats exist
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let tree = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });
    debug!(from, to, "parsed input");

    let mut format_options = if to == "json" {
        json_params_from_config(config)
    } else {
        HashMap::new()
    };
    for (key, value) in extra_params {
        format_options.insert(key.clone(), value.clone());
    }

    let result = registry
        .serialize_with_options(&tree, to, &format_options)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

/// Handle the list-formats flag
fn handle_list_formats_command(config: &TasklistConfig) {
    let registry = build_registry(config);
    println!("Conversion formats:");
    for format_name in registry.list_formats() {
        let description = registry
            .get(&format_name)
            .map(|format| format.description().to_string())
            .unwrap_or_default();
        println!("  {format_name:<10} {description}");
    }

    println!("\nInspect transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

/// Remove the `--extra-*` keys that name configuration knobs, as `(config key, value)` pairs.
fn take_config_overrides(
    extra_params: &mut HashMap<String, String>,
) -> Vec<(&'static str, ConfigValue)> {
    let mut overrides = Vec::new();
    for (flag, key, is_bool) in CONFIG_OVERRIDES {
        if let Some(raw) = extra_params.remove(*flag) {
            let value = if *is_bool {
                ConfigValue::Bool(parse_bool_arg(flag, &raw))
            } else {
                ConfigValue::Text(raw)
            };
            overrides.push((*key, value));
        }
    }
    overrides
}

#[derive(Debug, Clone, PartialEq)]
enum ConfigValue {
    Bool(bool),
    Text(String),
}

fn load_cli_config(
    explicit_path: Option<&str>,
    overrides: &[(&'static str, ConfigValue)],
) -> TasklistConfig {
    let loader = Loader::new().with_optional_file("tasklist.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    let loader = apply_config_overrides(loader, overrides).unwrap_or_else(|err| {
        eprintln!("Invalid configuration override: {err}");
        std::process::exit(1);
    });

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(
    mut loader: Loader,
    overrides: &[(&'static str, ConfigValue)],
) -> Result<Loader, tasklist_config::ConfigError> {
    for (key, value) in overrides {
        loader = match value {
            ConfigValue::Bool(flag) => loader.set_override(key, *flag)?,
            ConfigValue::Text(text) => loader.set_override(key, text.as_str())?,
        };
    }
    Ok(loader)
}

fn build_inspect_params(
    config: &TasklistConfig,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut params = json_params_from_config(config);
    params.insert(
        "gfm-task-list-items".to_string(),
        config.markdown.gfm_task_list_items.to_string(),
    );

    for (key, value) in overrides {
        params.insert(key.clone(), value.clone());
    }

    params
}

fn json_params_from_config(config: &TasklistConfig) -> HashMap<String, String> {
    let mut params = HashMap::new();
    params.insert("pretty".to_string(), config.json.pretty.to_string());
    params.insert("positions".to_string(), config.json.positions.to_string());
    params
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
