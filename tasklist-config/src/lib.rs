//! Shared configuration loader for the tasklist toolchain.
//!
//! `defaults/tasklist.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`TasklistConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use tasklist_babel::formats::markdown::parser::ParseOptions;
use tasklist_babel::formats::markdown::serializer::{ListItemIndent, SerializeOptions};

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/tasklist.default.toml");

/// Top-level configuration consumed by tasklist applications.
#[derive(Debug, Clone, Deserialize)]
pub struct TasklistConfig {
    pub markdown: MarkdownConfig,
    pub json: JsonConfig,
}

/// Mirrors the knobs exposed by the Markdown parser and serializer.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub bullet: char,
    pub bullet_ordered: char,
    pub list_item_indent: ListItemIndent,
    pub increment_list_marker: bool,
    pub gfm_task_list_items: bool,
}

impl From<&MarkdownConfig> for SerializeOptions {
    fn from(config: &MarkdownConfig) -> Self {
        SerializeOptions {
            bullet: config.bullet,
            bullet_ordered: config.bullet_ordered,
            list_item_indent: config.list_item_indent,
            increment_list_marker: config.increment_list_marker,
            gfm_task_list_items: config.gfm_task_list_items,
        }
    }
}

impl From<&MarkdownConfig> for ParseOptions {
    fn from(config: &MarkdownConfig) -> Self {
        ParseOptions {
            gfm_task_list_items: config.gfm_task_list_items,
        }
    }
}

/// Controls JSON output of trees and tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonConfig {
    pub pretty: bool,
    pub positions: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<TasklistConfig, ConfigError> {
        let config: TasklistConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl TasklistConfig {
    /// Reject marker characters the serializer cannot write.
    fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.markdown.bullet, '*' | '-' | '+') {
            return Err(ConfigError::Message(format!(
                "markdown.bullet must be one of *, - or +, found '{}'",
                self.markdown.bullet
            )));
        }
        if !matches!(self.markdown.bullet_ordered, '.' | ')') {
            return Err(ConfigError::Message(format!(
                "markdown.bullet_ordered must be . or ), found '{}'",
                self.markdown.bullet_ordered
            )));
        }
        Ok(())
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<TasklistConfig, ConfigError> {
    Loader::new().build()
}
