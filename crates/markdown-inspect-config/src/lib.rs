use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid parser configuration: {0}")]
    Invalid(String),
}

/// What happens to a line that carries a preprocessor directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectivePolicy {
    /// Replace the line with spaces so every offset stays where it was.
    #[default]
    Blank,
    /// Drop the line from the text handed to the structural parser.
    Remove,
    /// Hand the line to the structural parser unchanged.
    Keep,
}

/// How the serializer treats node kinds it has no mapping for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownNodePolicy {
    /// Treat the node's text as plain inline content.
    #[default]
    Lenient,
    /// Abort the document with a serialization fault.
    Strict,
}

/// Markdown extensions requested from the structural parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub hard_wraps: bool,
    pub autolinks: bool,
    pub fenced_code_blocks: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub footnotes: bool,
    /// `[ ]`/`[x]` markers at the start of list items.
    pub tasklists: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            hard_wraps: true,
            autolinks: true,
            fenced_code_blocks: true,
            tables: true,
            strikethrough: false,
            footnotes: false,
            tasklists: true,
        }
    }
}

/// Sentence boundary settings for the default tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceConfig {
    pub terminators: Vec<char>,
    pub abbreviations: Vec<String>,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            terminators: vec!['.', '?', '!', '。', '？', '！'],
            abbreviations: ["Mr", "Mrs", "Ms", "Dr", "St", "vs", "etc", "e.g", "i.e"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub directive_policy: DirectivePolicy,
    pub unknown_nodes: UnknownNodePolicy,
    pub structural_timeout_ms: u64,
    pub extensions: ExtensionConfig,
    pub sentence: SentenceConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            directive_policy: DirectivePolicy::default(),
            unknown_nodes: UnknownNodePolicy::default(),
            structural_timeout_ms: 10_000,
            extensions: ExtensionConfig::default(),
            sentence: SentenceConfig::default(),
        }
    }
}

impl ParserConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: ParserConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(Some(config))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Checks the settings the pipeline cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.structural_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "structural_timeout_ms must be greater than zero".to_string(),
            ));
        }

        let ext = &self.extensions;
        let missing: Vec<&str> = [
            ("hard_wraps", ext.hard_wraps),
            ("autolinks", ext.autolinks),
            ("fenced_code_blocks", ext.fenced_code_blocks),
            ("tables", ext.tables),
        ]
        .into_iter()
        .filter(|(_, enabled)| !enabled)
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "required extensions disabled: {}",
                missing.join(", ")
            )));
        }

        if self.sentence.terminators.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one sentence terminator is required".to_string(),
            ));
        }

        Ok(())
    }

    pub fn structural_timeout(&self) -> Duration {
        Duration::from_millis(self.structural_timeout_ms)
    }
}
