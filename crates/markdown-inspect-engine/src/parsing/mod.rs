//! # Markdown ingestion pipeline
//!
//! Reads Markdown into a [`Document`] of sentences and tokens whose offsets
//! point into the original text, ready for rule evaluation.
//!
//! ```text
//! input ─► preprocess ─► offsets ─► structure ─► serialize ─► Document
//!           (directives)  (line index) (pulldown-cmark)  (sentences)
//! ```
//!
//! - **`preprocess`**: line reading, terminator normalization, directives
//! - **`offsets`**: offset index, spans and the preprocessed-to-original map
//! - **`structure`**: the external structural parser behind a trait
//! - **`serialize`**: structural tree to sentences
//! - **`snapshot`**: helpers for snapshot and invariant tests

pub mod cancel;
pub mod offsets;
pub mod preprocess;
pub mod serialize;
pub mod snapshot;
pub mod structure;

#[cfg(test)]
mod tests;

use std::io::{BufReader, Read};
use std::sync::Arc;

use markdown_inspect_config::{ConfigError, DirectivePolicy, ParserConfig, UnknownNodePolicy};

pub use cancel::CancellationToken;
use offsets::{OffsetIndex, SourceMap};
use preprocess::PreprocessingReader;
use serialize::{SerializeContext, serialize};
use structure::{CmarkParser, Extensions, StructuralParser, StructureError};

use crate::error::PipelineError;
use crate::models::Document;
use crate::tokenizer::{SimpleTokenizer, Tokenizer};

/// Runs the ingestion pipeline. Cheap to clone and safe to share: parse
/// independent documents from as many threads as needed.
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    structure: Arc<dyn StructuralParser>,
    tokenizer: Arc<dyn Tokenizer>,
    extensions: Extensions,
    directive_policy: DirectivePolicy,
    unknown_nodes: UnknownNodePolicy,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self {
            structure: Arc::new(CmarkParser::default()),
            tokenizer: Arc::new(SimpleTokenizer::default()),
            extensions: Extensions::required(),
            directive_policy: DirectivePolicy::default(),
            unknown_nodes: UnknownNodePolicy::default(),
        }
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            structure: Arc::new(CmarkParser::new(config.structural_timeout())),
            tokenizer: Arc::new(SimpleTokenizer::new(&config.sentence)),
            extensions: Extensions::from(&config.extensions),
            directive_policy: config.directive_policy,
            unknown_nodes: config.unknown_nodes,
        })
    }

    pub fn with_structural_parser(mut self, parser: Arc<dyn StructuralParser>) -> Self {
        self.structure = parser;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_directive_policy(mut self, policy: DirectivePolicy) -> Self {
        self.directive_policy = policy;
        self
    }

    pub fn with_unknown_nodes(mut self, policy: UnknownNodePolicy) -> Self {
        self.unknown_nodes = policy;
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn parse_str(&self, text: &str, file_name: Option<&str>) -> Result<Document, PipelineError> {
        self.parse(text.as_bytes(), file_name)
    }

    pub fn parse<R: Read>(&self, input: R, file_name: Option<&str>) -> Result<Document, PipelineError> {
        self.run(input, file_name, None)
    }

    /// Like [`parse`](Self::parse), returning [`PipelineError::Cancelled`] at
    /// the next stage boundary once `cancel` is set.
    pub fn parse_with_cancel<R: Read>(
        &self,
        input: R,
        file_name: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Document, PipelineError> {
        self.run(input, file_name, Some(cancel))
    }

    fn run<R: Read>(
        &self,
        input: R,
        file_name: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Document, PipelineError> {
        let label = file_name.unwrap_or("<input>");
        let result = self.run_stages(input, file_name, cancel);
        if let Err(PipelineError::Serialization(fault)) = &result {
            log::error!("{label}: {fault}");
        }
        result
    }

    fn run_stages<R: Read>(
        &self,
        input: R,
        file_name: Option<&str>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Document, PipelineError> {
        let label = file_name.unwrap_or("<input>");
        let check = || match cancel {
            Some(token) if token.is_cancelled() => Err(PipelineError::Cancelled),
            _ => Ok(()),
        };

        let mut reader = PreprocessingReader::new(BufReader::new(input), self.directive_policy);
        let mut offsets = OffsetIndex::new();
        let mut source = String::new();
        let mut source_map = SourceMap::new();
        for line in reader.by_ref() {
            let line = line?;
            let start = offsets.total_len();
            if let Some(processed) = line.processed() {
                source_map.push_line(start, &processed);
            }
            offsets.push(line.length);
            source.push_str(&line.text);
            source.push('\n');
        }
        let rules = reader.into_rules();
        log::debug!(
            "{label}: read {} lines, {} directives",
            offsets.line_count(),
            rules.len()
        );

        check()?;
        let root = self
            .structure
            .parse(source_map.text(), &self.extensions)
            .map_err(|e| match e {
                StructureError::Timeout { budget } => PipelineError::StructuralTimeout { budget },
                StructureError::Crashed(message) => PipelineError::StructuralCrash(message),
            })?;
        log::debug!("{label}: structural tree has {} top-level nodes", root.children.len());

        let cx = SerializeContext {
            source_map: &source_map,
            offsets: &offsets,
            tokenizer: self.tokenizer.as_ref(),
            unknown_nodes: self.unknown_nodes,
            cancel,
        };
        let blocks = serialize(&root, &cx)?;
        log::debug!("{label}: serialized {} blocks", blocks.len());

        let mut builder = Document::builder(Arc::clone(&self.tokenizer))
            .file_name(file_name)
            .source(source, offsets)
            .preprocessor_rules(rules);
        for block in blocks {
            builder.push_block(block.context, block.sentences);
        }
        Ok(builder.build()?)
    }
}
