use std::ops::Range;
use std::sync::Arc;

use super::preprocessor_rule::PreprocessorRule;
use super::sentence::{Sentence, SentenceContext, Token};
use crate::error::SerializationFault;
use crate::parsing::offsets::{LineColumn, OffsetIndex, Span};
use crate::tokenizer::Tokenizer;

/// A segmented block: its context and the sentences it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub context: SentenceContext,
    /// Indices into [`Document::sentences`].
    pub sentences: Range<usize>,
}

/// A heading and the blocks up to the next heading of any level.
///
/// Blocks before the first heading form a preamble section of level 0 with
/// an empty header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: u8,
    /// Indices into [`Document::sentences`] of the heading text.
    pub header: Range<usize>,
    /// Indices into [`Document::blocks`], heading block excluded.
    pub blocks: Range<usize>,
}

/// The parsed representation of one input file.
///
/// Immutable once built and safe to share across threads. Every span refers
/// to [`source`](Self::source): the input with line terminators normalized to
/// `\n` and a final `\n` guaranteed.
#[derive(Debug, Clone)]
pub struct Document {
    file_name: Option<String>,
    source: String,
    offsets: OffsetIndex,
    sentences: Vec<Sentence>,
    blocks: Vec<Block>,
    sections: Vec<Section>,
    rules: Vec<PreprocessorRule>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl Document {
    pub fn builder(tokenizer: Arc<dyn Tokenizer>) -> DocumentBuilder {
        DocumentBuilder::new(tokenizer)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn offsets(&self) -> &OffsetIndex {
        &self.offsets
    }

    pub fn line_count(&self) -> usize {
        self.offsets.line_count()
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn preprocessor_rules(&self) -> &[PreprocessorRule] {
        &self.rules
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    pub fn block_sentences(&self, block: &Block) -> &[Sentence] {
        self.sentences.get(block.sentences.clone()).unwrap_or(&[])
    }

    pub fn header_sentences(&self, section: &Section) -> &[Sentence] {
        self.sentences.get(section.header.clone()).unwrap_or(&[])
    }

    pub fn position(&self, offset: usize) -> Option<LineColumn> {
        self.offsets.resolve(offset)
    }

    /// The original characters covered by `span`.
    pub fn source_slice(&self, span: Span) -> Option<String> {
        if span.start > span.end || span.end > self.offsets.total_len() {
            return None;
        }
        Some(
            self.source
                .chars()
                .skip(span.start)
                .take(span.len())
                .collect(),
        )
    }

    /// True if a directive silences `rule` on the 0-based `line`.
    pub fn is_suppressed(&self, rule: &str, line: usize) -> bool {
        self.rules.iter().any(|r| r.applies_to(rule, line))
    }

    /// Directives whose scope covers `line`.
    pub fn suppressed_rules_at(&self, line: usize) -> impl Iterator<Item = &PreprocessorRule> {
        self.rules.iter().filter(move |r| r.covers(line))
    }

    /// Sentences with at least one character on `line`.
    pub fn sentences_in_line(&self, line: usize) -> impl Iterator<Item = &Sentence> {
        let bounds = self
            .offsets
            .line_start(line)
            .zip(self.offsets.line_len(line))
            .map(|(start, len)| Span::new(start, start + len));
        self.sentences
            .iter()
            .filter(move |s| bounds.is_some_and(|line| s.span.overlaps(line)))
    }

    /// Re-runs the document's tokenizer over a sentence's content, anchoring
    /// the new tokens in the original text.
    pub fn retokenize(&self, sentence: &Sentence) -> Vec<Token> {
        let chars: Vec<char> = sentence.content.chars().collect();
        self.tokenizer
            .tokenize(&sentence.content)
            .into_iter()
            .filter(|t| t.start < t.end && t.end <= chars.len())
            .map(|t| Token {
                surface: chars[t.start..t.end].iter().collect(),
                kind: t.kind,
                span: Span::new(
                    sentence.offset_map[t.start].start,
                    sentence.offset_map[t.end - 1].end,
                ),
            })
            .collect()
    }
}

/// Accumulates the pipeline's output and validates it into a [`Document`].
#[derive(Debug)]
pub struct DocumentBuilder {
    file_name: Option<String>,
    source: String,
    offsets: OffsetIndex,
    rules: Vec<PreprocessorRule>,
    sentences: Vec<Sentence>,
    blocks: Vec<Block>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl DocumentBuilder {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            file_name: None,
            source: String::new(),
            offsets: OffsetIndex::new(),
            rules: Vec::new(),
            sentences: Vec::new(),
            blocks: Vec::new(),
            tokenizer,
        }
    }

    pub fn file_name(mut self, name: Option<&str>) -> Self {
        self.file_name = name.map(String::from);
        self
    }

    pub fn source(mut self, source: String, offsets: OffsetIndex) -> Self {
        self.source = source;
        self.offsets = offsets;
        self
    }

    pub fn preprocessor_rules(mut self, rules: Vec<PreprocessorRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Appends a block. Blocks without sentences are dropped.
    pub fn push_block(&mut self, context: SentenceContext, sentences: Vec<Sentence>) {
        if sentences.is_empty() {
            return;
        }
        let start = self.sentences.len();
        self.sentences.extend(sentences);
        self.blocks.push(Block {
            context,
            sentences: start..self.sentences.len(),
        });
    }

    pub fn build(self) -> Result<Document, SerializationFault> {
        let total = self.offsets.total_len();
        let source_len = self.source.chars().count();
        if source_len != total {
            return Err(fault(source_len, total, "source length"));
        }
        for (index, sentence) in self.sentences.iter().enumerate() {
            check_sentence(index, sentence, total)?;
        }

        let sections = build_sections(&self.blocks);
        Ok(Document {
            file_name: self.file_name,
            source: self.source,
            offsets: self.offsets,
            sentences: self.sentences,
            blocks: self.blocks,
            sections,
            rules: self.rules,
            tokenizer: self.tokenizer,
        })
    }
}

fn fault(offset: usize, total: usize, context: impl Into<String>) -> SerializationFault {
    SerializationFault::OffsetOutOfRange {
        offset,
        total,
        context: context.into(),
    }
}

fn check_span(span: Span, total: usize, context: impl Fn() -> String) -> Result<(), SerializationFault> {
    if span.start > span.end {
        return Err(fault(span.start, total, context()));
    }
    if span.end > total {
        return Err(fault(span.end, total, context()));
    }
    Ok(())
}

fn check_sentence(index: usize, sentence: &Sentence, total: usize) -> Result<(), SerializationFault> {
    check_span(sentence.span, total, || format!("sentence {index}"))?;
    if sentence.offset_map.len() != sentence.content.chars().count() {
        return Err(fault(
            sentence.offset_map.len(),
            total,
            format!("sentence {index} offset map length"),
        ));
    }
    for (i, span) in sentence.offset_map.iter().enumerate() {
        check_span(*span, total, || format!("sentence {index} character {i}"))?;
    }
    for (i, token) in sentence.tokens.iter().enumerate() {
        check_span(token.span, total, || format!("sentence {index} token {i}"))?;
    }
    Ok(())
}

fn build_sections(blocks: &[Block]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section {
        level: 0,
        header: 0..0,
        blocks: 0..0,
    };
    for (index, block) in blocks.iter().enumerate() {
        if let Some(level) = block.context.heading_level() {
            if current.level > 0 || !current.blocks.is_empty() {
                sections.push(current);
            }
            current = Section {
                level,
                header: block.sentences.clone(),
                blocks: index + 1..index + 1,
            };
        } else {
            if current.blocks.is_empty() {
                current.blocks = index..index;
            }
            current.blocks.end = index + 1;
        }
    }
    if current.level > 0 || !current.blocks.is_empty() {
        sections.push(current);
    }
    sections
}
