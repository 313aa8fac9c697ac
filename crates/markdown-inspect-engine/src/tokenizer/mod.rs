//! Sentence and word tokenization.
//!
//! The pipeline only depends on the [`Tokenizer`] trait; locale-specific
//! tokenizers plug in behind it. [`SimpleTokenizer`] is the default.

mod simple;

use std::fmt::Debug;

use serde::Serialize;

pub use simple::SimpleTokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Word,
    Punctuation,
    Whitespace,
}

/// A token in tokenizer-local character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
    /// This token closes a sentence.
    pub sentence_end: bool,
}

impl TokenSpan {
    pub fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Self {
            start,
            end,
            kind,
            sentence_end: false,
        }
    }
}

/// Splits text into an ordered, gap-free sequence of tokens with sentence
/// boundary flags.
///
/// Implementations must cover every character of the input exactly once, in
/// order. Offsets count characters, not bytes.
pub trait Tokenizer: Send + Sync + Debug {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan>;
}
