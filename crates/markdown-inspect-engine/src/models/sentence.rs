use serde::Serialize;

use crate::parsing::offsets::{LineColumn, Span};
use crate::tokenizer::TokenKind;

/// The block-level construct a sentence was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    ListItem { ordered: bool },
    TableCell { header: bool },
    Footnote,
    /// Content of a node kind the serializer has no mapping for.
    Other(String),
}

/// Structural facts about where a sentence sits, so rules need not re-walk
/// the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceContext {
    pub block: BlockKind,
    /// Number of enclosing lists; 0 outside lists.
    pub list_depth: usize,
    /// Number of enclosing block quotes.
    pub quote_depth: usize,
}

impl SentenceContext {
    pub fn new(block: BlockKind) -> Self {
        Self {
            block,
            list_depth: 0,
            quote_depth: 0,
        }
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self.block {
            BlockKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self.block, BlockKind::ListItem { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub surface: String,
    pub kind: TokenKind,
    /// Absolute span in the original text.
    pub span: Span,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// A run of tokens with absolute offsets into the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    /// Markup-free text, as the tokenizer saw it.
    pub content: String,
    /// From the first character's start to the last character's end.
    pub span: Span,
    /// Resolved start of the sentence.
    pub position: LineColumn,
    /// Original span of every character of `content`, in order.
    pub offset_map: Vec<Span>,
    pub tokens: Vec<Token>,
    pub context: SentenceContext,
    /// First sentence of its block.
    pub is_first: bool,
}

impl Sentence {
    /// Absolute offset of the `index`-th character of `content`.
    pub fn offset_of(&self, index: usize) -> Option<usize> {
        self.offset_map.get(index).map(|span| span.start)
    }

    pub fn words(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_word())
    }
}
