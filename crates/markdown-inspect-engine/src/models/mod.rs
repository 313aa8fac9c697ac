pub mod document;
pub mod preprocessor_rule;
pub mod sentence;

pub use document::{Block, Document, DocumentBuilder, Section};
pub use preprocessor_rule::{PreprocessorRule, RuleKind, RuleScope};
pub use sentence::{BlockKind, Sentence, SentenceContext, Token};
pub use crate::tokenizer::TokenKind;
