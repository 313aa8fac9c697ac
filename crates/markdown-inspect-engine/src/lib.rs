pub mod error;
pub mod models;
pub mod parsing;
pub mod tokenizer;

pub use markdown_inspect_config as config;

// Re-export key types for easier usage
pub use error::{PipelineError, ReadFailure, SerializationFault};
pub use models::*;
pub use parsing::offsets::{LineColumn, Span};
pub use parsing::{CancellationToken, MarkdownParser};
