//! # Structural Parsing
//!
//! The Markdown grammar is delegated to an external parser behind the
//! [`StructuralParser`] trait. The pipeline only sees the resulting
//! [`StructuralNode`] tree, whose spans are byte ranges into the preprocessed
//! buffer.
//!
//! - **`node`**: the closed [`NodeKind`] enum and the tree type
//! - **`cmark`**: [`CmarkParser`], the `pulldown-cmark` backed implementation
//!   run on a worker thread under a time budget
//! - **`autolink`**: bare URL detection for the autolinks extension

mod autolink;
mod cmark;
mod node;

use std::fmt::Debug;
use std::time::Duration;

pub use cmark::CmarkParser;
pub use node::{Extensions, NodeKind, StructuralNode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("structural parse exceeded its {budget:?} budget")]
    Timeout { budget: Duration },
    #[error("structural parser stopped without a result: {0}")]
    Crashed(String),
}

/// Parses the full preprocessed text into a tree of block and inline nodes.
///
/// Implementations must return within a bounded time or report
/// [`StructureError::Timeout`]; callers never retry.
pub trait StructuralParser: Send + Sync + Debug {
    fn parse(&self, text: &str, extensions: &Extensions) -> Result<StructuralNode, StructureError>;
}
