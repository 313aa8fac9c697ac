pub mod index;
pub mod source_map;
pub mod span;

pub use index::{LineColumn, OffsetIndex};
pub use source_map::SourceMap;
pub use span::Span;
