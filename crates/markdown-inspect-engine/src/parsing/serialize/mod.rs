//! # Tree Serialization
//!
//! Walks the structural tree and turns every prose-bearing block into
//! sentences whose offsets point into the original text.
//!
//! - **`inline`**: flattens inline nodes into markup-free text with a
//!   per-character span table
//! - **`segment`**: runs the tokenizer and cuts the text into sentences
//!
//! [`serialize`] is a pure function of the tree and its context; it keeps no
//! state between calls.

mod inline;
mod segment;

use markdown_inspect_config::UnknownNodePolicy;

use inline::InlineCollector;
use segment::segment;

use super::cancel::CancellationToken;
use super::offsets::{OffsetIndex, SourceMap};
use super::structure::{NodeKind, StructuralNode};
use crate::error::{PipelineError, SerializationFault};
use crate::models::{BlockKind, Sentence, SentenceContext};
use crate::tokenizer::Tokenizer;

/// Everything the serializer reads besides the tree itself.
#[derive(Debug, Clone, Copy)]
pub struct SerializeContext<'a> {
    pub source_map: &'a SourceMap,
    pub offsets: &'a OffsetIndex,
    pub tokenizer: &'a dyn Tokenizer,
    pub unknown_nodes: UnknownNodePolicy,
    pub cancel: Option<&'a CancellationToken>,
}

/// A segmentation unit and the sentences found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedBlock {
    pub context: SentenceContext,
    pub sentences: Vec<Sentence>,
}

/// Position of the walk in the container hierarchy.
#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    list_depth: usize,
    quote_depth: usize,
    /// Innermost enclosing list is ordered.
    ordered: bool,
    in_item: bool,
    in_footnote: bool,
    table_header: bool,
}

impl Frame {
    fn context(&self, block: BlockKind) -> SentenceContext {
        SentenceContext {
            block,
            list_depth: self.list_depth,
            quote_depth: self.quote_depth,
        }
    }

    fn paragraph_kind(&self) -> BlockKind {
        if self.in_item {
            BlockKind::ListItem {
                ordered: self.ordered,
            }
        } else if self.in_footnote {
            BlockKind::Footnote
        } else {
            BlockKind::Paragraph
        }
    }
}

/// Serializes `root` into blocks of sentences, in document order.
pub fn serialize(
    root: &StructuralNode,
    cx: &SerializeContext<'_>,
) -> Result<Vec<SerializedBlock>, PipelineError> {
    let mut walker = Walker {
        cx,
        blocks: Vec::new(),
    };
    if root.kind == NodeKind::Document {
        for child in &root.children {
            walker.check_cancelled()?;
            walker.walk(child, Frame::default())?;
        }
    } else {
        walker.walk(root, Frame::default())?;
    }
    Ok(walker.blocks)
}

struct Walker<'a, 'b> {
    cx: &'b SerializeContext<'a>,
    blocks: Vec<SerializedBlock>,
}

impl Walker<'_, '_> {
    fn check_cancelled(&self) -> Result<(), PipelineError> {
        if self.cx.cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    fn walk(&mut self, node: &StructuralNode, frame: Frame) -> Result<(), PipelineError> {
        match &node.kind {
            NodeKind::Document | NodeKind::Table | NodeKind::TableRow => {
                self.walk_children(node, frame)?
            }
            NodeKind::BlockQuote => self.walk_children(
                node,
                Frame {
                    quote_depth: frame.quote_depth + 1,
                    ..frame
                },
            )?,
            NodeKind::List { ordered } => self.walk_children(
                node,
                Frame {
                    list_depth: frame.list_depth + 1,
                    ordered: *ordered,
                    ..frame
                },
            )?,
            NodeKind::ListItem => self.walk_item(node, frame)?,
            NodeKind::TableHead => self.walk_children(
                node,
                Frame {
                    table_header: true,
                    ..frame
                },
            )?,
            NodeKind::FootnoteDefinition { .. } => self.walk_children(
                node,
                Frame {
                    in_footnote: true,
                    ..frame
                },
            )?,
            NodeKind::Heading { level } => {
                self.segment(&node.children, frame.context(BlockKind::Heading { level: *level }))?
            }
            NodeKind::Paragraph => {
                self.segment(&node.children, frame.context(frame.paragraph_kind()))?
            }
            NodeKind::TableCell => self.segment(
                &node.children,
                frame.context(BlockKind::TableCell {
                    header: frame.table_header,
                }),
            )?,
            kind if kind.is_opaque() => {}
            NodeKind::Other(name) => self.walk_other(node, name, frame)?,
            // Inline content directly under a container.
            _ => self.segment(
                std::slice::from_ref(node),
                frame.context(frame.paragraph_kind()),
            )?,
        }
        Ok(())
    }

    fn walk_children(&mut self, node: &StructuralNode, frame: Frame) -> Result<(), PipelineError> {
        for child in &node.children {
            self.walk(child, frame)?;
        }
        Ok(())
    }

    /// Tight list items hold inline content directly; runs of it between
    /// nested blocks are segmented on their own.
    fn walk_item(&mut self, node: &StructuralNode, frame: Frame) -> Result<(), PipelineError> {
        let frame = Frame {
            in_item: true,
            ..frame
        };
        let context = frame.context(frame.paragraph_kind());
        let mut pending: Vec<StructuralNode> = Vec::new();
        for child in &node.children {
            if child.kind.is_block() {
                self.segment(&pending, context.clone())?;
                pending.clear();
                self.walk(child, frame)?;
            } else {
                pending.push(child.clone());
            }
        }
        self.segment(&pending, context)
    }

    fn walk_other(
        &mut self,
        node: &StructuralNode,
        name: &str,
        frame: Frame,
    ) -> Result<(), PipelineError> {
        if self.cx.unknown_nodes == UnknownNodePolicy::Strict {
            return Err(SerializationFault::UnknownNode {
                kind: name.to_string(),
            }
            .into());
        }
        log::debug!("no mapping for {name} node at bytes {:?}, reading through it", node.span);
        if node.children.iter().any(|c| c.kind.is_block()) {
            self.walk_children(node, frame)
        } else {
            self.segment(
                std::slice::from_ref(node),
                frame.context(BlockKind::Other(name.to_string())),
            )
        }
    }

    fn segment(
        &mut self,
        nodes: &[StructuralNode],
        context: SentenceContext,
    ) -> Result<(), PipelineError> {
        let mut collector = InlineCollector::new(self.cx.source_map, self.cx.unknown_nodes);
        for node in nodes {
            collector.collect(node)?;
        }
        let run = collector.finish();
        if run.is_empty() {
            return Ok(());
        }
        let sentences = segment(&run, self.cx.tokenizer, self.cx.offsets, &context)?;
        if !sentences.is_empty() {
            self.blocks.push(SerializedBlock { context, sentences });
        }
        Ok(())
    }
}
