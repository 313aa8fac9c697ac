use std::collections::BTreeSet;

use markdown_inspect_config::UnknownNodePolicy;

use crate::error::SerializationFault;
use crate::parsing::offsets::{SourceMap, Span};
use crate::parsing::structure::{NodeKind, StructuralNode};

/// Markup-free text of one segmentation unit, with the original span of each
/// character and the positions where inline markup started or ended.
#[derive(Debug, Default)]
pub(super) struct InlineRun {
    pub chars: Vec<char>,
    pub spans: Vec<Span>,
    /// Character indices that tokens must not straddle.
    pub breaks: BTreeSet<usize>,
}

impl InlineRun {
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    fn mark_break(&mut self) {
        if !self.chars.is_empty() {
            self.breaks.insert(self.chars.len());
        }
    }
}

/// Flattens inline nodes into an [`InlineRun`].
pub(super) struct InlineCollector<'a> {
    source_map: &'a SourceMap,
    unknown_nodes: UnknownNodePolicy,
    run: InlineRun,
}

impl<'a> InlineCollector<'a> {
    pub fn new(source_map: &'a SourceMap, unknown_nodes: UnknownNodePolicy) -> Self {
        Self {
            source_map,
            unknown_nodes,
            run: InlineRun::default(),
        }
    }

    pub fn finish(self) -> InlineRun {
        self.run
    }

    pub fn collect(&mut self, node: &StructuralNode) -> Result<(), SerializationFault> {
        match &node.kind {
            NodeKind::Text => self.push_text(node)?,
            NodeKind::Code => {
                self.run.mark_break();
                self.push_text(node)?;
                self.run.mark_break();
            }
            NodeKind::SoftBreak | NodeKind::HardBreak => {
                self.run.mark_break();
                let span = self.map_range(node)?;
                self.run.chars.push(' ');
                self.run.spans.push(span);
                self.run.mark_break();
            }
            NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Strikethrough
            | NodeKind::Link { .. } => {
                self.run.mark_break();
                self.collect_children(node)?;
                self.run.mark_break();
            }
            kind if kind.is_opaque() => self.run.mark_break(),
            NodeKind::Other(name) => {
                if self.unknown_nodes == UnknownNodePolicy::Strict {
                    return Err(SerializationFault::UnknownNode { kind: name.clone() });
                }
                log::debug!("treating inline {name} node as plain text");
                self.push_text(node)?;
                self.collect_children(node)?;
            }
            _ => self.collect_children(node)?,
        }
        Ok(())
    }

    fn collect_children(&mut self, node: &StructuralNode) -> Result<(), SerializationFault> {
        for child in &node.children {
            self.collect(child)?;
        }
        Ok(())
    }

    fn to_original(&self, byte: usize, node: &StructuralNode) -> Result<usize, SerializationFault> {
        self.source_map
            .to_original(byte)
            .ok_or_else(|| SerializationFault::OffsetOutOfRange {
                offset: byte,
                total: self.source_map.text().len(),
                context: format!("{:?} node at bytes {:?}", node.kind, node.span),
            })
    }

    fn map_range(&self, node: &StructuralNode) -> Result<Span, SerializationFault> {
        Ok(Span::new(
            self.to_original(node.span.start, node)?,
            self.to_original(node.span.end, node)?,
        ))
    }

    fn push_text(&mut self, node: &StructuralNode) -> Result<(), SerializationFault> {
        let Some(text) = node.text.as_deref() else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }
        let source_map = self.source_map;
        let source = source_map.text();
        let slice = source.get(node.span.clone());
        let verbatim_at = match (&node.kind, slice) {
            (_, Some(s)) if s == text => Some(node.span.start),
            // Code span text sits between its backticks; a line end inside
            // it reads as one space.
            (NodeKind::Code, Some(s)) => s
                .replace('\n', " ")
                .find(text)
                .map(|i| node.span.start + i),
            _ => None,
        };
        if let Some(first) = verbatim_at {
            // Characters of one preprocessed line are contiguous in the
            // original; only a line end can jump.
            let mut at = self.to_original(first, node)?;
            for (i, c) in text.char_indices() {
                self.run.chars.push(c);
                self.run.spans.push(Span::new(at, at + 1));
                at = if source.as_bytes().get(first + i) == Some(&b'\n') {
                    self.to_original(first + i + 1, node)?
                } else {
                    at + 1
                };
            }
        } else {
            // Escapes and entities: no per-character correspondence.
            let span = self.map_range(node)?;
            for c in text.chars() {
                self.run.chars.push(c);
                self.run.spans.push(span);
            }
        }
        Ok(())
    }
}
