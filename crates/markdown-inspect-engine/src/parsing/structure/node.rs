use std::ops::Range;

use markdown_inspect_config::ExtensionConfig;

/// Markdown extensions the structural parser is asked to honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extensions {
    /// Line breaks inside a paragraph are hard breaks.
    pub hard_wraps: bool,
    /// Bare `http(s)://` URLs become links.
    pub autolinks: bool,
    pub fenced_code_blocks: bool,
    pub tables: bool,
    pub strikethrough: bool,
    pub footnotes: bool,
    pub tasklists: bool,
}

impl Extensions {
    /// The extension set Markdown-flavor compatibility depends on.
    pub fn required() -> Self {
        Self {
            hard_wraps: true,
            autolinks: true,
            fenced_code_blocks: true,
            tables: true,
            strikethrough: false,
            footnotes: false,
            tasklists: true,
        }
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self::required()
    }
}

impl From<&ExtensionConfig> for Extensions {
    fn from(config: &ExtensionConfig) -> Self {
        Self {
            hard_wraps: config.hard_wraps,
            autolinks: config.autolinks,
            fenced_code_blocks: config.fenced_code_blocks,
            tables: config.tables,
            strikethrough: config.strikethrough,
            footnotes: config.footnotes,
            tasklists: config.tasklists,
        }
    }
}

/// Every node kind the serializer maps. Anything else the backend reports is
/// carried as [`NodeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    // Blocks
    Heading { level: u8 },
    Paragraph,
    BlockQuote,
    List { ordered: bool },
    ListItem,
    Table,
    TableHead,
    TableRow,
    TableCell,
    CodeBlock { language: Option<String> },
    HtmlBlock,
    FootnoteDefinition { label: String },
    Rule,
    // Inline containers
    Emphasis,
    Strong,
    Strikethrough,
    Link { destination: String },
    Image { destination: String },
    // Leaves
    Text,
    Code,
    Html,
    SoftBreak,
    HardBreak,
    FootnoteReference,
    TaskListMarker { checked: bool },
    /// A kind without a dedicated mapping, named after the backend's tag.
    Other(String),
}

impl NodeKind {
    /// Kinds that never carry prose.
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            NodeKind::CodeBlock { .. }
                | NodeKind::HtmlBlock
                | NodeKind::Html
                | NodeKind::Rule
                | NodeKind::Image { .. }
                | NodeKind::FootnoteReference
                | NodeKind::TaskListMarker { .. }
        )
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Heading { .. }
                | NodeKind::Paragraph
                | NodeKind::BlockQuote
                | NodeKind::List { .. }
                | NodeKind::ListItem
                | NodeKind::Table
                | NodeKind::TableHead
                | NodeKind::TableRow
                | NodeKind::TableCell
                | NodeKind::CodeBlock { .. }
                | NodeKind::HtmlBlock
                | NodeKind::FootnoteDefinition { .. }
                | NodeKind::Rule
        )
    }
}

/// A node of the structural tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralNode {
    pub kind: NodeKind,
    /// Byte range in the preprocessed buffer.
    pub span: Range<usize>,
    /// Decoded text, for leaves only.
    pub text: Option<String>,
    pub children: Vec<StructuralNode>,
}

impl StructuralNode {
    pub fn new(kind: NodeKind, span: Range<usize>) -> Self {
        Self {
            kind,
            span,
            text: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(kind: NodeKind, span: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<StructuralNode>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first, document-order iterator over this node and its
    /// descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &StructuralNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descendants_walk_in_document_order() {
        let tree = StructuralNode::new(NodeKind::Document, 0..12).with_children(vec![
            StructuralNode::new(NodeKind::Paragraph, 0..5)
                .with_children(vec![StructuralNode::leaf(NodeKind::Text, 0..5, "Hello")]),
            StructuralNode::new(NodeKind::Paragraph, 7..12)
                .with_children(vec![StructuralNode::leaf(NodeKind::Text, 7..12, "World")]),
        ]);

        let texts: Vec<&str> = tree
            .descendants()
            .filter_map(|n| n.text.as_deref())
            .collect();
        assert_eq!(texts, vec!["Hello", "World"]);
        assert_eq!(tree.descendants().count(), 5);
    }

    #[test]
    fn extensions_follow_config() {
        let config = ExtensionConfig {
            strikethrough: true,
            ..ExtensionConfig::default()
        };
        let ext = Extensions::from(&config);
        assert!(ext.strikethrough);
        assert!(ext.tables && ext.hard_wraps && ext.autolinks && ext.fenced_code_blocks);
    }
}
