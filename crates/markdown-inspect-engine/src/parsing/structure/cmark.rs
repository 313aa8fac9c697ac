use std::fmt::Debug;
use std::ops::Range;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use super::autolink::link_bare_urls;
use super::node::{Extensions, NodeKind, StructuralNode};
use super::{StructuralParser, StructureError};

const DEFAULT_BUDGET: Duration = Duration::from_secs(10);

/// [`StructuralParser`] backed by `pulldown-cmark`.
///
/// Each parse runs on its own worker thread while the caller waits at most
/// `budget`. A parse that overruns is abandoned: the caller gets
/// [`StructureError::Timeout`] and the worker's result is discarded when it
/// eventually finishes.
#[derive(Debug, Clone)]
pub struct CmarkParser {
    budget: Duration,
}

impl CmarkParser {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl Default for CmarkParser {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl StructuralParser for CmarkParser {
    fn parse(&self, text: &str, extensions: &Extensions) -> Result<StructuralNode, StructureError> {
        let owned = text.to_owned();
        let extensions = *extensions;
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("markdown-structure".to_string())
            .spawn(move || {
                // The receiver is gone if the caller already timed out.
                let _ = tx.send(build_tree(&owned, &extensions));
            })
            .map_err(|e| StructureError::Crashed(e.to_string()))?;

        match rx.recv_timeout(self.budget) {
            Ok(root) => Ok(root),
            Err(RecvTimeoutError::Timeout) => Err(StructureError::Timeout {
                budget: self.budget,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(StructureError::Crashed(
                "worker exited without producing a tree".to_string(),
            )),
        }
    }
}

fn options_for(extensions: &Extensions) -> Options {
    let mut options = Options::empty();
    if extensions.tables {
        options.insert(Options::ENABLE_TABLES);
    }
    if extensions.strikethrough {
        options.insert(Options::ENABLE_STRIKETHROUGH);
    }
    if extensions.footnotes {
        options.insert(Options::ENABLE_FOOTNOTES);
    }
    if extensions.tasklists {
        options.insert(Options::ENABLE_TASKLISTS);
    }
    options
}

/// Name of an enum variant from its `Debug` output, e.g. `InlineMath`.
fn variant_name(value: &impl Debug) -> String {
    format!("{value:?}")
        .chars()
        .take_while(|c| c.is_alphanumeric())
        .collect()
}

fn kind_for_tag(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading { level: level as u8 },
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::CodeBlock(kind) => NodeKind::CodeBlock {
            language: match kind {
                CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                _ => None,
            },
        },
        Tag::HtmlBlock => NodeKind::HtmlBlock,
        Tag::List(start) => NodeKind::List {
            ordered: start.is_some(),
        },
        Tag::Item => NodeKind::ListItem,
        Tag::FootnoteDefinition(label) => NodeKind::FootnoteDefinition {
            label: label.to_string(),
        },
        Tag::Table(_) => NodeKind::Table,
        Tag::TableHead => NodeKind::TableHead,
        Tag::TableRow => NodeKind::TableRow,
        Tag::TableCell => NodeKind::TableCell,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Strikethrough,
        Tag::Link { dest_url, .. } => NodeKind::Link {
            destination: dest_url.to_string(),
        },
        Tag::Image { dest_url, .. } => NodeKind::Image {
            destination: dest_url.to_string(),
        },
        other => NodeKind::Other(variant_name(&other)),
    }
}

/// Assembles the pulldown-cmark event stream into a tree.
///
/// `Start`/`End` pairs open and close container nodes on a stack; every other
/// event becomes a leaf of the innermost open container.
struct TreeAssembler {
    stack: Vec<StructuralNode>,
    hard_wraps: bool,
}

impl TreeAssembler {
    fn new(len: usize, hard_wraps: bool) -> Self {
        Self {
            stack: vec![StructuralNode::new(NodeKind::Document, 0..len)],
            hard_wraps,
        }
    }

    fn attach(&mut self, node: StructuralNode) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn close(&mut self) {
        // The document root is never popped here.
        if self.stack.len() > 1
            && let Some(node) = self.stack.pop()
        {
            self.attach(node);
        }
    }

    fn leaf(&mut self, kind: NodeKind, range: Range<usize>, text: &str) {
        self.attach(StructuralNode::leaf(kind, range, text));
    }

    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.stack.push(StructuralNode::new(kind_for_tag(tag), range)),
            Event::End(_) => self.close(),
            Event::Text(text) => self.leaf(NodeKind::Text, range, &text),
            Event::Code(code) => self.leaf(NodeKind::Code, range, &code),
            Event::Html(html) | Event::InlineHtml(html) => self.leaf(NodeKind::Html, range, &html),
            Event::SoftBreak => {
                let kind = if self.hard_wraps {
                    NodeKind::HardBreak
                } else {
                    NodeKind::SoftBreak
                };
                self.leaf(kind, range, "\n");
            }
            Event::HardBreak => self.leaf(NodeKind::HardBreak, range, "\n"),
            Event::Rule => self.attach(StructuralNode::new(NodeKind::Rule, range)),
            Event::FootnoteReference(label) => {
                self.leaf(NodeKind::FootnoteReference, range, &label)
            }
            Event::TaskListMarker(checked) => self.attach(StructuralNode::new(
                NodeKind::TaskListMarker { checked },
                range,
            )),
            other => {
                let name = variant_name(&other);
                self.leaf(NodeKind::Other(name), range, "");
            }
        }
    }

    fn finish(mut self) -> StructuralNode {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .unwrap_or_else(|| StructuralNode::new(NodeKind::Document, 0..0))
    }
}

/// Parses `text` synchronously on the calling thread.
fn build_tree(text: &str, extensions: &Extensions) -> StructuralNode {
    let mut assembler = TreeAssembler::new(text.len(), extensions.hard_wraps);
    for (event, range) in Parser::new_ext(text, options_for(extensions)).into_offset_iter() {
        assembler.process_event(event, range);
    }
    let mut root = assembler.finish();
    if extensions.autolinks {
        link_bare_urls(&mut root, text);
    }
    root
}
