use std::sync::OnceLock;

use regex::Regex;

use super::node::{NodeKind, StructuralNode};

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s<>\[\]]+").expect("Invalid URL regex"))
}

/// Byte ranges of bare URLs in `text`, minus trailing punctuation that is
/// usually sentence punctuation rather than part of the URL.
fn find_urls(text: &str) -> Vec<(usize, usize)> {
    url_regex()
        .find_iter(text)
        .filter_map(|m| {
            let trimmed = m
                .as_str()
                .trim_end_matches(['.', ',', ':', ';', '!', '?', ')', ']', '}']);
            (!trimmed.is_empty()).then(|| (m.start(), m.start() + trimmed.len()))
        })
        .collect()
}

/// Rewrites text leaves under `node` so bare URLs become `Link` nodes.
///
/// Only leaves whose text matches the source verbatim are split, since the
/// split points are byte offsets into `source`.
pub(super) fn link_bare_urls(node: &mut StructuralNode, source: &str) {
    if matches!(
        node.kind,
        NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::CodeBlock { .. }
            | NodeKind::HtmlBlock
    ) {
        return;
    }

    let children = std::mem::take(&mut node.children);
    for mut child in children {
        if child.kind == NodeKind::Text {
            node.children.extend(split_leaf(child, source));
        } else {
            link_bare_urls(&mut child, source);
            node.children.push(child);
        }
    }
}

fn split_leaf(leaf: StructuralNode, source: &str) -> Vec<StructuralNode> {
    let Some(text) = leaf.text.as_deref() else {
        return vec![leaf];
    };
    if source.get(leaf.span.clone()) != Some(text) {
        return vec![leaf];
    }
    let urls = find_urls(text);
    if urls.is_empty() {
        return vec![leaf];
    }

    let base = leaf.span.start;
    let mut out = Vec::new();
    let mut cursor = 0;
    for (start, end) in urls {
        if start > cursor {
            out.push(StructuralNode::leaf(
                NodeKind::Text,
                base + cursor..base + start,
                &text[cursor..start],
            ));
        }
        let url = &text[start..end];
        out.push(
            StructuralNode::new(
                NodeKind::Link {
                    destination: url.to_string(),
                },
                base + start..base + end,
            )
            .with_children(vec![StructuralNode::leaf(
                NodeKind::Text,
                base + start..base + end,
                url,
            )]),
        );
        cursor = end;
    }
    if cursor < text.len() {
        out.push(StructuralNode::leaf(
            NodeKind::Text,
            base + cursor..base + text.len(),
            &text[cursor..],
        ));
    }
    out
}
