use crate::models::{BlockKind, Document, RuleScope, Sentence};

/// One line per sentence and directive; the `Debug` output is the snapshot.
#[derive(Debug)]
pub struct Snap {
    pub sentences: Vec<SentenceSnap>,
    pub rules: Vec<String>,
}

#[derive(Debug)]
pub struct SentenceSnap {
    pub block: String,
    /// `start..end` in original characters.
    pub span: String,
    /// 1-based `line:column` of the start.
    pub at: String,
    pub text: String,
}

fn block_label(sentence: &Sentence) -> String {
    let ctx = &sentence.context;
    let mut label = match &ctx.block {
        BlockKind::Heading { level } => format!("Heading({level})"),
        BlockKind::Paragraph => "Paragraph".to_string(),
        BlockKind::ListItem { ordered: true } => "OrderedItem".to_string(),
        BlockKind::ListItem { ordered: false } => "Item".to_string(),
        BlockKind::TableCell { header: true } => "HeaderCell".to_string(),
        BlockKind::TableCell { header: false } => "Cell".to_string(),
        BlockKind::Footnote => "Footnote".to_string(),
        BlockKind::Other(name) => format!("Other({name})"),
    };
    if ctx.list_depth > 0 {
        label.push_str(&format!(" list={}", ctx.list_depth));
    }
    if ctx.quote_depth > 0 {
        label.push_str(&format!(" quote={}", ctx.quote_depth));
    }
    label
}

pub fn normalize(doc: &Document) -> Snap {
    let sentences = doc
        .sentences()
        .iter()
        .map(|s| SentenceSnap {
            block: block_label(s),
            span: format!("{}..{}", s.span.start, s.span.end),
            at: s.position.to_string(),
            text: s.content.clone(),
        })
        .collect();

    let rules = doc
        .preprocessor_rules()
        .iter()
        .map(|r| {
            let scope = match &r.scope {
                RuleScope::Lines(lines) => format!("lines {}..{}", lines.start, lines.end),
                RuleScope::Persistent => "file".to_string(),
            };
            format!("line {}: {:?} [{}] {scope}", r.line, r.kind, r.rule_names.join(", "))
        })
        .collect();

    Snap { sentences, rules }
}
