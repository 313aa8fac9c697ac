//! Pipeline tests for the parsing module.
//!
//! Uses debug snapshots for readability. Fixtures (.md) and snapshots (.snap)
//! are co-located in `fixtures/`.

use std::sync::Arc;
use std::time::Duration;

use markdown_inspect_config::{DirectivePolicy, ParserConfig, UnknownNodePolicy};
use pretty_assertions::assert_eq;

use crate::error::{PipelineError, SerializationFault};
use crate::models::{BlockKind, Document, RuleScope};
use crate::parsing::offsets::Span;
use crate::parsing::snapshot;
use crate::parsing::structure::{
    Extensions, NodeKind, StructuralNode, StructuralParser, StructureError,
};
use crate::parsing::{CancellationToken, MarkdownParser};

fn parse(md: &str) -> Document {
    MarkdownParser::new().parse_str(md, Some("test.md")).unwrap()
}

fn contents(doc: &Document) -> Vec<&str> {
    doc.sentences().iter().map(|s| s.content.as_str()).collect()
}

// Fixture-based snapshot tests

#[test]
fn fixture_simple_paragraph() {
    assert_fixture("simple_paragraph");
}

#[test]
fn fixture_directives() {
    assert_fixture("directives");
}

#[test]
fn fixture_nested_containers() {
    assert_fixture("nested_containers");
}

fn assert_fixture(name: &str) {
    let fixtures_dir = format!("{}/src/parsing/tests/fixtures", env!("CARGO_MANIFEST_DIR"));
    let md = std::fs::read_to_string(format!("{fixtures_dir}/{name}.md")).unwrap();

    let doc = parse(&md);
    snapshot::invariants(&doc);

    let snap = snapshot::normalize(&doc);
    insta::with_settings!({
        snapshot_path => fixtures_dir.as_str(),
        prepend_module_to_snapshot => false,
    }, {
        insta::assert_debug_snapshot!(name, snap);
    });
}

// Scenarios

#[test]
fn heading_and_two_sentences() {
    let doc = parse("# Title\n\nHello world. Second sentence.\n");
    let got: Vec<(&str, Span)> = doc
        .sentences()
        .iter()
        .map(|s| (s.content.as_str(), s.span))
        .collect();
    assert_eq!(
        got,
        vec![
            ("Title", Span::new(2, 7)),
            ("Hello world.", Span::new(9, 21)),
            ("Second sentence.", Span::new(22, 38)),
        ]
    );
    assert_eq!(doc.sentences()[0].context.heading_level(), Some(1));
    assert_eq!(doc.file_name(), Some("test.md"));
    assert_eq!(doc.sections().len(), 1);
}

#[test]
fn directive_line_is_excluded() {
    let doc = parse("<!--suppress:rule1-->\nSome text.\n");
    assert_eq!(contents(&doc), vec!["Some text."]);
    assert_eq!(doc.sentences()[0].span, Span::new(22, 32));

    let rules = doc.preprocessor_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].rule_names, vec!["rule1"]);
    assert_eq!(rules[0].line, 0);
    assert!(doc.is_suppressed("rule1", 1));
}

#[test]
fn removed_directive_keeps_original_offsets() {
    let parser = MarkdownParser::new().with_directive_policy(DirectivePolicy::Remove);
    let doc = parser
        .parse_str("<!--suppress:rule1-->\nSome text.\n", None)
        .unwrap();
    let sentence = &doc.sentences()[0];
    assert_eq!(sentence.content, "Some text.");
    assert_eq!(sentence.span, Span::new(22, 32));
    assert_eq!(sentence.position.line, 1);
    assert_eq!(doc.source(), "<!--suppress:rule1-->\nSome text.\n");
    snapshot::invariants(&doc);
}

#[test]
fn kept_directive_is_skipped_as_html() {
    let parser = MarkdownParser::new().with_directive_policy(DirectivePolicy::Keep);
    let doc = parser
        .parse_str("<!--suppress:rule1-->\nSome text.\n", None)
        .unwrap();
    assert_eq!(contents(&doc), vec!["Some text."]);
    assert_eq!(doc.preprocessor_rules().len(), 1);
}

#[test]
fn rule_scope_covers_next_lines() {
    let doc = parse("<!-- suppress: spelling next=2 -->\nOne.\nTwo.\nThree.\n");
    assert_eq!(doc.preprocessor_rules()[0].scope, RuleScope::Lines(1..3));
    assert!(!doc.is_suppressed("spelling", 0));
    assert!(doc.is_suppressed("spelling", 1));
    assert!(doc.is_suppressed("spelling", 2));
    assert!(!doc.is_suppressed("spelling", 3));
    assert!(!doc.is_suppressed("length", 1));
}

// Offset fidelity

#[test]
fn plain_sentences_slice_back_to_source() {
    let md = "First line here. And more.\nSecond paragraph text.\n\nThird one! Yes?\n";
    let doc = parse(md);
    snapshot::invariants(&doc);
    for s in doc.sentences() {
        assert_eq!(doc.source_slice(s.span).as_deref(), Some(s.content.as_str()));
        for t in &s.tokens {
            assert_eq!(doc.source_slice(t.span).as_deref(), Some(t.surface.as_str()));
        }
    }
}

#[test]
fn markup_splits_tokens_but_not_sentences() {
    let doc = parse("Un**believ**able claims.\n");
    let sentence = &doc.sentences()[0];
    assert_eq!(sentence.content, "Unbelievable claims.");
    assert_eq!(sentence.span, Span::new(0, 24));

    let words: Vec<(&str, Span)> = sentence
        .words()
        .map(|t| (t.surface.as_str(), t.span))
        .collect();
    assert_eq!(
        words,
        vec![
            ("Un", Span::new(0, 2)),
            ("believ", Span::new(4, 10)),
            ("able", Span::new(12, 16)),
            ("claims", Span::new(17, 23)),
        ]
    );
}

#[test]
fn crlf_input_is_normalized() {
    let doc = parse("Line one.\r\nLine two.\r\n");
    assert_eq!(doc.source(), "Line one.\nLine two.\n");
    assert_eq!(contents(&doc), vec!["Line one.", "Line two."]);
    assert_eq!(doc.sentences()[1].span, Span::new(10, 19));
    assert_eq!(doc.sentences()[1].position.line, 1);
}

#[test]
fn missing_final_newline_is_added() {
    let doc = parse("No newline");
    assert_eq!(doc.source(), "No newline\n");
    assert_eq!(doc.offsets().total_len(), 11);
    assert_eq!(contents(&doc), vec!["No newline"]);
}

#[test]
fn empty_input_has_no_sentences() {
    let doc = parse("");
    assert!(doc.sentences().is_empty());
    assert_eq!(doc.line_count(), 0);
}

#[test]
fn escaped_text_maps_to_its_markup() {
    let doc = parse("Fish &amp; chips.\n");
    let sentence = &doc.sentences()[0];
    assert_eq!(sentence.content, "Fish & chips.");
    assert_eq!(sentence.offset_map[5], Span::new(5, 10));
    assert_eq!(sentence.span, Span::new(0, 17));
}

#[test]
fn sentences_in_line_finds_multiline_sentence() {
    let doc = parse("This sentence\nspans two lines.\n");
    assert_eq!(doc.sentences().len(), 1);
    assert_eq!(doc.sentences_in_line(0).count(), 1);
    assert_eq!(doc.sentences_in_line(1).count(), 1);
}

#[test]
fn parsing_is_idempotent() {
    let md = "# A\n\n- one. two.\n- three\n\n> quote *here*.\n";
    let parser = MarkdownParser::new();
    let first = parser.parse_str(md, None).unwrap();
    let second = parser.parse_str(md, None).unwrap();
    assert_eq!(first.sentences(), second.sentences());
    assert_eq!(first.preprocessor_rules(), second.preprocessor_rules());
}

#[test]
fn code_blocks_are_not_prose() {
    let doc = parse("Text before.\n\n```\ncode. here.\n```\n\n    indented. code.\n\nAfter `inline code` too.\n");
    assert_eq!(
        contents(&doc),
        vec!["Text before.", "After inline code too."]
    );
    let inline = doc.sentences()[1]
        .words()
        .find(|t| t.surface == "inline")
        .map(|t| t.span);
    assert_eq!(inline, Some(Span::new(63, 69)));
}

#[test]
fn footnotes_are_tagged_when_enabled() {
    let parser = MarkdownParser::new().with_extensions(Extensions {
        footnotes: true,
        ..Extensions::required()
    });
    let doc = parser
        .parse_str("Claim.[^1]\n\n[^1]: The source.\n", None)
        .unwrap();
    let blocks: Vec<(BlockKind, &str)> = doc
        .sentences()
        .iter()
        .map(|s| (s.context.block.clone(), s.content.as_str()))
        .collect();
    assert_eq!(
        blocks,
        vec![
            (BlockKind::Paragraph, "Claim."),
            (BlockKind::Footnote, "The source."),
        ]
    );
}

// Failure modes

#[derive(Debug)]
struct Stalled;

impl StructuralParser for Stalled {
    fn parse(&self, _: &str, _: &Extensions) -> Result<StructuralNode, StructureError> {
        Err(StructureError::Timeout {
            budget: Duration::from_millis(5),
        })
    }
}

#[derive(Debug)]
struct Crashing;

impl StructuralParser for Crashing {
    fn parse(&self, _: &str, _: &Extensions) -> Result<StructuralNode, StructureError> {
        Err(StructureError::Crashed("boom".to_string()))
    }
}

/// Reports the whole input as one node kind the serializer has no mapping for.
#[derive(Debug)]
struct Exotic;

impl StructuralParser for Exotic {
    fn parse(&self, text: &str, _: &Extensions) -> Result<StructuralNode, StructureError> {
        let body = text.trim_end_matches('\n');
        Ok(
            StructuralNode::new(NodeKind::Document, 0..text.len()).with_children(vec![
                StructuralNode::leaf(NodeKind::Other("Math".to_string()), 0..body.len(), body),
            ]),
        )
    }
}

#[test]
fn timeout_is_reported_distinctly() {
    let parser = MarkdownParser::new().with_structural_parser(Arc::new(Stalled));
    let err = parser.parse_str("Anything.\n", None).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::StructuralTimeout { budget } if budget == Duration::from_millis(5)
    ));
}

#[test]
fn crash_is_reported() {
    let parser = MarkdownParser::new().with_structural_parser(Arc::new(Crashing));
    let err = parser.parse_str("Anything.\n", None).unwrap_err();
    assert!(matches!(err, PipelineError::StructuralCrash(msg) if msg == "boom"));
}

#[test]
fn unknown_nodes_follow_policy() {
    let lenient = MarkdownParser::new().with_structural_parser(Arc::new(Exotic));
    let doc = lenient.parse_str("E equals mc squared.\n", None).unwrap();
    assert_eq!(contents(&doc), vec!["E equals mc squared."]);
    assert_eq!(
        doc.sentences()[0].context.block,
        BlockKind::Other("Math".to_string())
    );

    let strict = lenient.with_unknown_nodes(UnknownNodePolicy::Strict);
    let err = strict.parse_str("E equals mc squared.\n", None).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Serialization(SerializationFault::UnknownNode { kind }) if kind == "Math"
    ));
}

#[test]
fn invalid_utf8_fails_the_parse() {
    let input: &[u8] = b"ok\n\xc3\x28\n";
    let err = MarkdownParser::new().parse(input, None).unwrap_err();
    assert!(matches!(err, PipelineError::Read(ref failure) if failure.line == 1));
}

#[test]
fn cancelled_parse_stops() {
    let token = CancellationToken::new();
    token.cancel();
    let err = MarkdownParser::new()
        .parse_with_cancel("Some text.\n".as_bytes(), None, &token)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled));
}

// Configuration and concurrency

#[test]
fn parser_from_config() {
    let config = ParserConfig {
        directive_policy: DirectivePolicy::Remove,
        ..ParserConfig::default()
    };
    let parser = MarkdownParser::from_config(&config).unwrap();
    let doc = parser.parse_str("<!-- suppress -->\nBody.\n", None).unwrap();
    assert_eq!(doc.sentences()[0].span, Span::new(18, 23));

    let broken = ParserConfig {
        structural_timeout_ms: 0,
        ..ParserConfig::default()
    };
    assert!(MarkdownParser::from_config(&broken).is_err());
}

#[test]
fn documents_parse_in_parallel() {
    let parser = MarkdownParser::new();
    let inputs: Vec<String> = (0..8)
        .map(|i| format!("# Doc {i}\n\nBody of document {i}. Ends here.\n"))
        .collect();

    let parser = &parser;
    let docs: Vec<Document> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|md| scope.spawn(move || parser.parse_str(md, None).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, doc) in docs.iter().enumerate() {
        assert_eq!(doc.sentences().len(), 3);
        assert_eq!(doc.sentences()[0].content, format!("Doc {i}"));
    }
}
