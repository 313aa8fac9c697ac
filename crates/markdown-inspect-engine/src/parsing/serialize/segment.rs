use std::collections::BTreeSet;

use super::inline::InlineRun;
use crate::error::SerializationFault;
use crate::models::{Sentence, SentenceContext, Token};
use crate::parsing::offsets::{OffsetIndex, Span};
use crate::tokenizer::{TokenKind, TokenSpan, Tokenizer};

/// Splits tokens that straddle an inline boundary. The sentence-end flag stays
/// on the last piece.
fn split_at_breaks(tokens: Vec<TokenSpan>, breaks: &BTreeSet<usize>) -> Vec<TokenSpan> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let mut start = token.start;
        for &at in breaks.range(token.start + 1..token.end) {
            out.push(TokenSpan::new(start, at, token.kind));
            start = at;
        }
        out.push(TokenSpan { start, ..token });
    }
    out
}

/// Turns an inline run into sentences, anchoring every character and token
/// in the original text.
pub(super) fn segment(
    run: &InlineRun,
    tokenizer: &dyn Tokenizer,
    offsets: &OffsetIndex,
    context: &SentenceContext,
) -> Result<Vec<Sentence>, SerializationFault> {
    let tokens = tokenizer.tokenize(&run.text());
    if let Some(bad) = tokens
        .iter()
        .find(|t| t.start >= t.end || t.end > run.chars.len())
    {
        return Err(SerializationFault::OffsetOutOfRange {
            offset: bad.end,
            total: run.chars.len(),
            context: format!("tokenizer span {}..{}", bad.start, bad.end),
        });
    }
    let tokens = split_at_breaks(tokens, &run.breaks);

    let mut sentences = Vec::new();
    let mut group: Vec<TokenSpan> = Vec::new();
    for token in tokens {
        let ends = token.sentence_end;
        group.push(token);
        if ends {
            sentences.extend(build_sentence(&group, run, offsets, context)?);
            group.clear();
        }
    }
    sentences.extend(build_sentence(&group, run, offsets, context)?);

    if let Some(first) = sentences.first_mut() {
        first.is_first = true;
    }
    Ok(sentences)
}

fn build_sentence(
    group: &[TokenSpan],
    run: &InlineRun,
    offsets: &OffsetIndex,
    context: &SentenceContext,
) -> Result<Option<Sentence>, SerializationFault> {
    let is_space = |t: &&TokenSpan| t.kind == TokenKind::Whitespace;
    let Some(first) = group.iter().position(|t| !is_space(&t)) else {
        return Ok(None);
    };
    let last = group.len() - group.iter().rev().position(|t| !is_space(&t)).unwrap_or(0);
    let group = &group[first..last];

    let start = group[0].start;
    let end = group[group.len() - 1].end;
    let offset_map: Vec<Span> = run.spans[start..end].to_vec();
    let span = Span::new(offset_map[0].start, offset_map[offset_map.len() - 1].end);
    let position = offsets
        .resolve(span.start)
        .ok_or_else(|| SerializationFault::OffsetOutOfRange {
            offset: span.start,
            total: offsets.total_len(),
            context: "sentence start".to_string(),
        })?;

    let tokens = group
        .iter()
        .map(|t| Token {
            surface: run.chars[t.start..t.end].iter().collect(),
            kind: t.kind,
            span: Span::new(run.spans[t.start].start, run.spans[t.end - 1].end),
        })
        .collect();

    Ok(Some(Sentence {
        content: run.chars[start..end].iter().collect(),
        span,
        position,
        offset_map,
        tokens,
        context: context.clone(),
        is_first: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockKind;
    use crate::tokenizer::SimpleTokenizer;
    use pretty_assertions::assert_eq;

    fn run(text: &str, start: usize, breaks: &[usize]) -> InlineRun {
        let chars: Vec<char> = text.chars().collect();
        InlineRun {
            spans: (0..chars.len())
                .map(|i| Span::new(start + i, start + i + 1))
                .collect(),
            chars,
            breaks: breaks.iter().copied().collect(),
        }
    }

    fn index(total: usize) -> OffsetIndex {
        std::iter::once(total).collect()
    }

    fn segment_text(run: &InlineRun) -> Vec<Sentence> {
        segment(
            run,
            &SimpleTokenizer::default(),
            &index(100),
            &SentenceContext::new(BlockKind::Paragraph),
        )
        .unwrap()
    }

    #[test]
    fn sentences_are_trimmed_and_anchored() {
        let sentences = segment_text(&run("Hello world. Second sentence.", 9, &[]));
        let got: Vec<(&str, Span, bool)> = sentences
            .iter()
            .map(|s| (s.content.as_str(), s.span, s.is_first))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Hello world.", Span::new(9, 21), true),
                ("Second sentence.", Span::new(22, 38), false)
            ]
        );
        assert_eq!(sentences[1].position.column, 22);
        assert_eq!(sentences[1].offset_map.len(), "Second sentence.".len());
    }

    #[test]
    fn whitespace_only_run_has_no_sentences() {
        assert!(segment_text(&run("   ", 0, &[])).is_empty());
    }

    #[test]
    fn tokens_split_at_inline_boundaries() {
        let sentences = segment_text(&run("unbelievable", 0, &[2, 8]));
        let surfaces: Vec<&str> = sentences[0]
            .tokens
            .iter()
            .map(|t| t.surface.as_str())
            .collect();
        assert_eq!(surfaces, vec!["un", "believ", "able"]);
    }

    #[test]
    fn split_keeps_sentence_end_on_last_piece() {
        let mut token = TokenSpan::new(0, 4, TokenKind::Word);
        token.sentence_end = true;
        let split = split_at_breaks(vec![token], &BTreeSet::from([2]));
        assert_eq!(
            split.iter().map(|t| t.sentence_end).collect::<Vec<_>>(),
            vec![false, true]
        );
    }

    #[derive(Debug)]
    struct Overrun;

    impl Tokenizer for Overrun {
        fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
            vec![TokenSpan::new(0, text.chars().count() + 5, TokenKind::Word)]
        }
    }

    #[test]
    fn misbehaving_tokenizer_is_a_fault() {
        let err = segment(
            &run("abc", 0, &[]),
            &Overrun,
            &index(10),
            &SentenceContext::new(BlockKind::Paragraph),
        )
        .unwrap_err();
        assert!(matches!(err, SerializationFault::OffsetOutOfRange { .. }));
    }
}
