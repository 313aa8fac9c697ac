use markdown_inspect_config::SentenceConfig;

use super::{TokenKind, TokenSpan, Tokenizer};

/// Characters that may trail a terminator and still belong to its sentence.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '}', '”', '’', '»', '」', '』'];

/// Whitespace/punctuation tokenizer with configurable sentence terminators.
///
/// A terminator ends a sentence when the run of terminators and closing marks
/// it starts is followed by whitespace or the end of the text. Non-ASCII
/// terminators such as `。` end a sentence unconditionally. A `.` directly
/// after a known abbreviation never does.
#[derive(Debug, Clone)]
pub struct SimpleTokenizer {
    terminators: Vec<char>,
    abbreviations: Vec<Vec<char>>,
}

impl SimpleTokenizer {
    pub fn new(config: &SentenceConfig) -> Self {
        Self {
            terminators: config.terminators.clone(),
            abbreviations: config
                .abbreviations
                .iter()
                .map(|a| a.chars().collect())
                .collect(),
        }
    }

    fn is_terminator(&self, c: char) -> bool {
        self.terminators.contains(&c)
    }

    fn follows_abbreviation(&self, chars: &[char], dot: usize) -> bool {
        self.abbreviations.iter().any(|abbr| {
            let Some(start) = dot.checked_sub(abbr.len()) else {
                return false;
            };
            chars[start..dot] == abbr[..] && (start == 0 || !chars[start - 1].is_alphanumeric())
        })
    }

    /// Whether the terminator at `at` closes a sentence, given that the
    /// terminator/closer run it starts ends before `run_end`.
    fn ends_sentence(&self, chars: &[char], at: usize, run_end: usize) -> bool {
        let c = chars[at];
        if !c.is_ascii() {
            return true;
        }
        if c == '.' && self.follows_abbreviation(chars, at) {
            return false;
        }
        run_end == chars.len() || chars[run_end].is_whitespace()
    }
}

impl Default for SimpleTokenizer {
    fn default() -> Self {
        Self::new(&SentenceConfig::default())
    }
}

fn is_word_joiner(c: char) -> bool {
    matches!(c, '\'' | '’' | '-')
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < n {
            let c = chars[i];
            if c.is_whitespace() {
                let end = (i..n).find(|&j| !chars[j].is_whitespace()).unwrap_or(n);
                tokens.push(TokenSpan::new(i, end, TokenKind::Whitespace));
                i = end;
            } else if c.is_alphanumeric() {
                let mut end = i + 1;
                while end < n
                    && (chars[end].is_alphanumeric()
                        || (is_word_joiner(chars[end])
                            && end + 1 < n
                            && chars[end + 1].is_alphanumeric()))
                {
                    end += 1;
                }
                tokens.push(TokenSpan::new(i, end, TokenKind::Word));
                i = end;
            } else if self.is_terminator(c) {
                let run_end = (i..n)
                    .find(|&j| !(self.is_terminator(chars[j]) || CLOSERS.contains(&chars[j])))
                    .unwrap_or(n);
                let closes = self.ends_sentence(&chars, i, run_end);
                for j in i..run_end {
                    let mut token = TokenSpan::new(j, j + 1, TokenKind::Punctuation);
                    // Full-width terminators close on their own; otherwise the
                    // last mark of the run carries the boundary.
                    token.sentence_end = closes && (j + 1 == run_end || !chars[j].is_ascii());
                    tokens.push(token);
                }
                i = run_end;
            } else {
                tokens.push(TokenSpan::new(i, i + 1, TokenKind::Punctuation));
                i += 1;
            }
        }

        tokens
    }
}
