use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::{self, BufRead};

use markdown_inspect_config::DirectivePolicy;

use super::directive::parse_directive;
use crate::error::ReadFailure;
use crate::models::PreprocessorRule;

/// What the preprocessing pass did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDisposition {
    /// Handed to the structural parser as-is.
    Text,
    /// A directive line replaced by spaces of the same character length.
    Blanked,
    /// A directive line withheld from the structural parser.
    Removed,
}

/// One physical line of input after preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 0-based line number in the original input.
    pub number: usize,
    /// Original line content without its terminator.
    pub text: String,
    /// Characters in the line, counting one normalized terminator.
    pub length: usize,
    pub disposition: LineDisposition,
}

impl RawLine {
    /// The text handed to the structural parser, without terminator.
    pub fn processed(&self) -> Option<Cow<'_, str>> {
        match self.disposition {
            LineDisposition::Text => Some(Cow::Borrowed(&self.text)),
            LineDisposition::Blanked => Some(Cow::Owned(" ".repeat(self.length - 1))),
            LineDisposition::Removed => None,
        }
    }

    pub fn is_directive(&self) -> bool {
        self.disposition != LineDisposition::Text
    }
}

/// Lazily reads [`RawLine`]s from a buffered stream, collecting the
/// preprocessor directives it meets along the way.
///
/// The sequence is consumed once. After the first read error the iterator is
/// exhausted; call [`into_rules`](Self::into_rules) once it is drained.
pub struct PreprocessingReader<R> {
    inner: R,
    policy: DirectivePolicy,
    pending: VecDeque<String>,
    next_line: usize,
    rules: Vec<PreprocessorRule>,
    /// Marker character and length of the open code fence, if any.
    fence: Option<(char, usize)>,
    done: bool,
}

/// Marker character and run length of a fence line: at most three spaces of
/// indent, then three or more backticks or tildes.
fn fence_run(text: &str) -> Option<(char, usize, &str)> {
    let indent = text.len() - text.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &text[indent..];
    let marker = rest.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = rest.chars().take_while(|&c| c == marker).count();
    (len >= 3).then(|| (marker, len, &rest[len..]))
}

impl<R: BufRead> PreprocessingReader<R> {
    pub fn new(inner: R, policy: DirectivePolicy) -> Self {
        Self {
            inner,
            policy,
            pending: VecDeque::new(),
            next_line: 0,
            rules: Vec::new(),
            fence: None,
            done: false,
        }
    }

    /// Directives collected so far, in input order.
    pub fn rules(&self) -> &[PreprocessorRule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<PreprocessorRule> {
        self.rules
    }

    /// Refills `pending` with the logical lines of the next `\n`-terminated
    /// chunk. `\r\n` and lone `\r` both end a line.
    fn fill(&mut self) -> io::Result<bool> {
        let mut buf = Vec::new();
        if self.inner.read_until(b'\n', &mut buf)? == 0 {
            return Ok(false);
        }
        let chunk =
            String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let chunk = chunk.strip_suffix('\n').unwrap_or(&chunk);
        let chunk = chunk.strip_suffix('\r').unwrap_or(chunk);
        self.pending.extend(chunk.split('\r').map(String::from));
        Ok(true)
    }

    /// Tracks fenced code so directive-looking lines inside it stay text.
    /// Returns whether `text` belongs to a fence.
    fn track_fence(&mut self, text: &str) -> bool {
        let run = fence_run(text);
        match (self.fence, run) {
            (Some((open, open_len)), Some((marker, len, rest)))
                if marker == open && len >= open_len && rest.trim().is_empty() =>
            {
                self.fence = None;
                true
            }
            (Some(_), _) => true,
            (None, Some((marker, len, info))) if marker == '~' || !info.contains('`') => {
                self.fence = Some((marker, len));
                true
            }
            (None, _) => false,
        }
    }

    fn classify(&mut self, number: usize, text: String) -> RawLine {
        let length = text.chars().count() + 1;
        let directive = if self.track_fence(&text) {
            None
        } else {
            parse_directive(&text, number)
        };
        let disposition = match directive {
            Some(rule) => {
                log::debug!("preprocessor directive on line {number}: {rule:?}");
                self.rules.push(rule);
                match self.policy {
                    DirectivePolicy::Blank => LineDisposition::Blanked,
                    DirectivePolicy::Remove => LineDisposition::Removed,
                    DirectivePolicy::Keep => LineDisposition::Text,
                }
            }
            None => LineDisposition::Text,
        };
        RawLine {
            number,
            text,
            length,
            disposition,
        }
    }
}

impl<R: BufRead> Iterator for PreprocessingReader<R> {
    type Item = Result<RawLine, ReadFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while self.pending.is_empty() {
            match self.fill() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(source) => {
                    self.done = true;
                    return Some(Err(ReadFailure {
                        line: self.next_line,
                        source,
                    }));
                }
            }
        }
        let text = self.pending.pop_front()?;
        let number = self.next_line;
        self.next_line += 1;
        Some(Ok(self.classify(number, text)))
    }
}
