/// A line of the preprocessed buffer and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MappedLine {
    /// Byte offset of the line in the preprocessed buffer.
    byte_start: usize,
    /// Character offset of the same line in the original text.
    original_start: usize,
}

/// The preprocessed buffer handed to the structural parser, together with the
/// table that maps its byte offsets back to original character offsets.
///
/// When no line is removed the mapping is the identity on characters and only
/// converts bytes to chars. When directive lines are dropped, every later line
/// keeps its original start so offsets skip over the gap.
#[derive(Debug, Clone)]
pub struct SourceMap {
    text: String,
    char_len: usize,
    lines: Vec<MappedLine>,
    identity: bool,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            char_len: 0,
            lines: Vec::new(),
            identity: true,
        }
    }

    /// Appends `content` plus a `\n` terminator, recording that it starts at
    /// character `original_start` of the original text.
    pub fn push_line(&mut self, original_start: usize, content: &str) {
        if self.char_len != original_start {
            self.identity = false;
        }
        self.lines.push(MappedLine {
            byte_start: self.text.len(),
            original_start,
        });
        self.text.push_str(content);
        self.text.push('\n');
        self.char_len += content.chars().count() + 1;
    }

    /// The buffer handed to the structural parser.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when every preprocessed character sits at its original offset.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Maps a byte offset in the preprocessed buffer to a character offset in
    /// the original text. `byte == text().len()` maps to the end of the last
    /// line handed to the parser.
    pub fn to_original(&self, byte: usize) -> Option<usize> {
        if byte > self.text.len() {
            return None;
        }
        let idx = self.lines.partition_point(|l| l.byte_start <= byte);
        if idx == 0 {
            // Only reachable for an empty buffer.
            return (byte == 0).then_some(0);
        }
        let line = self.lines[idx - 1];
        let line_end = self
            .lines
            .get(idx)
            .map(|next| next.byte_start)
            .unwrap_or(self.text.len());
        let line_text = &self.text[line.byte_start..line_end];
        let within = byte - line.byte_start;
        let chars = line_text
            .char_indices()
            .take_while(|(i, _)| *i < within)
            .count();
        Some(line.original_start + chars)
    }
}

impl Default for SourceMap {
    fn default() -> Self {
        Self::new()
    }
}
