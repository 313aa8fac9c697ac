use std::sync::OnceLock;

use regex::Regex;

use crate::models::{PreprocessorRule, RuleKind, RuleScope};

const DEFAULT_SCOPE_LINES: usize = 1;

fn directive_regex() -> &'static Regex {
    static DIRECTIVE_REGEX: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE_REGEX.get_or_init(|| {
        Regex::new(r"^\s*<!--\s*@?(suppress-file|suppress)(?:[:\s]([^>]*?))?\s*-->\s*$")
            .expect("Invalid directive regex")
    })
}

/// Parses a directive line declared on `line`, or returns `None` for ordinary
/// text.
pub fn parse_directive(text: &str, line: usize) -> Option<PreprocessorRule> {
    let caps = directive_regex().captures(text)?;
    let persistent = &caps[1] == "suppress-file";
    let params = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    let mut rule_names = Vec::new();
    let mut next_lines = DEFAULT_SCOPE_LINES;
    for param in params
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
    {
        match param.strip_prefix("next=") {
            Some(count) => match count.parse::<usize>() {
                Ok(n) => next_lines = n,
                Err(_) => log::warn!(
                    "ignoring malformed directive parameter {param:?} on line {line}"
                ),
            },
            None => rule_names.push(param.to_string()),
        }
    }

    let scope = if persistent {
        RuleScope::Persistent
    } else {
        RuleScope::Lines(line + 1..line + 1 + next_lines)
    };

    Some(PreprocessorRule {
        kind: RuleKind::Suppress,
        rule_names,
        line,
        scope,
    })
}
