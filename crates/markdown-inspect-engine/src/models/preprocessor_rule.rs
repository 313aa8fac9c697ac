use std::ops::Range;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleKind {
    /// Silence the named inspection rules.
    Suppress,
}

/// Which lines a directive applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RuleScope {
    /// 0-based original line numbers, end exclusive.
    Lines(Range<usize>),
    /// The whole document.
    Persistent,
}

/// A directive extracted while reading, e.g. "suppress rule X for the next
/// N lines". Line numbers always refer to the original input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessorRule {
    pub kind: RuleKind,
    /// Rule identifiers; empty means every rule.
    pub rule_names: Vec<String>,
    /// Line the directive was declared on.
    pub line: usize,
    pub scope: RuleScope,
}

impl PreprocessorRule {
    pub fn covers(&self, line: usize) -> bool {
        match &self.scope {
            RuleScope::Lines(lines) => lines.contains(&line),
            RuleScope::Persistent => true,
        }
    }

    pub fn names(&self, rule: &str) -> bool {
        self.rule_names.is_empty() || self.rule_names.iter().any(|name| name == rule)
    }

    /// True if this directive silences `rule` on `line`.
    pub fn applies_to(&self, rule: &str, line: usize) -> bool {
        self.kind == RuleKind::Suppress && self.covers(line) && self.names(rule)
    }
}
