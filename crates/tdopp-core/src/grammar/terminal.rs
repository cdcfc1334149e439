//! Terminal matchers.
//!
//! A terminal performs an anchored match at a byte offset and reports how many
//! bytes it consumed. It never searches ahead for a later match.

use std::fmt;
use std::sync::Arc;

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input};

use super::GrammarError;
use crate::Kind;

/// Matching contract for every leaf of a grammar.
///
/// `Display` is used when listing expected terminals in diagnostics.
pub trait Terminal: fmt::Debug + fmt::Display + Send + Sync {
    /// Kind given to the terminal node produced by a successful match.
    fn kind(&self) -> &Kind;

    /// Match at `pos`, returning the consumed byte length.
    ///
    /// Zero is a valid length for nullable terminals. Returns `None` on a
    /// mismatch and when `pos` is not a char boundary inside `input`.
    fn try_match(&self, input: &str, pos: usize) -> Option<usize>;

    /// Recovery terminals are only reachable through recovery alternatives.
    fn is_recovery(&self) -> bool {
        false
    }

    /// Whether the terminal can match the empty string.
    fn is_nullable(&self) -> bool {
        false
    }
}

/// Exact text match.
#[derive(Debug, Clone)]
pub struct Literal {
    value: String,
    kind: Kind,
}

impl Literal {
    /// Literal whose node kind is the literal text itself.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let kind = Kind::from(value.as_str());
        Self { value, kind }
    }

    pub fn with_kind(mut self, kind: impl Into<Kind>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Terminal for Literal {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn try_match(&self, input: &str, pos: usize) -> Option<usize> {
        let rest = input.get(pos..)?;
        rest.starts_with(self.value.as_str())
            .then_some(self.value.len())
    }

    fn is_nullable(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.value)
    }
}

/// Regular-expression terminal compiled to an anchored dense DFA.
///
/// Matching follows leftmost-first semantics, so greedy repetitions consume
/// as much as they can.
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: Kind,
    source: String,
    dfa: dense::DFA<Vec<u32>>,
    nullable: bool,
}

impl Pattern {
    pub fn new(kind: impl Into<Kind>, pattern: &str) -> Result<Self, GrammarError> {
        let dfa = dense::DFA::builder()
            .configure(
                dense::DFA::config()
                    .start_kind(StartKind::Anchored)
                    .minimize(true),
            )
            .build(pattern)
            .map_err(|e| GrammarError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        let mut this = Self {
            kind: kind.into(),
            source: pattern.to_string(),
            dfa,
            nullable: false,
        };
        this.nullable = this.try_match("", 0) == Some(0);
        Ok(this)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Terminal for Pattern {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn try_match(&self, input: &str, pos: usize) -> Option<usize> {
        if !input.is_char_boundary(pos) {
            return None;
        }
        let search = Input::new(input).range(pos..).anchored(Anchored::Yes);
        // Errors only come from quit bytes or gave-up searches, neither of
        // which is configured here; treat them as a mismatch.
        let found = self.dfa.try_search_fwd(&search).ok()??;
        Some(found.offset() - pos)
    }

    fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)
    }
}

/// Recovery terminal that always matches zero width.
///
/// Used to stand in for a missing token or operand.
#[derive(Debug, Clone)]
pub struct EmptyTerminal {
    kind: Kind,
}

impl EmptyTerminal {
    pub fn new(kind: impl Into<Kind>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Terminal for EmptyTerminal {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn try_match(&self, input: &str, pos: usize) -> Option<usize> {
        input.is_char_boundary(pos).then_some(0)
    }

    fn is_recovery(&self) -> bool {
        true
    }

    fn is_nullable(&self) -> bool {
        true
    }
}

impl fmt::Display for EmptyTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.kind)
    }
}

/// Recovery terminal that swallows a run of non-trivia text.
///
/// The run stops where the trivia terminal would match a non-empty prefix.
/// At least one char is consumed, so it fails only at the end of input.
#[derive(Debug, Clone)]
pub struct SkipNonTrivia {
    kind: Kind,
    trivia: Arc<dyn Terminal>,
}

impl SkipNonTrivia {
    pub fn new(kind: impl Into<Kind>, trivia: Arc<dyn Terminal>) -> Self {
        Self {
            kind: kind.into(),
            trivia,
        }
    }
}

impl Terminal for SkipNonTrivia {
    fn kind(&self) -> &Kind {
        &self.kind
    }

    fn try_match(&self, input: &str, pos: usize) -> Option<usize> {
        let rest = input.get(pos..)?;
        let mut len = 0;
        for c in rest.chars() {
            if len > 0 && self.trivia.try_match(input, pos + len).is_some_and(|n| n > 0) {
                break;
            }
            len += c.len_utf8();
        }
        (len > 0).then_some(len)
    }

    fn is_recovery(&self) -> bool {
        true
    }
}

impl fmt::Display for SkipNonTrivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.kind)
    }
}
