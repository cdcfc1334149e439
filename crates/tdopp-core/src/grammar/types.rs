//! Named-rule container.

use std::sync::Arc;

use indexmap::IndexMap;

use super::rule::Rule;
use super::terminal::{EmptyTerminal, Terminal};

/// Mapping from rule name to its ordered alternatives, plus the trivia
/// terminal skipped after every terminal match.
///
/// Definition order is preserved. The order of alternatives inside a rule only
/// matters for tie-breaking between equally long matches.
#[derive(Debug, Clone)]
pub struct Grammar {
    trivia: Arc<dyn Terminal>,
    rules: IndexMap<String, Vec<Rule>>,
}

impl Default for Grammar {
    /// Grammar without trivia.
    fn default() -> Self {
        Self::with_shared_trivia(Arc::new(EmptyTerminal::new("Trivia")))
    }
}

impl Grammar {
    pub fn new(trivia: impl Terminal + 'static) -> Self {
        Self::with_shared_trivia(Arc::new(trivia))
    }

    /// Use when the trivia terminal is also referenced by rules, e.g. by a
    /// [`SkipNonTrivia`](super::SkipNonTrivia) recovery terminal.
    pub fn with_shared_trivia(trivia: Arc<dyn Terminal>) -> Self {
        Self {
            trivia,
            rules: IndexMap::new(),
        }
    }

    /// Builder-style [`Grammar::insert`].
    pub fn rule(
        mut self,
        name: impl Into<String>,
        alternatives: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.insert(name, alternatives);
        self
    }

    /// Define a rule, replacing and returning any previous definition.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        alternatives: impl IntoIterator<Item = Rule>,
    ) -> Option<Vec<Rule>> {
        self.rules
            .insert(name.into(), alternatives.into_iter().collect())
    }

    /// Append one alternative, creating the rule if needed.
    pub fn add_alternative(&mut self, name: impl Into<String>, alternative: Rule) {
        self.rules.entry(name.into()).or_default().push(alternative);
    }

    pub fn get(&self, name: &str) -> Option<&[Rule]> {
        self.rules.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rules in definition order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.rules
            .iter()
            .map(|(name, alternatives)| (name.as_str(), alternatives.as_slice()))
    }

    pub fn trivia(&self) -> &Arc<dyn Terminal> {
        &self.trivia
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
