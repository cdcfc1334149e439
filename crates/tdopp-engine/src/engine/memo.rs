//! Memo table keyed by (position, rule, minimum precedence).

use std::collections::HashMap;
use std::fmt::Write as _;

use super::compiled::CompiledGrammar;
use super::ids::RuleId;
use super::step::{Fragment, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct MemoKey {
    pub pos: usize,
    pub rule: RuleId,
    pub min_prec: i32,
}

#[derive(Debug, Default)]
pub(crate) struct Memo {
    entries: HashMap<MemoKey, Step>,
}

impl Memo {
    pub fn get(&self, key: &MemoKey) -> Option<&Step> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: MemoKey, step: Step) {
        self.entries.insert(key, step);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop entries a new recovery pass must recompute: failures, entries
    /// starting at `origin`, and successes ending at `skip`. Returns the
    /// number removed.
    pub fn invalidate(&mut self, origin: usize, skip: usize) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, step| match step {
            Step::Failure { .. } => false,
            Step::Success { end, .. } => key.pos != origin && *end != skip,
        });
        before - self.entries.len()
    }

    /// One line per entry, sorted by position, rule and precedence.
    pub fn render(&self, grammar: &CompiledGrammar, input: &str) -> String {
        let mut keys: Vec<&MemoKey> = self.entries.keys().collect();
        keys.sort();

        let mut out = String::new();
        for key in keys {
            let rule = grammar.rule_name(key.rule);
            match &self.entries[key] {
                Step::Success {
                    fragment,
                    end,
                    max_fail,
                } => {
                    let tree = match fragment {
                        Fragment::Node(node) => node.sexpr(input),
                        Fragment::Predicate => "&".to_string(),
                    };
                    writeln!(
                        out,
                        "{}..{end} {rule}:{} {tree} (max fail {max_fail})",
                        key.pos, key.min_prec
                    )
                    .unwrap();
                }
                Step::Failure { max_fail } => {
                    writeln!(
                        out,
                        "{} {rule}:{} failed (max fail {max_fail})",
                        key.pos, key.min_prec
                    )
                    .unwrap();
                }
            }
        }
        out
    }
}
