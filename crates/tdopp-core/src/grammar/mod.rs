//! Grammar model: terminals, rule combinators and the named-rule container.
//!
//! Rules are pure data. A grammar is a mapping from rule name to an ordered
//! list of alternatives; the engine links it once and never looks up names
//! again while parsing.

mod error;
mod json;
mod rule;
mod terminal;
mod types;

#[cfg(test)]
mod rule_tests;

pub use error::GrammarError;
pub use rule::{Rule, SeparatorEnd};
pub use terminal::{EmptyTerminal, Literal, Pattern, SkipNonTrivia, Terminal};
pub use types::Grammar;
