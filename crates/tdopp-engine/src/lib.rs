#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Memoized top-down operator precedence parser.
//!
//! A [`Grammar`](tdopp_core::Grammar) is compiled once into a
//! [`CompiledGrammar`]: rule names are linked, left-recursive alternatives
//! become postfix continuations with a precedence, and FIRST sets are
//! computed. A [`Parser`] then runs the grammar over input text, memoizing
//! rule results per position and precedence, and recovers from syntax errors
//! by re-running with recovery alternatives enabled at the furthest failure.
//!
//! ```
//! use std::sync::Arc;
//! use tdopp_core::{Grammar, Pattern, Rule};
//! use tdopp_engine::{CompiledGrammar, Parser};
//!
//! let grammar = Grammar::new(Pattern::new("Trivia", r"\s*").unwrap()).rule(
//!     "Expr",
//!     [
//!         Rule::terminal(Pattern::new("Number", "[0-9]+").unwrap()),
//!         Rule::seq("Add", [Rule::reference("Expr"), Rule::lit("+"), Rule::req("Expr", 10)]),
//!     ],
//! );
//! let compiled = Arc::new(CompiledGrammar::build(&grammar).unwrap());
//! let mut parser = Parser::new(compiled);
//! let input = "1 + 2";
//! let output = parser.parse(input, "Expr").unwrap();
//! assert_eq!(output.tree().unwrap().sexpr(input), "(Add 1 + 2)");
//! ```

pub mod engine;

#[cfg(test)]
mod test_utils;

pub use engine::{
    BuildOptions, CompiledGrammar, FatalError, FirstSet, FollowSet, FollowSets, NoopTracer,
    Outcome, ParseError, ParseOptions, ParseOutput, Parser, PrintTracer, RuleId, TerminalId,
    Tracer, Verbosity,
};
