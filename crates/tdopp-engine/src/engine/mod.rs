//! Parsing engine: linking, TDOPP tables, FIRST/FOLLOW analysis and the
//! memoized interpreter with its recovery driver.

mod compiled;
mod error;
mod fatal;
mod first_follow;
mod ids;
mod interpreter;
mod link;
mod memo;
mod options;
mod parser;
mod recovery;
mod step;
mod tdopp;
mod trace;

#[cfg(test)]
mod compiled_tests;
#[cfg(test)]
mod interpreter_tests;
#[cfg(test)]
mod memo_tests;
#[cfg(test)]
mod parser_tests;

pub use compiled::CompiledGrammar;
pub use error::ParseError;
pub use fatal::FatalError;
pub use first_follow::{FirstSet, FirstSets, FollowSet, FollowSets};
pub use ids::{RuleId, TerminalId};
pub use options::{BuildOptions, ParseOptions};
pub use parser::{Outcome, ParseOutput, Parser};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
