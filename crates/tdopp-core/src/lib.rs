#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Authoring-side data for the tdopp parsing engine.
//!
//! Three layers:
//! - **Grammar layer** ([`grammar`]): rule combinators, terminal matchers and
//!   the named-rule container handed to the engine
//! - **Syntax layer** ([`syntax`]): immutable trees produced by a parse, the
//!   visitor contract, debug printers and their highlighting
//! - **Text layer** ([`utils`]): line/column conversion and caret excerpts
//!
//! Nothing in this crate parses input on its own. Matching logic beyond a
//! single anchored terminal match lives in `tdopp-engine`.

use std::sync::Arc;

pub mod grammar;
pub mod syntax;
pub mod utils;


pub use grammar::{
    EmptyTerminal, Grammar, GrammarError, Literal, Pattern, Rule, SeparatorEnd, SkipNonTrivia,
    Terminal,
};
pub use syntax::{
    ListNode, NodeRef, NoneNode, Painted, Palette, Role, SeqNode, SomeNode, SyntaxNode,
    SyntaxVisitor, TerminalNode, TreePrinter,
};

/// Kind label carried by rules and copied onto the nodes they produce.
pub type Kind = Arc<str>;
