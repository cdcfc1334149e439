//! Syntax trees produced by a parse.
//!
//! Nodes are immutable and shared through [`NodeRef`]. The same node may be
//! reachable from several parents when a memoized result is reused.

mod node;
mod palette;
mod printer;
mod visitor;

#[cfg(test)]
mod palette_tests;

pub use node::{ListNode, NodeRef, NoneNode, SeqNode, SomeNode, SyntaxNode, TerminalNode};
pub use palette::{Painted, Palette, Role};
pub use printer::TreePrinter;
pub use visitor::SyntaxVisitor;
