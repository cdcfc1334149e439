//! Intermediate results of the interpreter.

use std::rc::Rc;

use tdopp_core::{NodeRef, SyntaxNode};

/// What a successful sub-parse produced.
///
/// Lookahead predicates succeed without producing a node; sequences drop
/// them instead of storing a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fragment {
    Node(NodeRef),
    Predicate,
}

/// Result of matching one expression or rule at a position.
///
/// `max_fail` is the furthest position any attempt inside the sub-parse
/// failed at; the recovery driver uses it to decide whether a memoized
/// result may be reused.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    Success {
        fragment: Fragment,
        end: usize,
        max_fail: usize,
    },
    Failure {
        max_fail: usize,
    },
}

impl Step {
    pub fn node(node: SyntaxNode, end: usize, max_fail: usize) -> Self {
        Self::Success {
            fragment: Fragment::Node(Rc::new(node)),
            end,
            max_fail,
        }
    }

    pub fn predicate(pos: usize) -> Self {
        Self::Success {
            fragment: Fragment::Predicate,
            end: pos,
            max_fail: pos,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn end(&self) -> Option<usize> {
        match self {
            Self::Success { end, .. } => Some(*end),
            Self::Failure { .. } => None,
        }
    }

    pub fn max_fail(&self) -> usize {
        match self {
            Self::Success { max_fail, .. } | Self::Failure { max_fail } => *max_fail,
        }
    }
}
