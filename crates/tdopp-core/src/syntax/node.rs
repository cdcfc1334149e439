use std::ops::Range;
use std::rc::Rc;

use super::visitor::SyntaxVisitor;
use crate::Kind;

/// Shared handle to an immutable node.
pub type NodeRef = Rc<SyntaxNode>;

/// Matched terminal. The span covers trailing trivia; the content does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalNode {
    pub kind: Kind,
    pub start: usize,
    pub end: usize,
    pub content_len: usize,
    /// Produced by a recovery terminal or inserted by error recovery.
    pub is_recovery: bool,
}

impl TerminalNode {
    pub fn content_end(&self) -> usize {
        self.start + self.content_len
    }

    /// Matched text without trailing trivia.
    pub fn text<'i>(&self, input: &'i str) -> &'i str {
        &input[self.start..self.content_end()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqNode {
    pub kind: Kind,
    pub children: Vec<NodeRef>,
    pub start: usize,
    pub end: usize,
}

/// Separated list. `delimiters[i]` follows `elements[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode {
    pub kind: Kind,
    pub elements: Vec<NodeRef>,
    pub delimiters: Vec<NodeRef>,
    pub start: usize,
    pub end: usize,
    pub has_trailing_separator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomeNode {
    pub kind: Kind,
    pub value: NodeRef,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoneNode {
    pub kind: Kind,
    pub pos: usize,
}

/// Node of the generic parse tree.
///
/// Lookahead predicates never produce nodes, so every variant can be handed
/// to a [`SyntaxVisitor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    Terminal(TerminalNode),
    Seq(SeqNode),
    List(ListNode),
    Some(SomeNode),
    None(NoneNode),
}

impl SyntaxNode {
    pub fn kind(&self) -> &Kind {
        match self {
            Self::Terminal(n) => &n.kind,
            Self::Seq(n) => &n.kind,
            Self::List(n) => &n.kind,
            Self::Some(n) => &n.kind,
            Self::None(n) => &n.kind,
        }
    }

    pub fn start(&self) -> usize {
        match self {
            Self::Terminal(n) => n.start,
            Self::Seq(n) => n.start,
            Self::List(n) => n.start,
            Self::Some(n) => n.start,
            Self::None(n) => n.pos,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Self::Terminal(n) => n.end,
            Self::Seq(n) => n.end,
            Self::List(n) => n.end,
            Self::Some(n) => n.end,
            Self::None(n) => n.pos,
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// End of the last significant text, before any trailing trivia.
    pub fn content_end(&self) -> usize {
        match self {
            Self::Terminal(n) => n.content_end(),
            Self::Seq(n) => n.children.last().map_or(n.start, |c| c.content_end()),
            Self::List(n) => {
                let last_element = n.elements.last().map(|c| c.content_end());
                let last_delimiter = n.delimiters.last().map(|c| c.content_end());
                last_element.max(last_delimiter).unwrap_or(n.start)
            }
            Self::Some(n) => n.value.content_end(),
            Self::None(n) => n.pos,
        }
    }

    /// Exact source slice covered by the node, trailing trivia included.
    pub fn span_text<'i>(&self, input: &'i str) -> &'i str {
        &input[self.span()]
    }

    /// Source slice without trailing trivia.
    pub fn text<'i>(&self, input: &'i str) -> &'i str {
        &input[self.start()..self.content_end()]
    }

    pub fn is_recovery(&self) -> bool {
        matches!(self, Self::Terminal(n) if n.is_recovery)
    }

    /// Whether error recovery left a mark anywhere in this subtree.
    pub fn has_errors(&self) -> bool {
        self.is_recovery() || self.children().iter().any(|c| c.has_errors())
    }

    /// Direct children in source order. List delimiters are interleaved
    /// with the elements they follow.
    pub fn children(&self) -> Vec<&NodeRef> {
        match self {
            Self::Terminal(_) | Self::None(_) => Vec::new(),
            Self::Seq(n) => n.children.iter().collect(),
            Self::List(n) => {
                let mut children = Vec::with_capacity(n.elements.len() + n.delimiters.len());
                let mut delimiters = n.delimiters.iter();
                for element in &n.elements {
                    children.push(element);
                    if let Some(delimiter) = delimiters.next() {
                        children.push(delimiter);
                    }
                }
                children.extend(delimiters);
                children
            }
            Self::Some(n) => vec![&n.value],
        }
    }

    /// Leaf terminals in source order.
    pub fn terminals(&self) -> Vec<&TerminalNode> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a TerminalNode>) {
        match self {
            Self::Terminal(n) => out.push(n),
            _ => {
                for child in self.children() {
                    child.collect_terminals(out);
                }
            }
        }
    }

    pub fn accept<V: SyntaxVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Terminal(n) => visitor.visit_terminal(n),
            Self::Seq(n) => visitor.visit_seq(n),
            Self::List(n) => visitor.visit_list(n),
            Self::Some(n) => visitor.visit_some(n),
            Self::None(n) => visitor.visit_none(n),
        }
    }
}
