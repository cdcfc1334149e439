use super::node::{ListNode, NoneNode, SeqNode, SomeNode, TerminalNode};

/// Folds the generic tree into a consumer-defined representation.
///
/// Dispatch with [`SyntaxNode::accept`](super::SyntaxNode::accept). Children
/// are not visited automatically; implementations recurse where they need to.
pub trait SyntaxVisitor {
    type Output;

    fn visit_terminal(&mut self, node: &TerminalNode) -> Self::Output;
    fn visit_seq(&mut self, node: &SeqNode) -> Self::Output;
    fn visit_list(&mut self, node: &ListNode) -> Self::Output;
    fn visit_some(&mut self, node: &SomeNode) -> Self::Output;
    fn visit_none(&mut self, node: &NoneNode) -> Self::Output;
}
