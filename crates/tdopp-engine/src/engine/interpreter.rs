//! Memoized TDOPP interpreter.
//!
//! [`Run::parse_rule`] is the only memoized entry point. It tries every
//! prefix alternative of a rule, extends each success with postfix
//! continuations whose precedence admits them, and keeps the longest result.
//! Combinators below a rule are evaluated directly.

use indexmap::IndexSet;
use tdopp_core::grammar::SeparatorEnd;
use tdopp_core::{Kind, ListNode, NodeRef, NoneNode, SeqNode, SomeNode, SyntaxNode, TerminalNode};

use super::compiled::CompiledGrammar;
use super::error::ParseError;
use super::first_follow::FollowSets;
use super::ids::{ExprId, RuleId, TerminalId};
use super::link::Expr;
use super::memo::{Memo, MemoKey};
use super::options::ParseOptions;
use super::step::{Fragment, Step};
use super::tdopp::Postfix;
use super::trace::Tracer;

/// Remaining stack below which evaluation moves onto a fresh segment.
const STACK_RED_ZONE: usize = 100 * 1024;

/// Size of each stack segment allocated by [`stacker::maybe_grow`].
const STACK_SEGMENT: usize = 1024 * 1024;

/// Kind of nodes produced by recovery itself.
pub(crate) const ERROR_KIND: &str = "Error";

/// Something the parser wanted to see at the furthest failure position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Expected {
    Terminal(TerminalId),
    EndOfInput,
}

/// Mutable state that survives between passes of one parse call.
#[derive(Debug, Default)]
pub(crate) struct ParseState {
    pub memo: Memo,
    /// Furthest position a terminal failed at.
    pub error_pos: usize,
    /// What was expected at `error_pos`, in first-seen order.
    pub expected: IndexSet<Expected>,
    /// Position where recovery alternatives are enabled.
    pub skip: Option<usize>,
    /// Panic-mode scanning is active for the current pass.
    pub panic: bool,
    /// Rules currently being evaluated, innermost last.
    pub rule_stack: Vec<RuleId>,
}

impl ParseState {
    pub fn reset(&mut self, pos: usize) {
        self.memo.clear();
        self.error_pos = pos;
        self.expected.clear();
        self.skip = None;
        self.panic = false;
        self.rule_stack.clear();
    }
}

/// One parse call: borrowed grammar and input plus the parser's state.
pub(crate) struct Run<'p, T: Tracer> {
    pub grammar: &'p CompiledGrammar,
    pub follow: &'p FollowSets,
    pub input: &'p str,
    pub state: &'p mut ParseState,
    pub tracer: &'p mut T,
    pub options: ParseOptions,
    depth: u32,
}

impl<'p, T: Tracer> Run<'p, T> {
    pub fn new(
        grammar: &'p CompiledGrammar,
        follow: &'p FollowSets,
        input: &'p str,
        state: &'p mut ParseState,
        tracer: &'p mut T,
        options: ParseOptions,
    ) -> Self {
        Self {
            grammar,
            follow,
            input,
            state,
            tracer,
            options,
            depth: 0,
        }
    }

    pub fn parse_rule(
        &mut self,
        rule: RuleId,
        min_prec: i32,
        pos: usize,
    ) -> Result<Step, ParseError> {
        let grammar = self.grammar;
        let name = grammar.rule_name(rule);
        let key = MemoKey {
            pos,
            rule,
            min_prec,
        };
        // A result whose furthest failure is the recovery position was
        // computed before recovery could apply there.
        if let Some(cached) = self.state.memo.get(&key)
            && self.state.skip != Some(cached.max_fail())
        {
            let cached = cached.clone();
            self.tracer.trace_memo_hit(name, pos, min_prec, cached.end());
            return Ok(cached);
        }

        let recovering = self.state.skip == Some(pos);
        self.tracer.trace_enter_rule(name, pos, min_prec, recovering);
        self.enter(rule, pos)?;

        let mut best: Option<(Fragment, usize)> = None;
        let mut max_fail = pos;
        for &prefix in grammar.table(rule).prefixes(recovering) {
            let step = self.parse_expr(prefix, pos)?;
            max_fail = max_fail.max(step.max_fail());
            let Step::Success { fragment, end, .. } = step else {
                continue;
            };
            let (fragment, end, postfix_fail) =
                self.process_postfix(rule, fragment, min_prec, pos, end)?;
            max_fail = max_fail.max(postfix_fail);
            if best.as_ref().is_none_or(|(_, best_end)| end > *best_end) {
                best = Some((fragment, end));
            }
        }

        self.leave();
        let result = match best {
            Some((fragment, end)) => Step::Success {
                fragment,
                end,
                max_fail,
            },
            None => Step::Failure { max_fail },
        };
        self.tracer.trace_exit_rule(name, pos, result.end());
        self.state.memo.insert(key, result.clone());
        Ok(result)
    }

    /// Extend `lhs` with admissible postfix continuations until none applies.
    ///
    /// Returns the final fragment, its end and the furthest failure seen.
    fn process_postfix(
        &mut self,
        rule: RuleId,
        lhs: Fragment,
        min_prec: i32,
        start: usize,
        lhs_end: usize,
    ) -> Result<(Fragment, usize, usize), ParseError> {
        let grammar = self.grammar;
        let table = grammar.table(rule);
        let mut current = lhs;
        let mut pos = lhs_end;
        let mut max_fail = lhs_end;

        loop {
            let recovering = self.state.skip == Some(pos);
            let mut best: Option<(&Postfix, Fragment, usize)> = None;
            for postfix in table.postfixes(recovering) {
                if !postfix.admits(min_prec) {
                    continue;
                }
                let step = self.parse_postfix_tail(postfix, &current, start, pos)?;
                max_fail = max_fail.max(step.max_fail());
                let Step::Success { fragment, end, .. } = step else {
                    continue;
                };
                if end == pos && !recovering {
                    continue;
                }
                let better = match &best {
                    None => true,
                    Some((chosen, _, best_end)) => {
                        end > *best_end
                            || (end == *best_end && !recovering && chosen.right && !postfix.right)
                    }
                };
                if better {
                    best = Some((postfix, fragment, end));
                }
            }

            let Some((postfix, fragment, end)) = best else {
                break;
            };
            if end == pos {
                // A zero-width continuation at the recovery position ends
                // recovery without being applied.
                self.state.skip = None;
                break;
            }
            self.tracer.trace_postfix(&postfix.kind, start, end);
            current = fragment;
            pos = end;
        }
        Ok((current, pos, max_fail))
    }

    fn parse_postfix_tail(
        &mut self,
        postfix: &Postfix,
        lhs: &Fragment,
        start: usize,
        pos: usize,
    ) -> Result<Step, ParseError> {
        let mut children = Vec::with_capacity(postfix.tail.len() + 1);
        if let Fragment::Node(node) = lhs {
            children.push(node.clone());
        }
        self.parse_sequence(&postfix.tail, &postfix.kind, start, pos, children)
    }

    /// Grows the stack on demand so the recursion limit, not the thread's
    /// stack size, bounds nesting.
    pub fn parse_expr(&mut self, id: ExprId, pos: usize) -> Result<Step, ParseError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.eval_expr(id, pos))
    }

    fn eval_expr(&mut self, id: ExprId, pos: usize) -> Result<Step, ParseError> {
        let grammar = self.grammar;
        match grammar.expr(id) {
            Expr::Terminal(terminal) => Ok(self.parse_terminal(*terminal, pos)),
            Expr::Seq { elements, kind } => {
                self.parse_sequence(elements, kind, pos, pos, Vec::new())
            }
            Expr::OneOrMany { element, kind } => self.parse_repeat(*element, kind, 1, pos),
            Expr::ZeroOrMany { element, kind } => self.parse_repeat(*element, kind, 0, pos),
            Expr::Optional { element, kind } => self.parse_optional(*element, kind, pos),
            Expr::OftenMissed { element, kind } => self.parse_often_missed(*element, kind, pos),
            Expr::Ref(rule) => self.parse_rule(*rule, 0, pos),
            Expr::ReqRef {
                rule, precedence, ..
            } => self.parse_rule(*rule, *precedence, pos),
            Expr::And(inner) => self.parse_predicate(*inner, true, pos),
            Expr::Not(inner) => self.parse_predicate(*inner, false, pos),
            Expr::SeparatedList {
                element,
                separator,
                kind,
                end,
                can_be_empty,
            } => self.parse_separated_list(*element, *separator, kind, *end, *can_be_empty, pos),
            Expr::Inline { rule, body } => self.parse_inline(*rule, *body, pos),
        }
    }

    fn parse_terminal(&mut self, id: TerminalId, pos: usize) -> Step {
        let grammar = self.grammar;
        let terminal = grammar.terminal(id);
        let matched = terminal.try_match(self.input, pos);
        self.tracer.trace_terminal(terminal.as_ref(), pos, matched);

        if let Some(len) = matched {
            let content_end = pos + len;
            let end = content_end + self.trivia_len(content_end);
            let node = SyntaxNode::Terminal(TerminalNode {
                kind: terminal.kind().clone(),
                start: pos,
                end,
                content_len: len,
                is_recovery: terminal.is_recovery(),
            });
            return Step::node(node, end, pos);
        }

        if terminal.is_recovery() {
            return Step::Failure { max_fail: pos };
        }
        self.record_expected(Expected::Terminal(id), pos);
        if self.state.panic
            && self.state.skip == Some(pos)
            && let Some(step) = self.panic_recover(id, pos)
        {
            return step;
        }
        Step::Failure { max_fail: pos }
    }

    /// Elements in order; predicates are dropped and a single remaining
    /// child stands for the whole sequence. `children` may already hold a
    /// left operand, in which case the node starts at `start` rather than
    /// `pos`.
    fn parse_sequence(
        &mut self,
        elements: &[ExprId],
        kind: &Kind,
        start: usize,
        pos: usize,
        mut children: Vec<NodeRef>,
    ) -> Result<Step, ParseError> {
        let mut pos = pos;
        let mut max_fail = pos;
        for &element in elements {
            match self.parse_expr(element, pos)? {
                Step::Success {
                    fragment,
                    end,
                    max_fail: element_fail,
                } => {
                    max_fail = max_fail.max(element_fail);
                    if let Fragment::Node(node) = fragment {
                        children.push(node);
                    }
                    pos = end;
                }
                Step::Failure {
                    max_fail: element_fail,
                } => {
                    return Ok(Step::Failure {
                        max_fail: max_fail.max(element_fail),
                    });
                }
            }
        }

        let fragment = match children.len() {
            0 => Fragment::Predicate,
            1 => Fragment::Node(children.swap_remove(0)),
            _ => Fragment::Node(NodeRef::new(SyntaxNode::Seq(SeqNode {
                kind: kind.clone(),
                children,
                start,
                end: pos,
            }))),
        };
        Ok(Step::Success {
            fragment,
            end: pos,
            max_fail,
        })
    }

    /// `min` is 1 for one-or-many. An iteration that consumes nothing is
    /// kept once and ends the loop.
    fn parse_repeat(
        &mut self,
        element: ExprId,
        kind: &Kind,
        min: usize,
        start: usize,
    ) -> Result<Step, ParseError> {
        let mut children = Vec::new();
        let mut count = 0;
        let mut pos = start;
        let mut max_fail = start;
        loop {
            let step = self.parse_expr(element, pos)?;
            max_fail = max_fail.max(step.max_fail());
            let Step::Success { fragment, end, .. } = step else {
                break;
            };
            count += 1;
            if let Fragment::Node(node) = fragment {
                children.push(node);
            }
            if end == pos {
                break;
            }
            pos = end;
        }

        if count < min {
            return Ok(Step::Failure { max_fail });
        }
        let node = SyntaxNode::Seq(SeqNode {
            kind: kind.clone(),
            children,
            start,
            end: pos,
        });
        Ok(Step::node(node, pos, max_fail))
    }

    fn parse_optional(
        &mut self,
        element: ExprId,
        kind: &Kind,
        start: usize,
    ) -> Result<Step, ParseError> {
        let step = self.parse_expr(element, start)?;
        let max_fail = step.max_fail();
        let node = match step {
            Step::Success {
                fragment: Fragment::Node(value),
                end,
                ..
            } => {
                let node = SyntaxNode::Some(SomeNode {
                    kind: kind.clone(),
                    value,
                    start,
                    end,
                });
                return Ok(Step::node(node, end, max_fail));
            }
            Step::Success { .. } | Step::Failure { .. } => SyntaxNode::None(NoneNode {
                kind: kind.clone(),
                pos: start,
            }),
        };
        Ok(Step::node(node, start, max_fail))
    }

    fn parse_often_missed(
        &mut self,
        element: ExprId,
        kind: &Kind,
        start: usize,
    ) -> Result<Step, ParseError> {
        let step = self.parse_expr(element, start)?;
        if step.is_success() || self.state.skip != Some(start) {
            return Ok(step);
        }
        self.tracer.trace_recovery_node(kind, start);
        Ok(Step::node(
            recovery_node(kind.clone(), start),
            start,
            step.max_fail(),
        ))
    }

    /// Zero-width lookahead. Failures inside do not count as expectations
    /// and recovery state is left untouched.
    fn parse_predicate(
        &mut self,
        inner: ExprId,
        positive: bool,
        pos: usize,
    ) -> Result<Step, ParseError> {
        let error_pos = self.state.error_pos;
        let expected = self.state.expected.clone();
        let skip = self.state.skip;

        let matched = self.parse_expr(inner, pos)?.is_success();

        self.state.error_pos = error_pos;
        self.state.expected = expected;
        self.state.skip = skip;

        if matched == positive {
            Ok(Step::predicate(pos))
        } else {
            Ok(Step::Failure { max_fail: pos })
        }
    }

    fn parse_separated_list(
        &mut self,
        element: ExprId,
        separator: ExprId,
        kind: &Kind,
        end: SeparatorEnd,
        can_be_empty: bool,
        start: usize,
    ) -> Result<Step, ParseError> {
        let mut elements = Vec::new();
        let mut delimiters = Vec::new();
        let mut has_trailing_separator = false;
        let mut max_fail = start;
        let mut pos = start;

        match self.parse_expr(element, pos)? {
            Step::Success {
                fragment,
                end: element_end,
                max_fail: element_fail,
            } => {
                max_fail = max_fail.max(element_fail);
                push_fragment(&mut elements, fragment, pos);
                pos = element_end;
            }
            Step::Failure {
                max_fail: element_fail,
            } => {
                max_fail = max_fail.max(element_fail);
                if !can_be_empty {
                    return Ok(Step::Failure { max_fail });
                }
            }
        }

        while !elements.is_empty() {
            let iteration_start = pos;

            match self.parse_expr(separator, pos)? {
                Step::Success {
                    fragment,
                    end: separator_end,
                    max_fail: separator_fail,
                } => {
                    max_fail = max_fail.max(separator_fail);
                    push_fragment(&mut delimiters, fragment, pos);
                    pos = separator_end;
                }
                Step::Failure {
                    max_fail: separator_fail,
                } => {
                    max_fail = max_fail.max(separator_fail);
                    if end == SeparatorEnd::Required {
                        if self.state.skip != Some(pos) {
                            return Ok(Step::Failure { max_fail });
                        }
                        self.tracer.trace_recovery_node(ERROR_KIND, pos);
                        delimiters.push(NodeRef::new(recovery_node(Kind::from(ERROR_KIND), pos)));
                        self.state.skip = None;
                        has_trailing_separator = true;
                    }
                    break;
                }
            }

            match self.parse_expr(element, pos)? {
                Step::Success {
                    fragment,
                    end: element_end,
                    max_fail: element_fail,
                } => {
                    max_fail = max_fail.max(element_fail);
                    push_fragment(&mut elements, fragment, pos);
                    pos = element_end;
                }
                Step::Failure {
                    max_fail: element_fail,
                } => {
                    max_fail = max_fail.max(element_fail);
                    if end != SeparatorEnd::Forbidden {
                        has_trailing_separator = true;
                        break;
                    }
                    if self.state.skip != Some(pos) {
                        return Ok(Step::Failure { max_fail });
                    }
                    self.tracer.trace_recovery_node(ERROR_KIND, pos);
                    elements.push(NodeRef::new(recovery_node(Kind::from(ERROR_KIND), pos)));
                    self.state.skip = None;
                    break;
                }
            }

            if pos == iteration_start {
                break;
            }
        }

        let node = SyntaxNode::List(ListNode {
            kind: kind.clone(),
            elements,
            delimiters,
            start,
            end: pos,
            has_trailing_separator,
        });
        Ok(Step::node(node, pos, max_fail))
    }

    /// Inlined rule body. Keeps the rule on the stack for FOLLOW lookups but
    /// bypasses the memo table.
    fn parse_inline(&mut self, rule: RuleId, body: ExprId, pos: usize) -> Result<Step, ParseError> {
        self.enter(rule, pos)?;
        let step = self.parse_expr(body, pos);
        self.leave();
        step
    }

    fn enter(&mut self, rule: RuleId, pos: usize) -> Result<(), ParseError> {
        let limit = self.options.recursion_limit;
        if self.depth >= limit {
            return Err(ParseError::RecursionLimitExceeded { limit, pos });
        }
        self.depth += 1;
        self.state.rule_stack.push(rule);
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
        self.state.rule_stack.pop();
    }

    /// Keep only the failures at the furthest position.
    pub fn record_expected(&mut self, expected: Expected, pos: usize) {
        if pos < self.state.error_pos {
            return;
        }
        if pos > self.state.error_pos {
            self.state.error_pos = pos;
            self.state.expected.clear();
        }
        self.state.expected.insert(expected);
    }

    pub fn trivia_len(&self, pos: usize) -> usize {
        self.grammar.trivia.try_match(self.input, pos).unwrap_or(0)
    }
}

/// Zero-width node standing in for something missing.
pub(crate) fn recovery_node(kind: Kind, pos: usize) -> SyntaxNode {
    SyntaxNode::Terminal(TerminalNode {
        kind,
        start: pos,
        end: pos,
        content_len: 0,
        is_recovery: true,
    })
}

/// Lists keep predicate-only elements as an empty sequence so element and
/// delimiter indices stay aligned.
fn push_fragment(nodes: &mut Vec<NodeRef>, fragment: Fragment, pos: usize) {
    let node = match fragment {
        Fragment::Node(node) => node,
        Fragment::Predicate => NodeRef::new(SyntaxNode::Seq(SeqNode {
            kind: Kind::from("Empty"),
            children: Vec::new(),
            start: pos,
            end: pos,
        })),
    };
    nodes.push(node);
}
