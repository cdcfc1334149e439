//! Recovery driver and panic-mode scanning.
//!
//! A parse is a sequence of passes over the same input:
//!
//! 1. Parse the start rule. If it consumes the whole input, done.
//! 2. Otherwise the furthest failure position becomes the recovery
//!    position. Memo entries that could change are dropped and the next pass
//!    enables recovery alternatives at exactly that position.
//! 3. When a pass fails no further than the previous recovery position,
//!    recovery has stalled. Panic mode gets one attempt if enabled; after
//!    that the parse ends with a [`FatalError`].

use indexmap::IndexSet;
use tdopp_core::utils::char_len_at;
use tdopp_core::{Kind, SeqNode, SyntaxNode, TerminalNode};

use super::error::ParseError;
use super::fatal::FatalError;
use super::ids::{RuleId, TerminalId};
use super::interpreter::{ERROR_KIND, Expected, Run};
use super::parser::{Outcome, ParseOutput};
use super::step::{Fragment, Step};
use super::trace::Tracer;

impl<T: Tracer> Run<'_, T> {
    pub fn drive(&mut self, start: RuleId, start_pos: usize) -> Result<ParseOutput, ParseError> {
        self.state.reset(start_pos);
        let trivia_len = self.trivia_len(start_pos);
        let origin = start_pos + trivia_len;

        let mut recovered = Vec::new();
        let mut previous_skip: Option<usize> = None;
        let mut passes = 0;

        loop {
            passes += 1;
            self.tracer
                .trace_pass(passes, self.state.skip, self.state.panic);
            tracing::debug!(
                pass = passes,
                skip = ?self.state.skip,
                panic = self.state.panic,
                "parse pass"
            );

            let step = self.parse_rule(start, 0, origin)?;
            match step.end() {
                Some(end) if end == self.input.len() => {
                    tracing::debug!(passes, recovered = recovered.len(), "parse complete");
                    return Ok(self.finish(step, origin, trivia_len, None, recovered, passes));
                }
                Some(end) => self.record_expected(Expected::EndOfInput, end),
                None => {}
            }

            let error_pos = self.state.error_pos;
            let stalled = previous_skip.is_some_and(|previous| error_pos <= previous);
            if stalled {
                if self.options.panic_recovery && !self.state.panic {
                    tracing::debug!(error_pos, "recovery stalled, entering panic mode");
                    self.state.panic = true;
                    self.restart_at(origin, error_pos);
                    continue;
                }

                recovered.pop();
                tracing::debug!(error_pos, passes, "recovery stalled");
                self.tracer.trace_fatal(error_pos);
                let fatal = self.fatal_error();
                return Ok(self.finish(step, origin, trivia_len, Some(fatal), recovered, passes));
            }

            self.state.panic = false;
            previous_skip = Some(error_pos);
            recovered.push(error_pos);
            self.restart_at(origin, error_pos);
        }
    }

    fn restart_at(&mut self, origin: usize, skip: usize) {
        self.state.skip = Some(skip);
        let dropped = self.state.memo.invalidate(origin, skip);
        tracing::trace!(skip, dropped, "memo invalidated");
    }

    fn fatal_error(&self) -> FatalError {
        let grammar = self.grammar;
        let expected: IndexSet<String> = self
            .state
            .expected
            .iter()
            .map(|expected| match expected {
                Expected::Terminal(id) => grammar.terminal(*id).to_string(),
                Expected::EndOfInput => "end of input".to_string(),
            })
            .collect();
        FatalError::new(self.input, self.state.error_pos, expected.into_iter().collect())
    }

    fn finish(
        &self,
        step: Step,
        origin: usize,
        trivia_len: usize,
        fatal: Option<FatalError>,
        recovered: Vec<usize>,
        passes: u32,
    ) -> ParseOutput {
        let outcome = match step {
            Step::Success {
                fragment: Fragment::Node(node),
                end,
                max_fail,
            } => Outcome::Success {
                node,
                end,
                max_fail_pos: max_fail,
            },
            // Only lookaheads matched; report an empty node.
            Step::Success {
                fragment: Fragment::Predicate,
                end,
                max_fail,
            } => Outcome::Success {
                node: SyntaxNode::Seq(SeqNode {
                    kind: Kind::from(ERROR_KIND),
                    children: Vec::new(),
                    start: origin,
                    end,
                })
                .into(),
                end,
                max_fail_pos: max_fail,
            },
            Step::Failure { max_fail } => Outcome::Failure {
                max_fail_pos: max_fail,
            },
        };
        ParseOutput {
            outcome,
            trivia_len,
            fatal,
            recovered,
            passes,
        }
    }

    /// Skip ahead from `start` to a place the parse can continue from.
    ///
    /// Either the terminal that was expected turns up later, and it is
    /// returned after an `Error` node covering the skipped text, or something
    /// in FOLLOW of the innermost rule does, and the skipped text alone
    /// becomes the `Error` node. Both reset the recovery position.
    pub fn panic_recover(&mut self, expected: TerminalId, start: usize) -> Option<Step> {
        let grammar = self.grammar;
        let input = self.input;
        let follow_sets = self.follow;
        let terminal = grammar.terminal(expected);
        let follow = self
            .state
            .rule_stack
            .last()
            .map(|&rule| follow_sets.of(rule));

        let mut pos = start;
        let mut skipped_end = start;
        loop {
            if pos > start
                && let Some(len) = terminal.try_match(input, pos).filter(|&len| len > 0)
            {
                let content_end = pos + len;
                let end = content_end + self.trivia_len(content_end);
                let found = SyntaxNode::Terminal(TerminalNode {
                    kind: terminal.kind().clone(),
                    start: pos,
                    end,
                    content_len: len,
                    is_recovery: false,
                });
                let node = SyntaxNode::Seq(SeqNode {
                    kind: Kind::from(ERROR_KIND),
                    children: vec![skipped(start, pos, skipped_end).into(), found.into()],
                    start,
                    end,
                });
                self.tracer.trace_panic(start, pos);
                self.state.skip = None;
                return Some(Step::node(node, end, start));
            }

            let follows = follow.is_some_and(|follow| {
                (follow.end_of_input && pos == input.len())
                    || follow.terminals.iter().any(|&id| {
                        grammar
                            .terminal(id)
                            .try_match(input, pos)
                            .is_some_and(|len| len > 0)
                    })
            });
            if follows {
                self.tracer.trace_panic(start, pos);
                self.state.skip = None;
                return Some(Step::node(skipped(start, pos, skipped_end), pos, start));
            }

            if pos >= input.len() {
                return None;
            }
            pos += char_len_at(input, pos);
            skipped_end = pos;
            pos += self.trivia_len(pos);
        }
    }
}

/// `Error` terminal over skipped text; trivia after `content_end` is part of
/// its span but not its content.
fn skipped(start: usize, end: usize, content_end: usize) -> SyntaxNode {
    SyntaxNode::Terminal(TerminalNode {
        kind: Kind::from(ERROR_KIND),
        start,
        end,
        content_len: content_end - start,
        is_recovery: true,
    })
}
