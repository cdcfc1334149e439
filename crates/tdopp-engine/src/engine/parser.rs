//! Public parsing entry point.

use std::sync::Arc;

use tdopp_core::NodeRef;

use super::compiled::CompiledGrammar;
use super::error::ParseError;
use super::fatal::FatalError;
use super::first_follow::FollowSets;
use super::interpreter::{ParseState, Run};
use super::options::ParseOptions;
use super::trace::{NoopTracer, Tracer};

/// Result of the last pass of a parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        node: NodeRef,
        end: usize,
        max_fail_pos: usize,
    },
    Failure {
        max_fail_pos: usize,
    },
}

/// Everything a parse call reports.
///
/// When `fatal` is set, `outcome` is whatever the last pass produced: a
/// failure, or a tree that does not cover the whole input.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub outcome: Outcome,
    /// Length of the trivia skipped before the start rule.
    pub trivia_len: usize,
    pub fatal: Option<FatalError>,
    /// Recovery positions, in the order passes used them.
    pub recovered: Vec<usize>,
    pub passes: u32,
}

impl ParseOutput {
    /// The tree, if the parse covered the whole input.
    pub fn tree(&self) -> Option<&NodeRef> {
        match (&self.outcome, &self.fatal) {
            (Outcome::Success { node, .. }, None) => Some(node),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.tree().is_some()
    }

    /// Whether recovery had to change anything.
    pub fn has_errors(&self) -> bool {
        self.fatal.is_some() || !self.recovered.is_empty()
    }
}

/// Parser over one compiled grammar.
///
/// Holds the memo table and recovery state, so a parser is used by one
/// thread at a time; share the grammar, not the parser.
pub struct Parser {
    grammar: Arc<CompiledGrammar>,
    options: ParseOptions,
    state: ParseState,
    /// FOLLOW sets of the most recent start rule.
    follow: Option<Arc<FollowSets>>,
}

impl Parser {
    pub fn new(grammar: Arc<CompiledGrammar>) -> Self {
        Self::with_options(grammar, ParseOptions::default())
    }

    pub fn with_options(grammar: Arc<CompiledGrammar>, options: ParseOptions) -> Self {
        Self {
            grammar,
            options,
            state: ParseState::default(),
            follow: None,
        }
    }

    pub fn grammar(&self) -> &Arc<CompiledGrammar> {
        &self.grammar
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn parse(&mut self, input: &str, start: &str) -> Result<ParseOutput, ParseError> {
        self.parse_at(input, start, 0)
    }

    /// Parse `input[start_pos..]`; offsets in the result stay relative to
    /// the whole input.
    pub fn parse_at(
        &mut self,
        input: &str,
        start: &str,
        start_pos: usize,
    ) -> Result<ParseOutput, ParseError> {
        self.parse_traced(input, start, start_pos, &mut NoopTracer)
    }

    pub fn parse_traced<T: Tracer>(
        &mut self,
        input: &str,
        start: &str,
        start_pos: usize,
        tracer: &mut T,
    ) -> Result<ParseOutput, ParseError> {
        let rule = self
            .grammar
            .rule_id(start)
            .ok_or_else(|| ParseError::UnknownStartRule(start.to_string()))?;
        if !input.is_char_boundary(start_pos) {
            return Err(ParseError::InvalidStartPosition(start_pos));
        }

        let follow = match &self.follow {
            Some(follow) if follow.start() == rule => follow.clone(),
            _ => {
                let follow = Arc::new(FollowSets::compute(&self.grammar, rule));
                self.follow = Some(follow.clone());
                follow
            }
        };

        let mut run = Run::new(
            &self.grammar,
            &follow,
            input,
            &mut self.state,
            tracer,
            self.options,
        );
        run.drive(rule, start_pos)
    }

    /// Memo table left by the last parse, one entry per line.
    pub fn memo_table(&self, input: &str) -> String {
        self.state.memo.render(&self.grammar, input)
    }

    /// Number of memo entries left by the last parse.
    pub fn memo_len(&self) -> usize {
        self.state.memo.len()
    }
}
