//! Tracing hooks for debugging parses.
//!
//! The interpreter is generic over [`Tracer`]. With [`NoopTracer`] every hook
//! is an empty `#[inline(always)]` function and compiles away. [`PrintTracer`]
//! collects an indented, human-readable log.
//!
//! Pass-level events are also emitted through `tracing` at debug level, so a
//! subscriber sees them regardless of which tracer is plugged in.

use tdopp_core::{Palette, Role};
use tdopp_core::grammar::Terminal;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Passes, rule entry/exit and recovery events.
    #[default]
    Default,
    /// Adds matched terminals, memo hits and applied postfix operators.
    Verbose,
    /// Adds terminal mismatches.
    VeryVerbose,
}

/// Parse instrumentation.
///
/// Hooks receive names and offsets the interpreter already has; formatting
/// happens in the implementation.
pub trait Tracer {
    /// Called at the start of every pass over the input.
    fn trace_pass(&mut self, pass: u32, skip: Option<usize>, panic: bool);

    /// Called when a rule is about to be evaluated (not on memo hits).
    fn trace_enter_rule(&mut self, rule: &str, pos: usize, min_prec: i32, recovering: bool);

    /// Called after a rule evaluation; `end` is `None` on failure.
    fn trace_exit_rule(&mut self, rule: &str, pos: usize, end: Option<usize>);

    /// Called when a memoized result is reused.
    fn trace_memo_hit(&mut self, rule: &str, pos: usize, min_prec: i32, end: Option<usize>);

    /// Called after every terminal match attempt.
    fn trace_terminal(&mut self, terminal: &dyn Terminal, pos: usize, len: Option<usize>);

    /// Called when a postfix continuation extends the left operand.
    fn trace_postfix(&mut self, kind: &str, start: usize, end: usize);

    /// Called when recovery inserts a zero-width node.
    fn trace_recovery_node(&mut self, kind: &str, pos: usize);

    /// Called when panic mode skips input.
    fn trace_panic(&mut self, start: usize, end: usize);

    /// Called when no further recovery is possible.
    fn trace_fatal(&mut self, pos: usize);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_pass(&mut self, _pass: u32, _skip: Option<usize>, _panic: bool) {}

    #[inline(always)]
    fn trace_enter_rule(&mut self, _rule: &str, _pos: usize, _min_prec: i32, _recovering: bool) {}

    #[inline(always)]
    fn trace_exit_rule(&mut self, _rule: &str, _pos: usize, _end: Option<usize>) {}

    #[inline(always)]
    fn trace_memo_hit(&mut self, _rule: &str, _pos: usize, _min_prec: i32, _end: Option<usize>) {}

    #[inline(always)]
    fn trace_terminal(&mut self, _terminal: &dyn Terminal, _pos: usize, _len: Option<usize>) {}

    #[inline(always)]
    fn trace_postfix(&mut self, _kind: &str, _start: usize, _end: usize) {}

    #[inline(always)]
    fn trace_recovery_node(&mut self, _kind: &str, _pos: usize) {}

    #[inline(always)]
    fn trace_panic(&mut self, _start: usize, _end: usize) {}

    #[inline(always)]
    fn trace_fatal(&mut self, _pos: usize) {}
}

/// Tracer that collects an indented log of the parse.
pub struct PrintTracer<'s> {
    /// Input, for showing matched text.
    input: &'s str,
    verbosity: Verbosity,
    lines: Vec<String>,
    /// Current rule nesting.
    depth: usize,
    palette: Palette,
}

impl<'s> PrintTracer<'s> {
    pub fn new(input: &'s str, verbosity: Verbosity, palette: Palette) -> Self {
        Self {
            input,
            verbosity,
            lines: Vec::new(),
            depth: 0,
            palette,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn push(&mut self, content: String) {
        self.lines
            .push(format!("{:indent$}{content}", "", indent = self.depth * 2));
    }

    fn shows(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    fn format_end(&self, pos: usize, end: Option<usize>) -> String {
        let p = self.palette;
        match end {
            Some(end) => format!(
                "{} {}",
                p.paint(Role::Matched, "ok"),
                p.paint(Role::Position, format!("{pos}..{end}"))
            ),
            None => format!(
                "{} {}",
                p.paint(Role::Recovery, "fail"),
                p.paint(Role::Position, format!("@{pos}"))
            ),
        }
    }
}

impl Tracer for PrintTracer<'_> {
    fn trace_pass(&mut self, pass: u32, skip: Option<usize>, panic: bool) {
        let mut line = format!("pass {pass}");
        if let Some(skip) = skip {
            line.push_str(&format!(" skip={skip}"));
        }
        if panic {
            line.push_str(" panic");
        }
        self.depth = 0;
        self.push(line);
    }

    fn trace_enter_rule(&mut self, rule: &str, pos: usize, min_prec: i32, recovering: bool) {
        let p = self.palette;
        let mut line = format!(
            "{}:{min_prec} {}",
            p.paint(Role::Kind, rule),
            p.paint(Role::Position, format!("@{pos}"))
        );
        if recovering {
            line.push_str(&format!(" {}", p.paint(Role::Recovery, "recovering")));
        }
        self.push(line);
        self.depth += 1;
    }

    fn trace_exit_rule(&mut self, rule: &str, pos: usize, end: Option<usize>) {
        self.depth = self.depth.saturating_sub(1);
        let rule = self.palette.paint(Role::Kind, rule);
        let line = format!("{rule} {}", self.format_end(pos, end));
        self.push(line);
    }

    fn trace_memo_hit(&mut self, rule: &str, pos: usize, min_prec: i32, end: Option<usize>) {
        if !self.shows(Verbosity::Verbose) {
            return;
        }
        let rule = self.palette.paint(Role::Kind, rule);
        let line = format!("memo {rule}:{min_prec} {}", self.format_end(pos, end));
        self.push(line);
    }

    fn trace_terminal(&mut self, terminal: &dyn Terminal, pos: usize, len: Option<usize>) {
        let p = self.palette;
        let at = p.paint(Role::Position, format!("@{pos}"));
        let line = match len {
            Some(len) if self.shows(Verbosity::Verbose) => {
                let text = format!("{:?}", &self.input[pos..pos + len]);
                format!("{terminal} {} {at}", p.paint(Role::Matched, text))
            }
            None if self.shows(Verbosity::VeryVerbose) => {
                format!("{terminal} {} {at}", p.paint(Role::Recovery, "miss"))
            }
            _ => return,
        };
        self.push(line);
    }

    fn trace_postfix(&mut self, kind: &str, start: usize, end: usize) {
        if !self.shows(Verbosity::Verbose) {
            return;
        }
        let p = self.palette;
        let line = format!(
            "postfix {} {}",
            p.paint(Role::Kind, kind),
            p.paint(Role::Position, format!("{start}..{end}"))
        );
        self.push(line);
    }

    fn trace_recovery_node(&mut self, kind: &str, pos: usize) {
        let p = self.palette;
        let line = format!(
            "{} {}",
            p.paint(Role::Recovery, format!("insert {kind}")),
            p.paint(Role::Position, format!("@{pos}"))
        );
        self.push(line);
    }

    fn trace_panic(&mut self, start: usize, end: usize) {
        let p = self.palette;
        let line = format!(
            "{} {}",
            p.paint(Role::Recovery, "panic skip"),
            p.paint(Role::Position, format!("{start}..{end}"))
        );
        self.push(line);
    }

    fn trace_fatal(&mut self, pos: usize) {
        let p = self.palette;
        self.depth = 0;
        let line = format!(
            "{} {}",
            p.paint(Role::Recovery, "fatal"),
            p.paint(Role::Position, format!("@{pos}"))
        );
        self.push(line);
    }
}
