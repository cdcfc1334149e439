//! Highlighting for tree dumps and parse traces.
//!
//! Callers name what a fragment means, not how it looks. Recovery output is
//! always red so inserted nodes and skipped input stand out from real matches.

use std::fmt;

const RESET: &str = "\x1b[0m";

/// What a highlighted fragment stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Rule names and node kinds.
    Kind,
    /// Input consumed by a terminal.
    Matched,
    /// Inserted nodes, skipped input and failures.
    Recovery,
    /// Offsets, spans and precedences.
    Position,
}

impl Role {
    fn ansi(self) -> &'static str {
        match self {
            Role::Kind => "\x1b[34m",
            Role::Matched => "\x1b[32m",
            Role::Recovery => "\x1b[31m",
            Role::Position => "\x1b[2m",
        }
    }
}

/// Whether output carries ANSI escapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    ansi: bool,
}

impl Palette {
    pub const PLAIN: Self = Self { ansi: false };
    pub const ANSI: Self = Self { ansi: true };

    pub fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    pub fn is_ansi(self) -> bool {
        self.ansi
    }

    /// Wraps `value` so its `Display` output is highlighted for `role`.
    pub fn paint<T: fmt::Display>(self, role: Role, value: T) -> Painted<T> {
        Painted {
            escape: self.ansi.then(|| role.ansi()),
            value,
        }
    }
}

/// A value rendered with an optional highlight.
pub struct Painted<T> {
    escape: Option<&'static str>,
    value: T,
}

impl<T: fmt::Display> fmt::Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.escape {
            Some(escape) => write!(f, "{escape}{}{RESET}", self.value),
            None => self.value.fmt(f),
        }
    }
}
