//! Knobs for grammar compilation and parsing.

/// Options for [`CompiledGrammar::build_with`](super::CompiledGrammar::build_with).
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOptions {
    pub(crate) inline_rules: bool,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitute simple non-recursive rules at their reference sites.
    ///
    /// Parse results are unchanged; inlined rules skip the memo table.
    pub fn inline_rules(mut self, value: bool) -> Self {
        self.inline_rules = value;
        self
    }

    pub fn get_inline_rules(&self) -> bool {
        self.inline_rules
    }
}

/// Per-parser limits and recovery behavior.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Maximum nesting of rule invocations (default: 1,000).
    pub(crate) recursion_limit: u32,
    /// Fall back to panic-mode scanning when a recovery pass stalls
    /// (default: off).
    pub(crate) panic_recovery: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recursion_limit: 1000,
            panic_recovery: false,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn panic_recovery(mut self, enabled: bool) -> Self {
        self.panic_recovery = enabled;
        self
    }

    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    pub fn get_panic_recovery(&self) -> bool {
        self.panic_recovery
    }
}
