//! Dense indices into the tables of a [`CompiledGrammar`](super::CompiledGrammar).

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        $vis struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Rule index in definition order.
    pub struct RuleId;
}

define_id! {
    /// Terminal index. Every terminal occurrence is registered once per
    /// shared `Arc`.
    pub struct TerminalId;
}

define_id! {
    pub(crate) struct ExprId;
}
