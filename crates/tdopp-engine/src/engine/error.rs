//! Errors that abort a parse call.
//!
//! An input that cannot be parsed is not an error here: it is reported
//! through [`ParseOutput::fatal`](super::ParseOutput::fatal).

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown start rule `{0}`")]
    UnknownStartRule(String),

    #[error("start position {0} is not a char boundary inside the input")]
    InvalidStartPosition(usize),

    /// Too many nested rule invocations.
    #[error("recursion limit of {limit} exceeded at offset {pos}")]
    RecursionLimitExceeded { limit: u32, pos: usize },
}
