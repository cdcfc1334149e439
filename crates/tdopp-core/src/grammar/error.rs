//! Errors raised while building or loading a grammar.

/// Error during grammar loading or linking.
///
/// All variants are programmer errors in the grammar itself and are reported
/// before any input is parsed.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("trivia must be a terminal rule, found `{0}`")]
    NotATerminal(String),

    #[error("rule `{name}` referenced from `{referenced_from}` is not defined")]
    UnknownRule {
        name: String,
        referenced_from: String,
    },

    #[error("rule `{0}` has no alternatives")]
    EmptyRule(String),

    #[error("left-recursive alternative of `{0}` has nothing after the self reference")]
    EmptyPostfix(String),
}
