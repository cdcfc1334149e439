//! Unrecoverable syntax errors.

use std::ops::Range;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use tdopp_core::utils::{char_len_at, highlight_context, line_col};

/// Chars of context shown by [`FatalError::highlight`].
const HIGHLIGHT_WIDTH: usize = 60;

/// Syntax error that recovery could not get past.
///
/// `Display` gives a one-line `line:col: expected ...` message; use
/// [`FatalError::highlight`] or [`FatalError::render`] to show the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{col}: {}", describe_expected(.expected))]
pub struct FatalError {
    pub input: String,
    /// Byte offset of the furthest failure.
    pub pos: usize,
    /// 1-based.
    pub line: usize,
    /// 1-based, in chars.
    pub col: usize,
    /// Display forms of the expected terminals, in first-seen order.
    pub expected: Vec<String>,
}

impl FatalError {
    pub fn new(input: &str, pos: usize, expected: Vec<String>) -> Self {
        let (line, col) = line_col(input, pos);
        Self {
            input: input.to_string(),
            pos,
            line,
            col,
            expected,
        }
    }

    /// Message followed by an excerpt of the input with a caret at the error.
    pub fn highlight(&self) -> String {
        format!(
            "{self}\n{}",
            highlight_context(&self.input, self.pos, HIGHLIGHT_WIDTH)
        )
    }

    /// Full diagnostic with a source snippet.
    pub fn render(&self, path: Option<&str>, colored: bool) -> String {
        let renderer = if colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let message = describe_expected(&self.expected);
        let mut snippet = Snippet::source(self.input.as_str())
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(self.span()));
        if let Some(path) = path {
            snippet = snippet.path(path);
        }

        let report = [Level::ERROR.primary_title(&message).element(snippet)];
        renderer.render(&report).to_string()
    }

    /// The offending char, or an empty range at the end of input.
    fn span(&self) -> Range<usize> {
        self.pos..self.pos + char_len_at(&self.input, self.pos)
    }
}

fn describe_expected(expected: &[String]) -> String {
    if expected.is_empty() {
        return "unexpected input".to_string();
    }
    format!("expected {}", expected.join(", "))
}
