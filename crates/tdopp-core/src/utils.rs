//! Text position helpers shared by diagnostics and trace output.

/// Convert a byte offset into a 1-based `(line, column)` pair.
///
/// `\r\n`, a lone `\r` and `\n` each end a line. Columns count chars, not
/// bytes. Offsets past the end clamp to the end of the text.
///
/// # Examples
/// ```
/// use tdopp_core::utils::line_col;
/// assert_eq!(line_col("ab\ncd", 4), (2, 2));
/// assert_eq!(line_col("ab\r\ncd", 4), (2, 1));
/// ```
pub fn line_col(text: &str, pos: usize) -> (usize, usize) {
    let prefix = &text[..floor_char_boundary(text, pos)];
    let mut line = 1;
    let mut col = 1;
    let mut chars = prefix.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                line += 1;
                col = 1;
            }
            '\n' => {
                line += 1;
                col = 1;
            }
            _ => col += 1,
        }
    }
    (line, col)
}

/// Render up to `width` chars of context around `pos` with a caret below it.
///
/// Newlines and tabs are escaped so the excerpt always fits on one line and
/// the caret stays aligned.
///
/// # Examples
/// ```
/// use tdopp_core::utils::highlight_context;
/// assert_eq!(highlight_context("x = ;", 4, 20), "x = ;\n    ^");
/// ```
pub fn highlight_context(input: &str, pos: usize, width: usize) -> String {
    let pos = floor_char_boundary(input, pos);
    let half = width / 2;

    let mut before: Vec<char> = input[..pos].chars().rev().take(half).collect();
    before.reverse();
    let before: String = before.into_iter().map(escape_char).collect();
    let after: String = input[pos..].chars().take(half).map(escape_char).collect();

    let caret_col = before.chars().count();
    format!("{before}{after}\n{}^", " ".repeat(caret_col))
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Largest char boundary at or below `pos`, clamped to the text length.
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Byte length of the char starting at `pos`, or 0 at the end of the text.
pub fn char_len_at(text: &str, pos: usize) -> usize {
    text.get(pos..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8)
}
