//! Debug renderings of syntax trees.
//!
//! Nodes never store their input, so every printer takes it explicitly.

use std::fmt::Write as _;

use super::node::SyntaxNode;
use super::palette::{Palette, Role};

impl SyntaxNode {
    /// Compact one-line rendering.
    ///
    /// Terminals print as their text, recovery terminals as `<Kind>` or
    /// `<Kind "text">`, sequences as `(Kind …)`, lists as `[Kind …]` with
    /// delimiters interleaved, optionals as `Some(…)` and `None`.
    pub fn sexpr(&self, input: &str) -> String {
        let mut out = String::new();
        write_sexpr(&mut out, self, input);
        out
    }
}

fn write_sexpr(out: &mut String, node: &SyntaxNode, input: &str) {
    match node {
        SyntaxNode::Terminal(n) => {
            let text = n.text(input);
            match (n.is_recovery, text.is_empty()) {
                (true, true) => write!(out, "<{}>", n.kind),
                (true, false) => write!(out, "<{} {:?}>", n.kind, text),
                (false, true) => write!(out, "\"\""),
                (false, false) => write!(out, "{text}"),
            }
            .unwrap();
        }
        SyntaxNode::Seq(n) => {
            write!(out, "({}", n.kind).unwrap();
            for child in &n.children {
                out.push(' ');
                write_sexpr(out, child, input);
            }
            out.push(')');
        }
        SyntaxNode::List(n) => {
            write!(out, "[{}", n.kind).unwrap();
            for child in node.children() {
                out.push(' ');
                write_sexpr(out, child, input);
            }
            out.push(']');
        }
        SyntaxNode::Some(n) => {
            out.push_str("Some(");
            write_sexpr(out, &n.value, input);
            out.push(')');
        }
        SyntaxNode::None(_) => out.push_str("None"),
    }
}

/// Indented multi-line tree dump.
///
/// ```text
/// Add 0..5
///   Number 0..1 "1"
///   + 1..2 "+"
///   Number 2..5 "234"
/// ```
pub struct TreePrinter<'a> {
    input: &'a str,
    spans: bool,
    palette: Palette,
}

impl<'a> TreePrinter<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            spans: true,
            palette: Palette::PLAIN,
        }
    }

    pub fn spans(mut self, value: bool) -> Self {
        self.spans = value;
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.palette = Palette::new(value);
        self
    }

    pub fn render(&self, node: &SyntaxNode) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node, 0);
        out
    }

    fn write_node(&self, out: &mut String, node: &SyntaxNode, depth: usize) {
        let p = self.palette;
        let role = if node.is_recovery() { Role::Recovery } else { Role::Kind };

        if depth > 0 {
            out.push('\n');
        }
        write!(out, "{:indent$}{}", "", p.paint(role, node.kind()), indent = depth * 2).unwrap();

        if self.spans {
            let span = format!("{}..{}", node.start(), node.end());
            write!(out, " {}", p.paint(Role::Position, span)).unwrap();
        }

        match node {
            SyntaxNode::Terminal(n) => {
                let text = format!("{:?}", n.text(self.input));
                write!(out, " {}", p.paint(Role::Matched, text)).unwrap();
                if n.is_recovery {
                    write!(out, " {}", p.paint(Role::Recovery, "recovery")).unwrap();
                }
            }
            SyntaxNode::Seq(_) => {}
            SyntaxNode::List(n) => {
                out.push_str(" list");
                if n.has_trailing_separator {
                    out.push_str(" trailing");
                }
            }
            SyntaxNode::Some(_) => out.push_str(" some"),
            SyntaxNode::None(_) => out.push_str(" none"),
        }

        for child in node.children() {
            self.write_node(out, child, depth + 1);
        }
    }
}
