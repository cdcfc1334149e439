use tdopp_core::{
    Grammar, ListNode, NoneNode, Rule, SeqNode, SomeNode, SyntaxVisitor, TerminalNode,
};

use crate::test_utils::*;

fn decl_grammar() -> Grammar {
    Grammar::new(whitespace()).rule(
        "Decl",
        [Rule::seq(
            "Decl",
            [
                Rule::lit("let"),
                pattern("Ident", "[a-z]+"),
                Rule::optional(Rule::seq(
                    "Init",
                    [Rule::lit("="), pattern("Number", "[0-9]+")],
                )),
            ],
        )],
    )
}

#[test]
fn optional_present() {
    let input = "let x = 1";
    let output = parse(&decl_grammar(), "Decl", input);
    assert_eq!(sexpr(&output, input), "(Decl let x Some((Init = 1)))");
}

#[test]
fn optional_absent() {
    let input = "let x";
    let output = parse(&decl_grammar(), "Decl", input);
    assert_eq!(sexpr(&output, input), "(Decl let x None)");
    assert_eq!(output.passes, 1);
}

#[test]
fn negative_lookahead_rejects_keyword() {
    let grammar = Grammar::default().rule(
        "Name",
        [Rule::seq(
            "Name",
            [Rule::not(Rule::lit("let")), pattern("Ident", "[a-z]+")],
        )],
    );
    assert_eq!(sexpr(&parse(&grammar, "Name", "x"), "x"), "x");

    // Lookahead failures never become expectations.
    let output = parse(&grammar, "Name", "let");
    assert_eq!(fatal(&output), "1:1: unexpected input");
}

#[test]
fn positive_lookahead_is_not_in_tree() {
    let grammar = Grammar::default()
        .rule(
            "Call",
            [Rule::seq(
                "Call",
                [Rule::reference("Callee"), Rule::lit("("), Rule::lit(")")],
            )],
        )
        .rule(
            "Callee",
            [Rule::seq(
                "Callee",
                [pattern("Ident", "[a-z]+"), Rule::and(Rule::lit("("))],
            )],
        );
    assert_eq!(sexpr(&parse(&grammar, "Call", "f()"), "f()"), "(Call f ( ))");

    let output = parse(&grammar, "Call", "f)");
    assert_eq!(fatal(&output), "1:1: unexpected input");
}

fn digits(min_one: bool) -> Grammar {
    let digit = pattern("Digit", "[0-9]");
    let repeat = if min_one {
        Rule::one_or_many(digit)
    } else {
        Rule::zero_or_many(digit)
    };
    Grammar::default().rule("Digits", [repeat.with_kind("Digits")])
}

#[test]
fn one_or_many() {
    let output = parse(&digits(true), "Digits", "123");
    assert_eq!(sexpr(&output, "123"), "(Digits 1 2 3)");

    let output = parse(&digits(true), "Digits", "");
    assert_eq!(fatal(&output), "1:1: expected Digit");
}

#[test]
fn zero_or_many_accepts_nothing() {
    let output = parse(&digits(false), "Digits", "");
    assert_eq!(sexpr(&output, ""), "(Digits)");
}

#[test]
fn zero_width_iteration_runs_once() {
    let grammar = Grammar::default().rule(
        "Marks",
        [Rule::zero_or_many(Rule::optional(Rule::lit("x")))],
    );
    assert_eq!(sexpr(&parse(&grammar, "Marks", ""), ""), "(ZeroOrMany None)");
    assert_eq!(
        sexpr(&parse(&grammar, "Marks", "xx"), "xx"),
        "(ZeroOrMany Some(x) Some(x) None)"
    );
}

/// Evaluates calculator trees.
struct Eval<'a> {
    input: &'a str,
}

impl SyntaxVisitor for Eval<'_> {
    type Output = i64;

    fn visit_terminal(&mut self, node: &TerminalNode) -> i64 {
        node.text(self.input).parse().unwrap()
    }

    fn visit_seq(&mut self, node: &SeqNode) -> i64 {
        let mut operand = |i: usize| node.children[i].accept(&mut *self);
        match &*node.kind {
            "Parens" => operand(1),
            "Neg" => -operand(1),
            "Add" => operand(0) + operand(2),
            "Sub" => operand(0) - operand(2),
            "Mul" => operand(0) * operand(2),
            "Pow" => {
                let base = operand(0);
                base.pow(operand(2) as u32)
            }
            kind => panic!("unexpected node {kind}"),
        }
    }

    fn visit_list(&mut self, _: &ListNode) -> i64 {
        unreachable!()
    }

    fn visit_some(&mut self, node: &SomeNode) -> i64 {
        node.value.accept(self)
    }

    fn visit_none(&mut self, _: &NoneNode) -> i64 {
        0
    }
}

#[test]
fn visitor_evaluates_tree() {
    let grammar = calc_grammar();
    let eval = |input: &str| {
        let output = parse(&grammar, "Expr", input);
        output.tree().unwrap().accept(&mut Eval { input })
    };
    assert_eq!(eval("1 + 2 * 3"), 7);
    assert_eq!(eval("10 - 4 - 3"), 3);
    assert_eq!(eval("2 ^ 3 ^ 2"), 512);
    assert_eq!(eval("-(1 + 2) * 4"), -12);
}
