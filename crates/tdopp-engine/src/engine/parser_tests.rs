use std::sync::Arc;

use tdopp_core::{Grammar, Rule, TreePrinter};

use super::*;
use crate::test_utils::*;

fn calc(input: &str) -> String {
    sexpr(&parse(&calc_grammar(), "Expr", input), input)
}

#[test]
fn single_number() {
    assert_eq!(calc("42"), "42");
}

#[test]
fn multiplication_binds_tighter() {
    assert_eq!(calc("1+2*3"), "(Add 1 + (Mul 2 * 3))");
    assert_eq!(calc("1*2+3"), "(Add (Mul 1 * 2) + 3)");
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(calc("1-2-3"), "(Sub (Sub 1 - 2) - 3)");
}

#[test]
fn power_is_right_associative() {
    assert_eq!(calc("2^3^4"), "(Pow 2 ^ (Pow 3 ^ 4))");
}

#[test]
fn prefix_operator_binds_tightest() {
    assert_eq!(calc("-2*3"), "(Mul (Neg - 2) * 3)");
    assert_eq!(calc("-2^2"), "(Pow (Neg - 2) ^ 2)");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(calc("(1+2)*3"), "(Mul (Parens ( (Add 1 + 2) )) * 3)");
}

#[test]
fn trivia_is_attached_to_terminals() {
    let input = "  1 +\n 2 ";
    let output = parse(&calc_grammar(), "Expr", input);
    assert_eq!(output.trivia_len, 2);
    assert_eq!(sexpr(&output, input), "(Add 1 + 2)");

    let tree = output.tree().unwrap();
    insta::assert_snapshot!(TreePrinter::new(input).render(tree), @r#"
    Add 2..9
      Number 2..4 "1"
      + 4..7 "+"
      Number 7..9 "2"
    "#);
}

#[test]
fn clean_parse_reports_single_pass() {
    let output = parse(&calc_grammar(), "Expr", "1+2");
    assert!(output.is_success());
    assert!(!output.has_errors());
    assert_eq!(output.passes, 1);
    assert!(output.recovered.is_empty());
    let Outcome::Success { end, .. } = output.outcome else {
        panic!("expected success");
    };
    assert_eq!(end, 3);
}

#[test]
fn equal_length_postfix_prefers_left_associative() {
    let grammar = Grammar::default().rule(
        "Expr",
        [
            pattern("Number", "[0-9]+"),
            Rule::seq(
                "AssignRight",
                [Rule::reference("Expr"), Rule::lit("="), Rule::req_right("Expr", 1)],
            ),
            Rule::seq(
                "AssignLeft",
                [Rule::reference("Expr"), Rule::lit("="), Rule::req("Expr", 1)],
            ),
        ],
    );
    let input = "1=2";
    assert_eq!(
        sexpr(&parse(&grammar, "Expr", input), input),
        "(AssignLeft 1 = 2)"
    );
}

#[test]
fn equal_length_postfix_keeps_declaration_order() {
    let grammar = Grammar::default().rule(
        "Expr",
        [
            pattern("Ident", "[a-z]+"),
            Rule::seq("First", [Rule::reference("Expr"), Rule::lit("!")]),
            Rule::seq("Second", [Rule::reference("Expr"), Rule::lit("!")]),
        ],
    );
    let input = "a!!";
    assert_eq!(
        sexpr(&parse(&grammar, "Expr", input), input),
        "(First (First a !) !)"
    );
}

#[test]
fn postfix_precedence_from_head_reference() {
    // Call binds tighter than `*` because of the precedence on the head.
    let grammar = Grammar::default().rule(
        "Expr",
        [
            pattern("Ident", "[a-z]+"),
            Rule::seq(
                "Mul",
                [Rule::reference("Expr"), Rule::lit("*"), Rule::req("Expr", 20)],
            ),
            Rule::seq(
                "Call",
                [Rule::req("Expr", 50), Rule::lit("("), Rule::lit(")")],
            ),
        ],
    );
    let input = "a*f()";
    assert_eq!(
        sexpr(&parse(&grammar, "Expr", input), input),
        "(Mul a * (Call f ( )))"
    );
}

#[test]
fn longest_prefix_wins() {
    let grammar = Grammar::default().rule(
        "Word",
        [
            pattern("Short", "ab"),
            pattern("Long", "abc"),
            pattern("Shorter", "a"),
        ],
    );
    let output = parse(&grammar, "Word", "abc");
    assert_eq!(&**output.tree().unwrap().kind(), "Long");
}

#[test]
fn parse_at_offset() {
    let compiled = compile(&calc_grammar());
    let mut parser = Parser::new(compiled);
    let input = "xx 1+2";
    let output = parser.parse_at(input, "Expr", 2).unwrap();
    assert_eq!(output.trivia_len, 1);
    let tree = output.tree().unwrap();
    assert_eq!(tree.start(), 3);
    assert_eq!(tree.sexpr(input), "(Add 1 + 2)");
}

#[test]
fn parser_is_reusable_across_inputs_and_start_rules() {
    let compiled = compile(&mini_c_grammar());
    let mut parser = Parser::new(Arc::clone(&compiled));

    let first = parser.parse("a;", "Program").unwrap();
    assert_eq!(sexpr(&first, "a;"), "(Program (ExprStatement a ;))");

    let second = parser.parse("b = 1", "Expr").unwrap();
    assert_eq!(sexpr(&second, "b = 1"), "(Assign b = 1)");

    let third = parser.parse("c;", "Program").unwrap();
    assert_eq!(sexpr(&third, "c;"), "(Program (ExprStatement c ;))");
}

#[test]
fn empty_input_with_nullable_start() {
    let output = parse(&mini_c_grammar(), "Program", "");
    assert_eq!(sexpr(&output, ""), "(Program)");
}

#[test]
fn unknown_start_rule() {
    let mut parser = Parser::new(compile(&calc_grammar()));
    let err = parser.parse("1", "Statement").unwrap_err();
    assert_eq!(err, ParseError::UnknownStartRule("Statement".to_string()));
    assert_eq!(err.to_string(), "unknown start rule `Statement`");
}

#[test]
fn start_position_must_be_char_boundary() {
    let mut parser = Parser::new(compile(&calc_grammar()));
    let err = parser.parse_at("é1", "Expr", 1).unwrap_err();
    assert_eq!(err, ParseError::InvalidStartPosition(1));
}

#[test]
fn recursion_limit_is_enforced() {
    let options = ParseOptions::new().recursion_limit(3);
    let mut parser = Parser::with_options(compile(&calc_grammar()), options);
    let err = parser.parse("((((1))))", "Expr").unwrap_err();
    assert_eq!(err, ParseError::RecursionLimitExceeded { limit: 3, pos: 3 });
}

#[test]
fn indirect_left_recursion_hits_limit_on_small_stack() {
    let run = || {
        let grammar = Grammar::default()
            .rule("X", [Rule::reference("Y")])
            .rule("Y", [Rule::seq("Y", [Rule::reference("X"), Rule::lit("b")])]);
        let mut parser = Parser::new(compile(&grammar));
        parser.parse("b", "X").unwrap_err().to_string()
    };
    let message = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(run)
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(message, "recursion limit of 1000 exceeded at offset 0");
}

#[test]
fn default_options() {
    let options = ParseOptions::default();
    assert_eq!(options.get_recursion_limit(), 1000);
    assert!(!options.get_panic_recovery());
    assert!(!BuildOptions::default().get_inline_rules());
}

#[test]
fn assignment_is_right_associative() {
    let input = "a = b = 5";
    let output = parse(&mini_c_grammar(), "Expr", input);
    assert_eq!(sexpr(&output, input), "(Assign a = (Assign b = 5))");
}

#[test]
fn terminal_spans_cover_input() {
    let input = "a = b + 1;\nc = (a * 2);\n";
    let output = parse(&mini_c_grammar(), "Program", input);
    let tree = output.tree().unwrap();
    let text: String = tree
        .terminals()
        .iter()
        .map(|terminal| &input[terminal.start..terminal.end])
        .collect();
    assert_eq!(text, input);
    assert_eq!(tree.span_text(input), input);
}
