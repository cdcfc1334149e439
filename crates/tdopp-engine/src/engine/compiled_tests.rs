use tdopp_core::{Grammar, Rule};

use super::*;
use crate::test_utils::*;

#[test]
fn rule_lookup() {
    let grammar = compile(&mini_c_grammar());
    assert_eq!(grammar.rule_count(), 3);
    assert_eq!(
        grammar.rule_names().collect::<Vec<_>>(),
        ["Program", "Statement", "Expr"]
    );
    let expr = grammar.rule_id("Expr").unwrap();
    assert_eq!(expr.index(), 2);
    assert_eq!(grammar.rule_name(expr), "Expr");
    assert!(grammar.rule_id("Missing").is_none());
}

#[test]
fn literals_are_registered_per_occurrence() {
    // `-` appears twice, as two separate literals.
    let grammar = compile(&calc_grammar());
    assert_eq!(grammar.terminal_count(), 8);
}

#[test]
fn shared_terminal_registered_once() {
    let number = pattern("Number", "[0-9]+");
    let grammar = Grammar::default()
        .rule("A", [number.clone()])
        .rule("B", [Rule::seq("Pair", [number.clone(), number])]);
    assert_eq!(compile(&grammar).terminal_count(), 1);
}

#[test]
fn describe_calc_tables() {
    let grammar = compile(&calc_grammar());
    insta::assert_snapshot!(grammar.describe_rule("Expr").unwrap(), @r"
    rule Expr
      prefix
        Number
        (`(` Expr `)`)
        (`-` Expr:100)
      postfix
        Add 10 left: `+` Expr:10
        Sub 10 left: `-` Expr:10
        Mul 20 left: `*` Expr:20
        Pow 30 right: `^` Expr:30R
      recovery prefix
        Number
        (`(` Expr `)`)
        (`-` Expr:100)
      recovery postfix
        Add 10 left: `+` Expr:10
        Sub 10 left: `-` Expr:10
        Mul 20 left: `*` Expr:20
        Pow 30 right: `^` Expr:30R
    ");
}

#[test]
fn recovery_alternatives_only_in_recovery_tables() {
    let grammar = compile(&mini_c_grammar());
    insta::assert_snapshot!(grammar.describe_rule("Expr").unwrap(), @r"
    rule Expr
      prefix
        Ident
        Number
        (`(` Expr `)`)
      postfix
        Add 10 left: `+` Expr:10
        Mul 20 left: `*` Expr:20
        Assign 1 right: `=` Expr:1R
      recovery prefix
        Ident
        Number
        (`(` Expr `)`)
        <Error>
      recovery postfix
        Add 10 left: `+` Expr:10
        Mul 20 left: `*` Expr:20
        Assign 1 right: `=` Expr:1R
        UnexpectedOperator 200 left: <ErrorOperator> Expr:200
        MissingOperator 200 left: <Error> Expr:200
    ");
}

#[test]
fn postfix_precedence_sources() {
    let grammar = Grammar::default().rule(
        "E",
        [
            pattern("Ident", "[a-z]+"),
            Rule::seq("Call", [Rule::reference("E"), Rule::lit("("), Rule::lit(")")]),
            Rule::seq("Bang", [Rule::req("E", 50), Rule::lit("!")]),
        ],
    );
    let described = compile(&grammar).describe_rule("E").unwrap();
    assert!(described.contains("\n    Call 0 left: `(` `)`"));
    assert!(described.contains("\n    Bang 50 left: `!`"));
}

#[test]
fn unknown_rule() {
    let grammar = Grammar::default().rule("A", [Rule::reference("B")]);
    let err = CompiledGrammar::build(&grammar).unwrap_err();
    assert_eq!(err.to_string(), "rule `B` referenced from `A` is not defined");
}

#[test]
fn empty_rule() {
    let grammar = Grammar::default().rule("A", Vec::<Rule>::new());
    let err = CompiledGrammar::build(&grammar).unwrap_err();
    assert_eq!(err.to_string(), "rule `A` has no alternatives");
}

#[test]
fn left_recursion_without_tail() {
    let grammar = Grammar::default().rule(
        "A",
        [Rule::lit("a"), Rule::seq("Loop", [Rule::reference("A")])],
    );
    let err = CompiledGrammar::build(&grammar).unwrap_err();
    assert_eq!(
        err.to_string(),
        "left-recursive alternative of `A` has nothing after the self reference"
    );
}

#[test]
fn describe_unknown_rule() {
    assert!(compile(&calc_grammar()).describe_rule("Nope").is_none());
}
