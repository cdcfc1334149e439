use super::ids::RuleId;
use super::memo::{Memo, MemoKey};
use super::step::Step;
use crate::{Outcome, ParseOutput, Parser};
use crate::test_utils::*;

fn key(pos: usize, min_prec: i32) -> MemoKey {
    MemoKey {
        pos,
        rule: RuleId::new(0),
        min_prec,
    }
}

#[test]
fn table_after_parse() {
    let mut parser = Parser::new(compile(&calc_grammar()));
    let input = "1+2";
    parser.parse(input, "Expr").unwrap();

    assert_eq!(parser.memo_len(), 2);
    insta::assert_snapshot!(parser.memo_table(input), @r"
    0..3 Expr:0 (Add 1 + 2) (max fail 3)
    2..3 Expr:10 2 (max fail 3)
    ");
}

#[test]
fn failures_are_recorded() {
    let mut parser = Parser::new(compile(&calc_grammar()));
    let input = "1+";
    parser.parse(input, "Expr").unwrap();
    assert!(parser.memo_table(input).contains("2 Expr:10 failed (max fail 2)"));
}

#[test]
fn state_reset_between_parses() {
    let mut parser = Parser::new(compile(&calc_grammar()));
    parser.parse("1+2*3+4", "Expr").unwrap();
    let long = parser.memo_len();
    parser.parse("1+2", "Expr").unwrap();
    assert!(parser.memo_len() < long);
    assert_eq!(parser.memo_len(), 2);
}

#[test]
fn invalidate_keeps_unaffected_successes() {
    let mut memo = Memo::default();
    memo.insert(key(0, 0), Step::predicate(0));
    memo.insert(key(2, 0), Step::predicate(4));
    memo.insert(key(3, 0), Step::Failure { max_fail: 3 });
    memo.insert(key(1, 5), Step::predicate(1));

    assert_eq!(memo.invalidate(0, 4), 3);
    assert_eq!(memo.len(), 1);
    assert!(memo.get(&key(1, 5)).is_some());
}

#[test]
fn predicate_entries_render_as_ampersand() {
    let grammar = compile(&calc_grammar());
    let mut memo = Memo::default();
    memo.insert(key(1, 5), Step::predicate(1));
    assert_eq!(memo.render(&grammar, "x"), "1..1 Expr:5 & (max fail 1)\n");
}

fn summary(output: &ParseOutput) -> (Outcome, Option<String>, Vec<usize>, u32) {
    (
        output.outcome.clone(),
        output.fatal.as_ref().map(ToString::to_string),
        output.recovered.clone(),
        output.passes,
    )
}

#[test]
fn reused_parser_matches_fresh_parser() {
    let grammar = compile(&mini_c_grammar());
    let inputs = [
        "z = y  x;",
        "x + ; y = 2;",
        "z = y  x; a + ;",
        "a = (1 + 2) * b;\nc = a  b;\n",
        "x = 1",
    ];

    let mut reused = Parser::new(grammar.clone());
    for input in inputs {
        let warm = reused.parse(input, "Program").unwrap();
        let fresh = Parser::new(grammar.clone()).parse(input, "Program").unwrap();
        assert_eq!(summary(&warm), summary(&fresh), "input {input:?}");
    }
}

#[test]
fn parse_at_mid_input_matches_fresh_parser() {
    let grammar = compile(&mini_c_grammar());
    let input = "a = 1; b = 2 * ; c = d  e;";

    let mut reused = Parser::new(grammar.clone());
    reused.parse(input, "Program").unwrap();
    for pos in [7, 17] {
        let warm = reused.parse_at(input, "Statement", pos).unwrap();
        let fresh = Parser::new(grammar.clone())
            .parse_at(input, "Statement", pos)
            .unwrap();
        assert_eq!(summary(&warm), summary(&fresh), "position {pos}");
    }
}
