//! Grammars and helpers shared by engine tests.

use std::sync::Arc;

use tdopp_core::grammar::Terminal;
use tdopp_core::{EmptyTerminal, Grammar, Pattern, Rule, SeparatorEnd, SkipNonTrivia};

use crate::{BuildOptions, CompiledGrammar, ParseOptions, ParseOutput, Parser};

pub fn pattern(kind: &str, regex: &str) -> Rule {
    Rule::terminal(Pattern::new(kind, regex).unwrap())
}

pub fn whitespace() -> Pattern {
    Pattern::new("Trivia", r"\s*").unwrap()
}

/// Arithmetic with `+ -` (10), `*` (20), right-associative `^` (30), prefix
/// `-` (100) and parentheses.
pub fn calc_grammar() -> Grammar {
    Grammar::new(whitespace()).rule(
        "Expr",
        [
            pattern("Number", "[0-9]+"),
            Rule::seq(
                "Parens",
                [Rule::lit("("), Rule::reference("Expr"), Rule::lit(")")],
            ),
            Rule::seq("Neg", [Rule::lit("-"), Rule::req("Expr", 100)]),
            Rule::seq(
                "Add",
                [Rule::reference("Expr"), Rule::lit("+"), Rule::req("Expr", 10)],
            ),
            Rule::seq(
                "Sub",
                [Rule::reference("Expr"), Rule::lit("-"), Rule::req("Expr", 10)],
            ),
            Rule::seq(
                "Mul",
                [Rule::reference("Expr"), Rule::lit("*"), Rule::req("Expr", 20)],
            ),
            Rule::seq(
                "Pow",
                [
                    Rule::reference("Expr"),
                    Rule::lit("^"),
                    Rule::req_right("Expr", 30),
                ],
            ),
        ],
    )
}

/// Statements of expressions with recovery alternatives for a stray
/// operator, a missing operator and a missing operand.
pub fn mini_c_grammar() -> Grammar {
    let trivia: Arc<dyn Terminal> = Arc::new(whitespace());
    Grammar::with_shared_trivia(trivia.clone())
        .rule(
            "Program",
            [Rule::zero_or_many(Rule::reference("Statement")).with_kind("Program")],
        )
        .rule(
            "Statement",
            [Rule::seq(
                "ExprStatement",
                [Rule::reference("Expr"), Rule::lit(";")],
            )],
        )
        .rule(
            "Expr",
            [
                pattern("Ident", "[a-z]+"),
                pattern("Number", "[0-9]+"),
                Rule::seq(
                    "Parens",
                    [Rule::lit("("), Rule::reference("Expr"), Rule::lit(")")],
                ),
                Rule::seq(
                    "Add",
                    [Rule::reference("Expr"), Rule::lit("+"), Rule::req("Expr", 10)],
                ),
                Rule::seq(
                    "Mul",
                    [Rule::reference("Expr"), Rule::lit("*"), Rule::req("Expr", 20)],
                ),
                Rule::seq(
                    "Assign",
                    [
                        Rule::reference("Expr"),
                        Rule::lit("="),
                        Rule::req_right("Expr", 1),
                    ],
                ),
                Rule::seq(
                    "UnexpectedOperator",
                    [
                        Rule::reference("Expr"),
                        Rule::terminal(SkipNonTrivia::new("ErrorOperator", trivia)),
                        Rule::req("Expr", 200),
                    ],
                ),
                Rule::seq(
                    "MissingOperator",
                    [
                        Rule::reference("Expr"),
                        Rule::terminal(EmptyTerminal::new("Error")),
                        Rule::req("Expr", 200),
                    ],
                ),
                Rule::terminal(EmptyTerminal::new("Error")),
            ],
        )
}

/// `f(...)` call whose arguments are numbers separated by `,`.
pub fn call_grammar(end: SeparatorEnd, can_be_empty: bool) -> Grammar {
    Grammar::new(whitespace())
        .rule(
            "Call",
            [Rule::seq(
                "Call",
                [
                    pattern("Ident", "[a-z]+"),
                    Rule::lit("("),
                    Rule::separated_list(
                        Rule::reference("Arg"),
                        Rule::lit(","),
                        "Args",
                        end,
                        can_be_empty,
                    ),
                    Rule::lit(")"),
                ],
            )],
        )
        .rule("Arg", [pattern("Number", "[0-9]+")])
}

pub fn compile(grammar: &Grammar) -> Arc<CompiledGrammar> {
    Arc::new(CompiledGrammar::build(grammar).unwrap())
}

pub fn compile_inlined(grammar: &Grammar) -> Arc<CompiledGrammar> {
    let options = BuildOptions::new().inline_rules(true);
    Arc::new(CompiledGrammar::build_with(grammar, options).unwrap())
}

pub fn parse(grammar: &Grammar, start: &str, input: &str) -> ParseOutput {
    Parser::new(compile(grammar)).parse(input, start).unwrap()
}

pub fn parse_with(
    grammar: &Grammar,
    options: ParseOptions,
    start: &str,
    input: &str,
) -> ParseOutput {
    Parser::with_options(compile(grammar), options)
        .parse(input, start)
        .unwrap()
}

/// Tree of a parse that must cover the whole input, as an s-expression.
pub fn sexpr(output: &ParseOutput, input: &str) -> String {
    let Some(tree) = output.tree() else {
        panic!("parse failed: {:?}", output.fatal);
    };
    tree.sexpr(input)
}

/// Fatal error message of a parse that must fail.
pub fn fatal(output: &ParseOutput) -> String {
    let Some(fatal) = &output.fatal else {
        panic!("parse unexpectedly succeeded: {:?}", output.outcome);
    };
    fatal.to_string()
}
