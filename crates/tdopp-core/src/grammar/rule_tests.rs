use super::*;

#[test]
fn display_notation() {
    let add = Rule::seq(
        "Add",
        [Rule::reference("Expr"), Rule::lit("+"), Rule::req("Expr", 100)],
    );
    assert_eq!(add.to_string(), "(Expr `+` Expr:100)");

    let assign = Rule::seq(
        "Assign",
        [Rule::reference("Expr"), Rule::lit("="), Rule::req_right("Expr", 10)],
    );
    assert_eq!(assign.to_string(), "(Expr `=` Expr:10R)");

    let block = Rule::seq(
        "Block",
        [
            Rule::lit("{"),
            Rule::zero_or_many(Rule::seq(
                "Item",
                [Rule::not(Rule::reference("Function")), Rule::reference("Statement")],
            )),
            Rule::often_missed(Rule::lit("}")),
        ],
    );
    assert_eq!(block.to_string(), "(`{` (!Function Statement)* `}`~)");

    let args = Rule::separated_list(
        Rule::reference("Expr"),
        Rule::lit(","),
        "Args",
        SeparatorEnd::Forbidden,
        false,
    );
    assert_eq!(args.to_string(), "sep1(Expr, `,`, forbidden)");
}

#[test]
fn default_and_custom_kinds() {
    let many = Rule::zero_or_many(Rule::reference("Function"));
    assert_eq!(many.kind().map(|k| &**k), Some("ZeroOrMany"));

    let many = many.with_kind("ModuleFunctions");
    assert_eq!(many.kind().map(|k| &**k), Some("ModuleFunctions"));

    assert_eq!(
        Rule::often_missed(Rule::lit(";")).kind().map(|k| &**k),
        Some("Error")
    );
    assert_eq!(Rule::reference("Expr").with_kind("Ignored").kind(), None);
}

#[test]
fn recovery_taint_is_nested() {
    let clean = Rule::seq("Neg", [Rule::lit("-"), Rule::req("Expr", 300)]);
    assert!(!clean.contains_recovery_terminal());

    let tainted = Rule::seq(
        "MissingOperator",
        [
            Rule::reference("Expr"),
            Rule::optional(Rule::terminal(EmptyTerminal::new("Error"))),
            Rule::req("Expr", 200),
        ],
    );
    assert!(tainted.contains_recovery_terminal());
}

#[test]
fn referenced_name() {
    assert_eq!(Rule::reference("Expr").referenced_name(), Some("Expr"));
    assert_eq!(Rule::req("Expr", 1).referenced_name(), Some("Expr"));
    assert_eq!(Rule::lit("x").referenced_name(), None);
}
