//! FIRST and FOLLOW sets over the linked alternatives.
//!
//! Both are least fixed points. Recovery terminals never contribute symbols
//! but a nullable one still makes its position transparent.

use std::collections::BTreeSet;

use super::compiled::CompiledGrammar;
use super::ids::{ExprId, RuleId, TerminalId};
use super::link::Expr;

/// Terminals that can start a phrase, and whether the phrase can be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: BTreeSet<TerminalId>,
    pub nullable: bool,
}

impl FirstSet {
    fn union(&mut self, other: &FirstSet) {
        self.terminals.extend(other.terminals.iter().copied());
        self.nullable |= other.nullable;
    }
}

/// Terminals that can follow a rule, and whether the end of input can.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowSet {
    pub terminals: BTreeSet<TerminalId>,
    pub end_of_input: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FirstSets {
    rules: Vec<FirstSet>,
}

impl FirstSets {
    pub(crate) fn compute(grammar: &CompiledGrammar) -> Self {
        let mut sets = Self {
            rules: vec![FirstSet::default(); grammar.alternatives.len()],
        };
        // Sets only grow, so comparing against the previous round is enough.
        loop {
            let mut changed = false;
            for (index, alternatives) in grammar.alternatives.iter().enumerate() {
                let mut first = FirstSet::default();
                for &alternative in alternatives {
                    first.union(&sets.of_expr(grammar, alternative));
                }
                if first != sets.rules[index] {
                    sets.rules[index] = first;
                    changed = true;
                }
            }
            if !changed {
                return sets;
            }
        }
    }

    pub fn of_rule(&self, rule: RuleId) -> &FirstSet {
        &self.rules[rule.index()]
    }

    pub(crate) fn of_expr(&self, grammar: &CompiledGrammar, id: ExprId) -> FirstSet {
        match grammar.expr(id) {
            Expr::Terminal(terminal) => {
                let terminal_ref = grammar.terminal(*terminal);
                let mut first = FirstSet {
                    nullable: terminal_ref.is_nullable(),
                    ..FirstSet::default()
                };
                if !terminal_ref.is_recovery() {
                    first.terminals.insert(*terminal);
                }
                first
            }
            Expr::Seq { elements, .. } => self.of_sequence(grammar, elements),
            Expr::OneOrMany { element, .. } => self.of_expr(grammar, *element),
            Expr::ZeroOrMany { element, .. }
            | Expr::Optional { element, .. }
            | Expr::OftenMissed { element, .. } => {
                let mut first = self.of_expr(grammar, *element);
                first.nullable = true;
                first
            }
            Expr::Ref(rule) | Expr::ReqRef { rule, .. } => self.of_rule(*rule).clone(),
            Expr::Inline { body, .. } => self.of_expr(grammar, *body),
            Expr::And(_) | Expr::Not(_) => FirstSet {
                nullable: true,
                ..FirstSet::default()
            },
            Expr::SeparatedList {
                element,
                can_be_empty,
                ..
            } => {
                let mut first = self.of_expr(grammar, *element);
                first.nullable |= *can_be_empty;
                first
            }
        }
    }

    fn of_sequence(&self, grammar: &CompiledGrammar, elements: &[ExprId]) -> FirstSet {
        let mut first = FirstSet::default();
        for &element in elements {
            let element_first = self.of_expr(grammar, element);
            first.terminals.extend(element_first.terminals);
            if !element_first.nullable {
                return first;
            }
        }
        first.nullable = true;
        first
    }
}

/// FOLLOW sets for one start rule.
#[derive(Debug, Clone)]
pub struct FollowSets {
    start: RuleId,
    rules: Vec<FollowSet>,
}

impl FollowSets {
    pub(crate) fn compute(grammar: &CompiledGrammar, start: RuleId) -> Self {
        let mut rules = vec![FollowSet::default(); grammar.alternatives.len()];
        rules[start.index()].end_of_input = true;
        let mut walker = FollowWalker {
            grammar,
            rules,
            changed: false,
        };
        loop {
            walker.changed = false;
            for (index, alternatives) in grammar.alternatives.iter().enumerate() {
                let owner = RuleId::new(index);
                for &alternative in alternatives {
                    walker.walk(alternative, &Context::tail(), owner);
                }
            }
            if !walker.changed {
                break;
            }
        }
        Self {
            start,
            rules: walker.rules,
        }
    }

    pub fn start(&self) -> RuleId {
        self.start
    }

    pub fn of(&self, rule: RuleId) -> &FollowSet {
        &self.rules[rule.index()]
    }
}

/// What can come after the expression being walked inside its alternative.
#[derive(Debug, Clone)]
struct Context {
    terminals: BTreeSet<TerminalId>,
    /// Whatever follows the owning rule may also follow here.
    inherits: bool,
}

impl Context {
    fn tail() -> Self {
        Self {
            terminals: BTreeSet::new(),
            inherits: true,
        }
    }

    fn with(&self, terminals: &BTreeSet<TerminalId>) -> Self {
        let mut extended = self.clone();
        extended.terminals.extend(terminals.iter().copied());
        extended
    }
}

struct FollowWalker<'g> {
    grammar: &'g CompiledGrammar,
    rules: Vec<FollowSet>,
    changed: bool,
}

impl FollowWalker<'_> {
    fn walk(&mut self, id: ExprId, context: &Context, owner: RuleId) {
        let grammar = self.grammar;
        let first = &grammar.first;
        match grammar.expr(id) {
            Expr::Terminal(_) => {}
            Expr::Ref(rule) | Expr::ReqRef { rule, .. } | Expr::Inline { rule, .. } => {
                self.add(*rule, context, owner);
            }
            Expr::Seq { elements, .. } => {
                let mut after = context.clone();
                for &element in elements.iter().rev() {
                    self.walk(element, &after, owner);
                    let element_first = first.of_expr(grammar, element);
                    after = if element_first.nullable {
                        after.with(&element_first.terminals)
                    } else {
                        Context {
                            terminals: element_first.terminals,
                            inherits: false,
                        }
                    };
                }
            }
            Expr::OneOrMany { element, .. } | Expr::ZeroOrMany { element, .. } => {
                let element_first = first.of_expr(grammar, *element);
                self.walk(*element, &context.with(&element_first.terminals), owner);
            }
            Expr::Optional { element, .. } | Expr::OftenMissed { element, .. } => {
                self.walk(*element, context, owner);
            }
            Expr::And(inner) | Expr::Not(inner) => self.walk(*inner, context, owner),
            Expr::SeparatedList {
                element, separator, ..
            } => {
                let element_first = first.of_expr(grammar, *element);
                let separator_first = first.of_expr(grammar, *separator);
                self.walk(*element, &context.with(&separator_first.terminals), owner);
                self.walk(*separator, &context.with(&element_first.terminals), owner);
            }
        }
    }

    fn add(&mut self, rule: RuleId, context: &Context, owner: RuleId) {
        let inherited = context.inherits.then(|| self.rules[owner.index()].clone());
        let target = &mut self.rules[rule.index()];
        let before = (target.terminals.len(), target.end_of_input);

        target.terminals.extend(context.terminals.iter().copied());
        if let Some(inherited) = inherited {
            target.terminals.extend(inherited.terminals);
            target.end_of_input |= inherited.end_of_input;
        }

        if (target.terminals.len(), target.end_of_input) != before {
            self.changed = true;
        }
    }
}
