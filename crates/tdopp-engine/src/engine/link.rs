//! Lowering of named rules into a flat expression arena.
//!
//! References are resolved to [`RuleId`]s here, so an undefined rule name is
//! reported before any input is seen.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use tdopp_core::grammar::{GrammarError, Rule, SeparatorEnd, Terminal};
use tdopp_core::{Grammar, Kind};

use super::ids::{ExprId, RuleId, TerminalId};

/// Linked grammar expression. Children are arena indices.
#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Terminal(TerminalId),
    Seq {
        elements: Box<[ExprId]>,
        kind: Kind,
    },
    OneOrMany {
        element: ExprId,
        kind: Kind,
    },
    ZeroOrMany {
        element: ExprId,
        kind: Kind,
    },
    Optional {
        element: ExprId,
        kind: Kind,
    },
    OftenMissed {
        element: ExprId,
        kind: Kind,
    },
    Ref(RuleId),
    ReqRef {
        rule: RuleId,
        precedence: i32,
        right: bool,
    },
    And(ExprId),
    Not(ExprId),
    SeparatedList {
        element: ExprId,
        separator: ExprId,
        kind: Kind,
        end: SeparatorEnd,
        can_be_empty: bool,
    },
    /// Body of a rule substituted at a reference site. Still counts as a
    /// rule entry for FOLLOW lookups, but is never memoized.
    Inline { rule: RuleId, body: ExprId },
}

/// Output of [`link`].
#[derive(Debug)]
pub(crate) struct Linked {
    pub names: IndexSet<String>,
    /// Alternatives per rule, in definition order.
    pub alternatives: Vec<Vec<ExprId>>,
    pub exprs: Vec<Expr>,
    pub terminals: Vec<Arc<dyn Terminal>>,
}

pub(crate) fn link(grammar: &Grammar) -> Result<Linked, GrammarError> {
    let names: IndexSet<String> = grammar.rules().map(|(name, _)| name.to_string()).collect();
    let mut linker = Linker {
        names: &names,
        current: "",
        exprs: Vec::new(),
        terminals: Vec::new(),
        terminal_ids: HashMap::new(),
    };

    let mut alternatives = Vec::with_capacity(names.len());
    for (name, rules) in grammar.rules() {
        if rules.is_empty() {
            return Err(GrammarError::EmptyRule(name.to_string()));
        }
        linker.current = name;
        let ids = rules
            .iter()
            .map(|rule| linker.lower(rule))
            .collect::<Result<Vec<_>, _>>()?;
        alternatives.push(ids);
    }

    let Linker {
        exprs, terminals, ..
    } = linker;
    Ok(Linked {
        names,
        alternatives,
        exprs,
        terminals,
    })
}

struct Linker<'g> {
    names: &'g IndexSet<String>,
    /// Rule being lowered, for error messages.
    current: &'g str,
    exprs: Vec<Expr>,
    terminals: Vec<Arc<dyn Terminal>>,
    terminal_ids: HashMap<*const (), TerminalId>,
}

impl Linker<'_> {
    fn lower(&mut self, rule: &Rule) -> Result<ExprId, GrammarError> {
        let expr = match rule {
            Rule::Terminal(terminal) => Expr::Terminal(self.terminal(terminal)),
            Rule::Seq { elements, kind } => Expr::Seq {
                elements: elements
                    .iter()
                    .map(|element| self.lower(element))
                    .collect::<Result<_, _>>()?,
                kind: kind.clone(),
            },
            Rule::OneOrMany { element, kind } => Expr::OneOrMany {
                element: self.lower(element)?,
                kind: kind.clone(),
            },
            Rule::ZeroOrMany { element, kind } => Expr::ZeroOrMany {
                element: self.lower(element)?,
                kind: kind.clone(),
            },
            Rule::Optional { element, kind } => Expr::Optional {
                element: self.lower(element)?,
                kind: kind.clone(),
            },
            Rule::OftenMissed { element, kind } => Expr::OftenMissed {
                element: self.lower(element)?,
                kind: kind.clone(),
            },
            Rule::Ref { name } => Expr::Ref(self.resolve(name)?),
            Rule::ReqRef {
                name,
                precedence,
                right,
            } => Expr::ReqRef {
                rule: self.resolve(name)?,
                precedence: *precedence,
                right: *right,
            },
            Rule::And(inner) => Expr::And(self.lower(inner)?),
            Rule::Not(inner) => Expr::Not(self.lower(inner)?),
            Rule::SeparatedList {
                element,
                separator,
                kind,
                end,
                can_be_empty,
            } => Expr::SeparatedList {
                element: self.lower(element)?,
                separator: self.lower(separator)?,
                kind: kind.clone(),
                end: *end,
                can_be_empty: *can_be_empty,
            },
        };
        Ok(self.push(expr))
    }

    fn push(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len());
        self.exprs.push(expr);
        id
    }

    fn terminal(&mut self, terminal: &Arc<dyn Terminal>) -> TerminalId {
        let key = Arc::as_ptr(terminal) as *const ();
        *self.terminal_ids.entry(key).or_insert_with(|| {
            let id = TerminalId::new(self.terminals.len());
            self.terminals.push(terminal.clone());
            id
        })
    }

    fn resolve(&self, name: &str) -> Result<RuleId, GrammarError> {
        self.names
            .get_index_of(name)
            .map(RuleId::new)
            .ok_or_else(|| GrammarError::UnknownRule {
                name: name.to_string(),
                referenced_from: self.current.to_string(),
            })
    }
}
