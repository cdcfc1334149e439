//! Linked grammar with its parse tables and FIRST sets.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use indexmap::IndexSet;
use tdopp_core::Grammar;
use tdopp_core::grammar::{GrammarError, SeparatorEnd, Terminal};

use super::first_follow::{FirstSet, FirstSets, FollowSets};
use super::ids::{ExprId, RuleId, TerminalId};
use super::link::{self, Expr, Linked};
use super::options::BuildOptions;
use super::tdopp::{self, Postfix, TdoppRule};

/// Immutable, linked form of a [`Grammar`].
///
/// Built once and shared between parsers through `Arc`. Nothing in here
/// changes while parsing.
#[derive(Debug)]
pub struct CompiledGrammar {
    pub(crate) names: IndexSet<String>,
    pub(crate) alternatives: Vec<Vec<ExprId>>,
    pub(crate) exprs: Vec<Expr>,
    pub(crate) terminals: Vec<Arc<dyn Terminal>>,
    pub(crate) trivia: Arc<dyn Terminal>,
    pub(crate) tables: Vec<TdoppRule>,
    pub(crate) first: FirstSets,
}

impl CompiledGrammar {
    pub fn build(grammar: &Grammar) -> Result<Self, GrammarError> {
        Self::build_with(grammar, BuildOptions::default())
    }

    pub fn build_with(grammar: &Grammar, options: BuildOptions) -> Result<Self, GrammarError> {
        let Linked {
            names,
            alternatives,
            exprs,
            terminals,
        } = link::link(grammar)?;

        let mut compiled = Self {
            names,
            alternatives,
            exprs,
            terminals,
            trivia: grammar.trivia().clone(),
            tables: Vec::new(),
            first: FirstSets::default(),
        };
        compiled.first = FirstSets::compute(&compiled);
        compiled.tables = tdopp::build_tables(&compiled)?;
        if options.inline_rules {
            tdopp::inline_rules(&mut compiled);
        }

        tracing::debug!(
            rules = compiled.names.len(),
            terminals = compiled.terminals.len(),
            exprs = compiled.exprs.len(),
            "grammar compiled"
        );
        Ok(compiled)
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.names.get_index_of(name).map(RuleId::new)
    }

    pub fn rule_name(&self, rule: RuleId) -> &str {
        &self.names[rule.index()]
    }

    /// Rule names in definition order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn rule_count(&self) -> usize {
        self.names.len()
    }

    pub fn terminal(&self, id: TerminalId) -> &Arc<dyn Terminal> {
        &self.terminals[id.index()]
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn trivia(&self) -> &Arc<dyn Terminal> {
        &self.trivia
    }

    pub fn first_set(&self, name: &str) -> Option<&FirstSet> {
        self.rule_id(name).map(|rule| self.first.of_rule(rule))
    }

    /// FOLLOW sets with `start` as the start rule.
    pub fn follow_sets(&self, start: &str) -> Option<FollowSets> {
        self.rule_id(start)
            .map(|rule| FollowSets::compute(self, rule))
    }

    /// Display strings of a set of terminals, sorted and deduplicated.
    pub fn terminal_names<'a>(&self, ids: impl IntoIterator<Item = &'a TerminalId>) -> Vec<String> {
        let mut names: Vec<String> = ids
            .into_iter()
            .map(|&id| self.terminal(id).to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Dump of the prefix and postfix tables of one rule.
    pub fn describe_rule(&self, name: &str) -> Option<String> {
        let rule = self.rule_id(name)?;
        let table = self.table(rule);
        let mut out = format!("rule {name}");

        let sections: [(&str, &[ExprId], &[Postfix]); 2] = [
            ("", &table.prefix, &table.postfix),
            ("recovery ", &table.recovery_prefix, &table.recovery_postfix),
        ];
        for (label, prefixes, postfixes) in sections {
            write!(out, "\n  {label}prefix").unwrap();
            for &prefix in prefixes {
                write!(out, "\n    {}", self.display(prefix)).unwrap();
            }
            write!(out, "\n  {label}postfix").unwrap();
            for postfix in postfixes {
                let assoc = if postfix.right { "right" } else { "left" };
                write!(
                    out,
                    "\n    {} {} {assoc}:",
                    postfix.kind, postfix.precedence
                )
                .unwrap();
                for &element in postfix.tail.iter() {
                    write!(out, " {}", self.display(element)).unwrap();
                }
            }
        }
        Some(out)
    }

    pub(crate) fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub(crate) fn table(&self, rule: RuleId) -> &TdoppRule {
        &self.tables[rule.index()]
    }

    pub(crate) fn contains_recovery(&self, id: ExprId) -> bool {
        match self.expr(id) {
            Expr::Terminal(terminal) => self.terminal(*terminal).is_recovery(),
            Expr::Seq { elements, .. } => elements.iter().any(|&e| self.contains_recovery(e)),
            Expr::OneOrMany { element, .. }
            | Expr::ZeroOrMany { element, .. }
            | Expr::Optional { element, .. }
            | Expr::OftenMissed { element, .. }
            | Expr::And(element)
            | Expr::Not(element) => self.contains_recovery(*element),
            Expr::SeparatedList {
                element, separator, ..
            } => self.contains_recovery(*element) || self.contains_recovery(*separator),
            Expr::Inline { body, .. } => self.contains_recovery(*body),
            Expr::Ref(_) | Expr::ReqRef { .. } => false,
        }
    }

    pub(crate) fn display(&self, id: ExprId) -> ExprDisplay<'_> {
        ExprDisplay { grammar: self, id }
    }
}

/// Renders a linked expression in the same notation as `Rule`'s `Display`.
/// Inlined references show as `{Name}`.
pub(crate) struct ExprDisplay<'g> {
    grammar: &'g CompiledGrammar,
    id: ExprId,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.grammar;
        match g.expr(self.id) {
            Expr::Terminal(terminal) => write!(f, "{}", g.terminal(*terminal)),
            Expr::Seq { elements, .. } => {
                f.write_str("(")?;
                for (i, &element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", g.display(element))?;
                }
                f.write_str(")")
            }
            Expr::OneOrMany { element, .. } => write!(f, "{}+", g.display(*element)),
            Expr::ZeroOrMany { element, .. } => write!(f, "{}*", g.display(*element)),
            Expr::Optional { element, .. } => write!(f, "{}?", g.display(*element)),
            Expr::OftenMissed { element, .. } => write!(f, "{}~", g.display(*element)),
            Expr::Ref(rule) => f.write_str(g.rule_name(*rule)),
            Expr::ReqRef {
                rule,
                precedence,
                right,
            } => {
                write!(f, "{}:{precedence}", g.rule_name(*rule))?;
                if *right {
                    f.write_str("R")?;
                }
                Ok(())
            }
            Expr::And(inner) => write!(f, "&{}", g.display(*inner)),
            Expr::Not(inner) => write!(f, "!{}", g.display(*inner)),
            Expr::SeparatedList {
                element,
                separator,
                end,
                can_be_empty,
                ..
            } => {
                let name = if *can_be_empty { "sep" } else { "sep1" };
                let end = match end {
                    SeparatorEnd::Optional => "optional",
                    SeparatorEnd::Required => "required",
                    SeparatorEnd::Forbidden => "forbidden",
                };
                write!(
                    f,
                    "{name}({}, {}, {end})",
                    g.display(*element),
                    g.display(*separator)
                )
            }
            Expr::Inline { rule, .. } => write!(f, "{{{}}}", g.rule_name(*rule)),
        }
    }
}
