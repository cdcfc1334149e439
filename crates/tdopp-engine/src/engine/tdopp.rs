//! TDOPP tables.
//!
//! Every alternative of a rule is sorted into one of two groups:
//! - **prefix**: alternatives that start with something other than the rule
//!   itself; one of them must match first
//! - **postfix**: left-recursive alternatives `Self tail...`, kept as the tail
//!   plus the precedence and associativity that govern when the tail may
//!   extend an already parsed left operand
//!
//! Alternatives containing a recovery terminal only go into the recovery
//! tables, which are consulted at the current recovery position. All other
//! alternatives go into both the normal and the recovery tables.

use std::collections::HashMap;

use tdopp_core::Kind;
use tdopp_core::grammar::GrammarError;

use super::compiled::CompiledGrammar;
use super::ids::{ExprId, RuleId};
use super::link::Expr;

/// Left-recursive alternative with its self reference removed.
#[derive(Debug, Clone)]
pub(crate) struct Postfix {
    pub kind: Kind,
    pub tail: Box<[ExprId]>,
    pub precedence: i32,
    pub right: bool,
}

impl Postfix {
    /// Whether this continuation may extend an operand parsed at `min_prec`.
    pub fn admits(&self, min_prec: i32) -> bool {
        self.precedence > min_prec || (self.precedence == min_prec && self.right)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TdoppRule {
    pub prefix: Vec<ExprId>,
    pub postfix: Vec<Postfix>,
    pub recovery_prefix: Vec<ExprId>,
    pub recovery_postfix: Vec<Postfix>,
}

impl TdoppRule {
    pub fn prefixes(&self, recovering: bool) -> &[ExprId] {
        if recovering {
            &self.recovery_prefix
        } else {
            &self.prefix
        }
    }

    pub fn postfixes(&self, recovering: bool) -> &[Postfix] {
        if recovering {
            &self.recovery_postfix
        } else {
            &self.postfix
        }
    }
}

pub(crate) fn build_tables(grammar: &CompiledGrammar) -> Result<Vec<TdoppRule>, GrammarError> {
    let mut tables = Vec::with_capacity(grammar.alternatives.len());
    for (index, alternatives) in grammar.alternatives.iter().enumerate() {
        let rule = RuleId::new(index);
        let mut table = TdoppRule::default();
        for &alternative in alternatives {
            let tainted = grammar.contains_recovery(alternative);
            match split_left_recursion(grammar, rule, alternative)? {
                Some(postfix) => {
                    if !tainted {
                        table.postfix.push(postfix.clone());
                    }
                    table.recovery_postfix.push(postfix);
                }
                None => {
                    if !tainted {
                        table.prefix.push(alternative);
                    }
                    table.recovery_prefix.push(alternative);
                }
            }
        }
        tables.push(table);
    }
    Ok(tables)
}

/// Turn `Self tail...` into a postfix entry.
///
/// Precedence comes from the first `ReqRef` in the tail. Without one, a
/// `ReqRef` self reference at the head binds the entry left-associatively.
/// Otherwise the entry gets precedence 0, left-associative.
fn split_left_recursion(
    grammar: &CompiledGrammar,
    rule: RuleId,
    alternative: ExprId,
) -> Result<Option<Postfix>, GrammarError> {
    let Expr::Seq { elements, kind } = grammar.expr(alternative) else {
        return Ok(None);
    };
    let Some((&head, tail)) = elements.split_first() else {
        return Ok(None);
    };
    let head_precedence = match *grammar.expr(head) {
        Expr::Ref(target) if target == rule => None,
        Expr::ReqRef {
            rule: target,
            precedence,
            ..
        } if target == rule => Some(precedence),
        _ => return Ok(None),
    };
    if tail.is_empty() {
        return Err(GrammarError::EmptyPostfix(
            grammar.rule_name(rule).to_string(),
        ));
    }

    let (precedence, right) = tail
        .iter()
        .find_map(|&element| match *grammar.expr(element) {
            Expr::ReqRef {
                precedence, right, ..
            } => Some((precedence, right)),
            _ => None,
        })
        .or(head_precedence.map(|precedence| (precedence, false)))
        .unwrap_or((0, false));

    Ok(Some(Postfix {
        kind: kind.clone(),
        tail: tail.into(),
        precedence,
        right,
    }))
}

/// Substitute references to simple rules with their body.
///
/// A rule is inlined when it has a single alternative that is neither
/// left-recursive nor recovery-only, and it cannot reach itself. Only the
/// parse tables are rewritten; FIRST and FOLLOW keep seeing the linked
/// alternatives.
pub(crate) fn inline_rules(grammar: &mut CompiledGrammar) {
    let inlinable: Vec<bool> = (0..grammar.alternatives.len())
        .map(|index| is_inlinable(grammar, RuleId::new(index)))
        .collect();
    if !inlinable.contains(&true) {
        return;
    }

    let CompiledGrammar {
        alternatives,
        exprs,
        tables,
        ..
    } = grammar;
    let mut inliner = Inliner {
        exprs,
        alternatives: alternatives.as_slice(),
        inlinable: &inlinable,
        rewritten: HashMap::new(),
    };
    for table in tables.iter_mut() {
        for id in table.prefix.iter_mut().chain(table.recovery_prefix.iter_mut()) {
            *id = inliner.rewrite(*id);
        }
        for postfix in table.postfix.iter_mut().chain(table.recovery_postfix.iter_mut()) {
            for id in postfix.tail.iter_mut() {
                *id = inliner.rewrite(*id);
            }
        }
    }
    tracing::debug!(
        rules = inlinable.iter().filter(|&&yes| yes).count(),
        "inlined rules"
    );
}

fn is_inlinable(grammar: &CompiledGrammar, rule: RuleId) -> bool {
    let table = &grammar.tables[rule.index()];
    grammar.alternatives[rule.index()].len() == 1
        && table.prefix.len() == 1
        && table.postfix.is_empty()
        && table.recovery_postfix.is_empty()
        && !is_recursive(grammar, rule)
}

fn is_recursive(grammar: &CompiledGrammar, rule: RuleId) -> bool {
    let mut seen = vec![false; grammar.alternatives.len()];
    let mut pending = Vec::new();
    for &alternative in &grammar.alternatives[rule.index()] {
        collect_references(&grammar.exprs, alternative, &mut pending);
    }
    while let Some(next) = pending.pop() {
        if next == rule {
            return true;
        }
        if std::mem::replace(&mut seen[next.index()], true) {
            continue;
        }
        for &alternative in &grammar.alternatives[next.index()] {
            collect_references(&grammar.exprs, alternative, &mut pending);
        }
    }
    false
}

fn collect_references(exprs: &[Expr], id: ExprId, out: &mut Vec<RuleId>) {
    match &exprs[id.index()] {
        Expr::Terminal(_) => {}
        Expr::Seq { elements, .. } => {
            for &element in elements.iter() {
                collect_references(exprs, element, out);
            }
        }
        Expr::OneOrMany { element, .. }
        | Expr::ZeroOrMany { element, .. }
        | Expr::Optional { element, .. }
        | Expr::OftenMissed { element, .. }
        | Expr::And(element)
        | Expr::Not(element) => collect_references(exprs, *element, out),
        Expr::SeparatedList {
            element, separator, ..
        } => {
            collect_references(exprs, *element, out);
            collect_references(exprs, *separator, out);
        }
        Expr::Ref(rule) | Expr::ReqRef { rule, .. } => out.push(*rule),
        Expr::Inline { rule, body } => {
            out.push(*rule);
            collect_references(exprs, *body, out);
        }
    }
}

struct Inliner<'a> {
    exprs: &'a mut Vec<Expr>,
    alternatives: &'a [Vec<ExprId>],
    inlinable: &'a [bool],
    /// Copy-on-write results; unchanged subtrees map to themselves.
    rewritten: HashMap<ExprId, ExprId>,
}

impl Inliner<'_> {
    fn rewrite(&mut self, id: ExprId) -> ExprId {
        if let Some(&done) = self.rewritten.get(&id) {
            return done;
        }

        let replacement = match self.exprs[id.index()].clone() {
            Expr::Ref(rule) if self.inlinable[rule.index()] => {
                let body = self.rewrite(self.alternatives[rule.index()][0]);
                Some(Expr::Inline { rule, body })
            }
            Expr::Seq { elements, kind } => {
                let rewritten: Box<[ExprId]> =
                    elements.iter().map(|&element| self.rewrite(element)).collect();
                (rewritten != elements).then(|| Expr::Seq {
                    elements: rewritten,
                    kind,
                })
            }
            Expr::OneOrMany { element, kind } => self
                .rewrite_child(element)
                .map(|element| Expr::OneOrMany { element, kind }),
            Expr::ZeroOrMany { element, kind } => self
                .rewrite_child(element)
                .map(|element| Expr::ZeroOrMany { element, kind }),
            Expr::Optional { element, kind } => self
                .rewrite_child(element)
                .map(|element| Expr::Optional { element, kind }),
            Expr::OftenMissed { element, kind } => self
                .rewrite_child(element)
                .map(|element| Expr::OftenMissed { element, kind }),
            Expr::And(inner) => self.rewrite_child(inner).map(Expr::And),
            Expr::Not(inner) => self.rewrite_child(inner).map(Expr::Not),
            Expr::SeparatedList {
                element,
                separator,
                kind,
                end,
                can_be_empty,
            } => {
                let new_element = self.rewrite(element);
                let new_separator = self.rewrite(separator);
                (new_element != element || new_separator != separator).then(|| {
                    Expr::SeparatedList {
                        element: new_element,
                        separator: new_separator,
                        kind,
                        end,
                        can_be_empty,
                    }
                })
            }
            Expr::Terminal(_) | Expr::Ref(_) | Expr::ReqRef { .. } | Expr::Inline { .. } => None,
        };

        let result = match replacement {
            Some(expr) => {
                let new_id = ExprId::new(self.exprs.len());
                self.exprs.push(expr);
                new_id
            }
            None => id,
        };
        self.rewritten.insert(id, result);
        result
    }

    fn rewrite_child(&mut self, child: ExprId) -> Option<ExprId> {
        let rewritten = self.rewrite(child);
        (rewritten != child).then_some(rewritten)
    }
}
