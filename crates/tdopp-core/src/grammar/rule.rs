//! Rule combinators.

use std::fmt;
use std::sync::Arc;

use super::terminal::{Literal, Terminal};
use crate::Kind;

/// How a separated list treats a separator after its last element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorEnd {
    /// A trailing separator may appear.
    #[default]
    Optional,
    /// Every element, including the last, is followed by a separator.
    Required,
    /// A trailing separator is an error.
    Forbidden,
}

/// Grammar expression.
///
/// Cloning is cheap for terminals, which are shared behind `Arc`. A literal
/// is a `Terminal` holding a [`Literal`].
///
/// A `Seq` whose first element references its own containing rule (through
/// `Ref` or `ReqRef`) is a left-recursive alternative. The engine splits it
/// into a postfix continuation instead of recursing on it.
#[derive(Debug, Clone)]
pub enum Rule {
    Terminal(Arc<dyn Terminal>),
    Seq {
        elements: Vec<Rule>,
        kind: Kind,
    },
    OneOrMany {
        element: Box<Rule>,
        kind: Kind,
    },
    ZeroOrMany {
        element: Box<Rule>,
        kind: Kind,
    },
    /// Never fails: yields a `Some` or `None` node.
    Optional {
        element: Box<Rule>,
        kind: Kind,
    },
    /// Element that users often forget, such as a closing brace. At the
    /// recovery position a missing element becomes a zero-width recovery node.
    OftenMissed {
        element: Box<Rule>,
        kind: Kind,
    },
    Ref {
        name: String,
    },
    /// Precedence-bound reference used for operands of operators.
    ReqRef {
        name: String,
        precedence: i32,
        right: bool,
    },
    /// Positive lookahead. Zero width, never part of the tree.
    And(Box<Rule>),
    /// Negative lookahead. Zero width, never part of the tree.
    Not(Box<Rule>),
    SeparatedList {
        element: Box<Rule>,
        separator: Box<Rule>,
        kind: Kind,
        end: SeparatorEnd,
        can_be_empty: bool,
    },
}

impl Rule {
    /// Literal terminal whose node kind is its text.
    pub fn lit(value: impl Into<String>) -> Self {
        Self::terminal(Literal::new(value))
    }

    pub fn terminal(terminal: impl Terminal + 'static) -> Self {
        Self::Terminal(Arc::new(terminal))
    }

    pub fn seq(kind: impl Into<Kind>, elements: impl IntoIterator<Item = Rule>) -> Self {
        Self::Seq {
            elements: elements.into_iter().collect(),
            kind: kind.into(),
        }
    }

    pub fn one_or_many(element: Rule) -> Self {
        Self::OneOrMany {
            element: Box::new(element),
            kind: Kind::from("OneOrMany"),
        }
    }

    pub fn zero_or_many(element: Rule) -> Self {
        Self::ZeroOrMany {
            element: Box::new(element),
            kind: Kind::from("ZeroOrMany"),
        }
    }

    pub fn optional(element: Rule) -> Self {
        Self::Optional {
            element: Box::new(element),
            kind: Kind::from("Optional"),
        }
    }

    /// The zero-width node produced on recovery has kind `Error` unless
    /// overridden with [`Rule::with_kind`].
    pub fn often_missed(element: Rule) -> Self {
        Self::OftenMissed {
            element: Box::new(element),
            kind: Kind::from("Error"),
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref { name: name.into() }
    }

    /// Left-associative precedence-bound reference.
    pub fn req(name: impl Into<String>, precedence: i32) -> Self {
        Self::ReqRef {
            name: name.into(),
            precedence,
            right: false,
        }
    }

    /// Right-associative precedence-bound reference.
    pub fn req_right(name: impl Into<String>, precedence: i32) -> Self {
        Self::ReqRef {
            name: name.into(),
            precedence,
            right: true,
        }
    }

    pub fn and(inner: Rule) -> Self {
        Self::And(Box::new(inner))
    }

    pub fn not(inner: Rule) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn separated_list(
        element: Rule,
        separator: Rule,
        kind: impl Into<Kind>,
        end: SeparatorEnd,
        can_be_empty: bool,
    ) -> Self {
        Self::SeparatedList {
            element: Box::new(element),
            separator: Box::new(separator),
            kind: kind.into(),
            end,
            can_be_empty,
        }
    }

    /// Replace the node kind of a kinded combinator. Other rules are returned
    /// unchanged.
    pub fn with_kind(mut self, new_kind: impl Into<Kind>) -> Self {
        match &mut self {
            Self::Seq { kind, .. }
            | Self::OneOrMany { kind, .. }
            | Self::ZeroOrMany { kind, .. }
            | Self::Optional { kind, .. }
            | Self::OftenMissed { kind, .. }
            | Self::SeparatedList { kind, .. } => *kind = new_kind.into(),
            Self::Terminal(_)
            | Self::Ref { .. }
            | Self::ReqRef { .. }
            | Self::And(_)
            | Self::Not(_) => {}
        }
        self
    }

    /// Node kind this rule gives to what it produces, if it names one.
    pub fn kind(&self) -> Option<&Kind> {
        match self {
            Self::Terminal(t) => Some(t.kind()),
            Self::Seq { kind, .. }
            | Self::OneOrMany { kind, .. }
            | Self::ZeroOrMany { kind, .. }
            | Self::Optional { kind, .. }
            | Self::OftenMissed { kind, .. }
            | Self::SeparatedList { kind, .. } => Some(kind),
            Self::Ref { .. } | Self::ReqRef { .. } | Self::And(_) | Self::Not(_) => None,
        }
    }

    /// Name of the rule referenced by `Ref` or `ReqRef`.
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            Self::Ref { name } | Self::ReqRef { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether a recovery terminal occurs anywhere below this rule.
    ///
    /// References are not followed.
    pub fn contains_recovery_terminal(&self) -> bool {
        match self {
            Self::Terminal(t) => t.is_recovery(),
            Self::Seq { elements, .. } => elements.iter().any(Self::contains_recovery_terminal),
            Self::OneOrMany { element, .. }
            | Self::ZeroOrMany { element, .. }
            | Self::Optional { element, .. }
            | Self::OftenMissed { element, .. } => element.contains_recovery_terminal(),
            Self::And(inner) | Self::Not(inner) => inner.contains_recovery_terminal(),
            Self::SeparatedList {
                element, separator, ..
            } => element.contains_recovery_terminal() || separator.contains_recovery_terminal(),
            Self::Ref { .. } | Self::ReqRef { .. } => false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(t) => write!(f, "{t}"),
            Self::Seq { elements, .. } => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
            Self::OneOrMany { element, .. } => write!(f, "{element}+"),
            Self::ZeroOrMany { element, .. } => write!(f, "{element}*"),
            Self::Optional { element, .. } => write!(f, "{element}?"),
            Self::OftenMissed { element, .. } => write!(f, "{element}~"),
            Self::Ref { name } => f.write_str(name),
            Self::ReqRef {
                name,
                precedence,
                right,
            } => {
                write!(f, "{name}:{precedence}")?;
                if *right {
                    f.write_str("R")?;
                }
                Ok(())
            }
            Self::And(inner) => write!(f, "&{inner}"),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::SeparatedList {
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
                write!(f, "{name}({element}, {separator}, {end})")
            }
        }
    }
}
