//! JSON grammar descriptions.
//!
//! Rules use internally tagged objects with a `type` field, in the style of
//! tree-sitter's `grammar.json`:
//!
//! ```json
//! {
//!   "trivia": { "type": "PATTERN", "value": "\\s*", "kind": "Trivia" },
//!   "rules": {
//!     "Expr": [
//!       { "type": "PATTERN", "value": "[0-9]+", "kind": "Number" },
//!       { "type": "SEQ", "kind": "Add", "members": [
//!         { "type": "REF", "name": "Expr" },
//!         { "type": "STRING", "value": "+" },
//!         { "type": "REQ_REF", "name": "Expr", "precedence": 10 }
//!       ]}
//!     ]
//!   }
//! }
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use super::error::GrammarError;
use super::rule::{Rule, SeparatorEnd};
use super::terminal::{EmptyTerminal, Literal, Pattern, SkipNonTrivia, Terminal};
use super::types::Grammar;
use crate::Kind;

impl Grammar {
    /// Load a grammar from its JSON description.
    ///
    /// `SKIP_NON_TRIVIA` terminals stop at the grammar's trivia.
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(json)?;

        let trivia: Arc<dyn Terminal> = match raw.trivia {
            None => Arc::new(EmptyTerminal::new("Trivia")),
            Some(rule) => match rule.into_rule(None)? {
                Rule::Terminal(terminal) => terminal,
                other => return Err(GrammarError::NotATerminal(other.to_string())),
            },
        };

        let mut grammar = Grammar::with_shared_trivia(trivia.clone());
        for (name, alternatives) in raw.rules {
            let alternatives = alternatives
                .into_iter()
                .map(|raw| raw.into_rule(Some(&trivia)))
                .collect::<Result<Vec<_>, _>>()?;
            grammar.insert(name, alternatives);
        }
        Ok(grammar)
    }
}

#[derive(Debug, Deserialize)]
struct RawGrammar {
    #[serde(default)]
    trivia: Option<RawRule>,
    rules: IndexMap<String, Vec<RawRule>>,
}

/// Raw rule matching the JSON format.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
enum RawRule {
    STRING {
        value: String,
        #[serde(default)]
        kind: Option<String>,
    },
    PATTERN {
        value: String,
        kind: String,
    },
    EMPTY {
        kind: String,
    },
    SKIP_NON_TRIVIA {
        kind: String,
    },
    SEQ {
        members: Vec<RawRule>,
        kind: String,
    },
    ONE_OR_MANY {
        content: Box<RawRule>,
        #[serde(default)]
        kind: Option<String>,
    },
    ZERO_OR_MANY {
        content: Box<RawRule>,
        #[serde(default)]
        kind: Option<String>,
    },
    OPTIONAL {
        content: Box<RawRule>,
        #[serde(default)]
        kind: Option<String>,
    },
    OFTEN_MISSED {
        content: Box<RawRule>,
        #[serde(default)]
        kind: Option<String>,
    },
    REF {
        name: String,
    },
    REQ_REF {
        name: String,
        #[serde(default)]
        precedence: i32,
        #[serde(default)]
        right: bool,
    },
    AND {
        content: Box<RawRule>,
    },
    NOT {
        content: Box<RawRule>,
    },
    SEPARATED_LIST {
        element: Box<RawRule>,
        separator: Box<RawRule>,
        kind: String,
        #[serde(default)]
        end: SeparatorEnd,
        #[serde(default = "default_can_be_empty")]
        can_be_empty: bool,
    },
}

fn default_can_be_empty() -> bool {
    true
}

impl RawRule {
    /// `trivia` is `None` only while converting the trivia rule itself.
    fn into_rule(self, trivia: Option<&Arc<dyn Terminal>>) -> Result<Rule, GrammarError> {
        let conv = |content: Box<RawRule>| (*content).into_rule(trivia);
        let with_kind = |rule: Rule, kind: Option<String>| match kind {
            Some(kind) => rule.with_kind(kind),
            None => rule,
        };

        let rule = match self {
            RawRule::STRING { value, kind } => match kind {
                Some(kind) => Rule::terminal(Literal::new(value).with_kind(kind)),
                None => Rule::lit(value),
            },
            RawRule::PATTERN { value, kind } => Rule::terminal(Pattern::new(kind, &value)?),
            RawRule::EMPTY { kind } => Rule::terminal(EmptyTerminal::new(kind)),
            RawRule::SKIP_NON_TRIVIA { kind } => {
                let trivia = trivia.cloned().unwrap_or_else(|| {
                    Arc::new(EmptyTerminal::new("Trivia")) as Arc<dyn Terminal>
                });
                Rule::terminal(SkipNonTrivia::new(kind, trivia))
            }
            RawRule::SEQ { members, kind } => Rule::Seq {
                elements: members
                    .into_iter()
                    .map(|m| m.into_rule(trivia))
                    .collect::<Result<_, _>>()?,
                kind: Kind::from(kind),
            },
            RawRule::ONE_OR_MANY { content, kind } => {
                with_kind(Rule::one_or_many(conv(content)?), kind)
            }
            RawRule::ZERO_OR_MANY { content, kind } => {
                with_kind(Rule::zero_or_many(conv(content)?), kind)
            }
            RawRule::OPTIONAL { content, kind } => with_kind(Rule::optional(conv(content)?), kind),
            RawRule::OFTEN_MISSED { content, kind } => {
                with_kind(Rule::often_missed(conv(content)?), kind)
            }
            RawRule::REF { name } => Rule::reference(name),
            RawRule::REQ_REF {
                name,
                precedence,
                right,
            } => Rule::ReqRef {
                name,
                precedence,
                right,
            },
            RawRule::AND { content } => Rule::and(conv(content)?),
            RawRule::NOT { content } => Rule::not(conv(content)?),
            RawRule::SEPARATED_LIST {
                element,
                separator,
                kind,
                end,
                can_be_empty,
            } => Rule::separated_list(conv(element)?, conv(separator)?, kind, end, can_be_empty),
        };
        Ok(rule)
    }
}
