//! Rule-based field extraction.
//!
//! Each field is resolved by a [`RuleChain`]: an ordered list of named pure
//! functions over a [`DocumentSegment`]. The first rule returning `Some` wins
//! and later rules are never run.

pub mod amounts;
pub mod dates;
pub mod names;
pub mod patterns;

pub use amounts::{choose_pay_value, clean_amount, currency_tokens, standalone_integer};
pub use dates::{find_date, parse_dmy};
pub use names::{StopWords, name_chain};

use tracing::trace;

use crate::text::DocumentSegment;

type RuleFn<'a, T> = Box<dyn Fn(&DocumentSegment) -> Option<T> + 'a>;

/// A single named heuristic.
pub struct Rule<'a, T> {
    name: &'static str,
    apply: RuleFn<'a, T>,
}

impl<T> Rule<'_, T> {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The value a chain resolved to, with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub rule: &'static str,
    pub value: T,
}

/// Ordered fallback heuristics for one field.
pub struct RuleChain<'a, T> {
    field: &'static str,
    rules: Vec<Rule<'a, T>>,
}

impl<'a, T> RuleChain<'a, T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            rules: Vec::new(),
        }
    }

    /// Append a rule; it runs only if every earlier rule fails.
    pub fn rule(
        mut self,
        name: &'static str,
        apply: impl Fn(&DocumentSegment) -> Option<T> + 'a,
    ) -> Self {
        self.rules.push(Rule {
            name,
            apply: Box::new(apply),
        });
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(Rule::name).collect()
    }

    /// Evaluate rules in order and return the first match.
    pub fn resolve(&self, segment: &DocumentSegment) -> Option<Resolved<T>> {
        for rule in &self.rules {
            if let Some(value) = (rule.apply)(segment) {
                trace!(field = self.field, rule = rule.name, "rule matched");
                return Some(Resolved {
                    rule: rule.name,
                    value,
                });
            }
        }
        trace!(field = self.field, "no rule matched");
        None
    }
}
