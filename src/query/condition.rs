//! Condition trees.
//!
//! A condition is a comparison node (or a parenthesized sub-condition),
//! optionally chained with And/Or continuations into a right-leaning chain.
//!
//! ## Evaluation order
//!
//! The chain is folded strictly left-to-right with no operator precedence
//! and no short-circuiting: each node's own comparison is computed in chain
//! order and combined into the running value with its connective. So
//! `a.and(b).or(c)` evaluates as `(a && b) || c`, and `a.or(b).and(c)` as
//! `(a || b) && c`; use [`Condition::sub`] for any other grouping. Every
//! node evaluates even when the running value is already decided, keeping
//! RNG draws inside operands deterministic.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::evaluator::{resolve, Operator};
use super::getter::{Getter, QueryScope};

/// The comparison a single node performs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum ConditionKind {
    /// Resolve both operands and compare.
    Compare {
        left: Getter,
        op: Operator,
        right: Getter,
    },
    /// Parenthesized sub-condition, evaluated as a whole.
    Sub(Box<Condition>),
}

/// A boolean expression over live match state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    kind: ConditionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    and: Option<Box<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    or: Option<Box<Condition>>,
}

impl Condition {
    /// A comparison node.
    pub fn compare(left: impl Into<Getter>, op: Operator, right: impl Into<Getter>) -> Self {
        Self {
            kind: ConditionKind::Compare {
                left: left.into(),
                op,
                right: right.into(),
            },
            and: None,
            or: None,
        }
    }

    /// A parenthesized sub-condition.
    #[must_use]
    pub fn sub(inner: Condition) -> Self {
        Self {
            kind: ConditionKind::Sub(Box::new(inner)),
            and: None,
            or: None,
        }
    }

    /// Append an And continuation at the end of the chain.
    #[must_use]
    pub fn and(mut self, next: Condition) -> Self {
        self.tail_mut().and = Some(Box::new(next));
        self
    }

    /// Append an Or continuation at the end of the chain.
    #[must_use]
    pub fn or(mut self, next: Condition) -> Self {
        self.tail_mut().or = Some(Box::new(next));
        self
    }

    fn tail_mut(&mut self) -> &mut Condition {
        match self {
            Condition { and: Some(next), .. } => next.tail_mut(),
            Condition { or: Some(next), .. } => next.tail_mut(),
            other => other,
        }
    }

    /// Evaluate the whole chain against current state.
    ///
    /// Incomparable operand kinds propagate as configuration errors;
    /// resolution misses inside operands fold in as `false`.
    pub fn evaluate(&self, scope: &mut QueryScope) -> Result<bool, EngineError> {
        let mut value = self.own_value(scope)?;
        let mut link = self.continuation();
        while let Some((connective, node)) = link {
            let next = node.own_value(scope)?;
            value = match connective {
                Connective::And => value && next,
                Connective::Or => value || next,
            };
            link = node.continuation();
        }
        Ok(value)
    }

    fn own_value(&self, scope: &mut QueryScope) -> Result<bool, EngineError> {
        match &self.kind {
            ConditionKind::Compare { left, op, right } => {
                let left = left.get(scope)?;
                let right = right.get(scope)?;
                resolve(scope.board, &left, *op, &right)
            }
            ConditionKind::Sub(inner) => inner.evaluate(scope),
        }
    }

    fn continuation(&self) -> Option<(Connective, &Condition)> {
        if let Some(next) = &self.and {
            Some((Connective::And, next))
        } else {
            self.or.as_deref().map(|next| (Connective::Or, next))
        }
    }
}

#[derive(Clone, Copy)]
enum Connective {
    And,
    Or,
}
