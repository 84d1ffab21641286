//! Parsed rule entry types

use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a unary test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The right-hand side of a test: a literal or another fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Literal(Value),

    /// Dotted path into the fact map (e.g. `applicant.limit`)
    FactRef(Vec<String>),
}

impl Operand {
    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal(value.into())
    }

    pub fn fact(path: &str) -> Self {
        Operand::FactRef(path.split('.').map(str::to_string).collect())
    }
}

/// A parsed input entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnaryTest {
    /// Wildcard
    Any,

    /// Compare the fact against an operand
    Compare { op: Comparator, operand: Operand },

    /// Interval membership
    Range {
        low: Operand,
        high: Operand,
        low_inclusive: bool,
        high_inclusive: bool,
    },

    /// Any of the tests matches
    Disjunction(Vec<UnaryTest>),

    /// None of the tests matches
    Negation(Vec<UnaryTest>),

    /// Verbatim text outside the built-in syntax
    Expression(String),
}

impl UnaryTest {
    /// Equality against a literal
    pub fn equals(value: impl Into<Value>) -> Self {
        UnaryTest::Compare {
            op: Comparator::Eq,
            operand: Operand::literal(value),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, UnaryTest::Any)
    }

    /// Whether the test, or any nested test, is an opaque expression
    pub fn contains_expression(&self) -> bool {
        match self {
            UnaryTest::Expression(_) => true,
            UnaryTest::Disjunction(tests) | UnaryTest::Negation(tests) => {
                tests.iter().any(UnaryTest::contains_expression)
            }
            _ => false,
        }
    }
}

/// A parsed output entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputEntry {
    Value(Value),
    FactRef(Vec<String>),
    Expression(String),
}

impl OutputEntry {
    pub fn is_expression(&self) -> bool {
        matches!(self, OutputEntry::Expression(_))
    }
}
