//! Rule Entry Syntax
//!
//! Input entries of a rule table are simple unary tests matched against a
//! single fact. Output entries are literals or references to other facts.
//!
//! # Input entries
//!
//! - `-` or empty: matches anything
//! - Literals: `700`, `"gold"`, `true`, `null`
//! - Comparisons: `< 10`, `<= 10`, `> 10`, `>= 10`, `= 10`, `!= 10`
//! - Intervals: `[1..10]`, `(1..10)`, `]1..10[`, `[1..10)`
//! - Disjunctions: `"gold", "silver"`
//! - Negation: `not("gold", "silver")`
//! - Fact references: `applicant.limit`, `>= applicant.limit`
//!
//! Anything else is kept verbatim as an expression entry, left to a custom
//! predicate evaluator.
//!
//! # Output entries
//!
//! Literals become typed values, bare names refer to facts, and anything
//! else is kept as an expression.

mod parser;
mod types;

pub use parser::UnaryTestParser;
pub use types::{Comparator, Operand, OutputEntry, UnaryTest};
