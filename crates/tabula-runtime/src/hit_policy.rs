//! Hit policy application
//!
//! Turns the set of rules that matched into the decision's value.

use crate::error::{Result, RuntimeError};
use std::cmp::Ordering;
use tabula_core::ast::{Aggregation, HitPolicy};
use tabula_core::ir::CompiledTable;
use tabula_core::types::Value;

/// A rule whose input entries all matched, with its computed outputs
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    /// Position of the rule in its table
    pub rule: usize,
    pub outputs: Vec<Value>,
}

/// Apply the table's hit policy to the matched rules, given in table order.
///
/// Returns `None` when nothing matched.
pub fn apply_hit_policy(table: &CompiledTable, matches: Vec<RuleMatch>) -> Result<Option<Value>> {
    if matches.is_empty() {
        return Ok(None);
    }

    let value = match &table.hit_policy {
        HitPolicy::First => row_value(table, first(matches)),
        HitPolicy::Unique => {
            if matches.len() > 1 {
                return Err(violation(
                    &table.hit_policy,
                    format!("rules {} all matched", rule_numbers(&matches)),
                ));
            }
            row_value(table, first(matches))
        }
        HitPolicy::Any => {
            let agree = matches.windows(2).all(|pair| pair[0].outputs == pair[1].outputs);
            if !agree {
                return Err(violation(
                    &table.hit_policy,
                    format!("rules {} matched with different outputs", rule_numbers(&matches)),
                ));
            }
            row_value(table, first(matches))
        }
        HitPolicy::Priority => {
            let best = matches
                .into_iter()
                .min_by(|a, b| compare_priority(table, a, b))
                .map(|m| m.outputs)
                .unwrap_or_default();
            row_value(table, best)
        }
        HitPolicy::OutputOrder => {
            let mut ordered = matches;
            ordered.sort_by(|a, b| compare_priority(table, a, b));
            collect_rows(table, ordered)
        }
        HitPolicy::RuleOrder => collect_rows(table, matches),
        HitPolicy::Collect => match &table.aggregation {
            None => collect_rows(table, matches),
            Some(aggregation) => aggregate(table, aggregation, matches)?,
        },
        HitPolicy::Other(_) => {
            return Err(violation(&table.hit_policy, "unknown hit policy".to_string()));
        }
    };

    Ok(Some(value))
}

fn first(matches: Vec<RuleMatch>) -> Vec<Value> {
    matches.into_iter().next().map(|m| m.outputs).unwrap_or_default()
}

/// A single output yields its value; several yield an object by output name
fn row_value(table: &CompiledTable, outputs: Vec<Value>) -> Value {
    if table.is_single_output() {
        return outputs.into_iter().next().unwrap_or(Value::Null);
    }
    Value::Object(
        table
            .outputs
            .iter()
            .map(|column| column.name.clone())
            .zip(outputs)
            .collect(),
    )
}

fn collect_rows(table: &CompiledTable, matches: Vec<RuleMatch>) -> Value {
    Value::Array(
        matches
            .into_iter()
            .map(|m| row_value(table, m.outputs))
            .collect(),
    )
}

/// Order by output priority, column by column; stable for equal priorities
fn compare_priority(table: &CompiledTable, a: &RuleMatch, b: &RuleMatch) -> Ordering {
    for (index, column) in table.outputs.iter().enumerate() {
        let left = a.outputs.get(index).map(|v| column.priority_of(v));
        let right = b.outputs.get(index).map(|v| column.priority_of(v));
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn aggregate(table: &CompiledTable, aggregation: &Aggregation, matches: Vec<RuleMatch>) -> Result<Value> {
    if let Aggregation::Count = aggregation {
        return Ok(Value::Number(matches.len() as f64));
    }
    if !table.is_single_output() {
        return Err(RuntimeError::TypeError(format!(
            "{} aggregation needs exactly one output column, found {}",
            aggregation.as_str(),
            table.outputs.len()
        )));
    }

    let values: Vec<Value> = matches
        .into_iter()
        .filter_map(|m| m.outputs.into_iter().next())
        .filter(|v| !v.is_null())
        .collect();

    match aggregation {
        Aggregation::Sum => {
            let mut total = 0.0;
            for value in &values {
                total += value.as_number().ok_or_else(|| {
                    RuntimeError::TypeError(format!("cannot sum {} value {}", value.type_name(), value))
                })?;
            }
            Ok(Value::Number(total))
        }
        Aggregation::Min => extreme(values, Ordering::Less),
        Aggregation::Max => extreme(values, Ordering::Greater),
        Aggregation::Count => Ok(Value::Number(values.len() as f64)),
        Aggregation::Other(tag) => Err(RuntimeError::TypeError(format!(
            "unknown aggregation {}",
            tag
        ))),
    }
}

fn extreme(values: Vec<Value>, wanted: Ordering) -> Result<Value> {
    let mut best: Option<Value> = None;
    for value in values {
        best = match best {
            Some(current) if value.compare(&current)? != wanted => Some(current),
            _ => Some(value),
        };
    }
    Ok(best.unwrap_or(Value::Null))
}

fn rule_numbers(matches: &[RuleMatch]) -> String {
    matches
        .iter()
        .map(|m| (m.rule + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn violation(policy: &HitPolicy, message: String) -> RuntimeError {
    RuntimeError::HitPolicyViolation {
        policy: policy.as_str().to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::ir::{CompiledInput, CompiledOutput};

    fn table(policy: HitPolicy, aggregation: Option<Aggregation>, outputs: &[&str]) -> CompiledTable {
        CompiledTable {
            hit_policy: policy,
            aggregation,
            inputs: vec![CompiledInput::new("x", "x")],
            outputs: outputs
                .iter()
                .map(|name| CompiledOutput {
                    name: name.to_string(),
                    priorities: vec![Value::from("HIGH"), Value::from("MEDIUM"), Value::from("LOW")],
                })
                .collect(),
            rules: Vec::new(),
        }
    }

    fn hit(rule: usize, outputs: &[Value]) -> RuleMatch {
        RuleMatch {
            rule,
            outputs: outputs.to_vec(),
        }
    }

    #[test]
    fn test_no_match_is_none() {
        let table = table(HitPolicy::First, None, &["out"]);
        assert_eq!(apply_hit_policy(&table, vec![]).unwrap(), None);
    }

    #[test]
    fn test_first_and_unique() {
        let matches = vec![hit(0, &[Value::from("a")]), hit(2, &[Value::from("b")])];

        let first = table(HitPolicy::First, None, &["out"]);
        assert_eq!(apply_hit_policy(&first, matches.clone()).unwrap(), Some(Value::from("a")));

        let unique = table(HitPolicy::Unique, None, &["out"]);
        let err = apply_hit_policy(&unique, matches).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Hit policy UNIQUE violated: rules 1, 3 all matched"
        );
    }

    #[test]
    fn test_any_requires_agreement() {
        let any = table(HitPolicy::Any, None, &["out"]);
        let agreeing = vec![hit(0, &[Value::from(1.0)]), hit(1, &[Value::from(1.0)])];
        assert_eq!(apply_hit_policy(&any, agreeing).unwrap(), Some(Value::from(1.0)));

        let disagreeing = vec![hit(0, &[Value::from(1.0)]), hit(1, &[Value::from(2.0)])];
        assert!(matches!(
            apply_hit_policy(&any, disagreeing),
            Err(RuntimeError::HitPolicyViolation { .. })
        ));
    }

    #[test]
    fn test_priority_orders_by_output_values() {
        let matches = vec![
            hit(0, &[Value::from("LOW")]),
            hit(1, &[Value::from("HIGH")]),
            hit(2, &[Value::from("UNLISTED")]),
            hit(3, &[Value::from("MEDIUM")]),
        ];

        let priority = table(HitPolicy::Priority, None, &["risk"]);
        assert_eq!(
            apply_hit_policy(&priority, matches.clone()).unwrap(),
            Some(Value::from("HIGH"))
        );

        let output_order = table(HitPolicy::OutputOrder, None, &["risk"]);
        assert_eq!(
            apply_hit_policy(&output_order, matches).unwrap(),
            Some(Value::Array(vec![
                Value::from("HIGH"),
                Value::from("MEDIUM"),
                Value::from("LOW"),
                Value::from("UNLISTED"),
            ]))
        );
    }

    #[test]
    fn test_collect_keeps_rule_order() {
        let collect = table(HitPolicy::Collect, None, &["out"]);
        let matches = vec![hit(1, &[Value::from("b")]), hit(4, &[Value::from("a")])];
        assert_eq!(
            apply_hit_policy(&collect, matches).unwrap(),
            Some(Value::Array(vec![Value::from("b"), Value::from("a")]))
        );
    }

    #[test]
    fn test_collect_aggregations() {
        let matches = vec![
            hit(0, &[Value::from(10.0)]),
            hit(1, &[Value::from(5.0)]),
            hit(2, &[Value::from(20.0)]),
        ];
        let run = |aggregation| {
            let table = table(HitPolicy::Collect, Some(aggregation), &["amount"]);
            apply_hit_policy(&table, matches.clone()).unwrap()
        };

        assert_eq!(run(Aggregation::Sum), Some(Value::from(35.0)));
        assert_eq!(run(Aggregation::Count), Some(Value::from(3.0)));
        assert_eq!(run(Aggregation::Min), Some(Value::from(5.0)));
        assert_eq!(run(Aggregation::Max), Some(Value::from(20.0)));
    }

    #[test]
    fn test_sum_rejects_strings() {
        let table = table(HitPolicy::Collect, Some(Aggregation::Sum), &["amount"]);
        let result = apply_hit_policy(&table, vec![hit(0, &[Value::from("ten")])]);
        assert!(matches!(result, Err(RuntimeError::TypeError(_))));
    }

    #[test]
    fn test_multi_output_rows_are_objects() {
        let first = table(HitPolicy::First, None, &["risk", "limit"]);
        let value = apply_hit_policy(&first, vec![hit(0, &[Value::from("LOW"), Value::from(500.0)])])
            .unwrap()
            .unwrap();

        assert_eq!(value.lookup(&["risk".to_string()]), Some(&Value::from("LOW")));
        assert_eq!(value.lookup(&["limit".to_string()]), Some(&Value::from(500.0)));
    }
}
