//! Rule table compiler
//!
//! Validates a rule table and lowers it into its compiled form.

use crate::compiler::CompilerOptions;
use crate::error::{CompileError, EntryKind};
use tabula_core::ast::{Aggregation, HitPolicy, RuleTable};
use tabula_core::ir::{CompiledInput, CompiledOutput, CompiledRule, CompiledTable};
use tabula_core::unary::UnaryTestParser;

/// Rule table compiler
pub struct TableCompiler<'a> {
    options: &'a CompilerOptions,
    parser: UnaryTestParser,
}

impl<'a> TableCompiler<'a> {
    pub fn new(options: &'a CompilerOptions) -> Self {
        Self {
            options,
            parser: UnaryTestParser::new(),
        }
    }

    /// Compile a table, pushing every problem found to `errors`.
    ///
    /// Returns `None` when the table has errors.
    pub fn compile(
        &self,
        model: &str,
        decision: &str,
        table: &RuleTable,
        errors: &mut Vec<CompileError>,
    ) -> Option<CompiledTable> {
        let before = errors.len();

        if table.outputs.is_empty() {
            errors.push(CompileError::MissingOutputs {
                model: model.to_string(),
                decision: decision.to_string(),
            });
        }

        if let HitPolicy::Other(policy) = &table.hit_policy {
            errors.push(CompileError::UnknownHitPolicy {
                model: model.to_string(),
                decision: decision.to_string(),
                policy: policy.clone(),
            });
        }

        match (&table.aggregation, &table.hit_policy) {
            (Some(Aggregation::Other(tag)), _) => errors.push(CompileError::InvalidAggregation {
                model: model.to_string(),
                decision: decision.to_string(),
                message: format!("unknown aggregation '{}'", tag),
            }),
            (Some(aggregation), policy) if *policy != HitPolicy::Collect => {
                errors.push(CompileError::InvalidAggregation {
                    model: model.to_string(),
                    decision: decision.to_string(),
                    message: format!(
                        "aggregation {} requires the COLLECT hit policy, found {}",
                        aggregation.as_str(),
                        policy
                    ),
                })
            }
            _ => {}
        }

        let inputs: Vec<CompiledInput> = table
            .inputs
            .iter()
            .map(|column| CompiledInput::new(column.display_label(), &column.expression_text()))
            .collect();

        let outputs: Vec<CompiledOutput> = table
            .outputs
            .iter()
            .map(|column| CompiledOutput {
                name: column.name.clone(),
                priorities: column
                    .output_values
                    .as_deref()
                    .map(|values| self.parser.parse_literal_list(values))
                    .unwrap_or_default(),
            })
            .collect();

        let mut rules = Vec::with_capacity(table.rules.len());
        for (index, rule) in table.rules.iter().enumerate() {
            let number = index + 1;
            let mut counts_ok = true;

            if rule.input_entries.len() != table.inputs.len() {
                counts_ok = false;
                errors.push(CompileError::EntryCountMismatch {
                    model: model.to_string(),
                    decision: decision.to_string(),
                    rule: number,
                    kind: EntryKind::Input,
                    expected: table.inputs.len(),
                    found: rule.input_entries.len(),
                });
            }
            if rule.output_entries.len() != table.outputs.len() {
                counts_ok = false;
                errors.push(CompileError::EntryCountMismatch {
                    model: model.to_string(),
                    decision: decision.to_string(),
                    rule: number,
                    kind: EntryKind::Output,
                    expected: table.outputs.len(),
                    found: rule.output_entries.len(),
                });
            }
            if !counts_ok {
                continue;
            }

            let tests: Vec<_> = rule
                .input_entries
                .iter()
                .map(|entry| self.parser.parse_input(entry))
                .collect();
            let results: Vec<_> = rule
                .output_entries
                .iter()
                .map(|entry| self.parser.parse_output(entry))
                .collect();

            if !self.options.allow_expressions {
                let unsupported = rule
                    .input_entries
                    .iter()
                    .zip(&tests)
                    .filter(|(_, test)| test.contains_expression())
                    .map(|(entry, _)| entry)
                    .chain(
                        rule.output_entries
                            .iter()
                            .zip(&results)
                            .filter(|(_, output)| output.is_expression())
                            .map(|(entry, _)| entry),
                    );
                for entry in unsupported {
                    errors.push(CompileError::UnsupportedEntry {
                        model: model.to_string(),
                        decision: decision.to_string(),
                        rule: number,
                        entry: entry.trim().to_string(),
                    });
                }
            }

            rules.push(CompiledRule {
                index,
                tests,
                outputs: results,
            });
        }

        if errors.len() > before {
            return None;
        }

        Some(CompiledTable {
            hit_policy: table.hit_policy.clone(),
            aggregation: table.aggregation.clone(),
            inputs,
            outputs,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::ast::{InputColumn, OutputColumn, Rule};
    use tabula_core::types::Value;
    use tabula_core::unary::{OutputEntry, UnaryTest};

    fn compile(table: &RuleTable, options: &CompilerOptions) -> (Option<CompiledTable>, Vec<CompileError>) {
        let mut errors = Vec::new();
        let compiled = TableCompiler::new(options).compile("loan", "approve", table, &mut errors);
        (compiled, errors)
    }

    fn approve_table() -> RuleTable {
        RuleTable::new()
            .add_input(InputColumn::new("score"))
            .add_output(OutputColumn::new("approved"))
            .add_rule(Rule::new([">= 700"], ["true"]))
            .add_rule(Rule::new(["-"], ["false"]))
    }

    #[test]
    fn test_compile_valid_table() {
        let (compiled, errors) = compile(&approve_table(), &CompilerOptions::default());
        assert!(errors.is_empty());

        let table = compiled.unwrap();
        assert_eq!(table.inputs[0].path, vec!["score"]);
        assert_eq!(table.rules.len(), 2);
        assert_eq!(table.rules[1].tests, vec![UnaryTest::Any]);
        assert_eq!(table.rules[0].outputs, vec![OutputEntry::Value(Value::Bool(true))]);
    }

    #[test]
    fn test_all_entry_count_errors_are_collected() {
        let table = approve_table()
            .add_rule(Rule::new(["1", "2"], ["true"]))
            .add_rule(Rule::new(["3"], Vec::<String>::new()));

        let (compiled, errors) = compile(&table, &CompilerOptions::default());
        assert!(compiled.is_none());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code() == "E001"));
    }

    #[test]
    fn test_policy_and_aggregation_errors() {
        let table = approve_table()
            .with_hit_policy(HitPolicy::Other("WEIGHTED".to_string()))
            .with_aggregation(Aggregation::Sum);

        let (_, errors) = compile(&table, &CompilerOptions::default());
        let codes: Vec<_> = errors.iter().map(CompileError::code).collect();
        assert_eq!(codes, vec!["E002", "E003"]);

        let table = approve_table()
            .with_hit_policy(HitPolicy::Collect)
            .with_aggregation(Aggregation::Other("AVG".to_string()));
        let (_, errors) = compile(&table, &CompilerOptions::default());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_expressions_need_opt_in() {
        let table = RuleTable::new()
            .add_input(InputColumn::new("date"))
            .add_output(OutputColumn::new("late"))
            .add_rule(Rule::new(["> date(\"2024-01-01\")"], ["score * 2"]));

        let (compiled, errors) = compile(&table, &CompilerOptions::default());
        assert!(compiled.is_none());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code() == "E004"));

        let options = CompilerOptions {
            allow_expressions: true,
        };
        let (compiled, errors) = compile(&table, &options);
        assert!(errors.is_empty());
        assert!(compiled.is_some());
    }

    #[test]
    fn test_output_priorities() {
        let table = RuleTable::new()
            .with_hit_policy(HitPolicy::Priority)
            .add_input(InputColumn::new("x"))
            .add_output(OutputColumn::new("risk").with_output_values("\"HIGH\", \"LOW\""))
            .add_rule(Rule::new(["-"], ["\"LOW\""]));

        let (compiled, _) = compile(&table, &CompilerOptions::default());
        let priorities = &compiled.unwrap().outputs[0].priorities;
        assert_eq!(priorities, &vec![Value::from("HIGH"), Value::from("LOW")]);
    }
}
