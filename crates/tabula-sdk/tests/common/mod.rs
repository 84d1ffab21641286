//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use std::sync::Arc;
use tabula_sdk::{
    DecisionOutcome, DecisionService, DecisionServiceBuilder, EditPolicy, EvaluationResult,
    MemoryStore, Value,
};

pub const LOAN_DMN: &str = r#"<definitions xmlns="http://www.omg.org/spec/DMN/20180521/MODEL/"
    name="loan" namespace="https://example.com/loan">
  <inputData name="score"><variable name="score" typeRef="number"/></inputData>
  <decision id="d_risk" name="risk">
    <decisionTable hitPolicy="UNIQUE">
      <input label="score"><inputExpression><text>score</text></inputExpression></input>
      <output name="risk"/>
      <rule><inputEntry><text>&lt; 600</text></inputEntry><outputEntry><text>"HIGH"</text></outputEntry></rule>
      <rule><inputEntry><text>&gt;= 600</text></inputEntry><outputEntry><text>"LOW"</text></outputEntry></rule>
    </decisionTable>
  </decision>
  <decision id="d_approve" name="approve">
    <decisionTable>
      <input label="score"><inputExpression><text>score</text></inputExpression></input>
      <output name="approved"/>
      <rule><inputEntry><text>&gt;= 700</text></inputEntry><outputEntry><text>true</text></outputEntry></rule>
      <rule><inputEntry><text>-</text></inputEntry><outputEntry><text>false</text></outputEntry></rule>
    </decisionTable>
  </decision>
</definitions>"#;

pub const PRICING_DMN: &str = r#"<definitions xmlns="http://www.omg.org/spec/DMN/20180521/MODEL/"
    name="pricing" namespace="https://example.com/pricing">
  <decision id="d_discount" name="discount">
    <decisionTable hitPolicy="COLLECT" aggregation="SUM">
      <input label="tier"><inputExpression><text>customer.tier</text></inputExpression></input>
      <output name="discount"/>
      <rule><inputEntry><text>"gold","silver"</text></inputEntry><outputEntry><text>10</text></outputEntry></rule>
      <rule><inputEntry><text>"gold"</text></inputEntry><outputEntry><text>5</text></outputEntry></rule>
    </decisionTable>
  </decision>
</definitions>"#;

/// The approve table with a custom threshold
pub fn approve_table(threshold: u32) -> String {
    format!(
        r#"<decisionTable xmlns="http://www.omg.org/spec/DMN/20180521/MODEL/">
  <input label="score"><inputExpression><text>score</text></inputExpression></input>
  <output name="approved"/>
  <rule><inputEntry><text>&gt;= {}</text></inputEntry><outputEntry><text>true</text></outputEntry></rule>
  <rule><inputEntry><text>-</text></inputEntry><outputEntry><text>false</text></outputEntry></rule>
</decisionTable>"#,
        threshold
    )
}

/// An approve table whose second rule has one input entry too many
pub const MALFORMED_TABLE: &str = r#"<decisionTable xmlns="http://www.omg.org/spec/DMN/20180521/MODEL/">
  <input label="score"><inputExpression><text>score</text></inputExpression></input>
  <output name="approved"/>
  <rule><inputEntry><text>&gt;= 650</text></inputEntry><outputEntry><text>true</text></outputEntry></rule>
  <rule><inputEntry><text>-</text></inputEntry><inputEntry><text>-</text></inputEntry><outputEntry><text>false</text></outputEntry></rule>
</decisionTable>"#;

pub fn loan_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_document("loan.dmn", LOAN_DMN)
            .with_document("pricing.dmn", PRICING_DMN),
    )
}

/// Build a service over `store`
pub async fn memory_service(store: Arc<MemoryStore>, policy: EditPolicy) -> DecisionService {
    DecisionServiceBuilder::new()
        .with_store(store)
        .with_edit_policy(policy)
        .build()
        .await
        .expect("Failed to build service")
}

/// Helper to create facts from key-value pairs
#[macro_export]
macro_rules! facts {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), tabula_sdk::Value::from($value));
        )*
        map
    }};
}

/// Assertion helpers for EvaluationResult
pub trait ResultAssertions {
    fn assert_value(&self, decision: &str, expected: Value);
    fn assert_no_result(&self, decision: &str);
    fn assert_failed(&self, decision: &str);
}

impl ResultAssertions for EvaluationResult {
    fn assert_value(&self, decision: &str, expected: Value) {
        let actual = self.get(decision).and_then(DecisionOutcome::value);
        assert_eq!(
            actual,
            Some(&expected),
            "Expected {} = {:?}, got {:?}",
            decision,
            expected,
            self.get(decision)
        );
    }

    fn assert_no_result(&self, decision: &str) {
        assert!(
            matches!(self.get(decision), Some(DecisionOutcome::NoResult)),
            "Expected no result for {}, got {:?}",
            decision,
            self.get(decision)
        );
    }

    fn assert_failed(&self, decision: &str) {
        assert!(
            matches!(self.get(decision), Some(DecisionOutcome::Failed { .. })),
            "Expected {} to fail, got {:?}",
            decision,
            self.get(decision)
        );
    }
}
