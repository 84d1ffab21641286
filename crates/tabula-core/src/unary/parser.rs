//! Rule entry parser
//!
//! Parsing never fails: text outside the built-in syntax becomes an
//! `Expression` entry, and the compiler decides whether that is allowed.

use super::types::{Comparator, Operand, OutputEntry, UnaryTest};
use crate::types::Value;

/// Parser for input and output entries
#[derive(Debug, Default, Clone, Copy)]
pub struct UnaryTestParser;

/// Comparators ordered longest first to avoid partial matches
const COMPARATORS: [(&str, Comparator); 6] = [
    ("<=", Comparator::Le),
    (">=", Comparator::Ge),
    ("!=", Comparator::Ne),
    ("<", Comparator::Lt),
    (">", Comparator::Gt),
    ("=", Comparator::Eq),
];

impl UnaryTestParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an input entry into a unary test
    pub fn parse_input(&self, entry: &str) -> UnaryTest {
        let text = entry.trim();
        if text.is_empty() || text == "-" {
            return UnaryTest::Any;
        }

        match self.parse_tests(text) {
            Some(mut tests) if tests.len() == 1 => tests.remove(0),
            Some(tests) => UnaryTest::Disjunction(tests),
            None => UnaryTest::Expression(text.to_string()),
        }
    }

    /// Parse an output entry
    pub fn parse_output(&self, entry: &str) -> OutputEntry {
        let text = entry.trim();
        if text.is_empty() {
            return OutputEntry::Value(Value::Null);
        }
        if let Some(value) = parse_literal(text) {
            return OutputEntry::Value(value);
        }
        if is_name_path(text) {
            return OutputEntry::FactRef(split_path(text));
        }
        OutputEntry::Expression(text.to_string())
    }

    /// Parse a comma-separated list of literals, such as an output values list.
    ///
    /// Items that are not literals are skipped.
    pub fn parse_literal_list(&self, text: &str) -> Vec<Value> {
        split_top_level(text)
            .iter()
            .filter_map(|item| parse_literal(item))
            .collect()
    }

    fn parse_tests(&self, text: &str) -> Option<Vec<UnaryTest>> {
        let items = split_top_level(text);
        if items.is_empty() {
            return None;
        }
        items.iter().map(|item| self.parse_single(item)).collect()
    }

    fn parse_single(&self, item: &str) -> Option<UnaryTest> {
        let item = item.trim();
        if item.is_empty() {
            return None;
        }
        if item == "-" {
            return Some(UnaryTest::Any);
        }

        if let Some(rest) = item.strip_prefix("not") {
            let rest = rest.trim_start();
            if rest.starts_with('(') && rest.ends_with(')') && rest.len() >= 2 {
                let inner = &rest[1..rest.len() - 1];
                return self.parse_tests(inner).map(UnaryTest::Negation);
            }
        }

        if let Some(range) = parse_range(item) {
            return Some(range);
        }

        for (symbol, op) in COMPARATORS {
            if let Some(rest) = item.strip_prefix(symbol) {
                let operand = parse_operand(rest.trim())?;
                return Some(UnaryTest::Compare { op, operand });
            }
        }

        parse_operand(item).map(|operand| UnaryTest::Compare {
            op: Comparator::Eq,
            operand,
        })
    }
}

fn parse_range(item: &str) -> Option<UnaryTest> {
    let first = item.chars().next()?;
    let last = item.chars().last()?;
    if !matches!(first, '[' | '(' | ']') || !matches!(last, ']' | ')' | '[') || item.len() < 2 {
        return None;
    }

    let inner = &item[1..item.len() - 1];
    let split = inner.find("..")?;
    let low = parse_operand(inner[..split].trim())?;
    let high = parse_operand(inner[split + 2..].trim())?;

    Some(UnaryTest::Range {
        low,
        high,
        low_inclusive: first == '[',
        high_inclusive: last == ']',
    })
}

fn parse_operand(text: &str) -> Option<Operand> {
    if text.is_empty() {
        return None;
    }
    if let Some(value) = parse_literal(text) {
        return Some(Operand::Literal(value));
    }
    if is_name_path(text) {
        return Some(Operand::FactRef(split_path(text)));
    }
    None
}

/// Parse a literal: quoted string, number, boolean or null
fn parse_literal(text: &str) -> Option<Value> {
    let text = text.trim();

    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return unquote(&text[1..text.len() - 1]).map(Value::String);
    }

    match text {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }

    if looks_numeric(text) {
        return text.parse::<f64>().ok().map(Value::Number);
    }

    None
}

/// Resolve escapes inside a quoted string; `None` if a bare quote remains
fn unquote(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '"' => return None,
            _ => out.push(c),
        }
    }
    Some(out)
}

fn looks_numeric(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    match body.chars().next() {
        Some(c) if c.is_ascii_digit() => body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')),
        _ => false,
    }
}

fn is_name_path(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_alphabetic() || c == '_' => {
                    chars.all(|c| c.is_alphanumeric() || c == '_')
                }
                _ => false,
            }
        })
}

fn split_path(text: &str) -> Vec<String> {
    text.split('.').map(str::to_string).collect()
}

/// Split on commas that sit outside strings, intervals and call parentheses.
///
/// Interval brackets are unbalanced by nature (`]1..10[`, `(1..5]`), so an
/// opening bracket only counts when it starts an item, and is closed by the
/// next closing bracket of any kind.
fn split_top_level(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut in_interval = false;
    let mut depth = 0usize;
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if in_string {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                prev = Some(c);
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '(' | ']' if !in_interval && matches!(prev, None | Some(',') | Some('(')) => {
                in_interval = true;
            }
            ']' | ')' | '[' if in_interval => in_interval = false,
            '(' if prev.is_some_and(|p| p.is_alphanumeric()) => depth += 1,
            ')' if depth > 0 => depth -= 1,
            ',' if depth == 0 => {
                items.push(current.trim().to_string());
                current.clear();
                prev = Some(c);
                continue;
            }
            _ => {}
        }

        current.push(c);
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }

    if !current.trim().is_empty() || !items.is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> UnaryTest {
        UnaryTestParser::new().parse_input(text)
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(parse("-"), UnaryTest::Any);
        assert_eq!(parse(""), UnaryTest::Any);
        assert_eq!(parse("  - "), UnaryTest::Any);
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("700"), UnaryTest::equals(700.0));
        assert_eq!(parse("-1.5"), UnaryTest::equals(-1.5));
        assert_eq!(parse("\"gold\""), UnaryTest::equals("gold"));
        assert_eq!(parse("true"), UnaryTest::equals(true));
        assert_eq!(
            parse("null"),
            UnaryTest::Compare {
                op: Comparator::Eq,
                operand: Operand::Literal(Value::Null)
            }
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            parse(">= 700"),
            UnaryTest::Compare {
                op: Comparator::Ge,
                operand: Operand::literal(700.0)
            }
        );
        assert_eq!(
            parse("<10"),
            UnaryTest::Compare {
                op: Comparator::Lt,
                operand: Operand::literal(10.0)
            }
        );
        assert_eq!(
            parse("!= \"x\""),
            UnaryTest::Compare {
                op: Comparator::Ne,
                operand: Operand::literal("x")
            }
        );
        assert_eq!(
            parse("> applicant.limit"),
            UnaryTest::Compare {
                op: Comparator::Gt,
                operand: Operand::fact("applicant.limit")
            }
        );
    }

    #[test]
    fn test_intervals() {
        assert_eq!(
            parse("[1..10]"),
            UnaryTest::Range {
                low: Operand::literal(1.0),
                high: Operand::literal(10.0),
                low_inclusive: true,
                high_inclusive: true,
            }
        );
        assert_eq!(
            parse("]1.5..2.5["),
            UnaryTest::Range {
                low: Operand::literal(1.5),
                high: Operand::literal(2.5),
                low_inclusive: false,
                high_inclusive: false,
            }
        );
        match parse("(0..100]") {
            UnaryTest::Range {
                low_inclusive,
                high_inclusive,
                ..
            } => {
                assert!(!low_inclusive);
                assert!(high_inclusive);
            }
            other => panic!("Expected range, got {:?}", other),
        }
    }

    #[test]
    fn test_disjunction_and_negation() {
        assert_eq!(
            parse("\"gold\", \"silver\""),
            UnaryTest::Disjunction(vec![UnaryTest::equals("gold"), UnaryTest::equals("silver")])
        );
        assert_eq!(
            parse("not(\"gold\", \"a,b\")"),
            UnaryTest::Negation(vec![UnaryTest::equals("gold"), UnaryTest::equals("a,b")])
        );

        match parse("(1..5], [7..9)") {
            UnaryTest::Disjunction(tests) => assert_eq!(tests.len(), 2),
            other => panic!("Expected disjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_syntax_is_expression() {
        assert_eq!(
            parse("date(\"2020-01-01\")"),
            UnaryTest::Expression("date(\"2020-01-01\")".to_string())
        );
        assert!(parse("count(items) > 3").contains_expression());
        assert!(parse("1, 2 + 3").contains_expression());
    }

    #[test]
    fn test_bare_name_is_fact_reference() {
        assert_eq!(
            parse("threshold"),
            UnaryTest::Compare {
                op: Comparator::Eq,
                operand: Operand::fact("threshold")
            }
        );
    }

    #[test]
    fn test_output_entries() {
        let parser = UnaryTestParser::new();
        assert_eq!(parser.parse_output("true"), OutputEntry::Value(Value::Bool(true)));
        assert_eq!(parser.parse_output(" \"HIGH\" "), OutputEntry::Value(Value::String("HIGH".into())));
        assert_eq!(parser.parse_output(""), OutputEntry::Value(Value::Null));
        assert_eq!(
            parser.parse_output("applicant.score"),
            OutputEntry::FactRef(vec!["applicant".into(), "score".into()])
        );
        assert!(parser.parse_output("score * 2").is_expression());
    }

    #[test]
    fn test_literal_list() {
        let parser = UnaryTestParser::new();
        assert_eq!(
            parser.parse_literal_list("\"high\",\"medium\", \"low\""),
            vec![
                Value::String("high".into()),
                Value::String("medium".into()),
                Value::String("low".into())
            ]
        );
        assert!(parser.parse_literal_list("").is_empty());
    }
}
