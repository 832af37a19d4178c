//! The condition language: what a rule may test against working memory.
//!
//! A condition is a tree of fact patterns combined with conjunction,
//! disjunction, and negation-as-failure. Conditions are owned by their rule
//! and never mutated after catalog load.

use serde::{Deserialize, Serialize};

use crate::fact::{ArrivalMode, FactKind, Gender};

/// Comparison operator for a field test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl Default for CmpOp {
    fn default() -> Self {
        CmpOp::Eq
    }
}

impl CmpOp {
    /// Ordering operators only make sense on numeric fields.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CmpOp::Eq | CmpOp::Ne)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A literal value as it appears in a field test or on a fact field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Num(i64),
    Sym(String),
}

impl FieldValue {
    pub fn sym(value: impl Into<String>) -> FieldValue {
        FieldValue::Sym(value.into())
    }
}

/// One test against a named field of a fact: either literal equality or a
/// numeric comparison against the bound field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTest {
    pub field: String,
    #[serde(default, rename = "operator")]
    pub op: CmpOp,
    pub value: FieldValue,
}

impl FieldTest {
    pub fn new(field: impl Into<String>, op: CmpOp, value: FieldValue) -> FieldTest {
        FieldTest {
            field: field.into(),
            op,
            value,
        }
    }
}

/// Condition tree evaluated live against the current working memory.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// At least one fact of `kind` satisfies every test. Multiple patterns
    /// of the same kind in one condition are independent required matches.
    Pattern { kind: FactKind, tests: Vec<FieldTest> },
    /// All children match. Short-circuits left to right.
    All(Vec<Condition>),
    /// At least one child matches.
    Any(Vec<Condition>),
    /// Negation-as-failure: matches while the child does not match the
    /// *current* fact set, re-evaluated on every agenda rebuild.
    Not(Box<Condition>),
}

impl Condition {
    pub fn all(children: Vec<Condition>) -> Condition {
        Condition::All(children)
    }

    pub fn any(children: Vec<Condition>) -> Condition {
        Condition::Any(children)
    }

    pub fn not(child: Condition) -> Condition {
        Condition::Not(Box::new(child))
    }

    /// A symptom with the given canonical name is present.
    pub fn symptom(name: &str) -> Condition {
        Condition::Pattern {
            kind: FactKind::Symptom,
            tests: vec![FieldTest::new("symptom", CmpOp::Eq, FieldValue::sym(name))],
        }
    }

    /// A history marker (e.g. "diabetes") is present.
    pub fn history(marker: &str) -> Condition {
        Condition::Pattern {
            kind: FactKind::History,
            tests: vec![FieldTest::new("history", CmpOp::Eq, FieldValue::sym(marker))],
        }
    }

    /// The patient arrived by the given mode.
    pub fn arrival(mode: ArrivalMode) -> Condition {
        Condition::Pattern {
            kind: FactKind::History,
            tests: vec![FieldTest::new(
                "arrival_mode",
                CmpOp::Eq,
                FieldValue::sym(mode.as_str()),
            )],
        }
    }

    /// A demographics fact satisfies `age <op> years`.
    pub fn age(op: CmpOp, years: i64) -> Condition {
        Condition::Pattern {
            kind: FactKind::Demographics,
            tests: vec![FieldTest::new("age", op, FieldValue::Num(years))],
        }
    }

    /// Age in `[min, max_exclusive)`, as a single pattern with two tests.
    pub fn age_band(min: i64, max_exclusive: i64) -> Condition {
        Condition::Pattern {
            kind: FactKind::Demographics,
            tests: vec![
                FieldTest::new("age", CmpOp::Ge, FieldValue::Num(min)),
                FieldTest::new("age", CmpOp::Lt, FieldValue::Num(max_exclusive)),
            ],
        }
    }

    /// The patient's recorded gender equals the given one.
    pub fn gender(gender: Gender) -> Condition {
        Condition::Pattern {
            kind: FactKind::Demographics,
            tests: vec![FieldTest::new(
                "gender",
                CmpOp::Eq,
                FieldValue::sym(gender.as_str()),
            )],
        }
    }

    /// No result fact has been asserted yet. This is the fallback rule's
    /// guard; it becomes permanently false once any rule fires.
    pub fn no_result() -> Condition {
        Condition::not(Condition::Pattern {
            kind: FactKind::Result,
            tests: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_operator_is_equality() {
        assert_eq!(CmpOp::default(), CmpOp::Eq);
        assert!(!CmpOp::Eq.is_ordering());
        assert!(CmpOp::Ge.is_ordering());
    }

    #[test]
    fn field_value_deserializes_untagged() {
        let num: FieldValue = serde_json::from_str("40").unwrap();
        assert_eq!(num, FieldValue::Num(40));
        let sym: FieldValue = serde_json::from_str("\"chest-pain\"").unwrap();
        assert_eq!(sym, FieldValue::sym("chest-pain"));
    }

    #[test]
    fn age_band_is_one_pattern_with_two_tests() {
        match Condition::age_band(40, 60) {
            Condition::Pattern { kind, tests } => {
                assert_eq!(kind, FactKind::Demographics);
                assert_eq!(tests.len(), 2);
                assert_eq!(tests[0].op, CmpOp::Ge);
                assert_eq!(tests[1].op, CmpOp::Lt);
            }
            other => panic!("expected pattern, got {:?}", other),
        }
    }

    #[test]
    fn no_result_is_negated_result_pattern() {
        match Condition::no_result() {
            Condition::Not(inner) => match *inner {
                Condition::Pattern { kind, tests } => {
                    assert_eq!(kind, FactKind::Result);
                    assert!(tests.is_empty());
                }
                other => panic!("expected pattern, got {:?}", other),
            },
            other => panic!("expected negation, got {:?}", other),
        }
    }
}
