//! Condition evaluation against the current working memory.
//!
//! Matching is pure: no bindings escape a single rule evaluation and the
//! fact set is never modified here. `Not` is evaluated live against the
//! facts as they stand at each call, which is what makes the fallback
//! rule's `Not(Result)` guard drop out the instant any rule fires.

use crate::condition::{CmpOp, Condition, FieldTest, FieldValue};
use crate::fact::{Fact, FactKind, WorkingMemory};

/// Evaluate a condition against the current fact set.
///
/// An empty fact set fails every pattern and satisfies every negation.
pub fn matches(condition: &Condition, wm: &WorkingMemory) -> bool {
    match condition {
        Condition::Pattern { kind, tests } => count_matching(wm, *kind, tests) > 0,
        Condition::All(children) => children.iter().all(|c| matches(c, wm)),
        Condition::Any(children) => children.iter().any(|c| matches(c, wm)),
        Condition::Not(child) => !matches(child, wm),
    }
}

/// Number of facts of `kind` satisfying every field test.
pub fn count_matching(wm: &WorkingMemory, kind: FactKind, tests: &[FieldTest]) -> usize {
    wm.of_kind(kind)
        .filter(|fact| tests.iter().all(|test| field_test_holds(fact, test)))
        .count()
}

/// A test on an absent field fails; it is not an error. Comparisons across
/// mismatched types (numeric literal against a symbolic field) also fail.
fn field_test_holds(fact: &Fact, test: &FieldTest) -> bool {
    let Some(actual) = fact.field(&test.field) else {
        return false;
    };
    match (&actual, &test.value) {
        (FieldValue::Num(have), FieldValue::Num(want)) => compare(test.op, *have, *want),
        (FieldValue::Sym(have), FieldValue::Sym(want)) => match test.op {
            // Tests on non-numeric fields are equality checks.
            CmpOp::Ne => have != want,
            _ => have == want,
        },
        _ => false,
    }
}

fn compare(op: CmpOp, have: i64, want: i64) -> bool {
    match op {
        CmpOp::Eq => have == want,
        CmpOp::Ne => have != want,
        CmpOp::Lt => have < want,
        CmpOp::Le => have <= want,
        CmpOp::Gt => have > want,
        CmpOp::Ge => have >= want,
    }
}
