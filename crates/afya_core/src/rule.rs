//! Rule records: salience, condition, and the result each firing asserts.

use crate::condition::Condition;
use crate::fact::{ResultFact, Transport, TriageLevel};

/// The action side of a rule: assert exactly one `Result` fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertResult {
    pub level: TriageLevel,
    /// Urgency score, 1 (most urgent) to 5.
    pub score: u8,
    pub transport: Transport,
    pub rationale: String,
}

impl AssertResult {
    /// Materialize the result fact this action asserts, stamped with the
    /// producing rule's identity for the firing log and the extractor.
    pub fn to_fact(&self, rule: &Rule) -> ResultFact {
        ResultFact {
            level: self.level,
            score: self.score,
            transport: self.transport,
            rationale: self.rationale.clone(),
            rule: rule.name.clone(),
            salience: rule.salience,
        }
    }
}

/// An immutable production rule. The catalog is read-only during a session;
/// rules are never shared between catalogs or mutated after load.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub description: Option<String>,
    /// Priority for conflict resolution. Higher fires first; 0 is reserved
    /// for the fallback.
    pub salience: i32,
    pub condition: Condition,
    pub action: AssertResult,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        salience: i32,
        condition: Condition,
        action: AssertResult,
    ) -> Rule {
        Rule {
            name: name.into(),
            description: None,
            salience,
            condition,
            action,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Rule {
        self.description = Some(description.into());
        self
    }
}
