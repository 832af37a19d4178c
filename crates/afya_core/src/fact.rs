//! Typed facts and the per-session working memory.
//!
//! Facts are immutable assertions: working memory only grows during a
//! session and is discarded afterwards. Nothing is ever retracted or
//! mutated in place.

use serde::{Deserialize, Serialize};

use crate::condition::FieldValue;

/// Patient gender as carried on the demographics fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Lenient parse for loose input documents; free-text values that are
    /// not recognizably male or female map to `Other`.
    pub fn parse(raw: &str) -> Gender {
        match raw.trim().to_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Other,
        }
    }
}

/// How the patient arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrivalMode {
    Ambulance,
    WalkIn,
}

impl ArrivalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrivalMode::Ambulance => "ambulance",
            ArrivalMode::WalkIn => "walk-in",
        }
    }

    /// Parse a loose arrival-mode string; `None` for unrecognized values.
    pub fn parse(raw: &str) -> Option<ArrivalMode> {
        match raw.trim().to_lowercase().as_str() {
            "ambulance" => Some(ArrivalMode::Ambulance),
            "walk-in" | "walkin" | "walk in" => Some(ArrivalMode::WalkIn),
            _ => None,
        }
    }
}

/// Triage severity level. The wire format uses the upper-case names
/// clinical staff see on the ward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriageLevel {
    Red,
    Yellow,
    Green,
}

impl TriageLevel {
    /// Priority for display ordering (1 = most urgent).
    pub fn priority(&self) -> u8 {
        match self {
            TriageLevel::Red => 1,
            TriageLevel::Yellow => 2,
            TriageLevel::Green => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TriageLevel::Red => "RED",
            TriageLevel::Yellow => "YELLOW",
            TriageLevel::Green => "GREEN",
        }
    }

    /// Case-insensitive parse; `None` for unknown levels.
    pub fn parse(raw: &str) -> Option<TriageLevel> {
        match raw.trim().to_uppercase().as_str() {
            "RED" => Some(TriageLevel::Red),
            "YELLOW" => Some(TriageLevel::Yellow),
            "GREEN" => Some(TriageLevel::Green),
            _ => None,
        }
    }
}

impl std::fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recommended transport for the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Ambulance,
    Matatu,
    Chemist,
    None,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Ambulance => "ambulance",
            Transport::Matatu => "matatu",
            Transport::Chemist => "chemist",
            Transport::None => "none",
        }
    }

    /// Case-insensitive parse; `None` for unknown transports.
    pub fn parse(raw: &str) -> Option<Transport> {
        match raw.trim().to_lowercase().as_str() {
            "ambulance" => Some(Transport::Ambulance),
            "matatu" => Some(Transport::Matatu),
            "chemist" => Some(Transport::Chemist),
            "none" => Some(Transport::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind tag shared by facts and fact patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    Demographics,
    History,
    Symptom,
    Result,
}

/// A derived triage result, asserted into working memory by a rule firing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFact {
    pub level: TriageLevel,
    /// Urgency score, 1 (most urgent) to 5.
    pub score: u8,
    pub transport: Transport,
    pub rationale: String,
    /// Name of the rule that asserted this result.
    pub rule: String,
    /// Salience of the producing rule.
    pub salience: i32,
}

/// An atomic, typed assertion in working memory.
///
/// `Demographics` and `History` carry optional fields because the intake
/// document may supply any subset; a field test on an absent field simply
/// fails to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    Demographics {
        age: Option<u32>,
        gender: Option<Gender>,
    },
    History {
        marker: Option<String>,
        arrival_mode: Option<ArrivalMode>,
    },
    Symptom {
        name: String,
    },
    Result(ResultFact),
}

impl Fact {
    pub fn symptom(name: impl Into<String>) -> Fact {
        Fact::Symptom { name: name.into() }
    }

    pub fn kind(&self) -> FactKind {
        match self {
            Fact::Demographics { .. } => FactKind::Demographics,
            Fact::History { .. } => FactKind::History,
            Fact::Symptom { .. } => FactKind::Symptom,
            Fact::Result(_) => FactKind::Result,
        }
    }

    /// Look up a named field for pattern matching.
    ///
    /// Returns `None` when the field is absent on this fact or unknown for
    /// its kind; the matcher treats both as a failed test, not an error.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match self {
            Fact::Demographics { age, gender } => match name {
                "age" => age.map(|a| FieldValue::Num(i64::from(a))),
                "gender" => gender.map(|g| FieldValue::Sym(g.as_str().to_string())),
                _ => None,
            },
            Fact::History {
                marker,
                arrival_mode,
            } => match name {
                "history" => marker.clone().map(FieldValue::Sym),
                "arrival_mode" => arrival_mode.map(|m| FieldValue::Sym(m.as_str().to_string())),
                _ => None,
            },
            Fact::Symptom { name: symptom } => match name {
                "symptom" => Some(FieldValue::Sym(symptom.clone())),
                _ => None,
            },
            Fact::Result(result) => match name {
                "level" => Some(FieldValue::Sym(result.level.as_str().to_string())),
                "score" => Some(FieldValue::Num(i64::from(result.score))),
                "transport" => Some(FieldValue::Sym(result.transport.as_str().to_string())),
                _ => None,
            },
        }
    }
}

/// Append-only fact set for one reasoning session.
///
/// Assertion order is preserved; the decision extractor relies on it to
/// identify the first-fired result. `Symptom` facts have set semantics:
/// duplicates by name collapse on assertion.
#[derive(Debug, Clone, Default)]
pub struct WorkingMemory {
    facts: Vec<Fact>,
}

impl WorkingMemory {
    pub fn new() -> WorkingMemory {
        WorkingMemory::default()
    }

    /// Seed a session's working memory with the caller's initial facts.
    pub fn seeded(initial: Vec<Fact>) -> WorkingMemory {
        let mut wm = WorkingMemory::new();
        for fact in initial {
            wm.assert_fact(fact);
        }
        wm
    }

    /// Assert a fact. Duplicate `Symptom` facts collapse; everything else
    /// appends. Facts are never removed.
    pub fn assert_fact(&mut self, fact: Fact) {
        if let Fact::Symptom { name } = &fact {
            let duplicate = self
                .facts
                .iter()
                .any(|f| matches!(f, Fact::Symptom { name: n } if n == name));
            if duplicate {
                return;
            }
        }
        self.facts.push(fact);
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// All facts, in assertion order.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Facts of one kind, in assertion order.
    pub fn of_kind(&self, kind: FactKind) -> impl Iterator<Item = &Fact> {
        self.facts.iter().filter(move |f| f.kind() == kind)
    }

    /// Derived results in firing order.
    pub fn results(&self) -> impl Iterator<Item = &ResultFact> {
        self.facts.iter().filter_map(|f| match f {
            Fact::Result(r) => Some(r),
            _ => None,
        })
    }

    /// The first-fired result, if any rule has fired.
    pub fn first_result(&self) -> Option<&ResultFact> {
        self.results().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_on_demographics() {
        let fact = Fact::Demographics {
            age: Some(55),
            gender: Some(Gender::Female),
        };
        assert_eq!(fact.field("age"), Some(FieldValue::Num(55)));
        assert_eq!(
            fact.field("gender"),
            Some(FieldValue::Sym("female".to_string()))
        );
        assert_eq!(fact.field("symptom"), None);
    }

    #[test]
    fn absent_field_is_none() {
        let fact = Fact::Demographics {
            age: None,
            gender: Some(Gender::Male),
        };
        assert_eq!(fact.field("age"), None);
    }

    #[test]
    fn symptom_facts_deduplicate() {
        let mut wm = WorkingMemory::new();
        wm.assert_fact(Fact::symptom("fever"));
        wm.assert_fact(Fact::symptom("fever"));
        wm.assert_fact(Fact::symptom("cough"));
        assert_eq!(wm.len(), 2);
    }

    #[test]
    fn assertion_order_is_preserved() {
        let mut wm = WorkingMemory::new();
        wm.assert_fact(Fact::symptom("fever"));
        wm.assert_fact(Fact::Demographics {
            age: Some(30),
            gender: None,
        });
        assert_eq!(wm.facts()[0], Fact::symptom("fever"));
        assert_eq!(wm.of_kind(FactKind::Symptom).count(), 1);
    }

    #[test]
    fn level_and_transport_parse() {
        assert_eq!(TriageLevel::parse("red"), Some(TriageLevel::Red));
        assert_eq!(TriageLevel::parse("YELLOW"), Some(TriageLevel::Yellow));
        assert_eq!(TriageLevel::parse("blue"), None);
        assert_eq!(Transport::parse("Matatu"), Some(Transport::Matatu));
        assert_eq!(Transport::parse("helicopter"), None);
    }

    #[test]
    fn arrival_mode_parse() {
        assert_eq!(ArrivalMode::parse("walk in"), Some(ArrivalMode::WalkIn));
        assert_eq!(ArrivalMode::parse("AMBULANCE"), Some(ArrivalMode::Ambulance));
        assert_eq!(ArrivalMode::parse("boda"), None);
    }
}
