//! The rule catalog: rule-source parsing, load-time validation, and the
//! built-in age-stratified knowledge base.
//!
//! A catalog is constructed once, validated completely before any session
//! runs, and shared read-only across sessions. Salience bands used by the
//! built-in catalog:
//!
//! - 90-100: life-threatening, RED, score 1, ambulance
//! - 60-89:  urgent, YELLOW, score 2-3, matatu
//! - 10-59:  routine, GREEN, score 4, chemist
//! - 0:      fallback, guarded by `Not(Result)`, GREEN, score 5, none

use std::sync::Arc;

use serde::Deserialize;

use crate::condition::{CmpOp, Condition, FieldTest, FieldValue};
use crate::error::TriageError;
use crate::fact::{ArrivalMode, FactKind, Gender, Transport, TriageLevel};
use crate::rule::{AssertResult, Rule};
use crate::symptoms;

/// Ordered, immutable collection of rules. Declaration order is the
/// equal-salience tie-break, so it is part of the catalog's meaning.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<Rule>) -> RuleCatalog {
        RuleCatalog { rules }
    }

    /// Parse a JSON rule-source document (an array of rule records) and
    /// validate every rule. A bad rule fails the whole load, before any
    /// session can see the catalog.
    pub fn from_json_str(json: &str) -> Result<RuleCatalog, TriageError> {
        let defs: Vec<RuleDef> = serde_json::from_str(json)?;
        let mut rules = Vec::with_capacity(defs.len());
        for (idx, def) in defs.iter().enumerate() {
            rules.push(compile_rule(idx, def)?);
        }
        Ok(RuleCatalog { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, idx: usize) -> Option<&Rule> {
        self.rules.get(idx)
    }

    /// Wrap for read-only sharing across concurrent sessions.
    pub fn shared(self) -> Arc<RuleCatalog> {
        Arc::new(self)
    }

    /// The built-in age-stratified triage knowledge base.
    pub fn builtin() -> RuleCatalog {
        RuleCatalog::new(builtin_rules())
    }
}

// =============================================================================
// Rule source format (JSON)
// =============================================================================

/// One rule record as authored in a rules file. Field-level validation is
/// deliberately manual so errors can name the offending rule.
#[derive(Debug, Clone, Deserialize)]
struct RuleDef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    salience: Option<i32>,
    #[serde(default)]
    conditions: Vec<ConditionDef>,
    #[serde(default)]
    actions: Option<ActionDef>,
}

/// Condition forms: a field test, a bare fact-presence check, or a nested
/// `all` / `any` / `not` combination. The top-level `conditions` array is an
/// implicit conjunction.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ConditionDef {
    All {
        all: Vec<ConditionDef>,
    },
    Any {
        any: Vec<ConditionDef>,
    },
    Not {
        not: Box<ConditionDef>,
    },
    Present {
        fact: String,
    },
    Test {
        field: String,
        #[serde(default)]
        operator: Option<String>,
        value: FieldValue,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct ActionDef {
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    transport: Option<String>,
    #[serde(default)]
    rationale: Option<String>,
}

/// Unnamed rules get a positional name so validation errors stay traceable.
fn rule_name(idx: usize, def: &RuleDef) -> String {
    match &def.name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => format!("R_user_{idx}"),
    }
}

fn malformed(rule: &str, reason: impl Into<String>) -> TriageError {
    TriageError::MalformedRule {
        rule: rule.to_string(),
        reason: reason.into(),
    }
}

fn compile_rule(idx: usize, def: &RuleDef) -> Result<Rule, TriageError> {
    let name = rule_name(idx, def);

    if def.conditions.is_empty() {
        return Err(malformed(&name, "rule has no conditions"));
    }
    let mut children = Vec::with_capacity(def.conditions.len());
    for cond in &def.conditions {
        children.push(compile_condition(&name, cond)?);
    }
    let condition = if children.len() == 1 {
        children.into_iter().next().expect("one child")
    } else {
        Condition::All(children)
    };

    let action = def
        .actions
        .as_ref()
        .ok_or_else(|| malformed(&name, "rule has no actions"))?;
    let action = compile_action(&name, action)?;

    let mut rule = Rule::new(name, def.salience.unwrap_or(10), condition, action);
    rule.description = def.description.clone();
    Ok(rule)
}

fn compile_condition(rule: &str, def: &ConditionDef) -> Result<Condition, TriageError> {
    match def {
        ConditionDef::All { all } => {
            let children = all
                .iter()
                .map(|c| compile_condition(rule, c))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Condition::All(children))
        }
        ConditionDef::Any { any } => {
            let children = any
                .iter()
                .map(|c| compile_condition(rule, c))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Condition::Any(children))
        }
        ConditionDef::Not { not } => Ok(Condition::not(compile_condition(rule, not)?)),
        ConditionDef::Present { fact } => {
            let kind = match fact.trim().to_lowercase().as_str() {
                "demographics" => FactKind::Demographics,
                "history" => FactKind::History,
                "symptom" => FactKind::Symptom,
                "result" => FactKind::Result,
                other => {
                    return Err(malformed(rule, format!("unknown fact kind '{other}'")));
                }
            };
            Ok(Condition::Pattern {
                kind,
                tests: Vec::new(),
            })
        }
        ConditionDef::Test {
            field,
            operator,
            value,
        } => compile_test(rule, field, operator.as_deref(), value),
    }
}

fn compile_test(
    rule: &str,
    field: &str,
    operator: Option<&str>,
    value: &FieldValue,
) -> Result<Condition, TriageError> {
    match field.trim().to_lowercase().as_str() {
        "age" => {
            let op = parse_operator(rule, "age", operator, false)?;
            let FieldValue::Num(_) = value else {
                return Err(malformed(rule, "age test needs an integer value"));
            };
            Ok(Condition::Pattern {
                kind: FactKind::Demographics,
                tests: vec![FieldTest::new("age", op, value.clone())],
            })
        }
        "gender" => {
            let op = parse_operator(rule, "gender", operator, true)?;
            let FieldValue::Sym(raw) = value else {
                return Err(malformed(rule, "gender test needs a string value"));
            };
            let gender = match raw.trim().to_lowercase().as_str() {
                "male" => Gender::Male,
                "female" => Gender::Female,
                "other" => Gender::Other,
                other => {
                    return Err(malformed(rule, format!("unknown gender '{other}'")));
                }
            };
            Ok(Condition::Pattern {
                kind: FactKind::Demographics,
                tests: vec![FieldTest::new("gender", op, FieldValue::sym(gender.as_str()))],
            })
        }
        "history" => {
            let op = parse_operator(rule, "history", operator, true)?;
            let FieldValue::Sym(raw) = value else {
                return Err(malformed(rule, "history test needs a string value"));
            };
            Ok(Condition::Pattern {
                kind: FactKind::History,
                tests: vec![FieldTest::new(
                    "history",
                    op,
                    FieldValue::Sym(symptoms::normalize(raw)),
                )],
            })
        }
        "arrival_mode" | "mode_of_arrival" | "mode-of-arrival" | "arrival" => {
            let op = parse_operator(rule, "arrival_mode", operator, true)?;
            let FieldValue::Sym(raw) = value else {
                return Err(malformed(rule, "arrival mode test needs a string value"));
            };
            let mode = ArrivalMode::parse(raw)
                .ok_or_else(|| malformed(rule, format!("unknown arrival mode '{raw}'")))?;
            Ok(Condition::Pattern {
                kind: FactKind::History,
                tests: vec![FieldTest::new(
                    "arrival_mode",
                    op,
                    FieldValue::sym(mode.as_str()),
                )],
            })
        }
        "symptom" => {
            let op = parse_operator(rule, "symptom", operator, true)?;
            let FieldValue::Sym(raw) = value else {
                return Err(malformed(rule, "symptom test needs a string value"));
            };
            Ok(Condition::Pattern {
                kind: FactKind::Symptom,
                tests: vec![FieldTest::new(
                    "symptom",
                    op,
                    FieldValue::Sym(symptoms::normalize(raw)),
                )],
            })
        }
        other => Err(malformed(rule, format!("unsupported field '{other}'"))),
    }
}

/// Parse an operator string. `contains` and `in` are accepted as equality
/// aliases on symbolic fields, since rule authors write both; ordering
/// operators are rejected on non-numeric fields.
fn parse_operator(
    rule: &str,
    field: &str,
    raw: Option<&str>,
    symbolic: bool,
) -> Result<CmpOp, TriageError> {
    let op = match raw.map(str::trim) {
        None | Some("") | Some("=") | Some("==") => CmpOp::Eq,
        Some("!=") => CmpOp::Ne,
        Some("<") => CmpOp::Lt,
        Some("<=") => CmpOp::Le,
        Some(">") => CmpOp::Gt,
        Some(">=") => CmpOp::Ge,
        Some("contains") | Some("in") if symbolic => CmpOp::Eq,
        Some(other) => {
            return Err(malformed(
                rule,
                format!("unsupported operator '{other}' on field '{field}'"),
            ));
        }
    };
    if symbolic && op.is_ordering() {
        return Err(malformed(
            rule,
            format!("ordering operator '{}' on non-numeric field '{field}'", op.as_str()),
        ));
    }
    Ok(op)
}

fn compile_action(rule: &str, def: &ActionDef) -> Result<AssertResult, TriageError> {
    let level_raw = def
        .level
        .as_deref()
        .ok_or_else(|| malformed(rule, "action is missing a triage level"))?;
    let level = TriageLevel::parse(level_raw)
        .ok_or_else(|| malformed(rule, format!("unknown triage level '{level_raw}'")))?;

    let score = def
        .score
        .ok_or_else(|| malformed(rule, "action is missing a score"))?;
    if !(1..=5).contains(&score) {
        return Err(malformed(rule, format!("score {score} out of range 1-5")));
    }

    let transport_raw = def
        .transport
        .as_deref()
        .ok_or_else(|| malformed(rule, "action is missing a transport"))?;
    let transport = Transport::parse(transport_raw)
        .ok_or_else(|| malformed(rule, format!("unknown transport '{transport_raw}'")))?;

    let rationale = def
        .rationale
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| malformed(rule, "action is missing a rationale"))?;

    Ok(AssertResult {
        level,
        score: score as u8,
        transport,
        rationale: rationale.to_string(),
    })
}

// =============================================================================
// Built-in knowledge base
// =============================================================================

fn rule(
    name: &str,
    salience: i32,
    condition: Condition,
    level: TriageLevel,
    score: u8,
    transport: Transport,
    rationale: &str,
) -> Rule {
    Rule::new(
        name,
        salience,
        condition,
        AssertResult {
            level,
            score,
            transport,
            rationale: rationale.to_string(),
        },
    )
}

fn builtin_rules() -> Vec<Rule> {
    use CmpOp::{Ge, Lt};
    use Transport::{Ambulance, Chemist, Matatu};
    use TriageLevel::{Green, Red, Yellow};

    vec![
        rule(
            "Unconscious_Patient",
            100,
            Condition::symptom("unconscious"),
            Red,
            1,
            Ambulance,
            "Unresponsive patient. Critical emergency - dispatch an ambulance immediately.",
        ),
        rule(
            "Severe_Bleeding",
            100,
            Condition::symptom("severe-bleeding"),
            Red,
            1,
            Ambulance,
            "Severe bleeding. Apply pressure to the wound; immediate ambulance transport required.",
        ),
        rule(
            "Seizure_Active",
            98,
            Condition::symptom("seizure"),
            Red,
            1,
            Ambulance,
            "Active or recent seizure - emergency evaluation required.",
        ),
        rule(
            "Severe_Burn",
            96,
            Condition::symptom("severe-burn"),
            Red,
            1,
            Ambulance,
            "Severe burn - emergency care required, cover the burn and keep the patient warm.",
        ),
        rule(
            "Middle_Age_Chest_Pain",
            95,
            Condition::all(vec![
                Condition::age(Ge, 40),
                Condition::symptom("chest-pain"),
            ]),
            Red,
            1,
            Ambulance,
            "Chest pain at age 40 or above. HIGH CARDIAC RISK - treat as a possible heart attack until ruled out.",
        )
        .with_description("Age-stratified cardiac rule for the 40+ bands"),
        rule(
            "Meningitis_Concern",
            95,
            Condition::all(vec![
                Condition::symptom("fever"),
                Condition::symptom("stiff-neck"),
                Condition::any(vec![
                    Condition::symptom("headache"),
                    Condition::symptom("confusion"),
                ]),
            ]),
            Red,
            1,
            Ambulance,
            "Fever with stiff neck. Suspected meningitis - urgent hospital evaluation required.",
        ),
        rule(
            "Child_Fever_Lethargy",
            92,
            Condition::all(vec![
                Condition::age(Lt, 11),
                Condition::symptom("fever"),
                Condition::symptom("lethargy"),
            ]),
            Red,
            1,
            Ambulance,
            "Fever with lethargy in a young child - sepsis risk, emergency assessment required.",
        ),
        rule(
            "Breathing_Difficulty",
            90,
            Condition::symptom("difficulty-breathing"),
            Red,
            1,
            Ambulance,
            "Severe respiratory distress - oxygen support may be needed immediately.",
        ),
        rule(
            "Ambulance_Arrival",
            80,
            Condition::arrival(ArrivalMode::Ambulance),
            Yellow,
            2,
            Transport::None,
            "Arrived by ambulance - prioritize assessment on arrival.",
        ),
        rule(
            "Pregnancy_Symptoms_Review",
            75,
            Condition::all(vec![
                Condition::gender(Gender::Female),
                Condition::symptom("pregnancy-symptoms"),
            ]),
            Yellow,
            2,
            Matatu,
            "Pregnancy-related symptoms - clinical review today.",
        ),
        rule(
            "Acute_Abdomen",
            70,
            Condition::all(vec![
                Condition::symptom("abdominal-pain"),
                Condition::symptom("vomiting"),
            ]),
            Yellow,
            3,
            Matatu,
            "Acute abdominal condition - hospital evaluation needed within hours.",
        ),
        rule(
            "Diabetic_With_Fever",
            65,
            Condition::all(vec![
                Condition::history("diabetes"),
                Condition::symptom("fever"),
            ]),
            Yellow,
            3,
            Matatu,
            "Diabetic with infection risk - hospital visit recommended.",
        ),
        rule(
            "Elderly_Fall",
            64,
            Condition::all(vec![
                Condition::age(Ge, 65),
                Condition::symptom("falls"),
            ]),
            Yellow,
            2,
            Matatu,
            "Fall at advanced age - fracture risk, clinical assessment needed.",
        ),
        rule(
            "Young_Adult_Chest_Pain",
            62,
            Condition::all(vec![
                Condition::age_band(21, 40),
                Condition::symptom("chest-pain"),
            ]),
            Yellow,
            2,
            Matatu,
            "Chest pain in a young adult. Cardiac cause less likely but needs same-day evaluation.",
        )
        .with_description("Age-stratified cardiac rule for the 21-39 band"),
        rule(
            "Chest_Pain_Any_Age",
            61,
            Condition::symptom("chest-pain"),
            Yellow,
            2,
            Matatu,
            "Chest pain reported - prompt clinical assessment needed.",
        )
        .with_description("Cross-age safety net below the age-specific cardiac rules"),
        rule(
            "Flu_Like_Illness",
            60,
            Condition::all(vec![
                Condition::symptom("fever"),
                Condition::symptom("cough"),
                Condition::symptom("headache"),
            ]),
            Yellow,
            3,
            Matatu,
            "Flu-like symptoms - medical consultation recommended today.",
        ),
        rule(
            "Pediatric_Common_Cold",
            40,
            Condition::all(vec![
                Condition::age(Lt, 11),
                Condition::symptom("runny-nose"),
                Condition::not(Condition::symptom("fever")),
                Condition::not(Condition::symptom("difficulty-breathing")),
            ]),
            Green,
            4,
            Chemist,
            "Common cold indicators in a child. Manage at home with fluids; visit a chemist if congestion persists.",
        ),
        rule(
            "Simple_Fever",
            25,
            Condition::symptom("fever"),
            Green,
            4,
            Chemist,
            "Mild fever - rest and fluids; visit a chemist for antipyretics if needed.",
        ),
        rule(
            "Mild_Headache",
            20,
            Condition::symptom("headache"),
            Green,
            4,
            Chemist,
            "Mild headache - over-the-counter medication from a chemist; return if it persists or worsens.",
        ),
        rule(
            "Default_Triage",
            0,
            Condition::no_result(),
            Green,
            5,
            Transport::None,
            "Symptoms reported. Monitor condition at home and visit a clinic if anything changes for the worse.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher;
    use crate::fact::WorkingMemory;

    #[test]
    fn builtin_catalog_has_single_fallback_at_salience_zero() {
        let catalog = RuleCatalog::builtin();
        let fallbacks: Vec<_> = catalog
            .rules()
            .iter()
            .filter(|r| r.salience == 0)
            .collect();
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].name, "Default_Triage");
        // The fallback guard matches exactly when no result exists.
        assert!(matcher::matches(
            &fallbacks[0].condition,
            &WorkingMemory::new()
        ));
    }

    #[test]
    fn builtin_red_rules_score_one_and_send_ambulance() {
        for rule in RuleCatalog::builtin().rules() {
            if rule.salience >= 90 {
                assert_eq!(rule.action.level, TriageLevel::Red, "{}", rule.name);
                assert_eq!(rule.action.score, 1, "{}", rule.name);
                assert_eq!(rule.action.transport, Transport::Ambulance, "{}", rule.name);
            }
        }
    }

    #[test]
    fn builtin_rule_names_are_unique() {
        let catalog = RuleCatalog::builtin();
        let mut names: Vec<_> = catalog.rules().iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }
}
