//! Tests for agenda construction and conflict resolution.

use afya_core::agenda::build_agenda;
use afya_core::catalog::RuleCatalog;
use afya_core::condition::Condition;
use afya_core::fact::{Fact, ResultFact, Transport, TriageLevel, WorkingMemory};
use afya_core::rule::{AssertResult, Rule};

fn green_action(rationale: &str) -> AssertResult {
    AssertResult {
        level: TriageLevel::Green,
        score: 4,
        transport: Transport::Chemist,
        rationale: rationale.to_string(),
    }
}

fn symptom_rule(name: &str, salience: i32, symptom: &str) -> Rule {
    Rule::new(name, salience, Condition::symptom(symptom), green_action(name))
}

fn no_fired(catalog: &RuleCatalog) -> Vec<bool> {
    vec![false; catalog.len()]
}

#[test]
fn agenda_orders_by_salience_descending() {
    let catalog = RuleCatalog::new(vec![
        symptom_rule("low", 10, "fever"),
        symptom_rule("high", 90, "fever"),
        symptom_rule("mid", 50, "fever"),
    ]);
    let wm = WorkingMemory::seeded(vec![Fact::symptom("fever")]);
    let agenda = build_agenda(&catalog, &wm, &no_fired(&catalog));
    let saliences: Vec<i32> = agenda.iter().map(|a| a.salience).collect();
    assert_eq!(saliences, vec![90, 50, 10]);
}

#[test]
fn equal_salience_keeps_declaration_order() {
    let catalog = RuleCatalog::new(vec![
        symptom_rule("declared_first", 50, "fever"),
        symptom_rule("declared_second", 50, "fever"),
    ]);
    let wm = WorkingMemory::seeded(vec![Fact::symptom("fever")]);
    let agenda = build_agenda(&catalog, &wm, &no_fired(&catalog));
    assert_eq!(agenda[0].rule_idx, 0);
    assert_eq!(agenda[1].rule_idx, 1);
}

#[test]
fn non_matching_rules_are_excluded() {
    let catalog = RuleCatalog::new(vec![
        symptom_rule("matching", 50, "fever"),
        symptom_rule("not_matching", 80, "cough"),
    ]);
    let wm = WorkingMemory::seeded(vec![Fact::symptom("fever")]);
    let agenda = build_agenda(&catalog, &wm, &no_fired(&catalog));
    assert_eq!(agenda.len(), 1);
    assert_eq!(agenda[0].rule_idx, 0);
}

#[test]
fn fired_rules_are_excluded() {
    let catalog = RuleCatalog::new(vec![
        symptom_rule("first", 90, "fever"),
        symptom_rule("second", 50, "fever"),
    ]);
    let wm = WorkingMemory::seeded(vec![Fact::symptom("fever")]);
    let agenda = build_agenda(&catalog, &wm, &[true, false]);
    assert_eq!(agenda.len(), 1);
    assert_eq!(agenda[0].rule_idx, 1);
}

#[test]
fn fallback_drops_out_once_a_result_exists() {
    let fallback = Rule::new(
        "fallback",
        0,
        Condition::no_result(),
        green_action("fallback"),
    );
    let catalog = RuleCatalog::new(vec![symptom_rule("real", 50, "fever"), fallback]);

    let mut wm = WorkingMemory::seeded(vec![Fact::symptom("fever")]);
    let agenda = build_agenda(&catalog, &wm, &no_fired(&catalog));
    assert_eq!(agenda.len(), 2, "both eligible before any firing");

    // No special-casing in the executor: asserting any result is enough.
    wm.assert_fact(Fact::Result(ResultFact {
        level: TriageLevel::Green,
        score: 4,
        transport: Transport::Chemist,
        rationale: "real".to_string(),
        rule: "real".to_string(),
        salience: 50,
    }));
    let agenda = build_agenda(&catalog, &wm, &[true, false]);
    assert!(agenda.is_empty());
}

#[test]
fn empty_memory_activates_only_negation_guarded_rules() {
    let catalog = RuleCatalog::new(vec![
        symptom_rule("needs_fact", 50, "fever"),
        Rule::new("fallback", 0, Condition::no_result(), green_action("fb")),
    ]);
    let agenda = build_agenda(&catalog, &WorkingMemory::new(), &no_fired(&catalog));
    assert_eq!(agenda.len(), 1);
    assert_eq!(agenda[0].rule_idx, 1);
}
