//! Agenda construction: which rules may fire next, in what order.

use crate::catalog::RuleCatalog;
use crate::fact::WorkingMemory;
use crate::matcher;

/// An agenda entry: a catalog index plus the salience that ordered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub rule_idx: usize,
    pub salience: i32,
}

/// Build the agenda for the current fact set.
///
/// Includes every not-yet-fired rule whose condition matches right now,
/// ordered by salience descending. The sort is stable, so equal salience
/// keeps catalog declaration order - the tie-break that makes identical
/// inputs yield identical verdicts. Fired rules are excluded (refraction):
/// facts are never retracted, so a fired rule's condition stays true and
/// would otherwise re-fire forever.
pub fn build_agenda(
    catalog: &RuleCatalog,
    wm: &WorkingMemory,
    fired: &[bool],
) -> Vec<Activation> {
    let mut agenda: Vec<Activation> = catalog
        .rules()
        .iter()
        .enumerate()
        .filter(|(idx, _)| !fired.get(*idx).copied().unwrap_or(false))
        .filter(|(_, rule)| matcher::matches(&rule.condition, wm))
        .map(|(idx, rule)| Activation {
            rule_idx: idx,
            salience: rule.salience,
        })
        .collect();
    agenda.sort_by(|a, b| b.salience.cmp(&a.salience));
    agenda
}
