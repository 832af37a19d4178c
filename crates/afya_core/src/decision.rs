//! Decision extraction: one authoritative verdict per session.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fact::{Transport, TriageLevel, WorkingMemory};

/// The final triage verdict returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub level: TriageLevel,
    pub score: u8,
    pub transport: Transport,
    pub rationale: String,
    /// Rule that produced this verdict.
    pub rule: String,
}

/// Outcome of decision extraction.
///
/// `NoVerdict` should be unreachable while the catalog carries a fallback
/// rule, but absence of a verdict must never be mistaken for a safe result,
/// so it stays a distinct outcome rather than a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Verdict(Verdict),
    NoVerdict,
}

impl Decision {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Decision::Verdict(v) => Some(v),
            Decision::NoVerdict => None,
        }
    }

    pub fn is_verdict(&self) -> bool {
        matches!(self, Decision::Verdict(_))
    }
}

/// Pick the authoritative verdict: the first-fired result fact.
///
/// The executor fires strictly in descending-salience order, so the first
/// result in assertion order is also the highest-salience one (earliest
/// declared on ties). Later firings stay in working memory and in the
/// firing log but never supersede it.
pub fn extract(wm: &WorkingMemory) -> Decision {
    match wm.first_result() {
        Some(result) => Decision::Verdict(Verdict {
            level: result.level,
            score: result.score,
            transport: result.transport,
            rationale: result.rationale.clone(),
            rule: result.rule.clone(),
        }),
        None => {
            warn!("no result fact asserted; returning NoVerdict");
            Decision::NoVerdict
        }
    }
}
