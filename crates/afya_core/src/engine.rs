//! Forward-chaining executor.
//!
//! The control loop is a two-state machine: Running while some rule can
//! fire, Stable once the agenda comes back empty. Each cycle rebuilds the
//! agenda against the current facts and fires only the single top entry -
//! firing one rule can invalidate a later entry's negated condition, so a
//! lower-salience `Not(Result)` rule must see the just-asserted fact before
//! it gets its turn.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::agenda;
use crate::catalog::RuleCatalog;
use crate::decision::{self, Decision};
use crate::error::TriageError;
use crate::fact::{Fact, WorkingMemory};

/// One rule firing, in firing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Firing {
    pub rule: String,
    pub salience: i32,
}

/// A completed session: the decision plus how the engine reached it.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub decision: Decision,
    /// Every firing, in order. The first entry produced the verdict.
    pub fired: Vec<Firing>,
    /// Cycles executed before stabilization.
    pub cycles: usize,
    /// Facts in working memory at stabilization (initial + derived).
    pub fact_count: usize,
}

/// The engine: an immutable catalog plus an iteration cap. Cheap to clone
/// and safe to share; each `run` owns its session state entirely.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Arc<RuleCatalog>,
    iteration_cap: usize,
}

impl Engine {
    /// Engine with the default cap of catalog size + 1. Refraction bounds a
    /// session at one firing per rule, so a correct run can never hit it.
    pub fn new(catalog: Arc<RuleCatalog>) -> Engine {
        let iteration_cap = catalog.len() + 1;
        Engine {
            catalog,
            iteration_cap,
        }
    }

    /// Engine with an explicit iteration cap, for diagnostics and for
    /// exercising the fault path.
    pub fn with_iteration_cap(catalog: Arc<RuleCatalog>, iteration_cap: usize) -> Engine {
        Engine {
            catalog,
            iteration_cap,
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Run one reasoning session over the given initial facts.
    ///
    /// Pure and synchronous: the only side effect is appending derived
    /// facts to the session's own working memory, which is discarded when
    /// the outcome is returned.
    pub fn run(&self, initial: Vec<Fact>) -> Result<SessionOutcome, TriageError> {
        let mut wm = WorkingMemory::seeded(initial);
        let mut fired = vec![false; self.catalog.len()];
        let mut firings: Vec<Firing> = Vec::new();
        let mut cycles = 0usize;

        // Running until the agenda is empty, then Stable.
        loop {
            let agenda = agenda::build_agenda(&self.catalog, &wm, &fired);
            let Some(top) = agenda.first() else {
                break;
            };

            cycles += 1;
            if cycles > self.iteration_cap {
                return Err(TriageError::NonTerminatingChain {
                    limit: self.iteration_cap,
                });
            }

            let rule = self
                .catalog
                .get(top.rule_idx)
                .expect("agenda index within catalog");
            debug!(rule = %rule.name, salience = rule.salience, "firing");
            wm.assert_fact(Fact::Result(rule.action.to_fact(rule)));
            fired[top.rule_idx] = true;
            firings.push(Firing {
                rule: rule.name.clone(),
                salience: rule.salience,
            });
        }

        let decision = decision::extract(&wm);
        info!(
            fired = firings.len(),
            cycles,
            facts = wm.len(),
            verdict = decision.is_verdict(),
            "session stable"
        );
        Ok(SessionOutcome {
            decision,
            fired: firings,
            cycles,
            fact_count: wm.len(),
        })
    }
}
