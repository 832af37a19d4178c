//! Forward-chaining triage rule engine.
//!
//! Facts in, ranked verdict out. A session seeds a working memory with
//! patient facts, fires catalog rules in salience order until no rule can
//! fire, and extracts the first-fired result as the verdict.
//!
//! The engine is pure and synchronous: no I/O, no clocks, no shared mutable
//! state. A `RuleCatalog` is immutable after load and shared read-only
//! across concurrent sessions via `Arc`.

pub mod agenda;
pub mod catalog;
pub mod condition;
pub mod decision;
pub mod engine;
pub mod error;
pub mod fact;
pub mod matcher;
pub mod patient;
pub mod rule;
pub mod symptoms;

pub use catalog::RuleCatalog;
pub use decision::{Decision, Verdict};
pub use engine::{Engine, SessionOutcome};
pub use error::TriageError;
pub use fact::{Fact, WorkingMemory};
pub use patient::PatientInput;
