//! Error types for the triage engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    /// A rule failed load-time validation. Raised while building a catalog,
    /// never during a session, so a bad rule cannot corrupt an in-flight
    /// decision.
    #[error("malformed rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },

    /// The executor exceeded its iteration cap. Surfaced as a fault rather
    /// than silently truncating, so the caller can apply maximum caution.
    #[error("non-terminating rule chain: exceeded {limit} firings")]
    NonTerminatingChain { limit: usize },

    /// A rule source or patient document was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
