use thiserror::Error;

/// Failures that abort a build pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Rejected input: unknown enum names, impossible weights, thresholds out of range.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The engine produced something it never should (mass leak, cycle, unresolved child).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// A read against a published snapshot that has no matching entry.
///
/// Expected while settings are changing; callers treat it as "not available yet".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupMiss {
    #[error("Unknown hand '{0}'")]
    Hand(String),
    #[error("Unknown dealer reference '{0}'")]
    Dealer(String),
    #[error("No decision for hand '{hand}' against '{dealer}'")]
    Decision { hand: String, dealer: String },
}
