//! Errors surfaced by the discovery engine.

use crate::schema::ConfigError;
use crate::store::StoreError;

/// Failures returned to engine callers.
///
/// Timeouts and candidate faults never appear here; the evaluator scores
/// them as failed test cases.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown candidate: {0}")]
    UnknownCandidate(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StoreError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
