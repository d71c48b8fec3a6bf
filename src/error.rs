use thiserror::Error;

/// Failures reported by a chain about the request itself. Never retried on another endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("DomainError - AccountNotFound: {0}")]
    AccountNotFound(String),
    #[error("DomainError - InsufficientFunds")]
    InsufficientFunds,
    #[error("DomainError - SignatureCountMismatch: expected {expected}, chain reports {actual}")]
    SignatureCountMismatch { expected: u64, actual: u64 },
    #[error("DomainError - Rejected: {0}")]
    Rejected(String),
    #[error("DomainError - Unsupported: {0}")]
    Unsupported(String),
}
