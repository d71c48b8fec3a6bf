use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("SignerError - UserCancelled")]
    UserCancelled,
    #[error("SignerError - CouldNotConnect: {0}")]
    CouldNotConnect(String),
    #[error("SignerError - RemoteCallFailure: {0}")]
    RemoteCallFailure(String),
    #[error("SignerError - UnexpectedSignatureCount: requested {expected}, received {actual}")]
    UnexpectedSignatureCount { expected: usize, actual: usize },
}
