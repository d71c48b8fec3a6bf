use thiserror::Error;

use crate::error::DomainError;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("NetworkError - Transport: {0}")]
    Transport(String),
    #[error("NetworkError - Timeout: {0}")]
    Timeout(String),
    #[error("NetworkError - UnexpectedStatus: {status} {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("NetworkError - CouldNotDecodeResponseBody: {0}")]
    CouldNotDecodeResponseBody(String),
    #[error("NetworkError - ValueOutOfRange: {0}")]
    ValueOutOfRange(String),
    #[error("NetworkError - Rpc: code {code}, {message}")]
    Rpc { code: i64, message: String },
    #[error("NetworkError - Domain: {0}")]
    Domain(#[from] DomainError),
    #[error("NetworkError - AllProvidersFailed after {attempts} attempt(s): {last}")]
    AllProvidersFailed {
        attempts: usize,
        last: Box<NetworkError>,
    },
}

impl NetworkError {
    /// Only failures of the endpoint itself justify trying the next one.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) | Self::CouldNotDecodeResponseBody(_) => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500 || *status == 429,
            Self::ValueOutOfRange(_)
            | Self::Rpc { .. }
            | Self::Domain(_)
            | Self::AllProvidersFailed { .. } => false,
        }
    }

    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::AllProvidersFailed { last, .. } => last.domain(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::CouldNotDecodeResponseBody(e.to_string())
        } else if let Some(status) = e.status() {
            Self::UnexpectedStatus {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for NetworkError {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => Self::Transport(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(e: serde_json::Error) -> Self {
        Self::CouldNotDecodeResponseBody(e.to_string())
    }
}
