mod client;
pub mod error;
mod multi_provider;

pub use client::*;
pub use error::NetworkError;
pub use multi_provider::MultiProvider;

/// An endpoint able to serve some chain-specific capability.
pub trait NetworkProvider: Send + Sync {
    fn base_url(&self) -> &str;
}
