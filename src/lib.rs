#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

pub mod chains;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fees;
mod macros;
pub mod manager;
pub mod network;
pub mod primitives;
pub mod signer;
pub mod tracing;
pub mod wallet;
