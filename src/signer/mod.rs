pub mod error;
mod r#trait;

pub use error::SignerError;
pub use r#trait::*;
