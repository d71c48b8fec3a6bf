mod entity;
pub mod error;
mod fee;
mod transaction;

pub use entity::*;
pub use error::TransactionError;
pub use fee::*;
pub use transaction::*;
