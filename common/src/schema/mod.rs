mod transaction;
mod wallet;

pub use transaction::*;
pub use wallet::*;
