mod accrual;
mod config;
mod db;
#[cfg(any(test, feature = "memory"))]
mod memory;
mod schema;
mod store;

pub use accrual::*;
pub use config::*;
pub use db::*;
#[cfg(any(test, feature = "memory"))]
pub use memory::*;
pub use schema::*;
pub use store::*;
