//! Settlement: balance aggregation and debt minimization

pub mod balances;
pub mod core;
pub mod debts;

pub use balances::*;
pub use self::core::*;
pub use debts::*;
