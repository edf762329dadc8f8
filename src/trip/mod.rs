//! Trip records: commands, expense patterns, storage orchestration and totals

pub mod commands;
pub mod expense;
pub mod ledger;
pub mod summary;

pub use commands::*;
pub use expense::*;
pub use ledger::*;
pub use summary::*;
