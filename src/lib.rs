//! # Trip Settlement
//!
//! Expense splitting and debt settlement for group trips.
//!
//! ## Features
//!
//! - **Currency normalization**: Expenses in three currencies converted with per-expense rate snapshots
//! - **Balances**: Net position per participant with multi-payer support
//! - **Debt minimization**: Greedy matching of debtors and creditors into a short list of transfers
//! - **Trip commands**: Pure reducer over trip snapshots, including fixed-cost upserts
//! - **Summaries**: Trip totals, category breakdown and per-person consumption
//! - **Storage abstraction**: Async trait-based trip store with an in-memory implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use trip_settlement::{compute_debts, Currency, Expense, Participant, Payers};
//! use chrono::Utc;
//!
//! let participants = vec![
//!     Participant::new("p1", "Dana", "+972500000001"),
//!     Participant::new("p2", "Noa", "+972500000002"),
//! ];
//! let dinner = Expense {
//!     id: "e1".to_string(),
//!     description: "Dinner".to_string(),
//!     amount: 100.0,
//!     currency: Currency::Reference,
//!     paid_by: Payers::single("p1"),
//!     split_between: vec!["p1".to_string(), "p2".to_string()],
//!     date: Utc::now(),
//!     category: None,
//!     excluded_from_settlement: false,
//!     rates: None,
//! };
//!
//! let debts = compute_debts(&[dinner], &participants, None).unwrap();
//! assert_eq!(debts[0].from, "p2");
//! assert_eq!(debts[0].amount, 50.0);
//! ```

pub mod config;
pub mod currency;
pub mod settlement;
pub mod traits;
pub mod trip;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use currency::*;
pub use settlement::balances::*;
pub use settlement::core::*;
pub use settlement::debts::*;
pub use traits::*;
pub use trip::*;
pub use types::*;
