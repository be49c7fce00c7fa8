//! # Group Plans Core
//!
//! Core logic for groups of people who propose, vote on and run social
//! plans, then settle the shared expenses afterwards.
//!
//! ## Features
//!
//! - **Settlement**: net balances per member and a greedy, deterministic
//!   transfer plan that zeroes them
//! - **Split computation**: equal, by-item, by-percentage and one-pays splits
//! - **Plan lifecycle**: `proposed → voting → confirmed → in_progress → closed`
//! - **Voting**: one vote per member per target, at most one veto per member per plan
//! - **Storage abstraction**: managers work against any [`PlanStorage`] backend
//!
//! The [`settlement`] and [`lifecycle`] modules are pure functions over
//! snapshots; the [`planner`] managers load those snapshots from storage and
//! write the results back.
//!
//! ## Quick Start
//!
//! ```rust
//! use group_plans_core::{compute_settlement, ExpenseBuilder, SplitType};
//! use bigdecimal::BigDecimal;
//!
//! let dinner = ExpenseBuilder::new(1, "Dinner".to_string(), BigDecimal::from(90), 1)
//!     .split_type(SplitType::Equal)
//!     .participant(1)
//!     .participant(2)
//!     .participant(3)
//!     .build()
//!     .unwrap();
//!
//! let transfers = compute_settlement(&[dinner]);
//! assert_eq!(transfers.len(), 2);
//! assert!(transfers.iter().all(|t| t.to_user == 1));
//! ```

pub mod config;
pub mod lifecycle;
pub mod planner;
pub mod settlement;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use lifecycle::*;
pub use planner::*;
pub use settlement::*;
pub use traits::*;
pub use types::*;
