//! Expense splitting and settlement

pub mod engine;
pub mod splits;

pub use engine::*;
pub use splits::*;
