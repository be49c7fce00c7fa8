//! Storage-backed managers that load snapshots, run the core and persist results

pub mod core;
pub mod expense;
pub mod plan;

pub use self::core::*;
pub use expense::*;
pub use plan::*;
