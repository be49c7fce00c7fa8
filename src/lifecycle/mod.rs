//! Plan lifecycle: status progression and voting

pub mod status;
pub mod voting;

pub use status::*;
pub use voting::*;
