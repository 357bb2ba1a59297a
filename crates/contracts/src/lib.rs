//! # Contracts
//!
//! Shared interface contracts between the FlowSight crates: flow records,
//! report shapes, the configuration blueprint, the error enum and the sink
//! trait. Every other crate depends on this one; it depends on none of them.
//!
//! ## Units
//! - Byte and packet counts are `u64` and never negative
//! - Report timestamps are UTC

mod blueprint;
mod error;
mod flow;
mod report;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use flow::{FlowCallback, FlowRecord};
pub use report::*;
pub use sink::*;
