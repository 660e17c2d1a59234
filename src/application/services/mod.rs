//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod replay;

pub use replay::{NodeState, ReferenceState, ReplayReport, ReplayService, RevisionReport};
