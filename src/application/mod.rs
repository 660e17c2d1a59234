//! Application layer: fixtures, rendering and services
//!
//! This layer builds trees for the domain layer and orchestrates replays.

pub mod error;
pub mod error_ext;
pub mod fixture;
pub mod render;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use fixture::{BuiltRevision, Fixture, NodeSpec, RevisionBuilder, RevisionSpec};
