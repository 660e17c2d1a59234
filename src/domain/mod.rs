//! Domain layer: tree nodes and mount-flag propagation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod commit;
pub mod error;
pub mod family;
pub mod mountable;
pub mod node;
pub mod propagate;
pub mod revision;
pub mod runtime_reference;

pub use commit::CommitSource;
pub use error::DomainError;
pub use family::{ShadowNodeFamily, Tag};
pub use mountable::MountableNode;
pub use node::{Props, ShadowNode, ShadowNodeFragment, ShadowNodeRef};
pub use propagate::{propagate, PropagationOptions};
pub use revision::{RevisionNumber, ShadowTree, ShadowTreeRevision};
pub use runtime_reference::RuntimeReference;
