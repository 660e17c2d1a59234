//! Mount-flag propagation across successive revisions of an immutable UI node tree.
//!
//! - [`domain`]: nodes, families, and the propagation itself. No I/O.
//! - [`application`]: replay fixtures, tree rendering, services.
//! - [`config`]: layered settings, including the feature flags injected
//!   into propagation.
//! - [`cli`]: argument parsing and command dispatch for the `treemount` binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{
    propagate, CommitSource, MountableNode, PropagationOptions, ShadowNode, ShadowNodeFamily,
    ShadowNodeRef, ShadowTree,
};
