//! Shadow tree: the current revision and the root-pair commit entry.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::commit::CommitSource;
use crate::domain::mountable::MountableNode;
use crate::domain::node::ShadowNodeRef;
use crate::domain::propagate::{propagate, PropagationOptions};

/// Monotonic revision counter of a shadow tree.
pub type RevisionNumber = u64;

/// Immutable snapshot of a tree at one commit.
#[derive(Debug, Clone)]
pub struct ShadowTreeRevision {
    pub number: RevisionNumber,
    pub root: ShadowNodeRef,
    pub source: CommitSource,
}

/// Holds the current revision and keeps mounted flags in sync on commit.
///
/// `commit` takes `&mut self`, which serializes propagation for one tree.
#[derive(Debug)]
pub struct ShadowTree {
    current: ShadowTreeRevision,
}

impl ShadowTree {
    /// Starts a tree at revision 0 and mounts the whole initial subtree.
    #[instrument(level = "debug", skip_all, fields(root = %root))]
    pub fn new(root: ShadowNodeRef, options: PropagationOptions) -> Self {
        propagate(&[], std::slice::from_ref(&root), CommitSource::Unknown, options);
        Self {
            current: ShadowTreeRevision {
                number: 0,
                root,
                source: CommitSource::Unknown,
            },
        }
    }

    pub fn current(&self) -> &ShadowTreeRevision {
        &self.current
    }

    /// Makes `new_root` the current revision and propagates mounted flags.
    ///
    /// Committing the current root instance again is a no-op.
    #[instrument(level = "debug", skip_all, fields(revision = self.current.number + 1, %source))]
    pub fn commit(
        &mut self,
        new_root: ShadowNodeRef,
        source: CommitSource,
        options: PropagationOptions,
    ) -> &ShadowTreeRevision {
        if Arc::ptr_eq(&self.current.root, &new_root) {
            debug!("root unchanged, nothing to commit");
            return &self.current;
        }

        let old_root = Arc::clone(&self.current.root);
        // root pair goes through the same paired/tail logic as any children list
        propagate(
            std::slice::from_ref(&old_root),
            std::slice::from_ref(&new_root),
            source,
            options,
        );
        if !old_root.same_family(&new_root) {
            debug!(old = %old_root, new = %new_root, "root family replaced");
        }

        self.current = ShadowTreeRevision {
            number: self.current.number + 1,
            root: new_root,
            source,
        };
        debug!(revision = self.current.number, "committed");
        &self.current
    }
}
