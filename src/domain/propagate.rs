//! Mount-flag propagation between two revisions of a children list.
//!
//! This is a positional diff, not a keyed one: nodes are paired by index
//! until the first pair from different families. Everything past that point
//! is treated as removed (old side) and inserted (new side). All mounts are
//! written before the unmounts they could replace, so a node moved within
//! the same update is never observed as unmounted.

use std::ptr;
use std::sync::Arc;

use tracing::trace;

use crate::domain::commit::CommitSource;
use crate::domain::mountable::MountableNode;

/// Injected configuration for [`propagate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Rebind runtime references to the new instance on primary-pipeline commits.
    pub update_runtime_references_on_commit: bool,
}

/// Updates the mounted flag of every node affected by replacing
/// `old_children` with `new_children` under the same parent.
///
/// Both lists must be free of duplicate instances. Violating that leaves
/// flags in an unspecified state but never panics.
pub fn propagate<N: MountableNode>(
    old_children: &[Arc<N>],
    new_children: &[Arc<N>],
    commit_source: CommitSource,
    options: PropagationOptions,
) {
    if ptr::eq(old_children, new_children) {
        // same shared list: nothing below changed
        return;
    }

    if old_children.is_empty() && new_children.is_empty() {
        return;
    }

    let refresh_references =
        commit_source.is_primary() && options.update_runtime_references_on_commit;

    // Stage 1: paired region, same family at the same position
    let mut index = 0;
    while index < old_children.len() && index < new_children.len() {
        let old_child = &old_children[index];
        let new_child = &new_children[index];

        if Arc::ptr_eq(old_child, new_child) {
            index += 1;
            continue;
        }

        if !old_child.same_family(new_child) {
            trace!(index, "family mismatch, pairing stops");
            break;
        }

        new_child.set_mounted(true);
        old_child.set_mounted(false);

        if refresh_references {
            new_child.update_runtime_reference(new_child);
        }

        propagate(
            old_child.children(),
            new_child.children(),
            commit_source,
            options,
        );
        index += 1;
    }

    let paired = index;

    // Stage 2: mount the new-only tail
    if paired < new_children.len() {
        trace!(from = paired, count = new_children.len() - paired, "mounting new tail");
    }
    for new_child in &new_children[paired..] {
        new_child.set_mounted(true);
        propagate::<N>(&[], new_child.children(), commit_source, options);
    }

    // Stage 3: unmount the old-only tail
    if paired < old_children.len() {
        trace!(from = paired, count = old_children.len() - paired, "unmounting old tail");
    }
    for old_child in &old_children[paired..] {
        old_child.set_mounted(false);
        propagate::<N>(old_child.children(), &[], commit_source, options);
    }
}
