//! Tree rendering of mount state via `termtree`.

use termtree::Tree;

use crate::application::fixture::BuiltRevision;
use crate::domain::{MountableNode, ShadowNodeRef};

pub const MOUNTED_MARK: &str = "●";
pub const UNMOUNTED_MARK: &str = "○";

pub trait TreeNodeConvert {
    fn to_tree_string(&self, revision: &BuiltRevision, show_props: bool) -> Tree<String>;
}

impl TreeNodeConvert for ShadowNodeRef {
    fn to_tree_string(&self, revision: &BuiltRevision, show_props: bool) -> Tree<String> {
        let leaves: Vec<_> = self
            .children()
            .iter()
            .map(|c| c.to_tree_string(revision, show_props))
            .collect();

        Tree::new(node_label(self, revision, show_props)).with_leaves(leaves)
    }
}

/// `● a View#2 {color=red}`; the id is `?` for instances unknown to `revision`.
pub fn node_label(node: &ShadowNodeRef, revision: &BuiltRevision, show_props: bool) -> String {
    let mark = if node.is_mounted() {
        MOUNTED_MARK
    } else {
        UNMOUNTED_MARK
    };
    let id = revision.id_of(node).unwrap_or("?");
    let mut label = format!("{} {} {}", mark, id, node);
    if show_props && !node.props().is_empty() {
        label.push_str(&format!(" {{{}}}", node.props_summary()));
    }
    label
}
