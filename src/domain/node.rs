//! Immutable UI tree node with an out-of-band mounted flag.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use itertools::Itertools;
use tracing::{instrument, trace};

use crate::domain::family::{ShadowNodeFamily, Tag};
use crate::domain::mountable::MountableNode;
use crate::domain::runtime_reference::RuntimeReference;

/// Content of a node. Opaque to mount propagation.
pub type Props = BTreeMap<String, String>;

/// Shared reference to a node; revisions share unchanged subtrees.
pub type ShadowNodeRef = Arc<ShadowNode>;

/// Replacement parts for [`ShadowNode::clone_with`]. `None` keeps the source's part.
#[derive(Debug, Default)]
pub struct ShadowNodeFragment {
    pub props: Option<Props>,
    pub children: Option<Vec<ShadowNodeRef>>,
}

/// One point of the UI tree as of a given revision.
///
/// Everything except the mounted flags and the runtime reference link is
/// fixed at construction.
#[derive(Debug)]
pub struct ShadowNode {
    family: Arc<ShadowNodeFamily>,
    props: Arc<Props>,
    children: Arc<[ShadowNodeRef]>,
    mounted: AtomicBool,
    has_been_mounted: AtomicBool,
    runtime_reference: RwLock<Weak<RuntimeReference>>,
}

impl ShadowNode {
    pub fn new(
        family: Arc<ShadowNodeFamily>,
        props: Props,
        children: Vec<ShadowNodeRef>,
    ) -> ShadowNodeRef {
        Arc::new(Self {
            family,
            props: Arc::new(props),
            children: children.into(),
            mounted: AtomicBool::new(false),
            has_been_mounted: AtomicBool::new(false),
            runtime_reference: RwLock::new(Weak::new()),
        })
    }

    /// New instance of the same family.
    ///
    /// Parts not replaced by `fragment` are shared with `self`, including the
    /// children list itself. The runtime reference link is inherited; the
    /// mounted flags start cleared.
    #[instrument(level = "trace", skip_all, fields(node = %self))]
    pub fn clone_with(&self, fragment: ShadowNodeFragment) -> ShadowNodeRef {
        let props = match fragment.props {
            Some(props) => Arc::new(props),
            None => Arc::clone(&self.props),
        };
        let children = match fragment.children {
            Some(children) => children.into(),
            None => Arc::clone(&self.children),
        };
        let link = self
            .runtime_reference
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Arc::new(Self {
            family: Arc::clone(&self.family),
            props,
            children,
            mounted: AtomicBool::new(false),
            has_been_mounted: AtomicBool::new(false),
            runtime_reference: RwLock::new(link),
        })
    }

    pub fn tag(&self) -> Tag {
        self.family.tag()
    }

    pub fn family(&self) -> &Arc<ShadowNodeFamily> {
        &self.family
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Sticky: stays true once the node was mounted at least once.
    pub fn has_been_mounted(&self) -> bool {
        self.has_been_mounted.load(Ordering::SeqCst)
    }

    pub fn runtime_reference(&self) -> Option<Arc<RuntimeReference>> {
        self.runtime_reference
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    pub(crate) fn link_runtime_reference(&self, reference: &Arc<RuntimeReference>) {
        *self
            .runtime_reference
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(reference);
    }

    /// Pre-order traversal of this node and all its descendants.
    pub fn descendants(self: &Arc<Self>) -> Descendants {
        Descendants {
            stack: vec![Arc::clone(self)],
        }
    }

    /// Props rendered as `k=v` pairs, for display.
    pub fn props_summary(&self) -> String {
        self.props
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .join(", ")
    }
}

impl MountableNode for ShadowNode {
    fn same_family(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.family, &other.family)
    }

    fn children(&self) -> &[ShadowNodeRef] {
        &self.children
    }

    fn set_mounted(&self, mounted: bool) {
        let previous = self.mounted.swap(mounted, Ordering::SeqCst);
        if mounted {
            self.has_been_mounted.store(true, Ordering::SeqCst);
        }
        if previous != mounted {
            trace!(node = %self, mounted, "mounted flag changed");
            self.family.record_transition(mounted);
        }
    }

    fn update_runtime_reference(&self, current: &ShadowNodeRef) {
        if let Some(reference) = self.runtime_reference() {
            reference.retarget(current);
        }
    }
}

impl fmt::Display for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)
    }
}

pub struct Descendants {
    stack: Vec<ShadowNodeRef>,
}

impl Iterator for Descendants {
    type Item = ShadowNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // reverse push keeps left-to-right order
        for child in current.children.iter().rev() {
            self.stack.push(Arc::clone(child));
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: Tag) -> ShadowNodeRef {
        ShadowNode::new(ShadowNodeFamily::new(tag, "View"), Props::new(), vec![])
    }

    #[test]
    fn test_set_mounted_moves_family_counter_only_on_change() {
        let node = leaf(1);
        node.set_mounted(true);
        node.set_mounted(true);
        assert!(node.is_mounted());
        assert_eq!(node.family().mounted_representatives(), 1);

        node.set_mounted(false);
        node.set_mounted(false);
        assert!(!node.is_mounted());
        assert_eq!(node.family().mounted_representatives(), 0);
    }

    #[test]
    fn test_has_been_mounted_is_sticky() {
        let node = leaf(1);
        assert!(!node.has_been_mounted());
        node.set_mounted(true);
        node.set_mounted(false);
        assert!(node.has_been_mounted());
    }

    #[test]
    fn test_clone_with_shares_untouched_children() {
        let parent = ShadowNode::new(
            ShadowNodeFamily::new(1, "View"),
            Props::new(),
            vec![leaf(2), leaf(3)],
        );
        let mut props = Props::new();
        props.insert("color".into(), "red".into());

        let clone = parent.clone_with(ShadowNodeFragment {
            props: Some(props),
            children: None,
        });

        assert!(!Arc::ptr_eq(&parent, &clone));
        assert!(parent.same_family(&clone));
        assert!(std::ptr::eq(parent.children(), clone.children()));
        assert_eq!(clone.props_summary(), "color=red");
        assert!(!clone.is_mounted());
    }

    #[test]
    fn test_descendants_is_preorder() {
        let grandchild = leaf(3);
        let child = ShadowNode::new(
            ShadowNodeFamily::new(2, "View"),
            Props::new(),
            vec![Arc::clone(&grandchild)],
        );
        let root = ShadowNode::new(
            ShadowNodeFamily::new(1, "Root"),
            Props::new(),
            vec![child, leaf(4)],
        );

        let tags: Vec<Tag> = root.descendants().map(|n| n.tag()).collect();
        assert_eq!(tags, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_runtime_reference_link_is_inherited_by_clones() {
        let node = leaf(5);
        let reference = RuntimeReference::bind(&node);
        let clone = node.clone_with(ShadowNodeFragment::default());

        let linked = clone.runtime_reference().expect("inherited link");
        assert!(Arc::ptr_eq(&linked, &reference));
    }
}
