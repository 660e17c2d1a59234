//! Live handle held by an external runtime for a node.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::domain::node::ShadowNode;

/// Handle through which an external runtime reaches "its" node.
///
/// The runtime owns the handle; nodes only keep a weak link to it. After a
/// commit from the primary pipeline the handle is retargeted to the newest
/// instance, so the runtime never acts on a retired revision.
#[derive(Debug)]
pub struct RuntimeReference {
    target: RwLock<Option<Arc<ShadowNode>>>,
}

impl RuntimeReference {
    /// Creates a handle pointing at `node` and links `node` back to it.
    pub fn bind(node: &Arc<ShadowNode>) -> Arc<Self> {
        let reference = Arc::new(Self {
            target: RwLock::new(Some(Arc::clone(node))),
        });
        node.link_runtime_reference(&reference);
        reference
    }

    /// The node instance this handle currently represents.
    pub fn target(&self) -> Option<Arc<ShadowNode>> {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn retarget(&self, node: &Arc<ShadowNode>) {
        let mut target = self.target.write().unwrap_or_else(PoisonError::into_inner);
        debug!(node = %node, "runtime reference retargeted");
        *target = Some(Arc::clone(node));
    }

    /// Drops the link to the node, e.g. when the runtime releases it.
    pub fn clear(&self) {
        *self.target.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
