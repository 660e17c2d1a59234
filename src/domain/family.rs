//! Cross-revision identity of a logical element.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::trace;

/// Numeric identifier shared by every instance of a family.
pub type Tag = u32;

/// Identity that survives across revisions for "the same logical element".
///
/// Node instances are replaced on every content update; the family stays.
/// It also counts how many of its member instances are currently mounted,
/// which is what an observer uses to decide whether the element is on screen.
#[derive(Debug)]
pub struct ShadowNodeFamily {
    tag: Tag,
    component_name: String,
    mounted_representatives: AtomicUsize,
}

impl ShadowNodeFamily {
    pub fn new(tag: Tag, component_name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            tag,
            component_name: component_name.into(),
            mounted_representatives: AtomicUsize::new(0),
        })
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// Number of member instances whose mounted flag is currently set.
    pub fn mounted_representatives(&self) -> usize {
        self.mounted_representatives.load(Ordering::SeqCst)
    }

    /// True while at least one member instance is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted_representatives() > 0
    }

    /// Records an effective flag transition of a member instance.
    pub(crate) fn record_transition(&self, mounted: bool) {
        if mounted {
            let previous = self.mounted_representatives.fetch_add(1, Ordering::SeqCst);
            trace!(tag = self.tag, count = previous + 1, "family representative mounted");
        } else {
            // saturating: an unbalanced unmount must not wrap around
            let result = self.mounted_representatives.fetch_update(
                Ordering::SeqCst,
                Ordering::SeqCst,
                |count| count.checked_sub(1),
            );
            if let Ok(previous) = result {
                trace!(tag = self.tag, count = previous - 1, "family representative unmounted");
            }
        }
    }
}

impl fmt::Display for ShadowNodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.component_name, self.tag)
    }
}
