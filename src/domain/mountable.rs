//! Node capabilities required by mount-flag propagation
//!
//! The propagator is generic over this trait so it can run on any immutable,
//! `Arc`-shared node type. Instance identity is always `Arc::ptr_eq`.

use std::sync::Arc;

pub trait MountableNode: Sized {
    /// True if `self` and `other` represent the same logical element.
    ///
    /// Must be an equivalence relation; the propagator does not check it.
    fn same_family(&self, other: &Self) -> bool;

    /// Ordered children of this instance.
    ///
    /// Instances that did not change their children should return the same
    /// shared slice, so the propagator can skip it by address.
    fn children(&self) -> &[Arc<Self>];

    /// Sets the mounted flag in place.
    fn set_mounted(&self, mounted: bool);

    /// Rebinds the live runtime counterpart of this element to `current`.
    ///
    /// `current` is the `Arc` that owns `self`.
    fn update_runtime_reference(&self, current: &Arc<Self>) {
        let _ = current;
    }
}
