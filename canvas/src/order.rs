//! Render-order policies.
//!
//! The drawable sequence is re-sorted with a [`RenderOrder`] whenever an
//! object is updated and whenever a run starts. Sorting is stable, so a
//! policy only has to rank what it cares about; ties keep definition order.
//! Any `Fn(&CanvasObject, &CanvasObject) -> Ordering` is a policy.

#[cfg(test)]
#[path = "order_test.rs"]
mod order_test;

use std::cmp::Ordering;

use crate::object::CanvasObject;

/// A total order over canvas objects; earlier objects are drawn first
/// (underneath).
pub trait RenderOrder {
    fn compare(&self, a: &CanvasObject, b: &CanvasObject) -> Ordering;
}

impl<F> RenderOrder for F
where
    F: Fn(&CanvasObject, &CanvasObject) -> Ordering,
{
    fn compare(&self, a: &CanvasObject, b: &CanvasObject) -> Ordering {
        self(a, b)
    }
}

/// Keep definition order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionOrder;

impl RenderOrder for InsertionOrder {
    fn compare(&self, _a: &CanvasObject, _b: &CanvasObject) -> Ordering {
        Ordering::Equal
    }
}

/// Ascending `zIndex`. The default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZIndexOrder;

impl RenderOrder for ZIndexOrder {
    fn compare(&self, a: &CanvasObject, b: &CanvasObject) -> Ordering {
        a.z_index.cmp(&b.z_index)
    }
}

/// Larger objects first, so small objects stay visible on top.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeOrder;

impl RenderOrder for SizeOrder {
    fn compare(&self, a: &CanvasObject, b: &CanvasObject) -> Ordering {
        b.area().total_cmp(&a.area())
    }
}
