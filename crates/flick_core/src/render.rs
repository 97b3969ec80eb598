//! Render-layer pointer filtering
//!
//! The render tree owns a node that can swallow pointer events before they
//! reach the gesture layer. Scroll coordinators flip its flag in place
//! while an externally-driven animation owns the position, so stray taps
//! do not tear the animation down mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};

/// A render node toggling pointer-event pass-through
#[derive(Debug, Default)]
pub struct PointerFilter {
    ignoring: AtomicBool,
}

impl PointerFilter {
    pub fn new(ignoring: bool) -> Self {
        Self {
            ignoring: AtomicBool::new(ignoring),
        }
    }

    /// Update the flag in place, without rebuilding the render tree
    pub fn set_ignoring(&self, value: bool) {
        self.ignoring.store(value, Ordering::Release);
    }

    /// Whether pointer events are currently swallowed
    pub fn is_ignoring(&self) -> bool {
        self.ignoring.load(Ordering::Acquire)
    }
}
