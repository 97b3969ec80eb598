//! Flick Scrollable Surface
//!
//! The scrollable subsystem of the Flick UI framework: scroll positions,
//! pointer-gesture coordination, fling physics, and ensure-visible
//! traversal across nested scrollables.
//!
//! # Architecture
//!
//! - [`ScrollPosition`] owns the continuous state (offset, extents, and
//!   the activity currently driving the offset)
//! - [`ScrollHold`]/[`ScrollDrag`] are short-lived ownership tokens handed
//!   to whoever is manipulating the position; at most one is live
//! - [`ScrollableState`] wires gesture recognizers to the position and
//!   rebuilds it when the physics chain or controller flavor changes
//! - [`ScrollPhysics`] strategies compose into chains and decide boundary
//!   behavior and fling hand-off
//! - [`ScrollContext`]/[`ScrollScope`] propagate `(coordinator, position)`
//!   to descendants, and [`ensure_visible`] walks them outward
//!
//! Everything runs on one logical thread between frames; animations are
//! driven by the shared [`FrameScheduler`](flick_animation::FrameScheduler)
//! and superseded positions are disposed on a microtask boundary.

pub mod activity;
pub mod controller;
pub mod error;
pub mod physics;
pub mod position;
pub mod scrollable;

pub use activity::{ActivityKind, ScrollDrag, ScrollHold};
pub use controller::{ScrollController, ScrollRef};
pub use error::{Result, ScrollError};
pub use physics::{
    chains_match, BouncingScrollPhysics, ClampingScrollPhysics, NeverScrollablePhysics,
    PhysicsKind, ScrollBehavior, ScrollMetrics, ScrollPhysics,
};
pub use position::{OffsetListener, ScrollPosition};
pub use scrollable::{
    ensure_visible, ScrollContext, Scrollable, ScrollableState, ScrollScope, VisibleTarget,
};
