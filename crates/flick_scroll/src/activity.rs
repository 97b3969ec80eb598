//! Scroll activities and ownership tokens
//!
//! A position is mutated by exactly one activity at a time. Gesture-driven
//! activities hand the caller an ownership token ([`ScrollHold`],
//! [`ScrollDrag`]); the token is id-guarded, so calls through a token that
//! has already been superseded are silent no-ops rather than contract
//! violations.

use std::sync::{Mutex, Weak};

use flick_animation::handle::AnimationCompleter;
use flick_animation::{Easing, Simulation};
use flick_core::events::{DragEndDetails, DragUpdateDetails};

use crate::position::{PositionInner, ScrollPosition};

/// Callback fired when a hold or drag stops owning the position
pub(crate) type ReleaseCallback = Box<dyn FnOnce() + Send>;

/// Observable activity state of a scroll position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// Nothing owns the position
    Idle,
    /// A pointer is down; any fling is paused, no motion yet
    Holding,
    /// A pointer drag applies incremental deltas
    Dragging,
    /// A physics simulation (fling or snap-back) drives the offset
    Ballistic,
    /// A duration/curve animation drives the offset
    Driven,
}

pub(crate) struct HoldActivity {
    pub on_release: Option<ReleaseCallback>,
}

pub(crate) struct DragActivity {
    pub on_release: Option<ReleaseCallback>,
}

pub(crate) struct BallisticActivity {
    pub simulation: Box<dyn Simulation>,
    pub completer: Option<AnimationCompleter>,
}

pub(crate) struct DrivenActivity {
    pub from: f64,
    pub to: f64,
    pub duration: f64,
    pub elapsed: f64,
    pub easing: Easing,
    pub completer: Option<AnimationCompleter>,
}

/// The position's current owner
pub(crate) enum Activity {
    Idle,
    Hold(HoldActivity),
    Drag(DragActivity),
    Ballistic(BallisticActivity),
    Driven(DrivenActivity),
}

impl Activity {
    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::Idle => ActivityKind::Idle,
            Activity::Hold(_) => ActivityKind::Holding,
            Activity::Drag(_) => ActivityKind::Dragging,
            Activity::Ballistic(_) => ActivityKind::Ballistic,
            Activity::Driven(_) => ActivityKind::Driven,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Hold(_) => "holding",
            Activity::Drag(_) => "dragging",
            Activity::Ballistic(_) => "ballistic",
            Activity::Driven(_) => "driven",
        }
    }

    /// Whether the offset is being animated (as opposed to held or idle)
    pub fn is_motion(&self) -> bool {
        matches!(self, Activity::Ballistic(_) | Activity::Driven(_))
    }

    /// Detach the release callback, if this activity carries one
    pub fn take_release(&mut self) -> Option<ReleaseCallback> {
        match self {
            Activity::Hold(hold) => hold.on_release.take(),
            Activity::Drag(drag) => drag.on_release.take(),
            _ => None,
        }
    }

    /// Detach the completion signal, if this activity carries one
    pub fn take_completer(&mut self) -> Option<AnimationCompleter> {
        match self {
            Activity::Ballistic(ballistic) => ballistic.completer.take(),
            Activity::Driven(driven) => driven.completer.take(),
            _ => None,
        }
    }
}

/// Ownership token for a hold
///
/// Holding pauses any in-flight animation without committing to motion.
/// The token is released by [`cancel`](Self::cancel), or implicitly when a
/// drag supersedes it.
#[derive(Clone)]
pub struct ScrollHold {
    pub(crate) position: Weak<Mutex<PositionInner>>,
    pub(crate) id: u64,
}

impl ScrollHold {
    /// End the hold; the position settles per its physics
    ///
    /// Idempotent: a stale token (already superseded or released) does
    /// nothing.
    pub fn cancel(&self) {
        if let Some(inner) = self.position.upgrade() {
            ScrollPosition::from_inner(inner).token_hold_cancel(self.id);
        }
    }
}

/// Ownership token for an active drag
///
/// Applies incremental deltas to the position and, on release, hands the
/// residual velocity to the physics for a possible fling. All methods are
/// id-guarded no-ops once the drag has been superseded.
#[derive(Clone)]
pub struct ScrollDrag {
    pub(crate) position: Weak<Mutex<PositionInner>>,
    pub(crate) id: u64,
}

impl ScrollDrag {
    /// Apply an incremental pointer delta
    pub fn update(&self, details: DragUpdateDetails) {
        if let Some(inner) = self.position.upgrade() {
            ScrollPosition::from_inner(inner).token_drag_update(self.id, details);
        }
    }

    /// Release the drag; residual velocity may start a fling
    pub fn end(&self, details: DragEndDetails) {
        if let Some(inner) = self.position.upgrade() {
            ScrollPosition::from_inner(inner).token_drag_end(self.id, details);
        }
    }

    /// Abort the drag without a fling
    pub fn cancel(&self) {
        if let Some(inner) = self.position.upgrade() {
            ScrollPosition::from_inner(inner).token_drag_cancel(self.id);
        }
    }
}
