//! Programmatic scroll control
//!
//! A controller attaches to the positions a coordinator creates and lets
//! application code drive them without touching the gesture layer. The
//! built-in [`ScrollRef`] covers the common case; custom controllers
//! implement [`ScrollController`] and may synthesize their own position
//! flavors in [`create_position`](ScrollController::create_position).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flick_animation::{AnimationHandle, Easing, FrameScheduler};
use flick_core::AxisDirection;

use crate::error::{Result, ScrollError};
use crate::physics::ScrollPhysics;
use crate::position::ScrollPosition;

/// Controller contract exposed by scroll coordinators
///
/// Reconfiguration compares controllers by [`kind`](Self::kind) tag, the
/// same way physics chains compare by kind: swapping between controller
/// flavors rebuilds the position, swapping same-kind instances does not.
pub trait ScrollController: Send + Sync {
    /// Static tag identifying the controller flavor
    fn kind(&self) -> &'static str;

    /// Called when a coordinator installs `position`
    fn attach(&self, position: &ScrollPosition);

    /// Called when a coordinator abandons `position`
    fn detach(&self, position: &ScrollPosition);

    /// Optionally synthesize the position for a coordinator
    ///
    /// Returning `None` makes the coordinator construct a standalone
    /// position.
    fn create_position(
        &self,
        physics: Arc<dyn ScrollPhysics>,
        axis_direction: AxisDirection,
        scheduler: &FrameScheduler,
        old_position: Option<&ScrollPosition>,
    ) -> Option<ScrollPosition> {
        let _ = (physics, axis_direction, scheduler, old_position);
        None
    }
}

struct ScrollRefInner {
    positions: Vec<ScrollPosition>,
    initial_offset: f64,
}

/// Handle for driving a scrollable from application code
///
/// Clone-shared; bind it to a scrollable's configuration and use it to
/// query the offset or start programmatic scrolls. Commands require
/// exactly one attached position and return [`ScrollError`] otherwise.
#[derive(Clone)]
pub struct ScrollRef {
    inner: Arc<Mutex<ScrollRefInner>>,
}

impl ScrollRef {
    pub fn new() -> Self {
        Self::with_initial_offset(0.0)
    }

    /// Controller whose first position starts at `offset`
    pub fn with_initial_offset(offset: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScrollRefInner {
                positions: Vec::new(),
                initial_offset: offset,
            })),
        }
    }

    /// Whether any position is attached
    pub fn has_clients(&self) -> bool {
        !self.inner.lock().unwrap().positions.is_empty()
    }

    /// The single attached position
    pub fn position(&self) -> Result<ScrollPosition> {
        let inner = self.inner.lock().unwrap();
        match inner.positions.as_slice() {
            [] => Err(ScrollError::NoPosition),
            [position] => {
                if position.is_disposed() {
                    Err(ScrollError::Disposed)
                } else {
                    Ok(position.clone())
                }
            }
            _ => Err(ScrollError::MultiplePositions),
        }
    }

    /// Current offset of the attached position
    pub fn offset(&self) -> Result<f64> {
        Ok(self.position()?.offset())
    }

    /// Jump the attached position to an exact offset
    pub fn jump_to(&self, offset: f64) -> Result<()> {
        self.position()?.jump_to(offset);
        Ok(())
    }

    /// Animate the attached position to an offset
    pub fn animate_to(
        &self,
        offset: f64,
        duration: Duration,
        easing: Easing,
    ) -> Result<AnimationHandle> {
        Ok(self.position()?.animate_to(offset, duration, easing))
    }
}

impl Default for ScrollRef {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollController for ScrollRef {
    fn kind(&self) -> &'static str {
        "scroll-ref"
    }

    fn attach(&self, position: &ScrollPosition) {
        let mut inner = self.inner.lock().unwrap();
        if inner.positions.iter().any(|p| p.same_position(position)) {
            return;
        }
        inner.positions.push(position.clone());
    }

    fn detach(&self, position: &ScrollPosition) {
        self.inner
            .lock()
            .unwrap()
            .positions
            .retain(|p| !p.same_position(position));
    }

    fn create_position(
        &self,
        physics: Arc<dyn ScrollPhysics>,
        axis_direction: AxisDirection,
        scheduler: &FrameScheduler,
        old_position: Option<&ScrollPosition>,
    ) -> Option<ScrollPosition> {
        let position = ScrollPosition::new(physics, axis_direction, scheduler, old_position);
        if old_position.is_none() {
            let initial = self.inner.lock().unwrap().initial_offset;
            if initial != 0.0 {
                position.force_offset(initial);
            }
        }
        Some(position)
    }
}
