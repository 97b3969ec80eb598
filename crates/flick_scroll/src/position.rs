//! Scroll position
//!
//! A [`ScrollPosition`] owns the continuous state of one scrollable
//! surface: the offset, the content/viewport extents, and the activity
//! currently driving the offset. Handles are cheap clones sharing one
//! state; the viewport reads [`offset`](ScrollPosition::offset) every
//! frame while exactly one activity mutates it.
//!
//! Lock discipline: the position's inner lock is never held while user
//! callbacks run. Release callbacks, offset listeners, and motion hooks
//! are queued while locked and fired after the lock drops, so a callback
//! may freely re-enter the position or take coordinator locks.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use flick_animation::{
    AnimationHandle, AnimationStatus, Easing, FrameScheduler, WeakScheduler,
};
use flick_core::events::{DragEndDetails, DragStartDetails, DragUpdateDetails, Velocity};
use flick_core::geometry::{AxisDirection, Span};

use crate::activity::{
    Activity, ActivityKind, BallisticActivity, DragActivity, DrivenActivity, HoldActivity,
    ScrollDrag, ScrollHold,
};
use crate::physics::{ScrollMetrics, ScrollPhysics};

/// Callback observing offset changes
pub type OffsetListener = Arc<dyn Fn(f64) + Send + Sync>;

type Effect = Box<dyn FnOnce() + Send>;

pub(crate) struct PositionInner {
    offset: f64,
    min_offset: f64,
    max_offset: f64,
    viewport_extent: f64,
    axis_direction: AxisDirection,
    physics: Arc<dyn ScrollPhysics>,
    activity: Activity,
    activity_id: u64,
    listeners: Vec<OffsetListener>,
    on_motion_changed: Option<Arc<dyn Fn(bool) + Send + Sync>>,
    // Deferred callbacks, drained after the inner lock is released
    effects: Vec<Effect>,
    scheduler: WeakScheduler,
    ticker_registered: bool,
    disposed: bool,
}

impl PositionInner {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            offset: self.offset,
            min_offset: self.min_offset,
            max_offset: self.max_offset,
            viewport_extent: self.viewport_extent,
            axis_direction: self.axis_direction,
        }
    }

    fn set_offset(&mut self, value: f64) {
        debug_assert!(value.is_finite(), "scroll offset must be finite");
        if (value - self.offset).abs() < f64::EPSILON {
            return;
        }
        self.offset = value;
        if !self.listeners.is_empty() {
            let listeners = self.listeners.clone();
            for listener in listeners {
                self.effects.push(Box::new(move || listener(value)));
            }
        }
    }

    /// Install `next` as the sole owner, tearing the previous owner down
    ///
    /// The previous owner's release callback is deferred, its completion
    /// signal resolves `Interrupted`, and the activity id advances so stale
    /// tokens go inert.
    fn begin_activity(&mut self, next: Activity) {
        self.activity_id += 1;
        let mut previous = std::mem::replace(&mut self.activity, next);
        if let Some(release) = previous.take_release() {
            self.effects.push(release);
        }
        if let Some(completer) = previous.take_completer() {
            completer.complete(AnimationStatus::Interrupted);
        }
        let was_motion = previous.is_motion();
        let now_motion = self.activity.is_motion();
        if was_motion != now_motion {
            if let Some(hook) = &self.on_motion_changed {
                let hook = Arc::clone(hook);
                self.effects.push(Box::new(move || hook(now_motion)));
            }
        }
        tracing::trace!(
            from = previous.label(),
            to = self.activity.label(),
            "scroll activity transition"
        );
    }

    fn go_ballistic_with(&mut self, velocity: f64) {
        let metrics = self.metrics();
        match self.physics.create_ballistic_simulation(&metrics, velocity) {
            Some(simulation) => self.begin_activity(Activity::Ballistic(BallisticActivity {
                simulation,
                completer: None,
            })),
            None => self.begin_activity(Activity::Idle),
        }
    }

    fn jump(&mut self, target: f64) {
        self.begin_activity(Activity::Idle);
        self.set_offset(target);
        // Settle any boundary excess per physics (bouncing springs back)
        self.go_ballistic_with(0.0);
    }

    fn tick_activity(&mut self, dt: f64) -> bool {
        enum Outcome {
            NotAnimating,
            Continue(f64),
            Finished(f64),
        }

        let outcome = match &mut self.activity {
            Activity::Ballistic(ballistic) => {
                ballistic.simulation.step(dt);
                let value = ballistic.simulation.value();
                if ballistic.simulation.is_settled() {
                    Outcome::Finished(value)
                } else {
                    Outcome::Continue(value)
                }
            }
            Activity::Driven(driven) => {
                driven.elapsed += dt;
                let t = (driven.elapsed / driven.duration).min(1.0);
                if t >= 1.0 {
                    Outcome::Finished(driven.to)
                } else {
                    let eased = driven.easing.apply(t);
                    Outcome::Continue(driven.from + (driven.to - driven.from) * eased)
                }
            }
            _ => Outcome::NotAnimating,
        };

        match outcome {
            Outcome::NotAnimating => false,
            Outcome::Continue(value) => {
                self.set_offset(value);
                true
            }
            Outcome::Finished(value) => {
                self.set_offset(value);
                if let Some(completer) = self.activity.take_completer() {
                    completer.complete(AnimationStatus::Completed);
                }
                self.begin_activity(Activity::Idle);
                false
            }
        }
    }
}

/// Shared handle to a scroll position
#[derive(Clone)]
pub struct ScrollPosition {
    inner: Arc<Mutex<PositionInner>>,
}

impl ScrollPosition {
    /// Create a position driven by the shared frame scheduler
    ///
    /// When `old_position` is given, its offset and extents carry over so
    /// a reconfiguration does not visually jump. In-flight activities are
    /// not carried; the old position tears them down when it is disposed.
    pub fn new(
        physics: Arc<dyn ScrollPhysics>,
        axis_direction: AxisDirection,
        scheduler: &FrameScheduler,
        old_position: Option<&ScrollPosition>,
    ) -> Self {
        Self::build(physics, axis_direction, scheduler.downgrade(), old_position)
    }

    /// Create a position without a scheduler; the embedder drives
    /// [`tick`](Self::tick) itself
    pub fn detached(physics: Arc<dyn ScrollPhysics>, axis_direction: AxisDirection) -> Self {
        Self::build(physics, axis_direction, WeakScheduler::unattached(), None)
    }

    fn build(
        physics: Arc<dyn ScrollPhysics>,
        axis_direction: AxisDirection,
        scheduler: WeakScheduler,
        old_position: Option<&ScrollPosition>,
    ) -> Self {
        let (offset, min_offset, max_offset, viewport_extent) = match old_position {
            Some(old) => {
                let old = old.inner.lock().unwrap();
                (old.offset, old.min_offset, old.max_offset, old.viewport_extent)
            }
            None => (0.0, 0.0, 0.0, 0.0),
        };
        Self {
            inner: Arc::new(Mutex::new(PositionInner {
                offset,
                min_offset,
                max_offset,
                viewport_extent,
                axis_direction,
                physics,
                activity: Activity::Idle,
                activity_id: 0,
                listeners: Vec::new(),
                on_motion_changed: None,
                effects: Vec::new(),
                scheduler,
                ticker_registered: false,
                disposed: false,
            })),
        }
    }

    pub(crate) fn from_inner(inner: Arc<Mutex<PositionInner>>) -> Self {
        Self { inner }
    }

    pub(crate) fn weak(&self) -> Weak<Mutex<PositionInner>> {
        Arc::downgrade(&self.inner)
    }

    /// Run `f` under the inner lock, then fire deferred callbacks and
    /// register the frame ticker if a motion activity just started
    fn with_inner<R>(&self, f: impl FnOnce(&mut PositionInner) -> R) -> R {
        let (result, effects, register) = {
            let mut inner = self.inner.lock().unwrap();
            let result = f(&mut inner);
            let register =
                inner.activity.is_motion() && !inner.ticker_registered && !inner.disposed;
            if register {
                inner.ticker_registered = true;
            }
            (result, std::mem::take(&mut inner.effects), register)
        };
        if register {
            self.register_ticker();
        }
        for effect in effects {
            effect();
        }
        result
    }

    fn register_ticker(&self) {
        let scheduler = { self.inner.lock().unwrap().scheduler.upgrade() };
        let Some(scheduler) = scheduler else {
            // No scheduler: the embedder drives tick() manually.
            self.inner.lock().unwrap().ticker_registered = false;
            return;
        };
        let weak = self.weak();
        scheduler.add_ticker(Box::new(move |dt| {
            let Some(inner) = weak.upgrade() else { return false };
            ScrollPosition::from_inner(inner).tick(dt)
        }));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current scroll offset along the axis
    pub fn offset(&self) -> f64 {
        self.inner.lock().unwrap().offset
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.inner.lock().unwrap().metrics()
    }

    pub fn axis_direction(&self) -> AxisDirection {
        self.inner.lock().unwrap().axis_direction
    }

    pub fn physics(&self) -> Arc<dyn ScrollPhysics> {
        Arc::clone(&self.inner.lock().unwrap().physics)
    }

    /// The activity currently owning the position
    pub fn activity_kind(&self) -> ActivityKind {
        self.inner.lock().unwrap().activity.kind()
    }

    /// Whether a ballistic or driven animation is running
    pub fn is_animating(&self) -> bool {
        self.inner.lock().unwrap().activity.is_motion()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().unwrap().disposed
    }

    /// Identity comparison; scopes invalidate on identity change only
    pub fn same_position(&self, other: &ScrollPosition) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Observation and layout input
    // =========================================================================

    /// Observe offset changes; fired after every mutation
    pub fn add_listener(&self, listener: impl Fn(f64) + Send + Sync + 'static) {
        self.inner.lock().unwrap().listeners.push(Arc::new(listener));
    }

    pub(crate) fn set_motion_hook(&self, hook: impl Fn(bool) + Send + Sync + 'static) {
        self.inner.lock().unwrap().on_motion_changed = Some(Arc::new(hook));
    }

    /// Apply the viewport extent measured by the layout layer
    pub fn apply_viewport_extent(&self, extent: f64) {
        self.with_inner(|inner| inner.viewport_extent = extent);
    }

    /// Apply the scrollable range measured by the layout layer
    ///
    /// The offset is not forcibly clamped; boundary handling is a physics
    /// decision and any excess settles lazily.
    pub fn apply_content_extents(&self, min: f64, max: f64) {
        self.with_inner(|inner| {
            inner.min_offset = min;
            inner.max_offset = max.max(min);
        });
    }

    // =========================================================================
    // Gesture entry points
    // =========================================================================

    /// Pause any in-flight animation without committing to motion
    ///
    /// `on_release` fires (once) when the hold stops owning the position,
    /// whether cancelled or superseded by a drag.
    pub fn hold(&self, on_release: impl FnOnce() + Send + 'static) -> ScrollHold {
        let weak = self.weak();
        self.with_inner(|inner| {
            debug_assert!(!inner.disposed, "hold() on a disposed position");
            if inner.disposed {
                return ScrollHold { position: Weak::new(), id: 0 };
            }
            inner.begin_activity(Activity::Hold(HoldActivity {
                on_release: Some(Box::new(on_release)),
            }));
            ScrollHold {
                position: weak,
                id: inner.activity_id,
            }
        })
    }

    /// Start a pointer drag, superseding any hold
    pub fn drag(
        &self,
        details: DragStartDetails,
        on_release: impl FnOnce() + Send + 'static,
    ) -> ScrollDrag {
        let weak = self.weak();
        self.with_inner(|inner| {
            debug_assert!(!inner.disposed, "drag() on a disposed position");
            if inner.disposed {
                return ScrollDrag { position: Weak::new(), id: 0 };
            }
            tracing::trace!(x = details.global_x, y = details.global_y, "drag start");
            inner.begin_activity(Activity::Drag(DragActivity {
                on_release: Some(Box::new(on_release)),
            }));
            ScrollDrag {
                position: weak,
                id: inner.activity_id,
            }
        })
    }

    pub(crate) fn token_hold_cancel(&self, id: u64) {
        self.with_inner(|inner| {
            if inner.activity_id != id || !matches!(inner.activity, Activity::Hold(_)) {
                return;
            }
            inner.go_ballistic_with(0.0);
        });
    }

    pub(crate) fn token_drag_update(&self, id: u64, details: DragUpdateDetails) {
        self.with_inner(|inner| {
            if inner.activity_id != id || !matches!(inner.activity, Activity::Drag(_)) {
                return;
            }
            let pointer = if inner.axis_direction.is_reversed() {
                -details.primary_delta
            } else {
                details.primary_delta
            };
            let scroll_delta = -pointer;
            if scroll_delta == 0.0 {
                return;
            }
            let metrics = inner.metrics();
            let applied = inner.physics.apply_user_offset(&metrics, scroll_delta);
            let proposed = inner.offset + applied;
            let excess = inner.physics.apply_boundary_conditions(&metrics, proposed);
            inner.set_offset(proposed - excess);
            tracing::trace!(
                delta = scroll_delta,
                offset = inner.offset,
                "drag delta applied"
            );
        });
    }

    pub(crate) fn token_drag_end(&self, id: u64, details: DragEndDetails) {
        self.with_inner(|inner| {
            if inner.activity_id != id || !matches!(inner.activity, Activity::Drag(_)) {
                return;
            }
            let pointer = if inner.axis_direction.is_reversed() {
                -details.primary_velocity
            } else {
                details.primary_velocity
            };
            let velocity = Velocity::new(-pointer)
                .clamp_magnitude(
                    inner.physics.min_fling_velocity(),
                    inner.physics.max_fling_velocity(),
                )
                .pixels_per_second;
            inner.go_ballistic_with(velocity);
        });
    }

    pub(crate) fn token_drag_cancel(&self, id: u64) {
        self.with_inner(|inner| {
            if inner.activity_id != id || !matches!(inner.activity, Activity::Drag(_)) {
                return;
            }
            inner.go_ballistic_with(0.0);
        });
    }

    // =========================================================================
    // Programmatic motion
    // =========================================================================

    /// Set the offset directly, without tearing down the owner or settling
    ///
    /// For initialization and state restoration only; gesture and
    /// animation code paths go through [`jump_to`](Self::jump_to) instead.
    pub fn force_offset(&self, value: f64) {
        self.with_inner(|inner| {
            if inner.disposed {
                return;
            }
            inner.set_offset(value);
        });
    }

    /// Jump to an exact offset, interrupting whatever owns the position
    pub fn jump_to(&self, target: f64) {
        self.with_inner(|inner| {
            if inner.disposed {
                return;
            }
            tracing::debug!(to = target, "jump_to");
            inner.jump(target);
        });
    }

    /// Animate to an offset over a duration
    ///
    /// The handle resolves `Completed` at the natural end, `Interrupted`
    /// when the animation is superseded (new gesture, new animation,
    /// disposal). Zero duration or a zero-distance move jumps and resolves
    /// immediately.
    pub fn animate_to(&self, target: f64, duration: Duration, easing: Easing) -> AnimationHandle {
        self.with_inner(|inner| {
            if inner.disposed {
                return AnimationHandle::resolved(AnimationStatus::Interrupted);
            }
            if duration.is_zero() || (target - inner.offset).abs() < 1e-9 {
                inner.jump(target);
                return AnimationHandle::resolved(AnimationStatus::Completed);
            }
            let (completer, handle) = AnimationHandle::pending();
            tracing::debug!(to = target, ?duration, "animate_to");
            inner.begin_activity(Activity::Driven(DrivenActivity {
                from: inner.offset,
                to: target,
                duration: duration.as_secs_f64(),
                elapsed: 0.0,
                easing,
                completer: Some(completer),
            }));
            handle
        })
    }

    /// Scroll the minimum distance so `span` satisfies `alignment`
    ///
    /// Alignment 0 puts the span's leading edge at the viewport's leading
    /// edge, 1 the trailing edge at the trailing edge; fractions
    /// interpolate. The target is clamped into the scrollable range.
    pub fn ensure_visible(
        &self,
        span: Span,
        alignment: f64,
        duration: Duration,
        easing: Easing,
    ) -> AnimationHandle {
        let target = {
            let inner = self.inner.lock().unwrap();
            let slack = inner.viewport_extent - span.extent();
            (span.leading - alignment * slack).clamp(inner.min_offset, inner.max_offset)
        };
        if (target - self.offset()).abs() < 1e-9 {
            return AnimationHandle::resolved(AnimationStatus::Completed);
        }
        if duration.is_zero() {
            self.jump_to(target);
            return AnimationHandle::resolved(AnimationStatus::Completed);
        }
        self.animate_to(target, duration, easing)
    }

    /// Hand the position to a physics simulation with the given velocity
    pub fn go_ballistic(&self, velocity: f64) {
        self.with_inner(|inner| {
            if inner.disposed {
                return;
            }
            inner.go_ballistic_with(velocity);
        });
    }

    /// Drop the current owner and rest
    pub fn go_idle(&self) {
        self.with_inner(|inner| inner.begin_activity(Activity::Idle));
    }

    /// Advance the active animation by `dt` seconds
    ///
    /// Returns true while an animation keeps running. Positions created
    /// with a scheduler are ticked by it automatically.
    pub fn tick(&self, dt: f64) -> bool {
        self.with_inner(|inner| {
            let keep = inner.tick_activity(dt);
            if !keep {
                inner.ticker_registered = false;
            }
            keep
        })
    }

    /// Tear the position down
    ///
    /// Any owner is released, in-flight completions resolve `Interrupted`,
    /// and further mutations are no-ops. Superseded positions are disposed
    /// on a microtask, never synchronously, so in-flight reads this frame
    /// still see a live object.
    pub fn dispose(&self) {
        self.with_inner(|inner| {
            if inner.disposed {
                return;
            }
            inner.begin_activity(Activity::Idle);
            inner.disposed = true;
            inner.listeners.clear();
            tracing::debug!("scroll position disposed");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BouncingScrollPhysics, ClampingScrollPhysics};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    fn clamping_position() -> ScrollPosition {
        let position = ScrollPosition::detached(
            Arc::new(ClampingScrollPhysics::new()),
            AxisDirection::Down,
        );
        position.apply_viewport_extent(400.0);
        position.apply_content_extents(0.0, 600.0);
        position
    }

    fn run_to_rest(position: &ScrollPosition) {
        for _ in 0..2000 {
            if !position.tick(1.0 / 120.0) {
                return;
            }
        }
        panic!("position never settled");
    }

    #[test]
    fn test_drag_applies_axis_mapped_delta() {
        let position = clamping_position();
        position.jump_to(100.0);

        let drag = position.drag(DragStartDetails::default(), || {});
        // Pointer moves down 30px: content follows, offset shrinks
        drag.update(DragUpdateDetails::vertical(30.0));
        assert_eq!(position.offset(), 70.0);

        drag.update(DragUpdateDetails::vertical(-10.0));
        assert_eq!(position.offset(), 80.0);
        drag.end(DragEndDetails::default());
    }

    #[test]
    fn test_reversed_axis_inverts_delta() {
        let position = ScrollPosition::detached(
            Arc::new(ClampingScrollPhysics::new()),
            AxisDirection::Up,
        );
        position.apply_viewport_extent(400.0);
        position.apply_content_extents(0.0, 600.0);
        position.jump_to(100.0);

        let drag = position.drag(DragStartDetails::default(), || {});
        drag.update(DragUpdateDetails::vertical(30.0));
        assert_eq!(position.offset(), 130.0);
        drag.end(DragEndDetails::default());
    }

    #[test]
    fn test_clamping_drag_stops_at_edge() {
        let position = clamping_position();

        let drag = position.drag(DragStartDetails::default(), || {});
        drag.update(DragUpdateDetails::vertical(50.0)); // would go to -50
        assert_eq!(position.offset(), 0.0);
        drag.end(DragEndDetails::default());
        assert_eq!(position.activity_kind(), ActivityKind::Idle);
    }

    #[test]
    fn test_drag_supersedes_hold_and_fires_release() {
        let position = clamping_position();
        let hold_released = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&hold_released);
        let _hold = position.hold(move || flag.store(true, Ordering::SeqCst));
        assert_eq!(position.activity_kind(), ActivityKind::Holding);
        assert!(!hold_released.load(Ordering::SeqCst));

        let drag = position.drag(DragStartDetails::default(), || {});
        assert!(hold_released.load(Ordering::SeqCst));
        assert_eq!(position.activity_kind(), ActivityKind::Dragging);
        drag.cancel();
        assert_eq!(position.activity_kind(), ActivityKind::Idle);
    }

    #[test]
    fn test_hold_pauses_fling() {
        let position = clamping_position();

        let drag = position.drag(DragStartDetails::default(), || {});
        drag.update(DragUpdateDetails::vertical(-40.0));
        drag.end(DragEndDetails::with_primary_velocity(-1200.0));
        assert_eq!(position.activity_kind(), ActivityKind::Ballistic);

        position.tick(1.0 / 120.0);
        let paused_at = position.offset();

        let hold = position.hold(|| {});
        assert_eq!(position.activity_kind(), ActivityKind::Holding);
        assert!(!position.tick(1.0 / 120.0));
        assert_eq!(position.offset(), paused_at);

        hold.cancel();
        assert_eq!(position.activity_kind(), ActivityKind::Idle);
    }

    #[test]
    fn test_fling_advances_and_settles() {
        let position = clamping_position();

        let drag = position.drag(DragStartDetails::default(), || {});
        drag.update(DragUpdateDetails::vertical(-40.0));
        assert_eq!(position.offset(), 40.0);
        drag.end(DragEndDetails::with_primary_velocity(-800.0));

        run_to_rest(&position);
        assert!(position.offset() > 40.0);
        assert!(position.offset() <= 600.0);
        assert_eq!(position.activity_kind(), ActivityKind::Idle);
    }

    #[test]
    fn test_release_velocity_clamped_to_max_fling() {
        // A huge release velocity coasts no further than one at the cap
        let fling_distance = |velocity: f64| -> f64 {
            let position = ScrollPosition::detached(
                Arc::new(ClampingScrollPhysics::new()),
                AxisDirection::Down,
            );
            position.apply_viewport_extent(400.0);
            position.apply_content_extents(0.0, 50_000.0);

            let drag = position.drag(DragStartDetails::default(), || {});
            drag.end(DragEndDetails::with_primary_velocity(velocity));
            run_to_rest(&position);
            position.offset()
        };

        let capped = fling_distance(-8000.0);
        let excessive = fling_distance(-20_000.0);
        assert_eq!(capped, excessive);
        assert!(capped > 0.0);
    }

    #[test]
    fn test_release_below_fling_threshold_settles() {
        let position = clamping_position();

        let drag = position.drag(DragStartDetails::default(), || {});
        drag.update(DragUpdateDetails::vertical(-40.0));
        drag.end(DragEndDetails::with_primary_velocity(-20.0));

        // Below the minimum fling velocity the release collapses to rest
        assert_eq!(position.activity_kind(), ActivityKind::Idle);
        assert_eq!(position.offset(), 40.0);
    }

    #[test]
    fn test_drag_release_fires_exactly_once() {
        let position = clamping_position();
        let releases = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&releases);
        let drag = position.drag(DragStartDetails::default(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drag.end(DragEndDetails::default());
        assert_eq!(releases.load(Ordering::SeqCst), 1);

        // Stale token calls are silent no-ops
        drag.cancel();
        drag.update(DragUpdateDetails::vertical(10.0));
        drag.end(DragEndDetails::default());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_jump_to_releases_drag() {
        let position = clamping_position();
        let released = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&released);
        let drag = position.drag(DragStartDetails::default(), move || {
            flag.store(true, Ordering::SeqCst);
        });
        drag.update(DragUpdateDetails::vertical(-20.0));

        position.jump_to(300.0);
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(position.offset(), 300.0);
        assert_eq!(position.activity_kind(), ActivityKind::Idle);
    }

    #[test]
    fn test_bouncing_cancel_springs_back_from_overscroll() {
        let position = ScrollPosition::detached(
            Arc::new(BouncingScrollPhysics::new()),
            AxisDirection::Down,
        );
        position.apply_viewport_extent(400.0);
        position.apply_content_extents(0.0, 600.0);

        let drag = position.drag(DragStartDetails::default(), || {});
        drag.update(DragUpdateDetails::vertical(60.0)); // overscroll past the top
        assert!(position.offset() < 0.0);

        drag.cancel();
        assert_eq!(position.activity_kind(), ActivityKind::Ballistic);

        run_to_rest(&position);
        assert!((position.offset() - 0.0).abs() < 0.1);
    }

    #[test]
    fn test_animate_to_completes() {
        let scheduler = FrameScheduler::new();
        let position = ScrollPosition::new(
            Arc::new(ClampingScrollPhysics::new()),
            AxisDirection::Down,
            &scheduler,
            None,
        );
        position.apply_viewport_extent(400.0);
        position.apply_content_extents(0.0, 600.0);

        let mut handle =
            position.animate_to(240.0, Duration::from_millis(200), Easing::EaseInOut);
        assert_eq!(position.activity_kind(), ActivityKind::Driven);
        assert_eq!(handle.try_status(), None);

        for _ in 0..60 {
            scheduler.tick(1.0 / 120.0);
        }
        assert_eq!(handle.try_status(), Some(AnimationStatus::Completed));
        assert_eq!(position.offset(), 240.0);
        assert_eq!(position.activity_kind(), ActivityKind::Idle);
    }

    #[test]
    fn test_animate_to_interrupted_by_hold() {
        let scheduler = FrameScheduler::new();
        let position = ScrollPosition::new(
            Arc::new(ClampingScrollPhysics::new()),
            AxisDirection::Down,
            &scheduler,
            None,
        );
        position.apply_viewport_extent(400.0);
        position.apply_content_extents(0.0, 600.0);

        let mut handle =
            position.animate_to(240.0, Duration::from_millis(200), Easing::Linear);
        scheduler.tick(1.0 / 120.0);

        let _hold = position.hold(|| {});
        assert_eq!(handle.try_status(), Some(AnimationStatus::Interrupted));
        assert_eq!(position.activity_kind(), ActivityKind::Holding);
    }

    #[test]
    fn test_animate_to_zero_duration_jumps() {
        let position = clamping_position();
        let mut handle = position.animate_to(120.0, Duration::ZERO, Easing::Linear);
        assert_eq!(handle.try_status(), Some(AnimationStatus::Completed));
        assert_eq!(position.offset(), 120.0);
    }

    #[test]
    fn test_ensure_visible_already_visible() {
        let position = clamping_position();
        position.jump_to(100.0);

        // Span fully inside the viewport at alignment 0 target == offset
        let mut handle = position.ensure_visible(
            Span::new(100.0, 150.0),
            0.0,
            Duration::from_millis(100),
            Easing::Linear,
        );
        assert_eq!(handle.try_status(), Some(AnimationStatus::Completed));
        assert_eq!(position.offset(), 100.0);
    }

    #[test]
    fn test_ensure_visible_alignment_math() {
        let position = clamping_position();

        // Trailing alignment: target = leading - 1.0 * (viewport - extent)
        position.ensure_visible(Span::new(500.0, 580.0), 1.0, Duration::ZERO, Easing::Linear);
        assert_eq!(position.offset(), 180.0);

        // Leading alignment: target = leading edge of the span
        position.ensure_visible(Span::new(250.0, 330.0), 0.0, Duration::ZERO, Easing::Linear);
        assert_eq!(position.offset(), 250.0);
    }

    #[test]
    fn test_offset_listener_notified() {
        let position = clamping_position();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        position.add_listener(move |offset| sink.lock().unwrap().push(offset));

        position.jump_to(50.0);
        position.jump_to(50.0); // no change, no notification
        position.jump_to(75.0);

        assert_eq!(*seen.lock().unwrap(), vec![50.0, 75.0]);
    }

    #[test]
    fn test_dispose_interrupts_and_deadens() {
        let position = clamping_position();
        let mut handle = position.animate_to(200.0, Duration::from_millis(200), Easing::Linear);

        position.dispose();
        assert!(position.is_disposed());
        assert_eq!(handle.try_status(), Some(AnimationStatus::Interrupted));

        let mut after = position.animate_to(300.0, Duration::from_millis(100), Easing::Linear);
        assert_eq!(after.try_status(), Some(AnimationStatus::Interrupted));
        position.jump_to(999.0);
        assert_ne!(position.offset(), 999.0);
    }

    #[test]
    fn test_new_position_carries_old_state() {
        let position = clamping_position();
        position.jump_to(420.0);

        let scheduler = FrameScheduler::new();
        let replacement = ScrollPosition::new(
            Arc::new(BouncingScrollPhysics::new()),
            AxisDirection::Down,
            &scheduler,
            Some(&position),
        );
        assert_eq!(replacement.offset(), 420.0);
        assert_eq!(replacement.metrics().max_offset, 600.0);
        assert!(!replacement.same_position(&position));
    }
}
