//! Scrollable surface coordination
//!
//! [`ScrollableState`] is the glue between the gesture layer and a
//! [`ScrollPosition`]: it publishes drag recognizers wired to the five
//! gesture callbacks, turns pointer events into hold/drag ownership of the
//! position, and rebuilds the position when the effective physics or
//! controller flavor changes.
//!
//! Descendant code finds its enclosing scrollables through an explicit
//! [`ScrollContext`] stack of [`ScrollScope`]s, and [`ensure_visible`]
//! walks that stack to bring a target into view across nested surfaces.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use smallvec::SmallVec;

use flick_animation::{AnimationHandle, AnimationStatus, Easing, FrameScheduler};
use flick_core::events::{DragDownDetails, DragEndDetails, DragStartDetails, DragUpdateDetails};
use flick_core::geometry::{Axis, AxisDirection, Span};
use flick_core::gesture::{DragGestureRecognizer, GestureSurface, RecognizerKind, RecognizerMap};
use flick_core::render::PointerFilter;

use crate::activity::{ScrollDrag, ScrollHold};
use crate::controller::ScrollController;
use crate::physics::{chains_match, ScrollBehavior, ScrollPhysics};
use crate::position::ScrollPosition;

// ============================================================================
// Configuration
// ============================================================================

/// Immutable configuration of one scrollable surface
#[derive(Clone, Default)]
pub struct Scrollable {
    pub axis_direction: AxisDirection,
    /// Local physics, composed over the ambient behavior's default
    pub physics: Option<Arc<dyn ScrollPhysics>>,
    /// Controller given programmatic access to the position
    pub controller: Option<Arc<dyn ScrollController>>,
}

impl Scrollable {
    pub fn new(axis_direction: AxisDirection) -> Self {
        Self {
            axis_direction,
            physics: None,
            controller: None,
        }
    }

    pub fn with_physics(mut self, physics: Arc<dyn ScrollPhysics>) -> Self {
        self.physics = Some(physics);
        self
    }

    pub fn with_controller(mut self, controller: Arc<dyn ScrollController>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis_direction.axis()
    }
}

// ============================================================================
// Pointer gate
// ============================================================================

/// Memoized switch over the mounted pointer filter
///
/// Driven from two sides: the coordinator's `set_ignore_pointer`, and the
/// position's motion hook while an externally-driven animation runs. The
/// mounted render node is updated in place, never rebuilt.
struct PointerGate {
    ignoring: AtomicBool,
    node: Mutex<Option<Arc<PointerFilter>>>,
}

impl PointerGate {
    fn new() -> Self {
        Self {
            ignoring: AtomicBool::new(false),
            node: Mutex::new(None),
        }
    }

    fn set(&self, value: bool) {
        if self.ignoring.swap(value, Ordering::AcqRel) == value {
            return;
        }
        if let Some(node) = &*self.node.lock().unwrap() {
            node.set_ignoring(value);
        }
    }

    fn mount(&self, node: Arc<PointerFilter>) {
        node.set_ignoring(self.ignoring.load(Ordering::Acquire));
        *self.node.lock().unwrap() = Some(node);
    }

    fn is_ignoring(&self) -> bool {
        self.ignoring.load(Ordering::Acquire)
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Gesture ownership slots, shared with the recognizer callbacks
///
/// Invariant: `hold` and `drag` are never both occupied. Release callbacks
/// registered with the position null the respective slot; they are
/// idempotent and safe to fire after the owner has moved on.
struct CoordinatorCore {
    position: Option<ScrollPosition>,
    hold: Option<ScrollHold>,
    drag: Option<ScrollDrag>,
}

struct StateInner {
    config: Scrollable,
    behavior: ScrollBehavior,
    resolved_physics: Option<Arc<dyn ScrollPhysics>>,
    recognizers: RecognizerMap,
    surface: Option<Arc<GestureSurface>>,
    last_can_drag: bool,
    last_axis: Option<Axis>,
}

/// Coordinator owning the gesture wiring and the scroll position
///
/// Clone-shared; clones address the same coordinator.
#[derive(Clone)]
pub struct ScrollableState {
    state: Arc<Mutex<StateInner>>,
    core: Arc<Mutex<CoordinatorCore>>,
    gate: Arc<PointerGate>,
    scheduler: FrameScheduler,
}

impl ScrollableState {
    /// Create a coordinator and resolve its first position
    pub fn new(config: Scrollable, behavior: ScrollBehavior, scheduler: &FrameScheduler) -> Self {
        let coordinator = Self {
            state: Arc::new(Mutex::new(StateInner {
                config,
                behavior,
                resolved_physics: None,
                recognizers: RecognizerMap::default(),
                surface: None,
                last_can_drag: false,
                last_axis: None,
            })),
            core: Arc::new(Mutex::new(CoordinatorCore {
                position: None,
                hold: None,
                drag: None,
            })),
            gate: Arc::new(PointerGate::new()),
            scheduler: scheduler.clone(),
        };
        coordinator.update_position();
        coordinator
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The position this coordinator currently owns
    pub fn position(&self) -> Option<ScrollPosition> {
        self.core.lock().unwrap().position.clone()
    }

    pub fn config(&self) -> Scrollable {
        self.state.lock().unwrap().config.clone()
    }

    pub fn axis_direction(&self) -> AxisDirection {
        self.state.lock().unwrap().config.axis_direction
    }

    pub fn axis(&self) -> Axis {
        self.axis_direction().axis()
    }

    /// The shared frame scheduler driving this coordinator's animations
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Whether a hold token is outstanding
    pub fn has_hold(&self) -> bool {
        self.core.lock().unwrap().hold.is_some()
    }

    /// Whether a drag token is outstanding
    pub fn has_drag(&self) -> bool {
        self.core.lock().unwrap().drag.is_some()
    }

    /// Kinds of the currently published recognizers
    pub fn recognizer_kinds(&self) -> Vec<RecognizerKind> {
        self.state.lock().unwrap().recognizers.keys().copied().collect()
    }

    pub fn ignores_pointer(&self) -> bool {
        self.gate.is_ignoring()
    }

    // =========================================================================
    // Position lifecycle
    // =========================================================================

    /// Resolve the effective physics and (re)build the position
    ///
    /// The previous position is detached from the controller and its
    /// disposal is deferred to the next microtask, so reads already in
    /// flight this frame never observe a disposed position.
    pub fn update_position(&self) {
        let (resolved, controller, axis_direction) = {
            let mut state = self.state.lock().unwrap();
            let base = state.behavior.physics();
            let resolved = match &state.config.physics {
                Some(local) => local.apply_to(Some(base)),
                None => base,
            };
            state.resolved_physics = Some(Arc::clone(&resolved));
            (
                resolved,
                state.config.controller.clone(),
                state.config.axis_direction,
            )
        };

        let old_position = { self.core.lock().unwrap().position.take() };
        if let Some(old) = &old_position {
            if let Some(controller) = &controller {
                controller.detach(old);
            }
            let doomed = old.clone();
            self.scheduler
                .schedule_microtask(Box::new(move || doomed.dispose()));
        }

        let position = controller
            .as_ref()
            .and_then(|controller| {
                controller.create_position(
                    Arc::clone(&resolved),
                    axis_direction,
                    &self.scheduler,
                    old_position.as_ref(),
                )
            })
            .unwrap_or_else(|| {
                ScrollPosition::new(
                    resolved,
                    axis_direction,
                    &self.scheduler,
                    old_position.as_ref(),
                )
            });

        // Externally-driven animations close the pointer gate for their
        // duration.
        let gate = Arc::clone(&self.gate);
        position.set_motion_hook(move |animating| gate.set(animating));

        if let Some(controller) = &controller {
            controller.attach(&position);
        }
        tracing::debug!(reconfigured = old_position.is_some(), "scroll position installed");
        self.core.lock().unwrap().position = Some(position);
    }

    /// Whether switching to `old_config`'s successor (the current config)
    /// requires rebuilding the position
    ///
    /// Physics chains are compared structurally by kind tag, link by link;
    /// controllers by kind tag. Tunables of same-kind links never trigger
    /// a rebuild.
    pub fn should_update_position(&self, old_config: &Scrollable) -> bool {
        let state = self.state.lock().unwrap();
        Self::config_requires_new_position(&state.config, old_config)
    }

    fn config_requires_new_position(new: &Scrollable, old: &Scrollable) -> bool {
        if !chains_match(new.physics.as_ref(), old.physics.as_ref()) {
            return true;
        }
        let new_kind = new.controller.as_ref().map(|controller| controller.kind());
        let old_kind = old.controller.as_ref().map(|controller| controller.kind());
        new_kind != old_kind
    }

    /// Install a new configuration
    ///
    /// Controller identity changes re-target attach/detach immediately;
    /// the position itself is rebuilt only when
    /// [`should_update_position`](Self::should_update_position) says so.
    pub fn did_update_config(&self, config: Scrollable) {
        let old = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut state.config, config)
        };

        let new_controller = { self.state.lock().unwrap().config.controller.clone() };
        let same_controller = match (&new_controller, &old.controller) {
            (Some(new), Some(old)) => Arc::ptr_eq(new, old),
            (None, None) => true,
            _ => false,
        };
        if !same_controller {
            if let Some(position) = self.position() {
                if let Some(controller) = &old.controller {
                    controller.detach(&position);
                }
                if let Some(controller) = &new_controller {
                    controller.attach(&position);
                }
            }
        }

        if self.should_update_position(&old) {
            self.update_position();
        }
    }

    /// Tear the coordinator down, disposing its position synchronously
    pub fn dispose(&self) {
        let controller = { self.state.lock().unwrap().config.controller.clone() };
        let position = { self.core.lock().unwrap().position.take() };
        if let Some(position) = position {
            if let Some(controller) = &controller {
                controller.detach(&position);
            }
            position.dispose();
        }
    }

    // =========================================================================
    // Layout input
    // =========================================================================

    /// Forward the measured viewport extent and refresh drag-ability
    pub fn apply_viewport_extent(&self, extent: f64) {
        if let Some(position) = self.position() {
            position.apply_viewport_extent(extent);
        }
        self.refresh_can_drag();
    }

    /// Forward the measured scrollable range and refresh drag-ability
    pub fn apply_content_extents(&self, min: f64, max: f64) {
        if let Some(position) = self.position() {
            position.apply_content_extents(min, max);
        }
        self.refresh_can_drag();
    }

    fn refresh_can_drag(&self) {
        let Some(position) = self.position() else { return };
        let physics = { self.state.lock().unwrap().resolved_physics.clone() };
        let Some(physics) = physics else { return };
        let accept = physics.should_accept_user_offset(&position.metrics());
        self.set_can_drag(accept, self.axis());
    }

    // =========================================================================
    // Gesture wiring
    // =========================================================================

    /// Rebuild the published recognizer set
    ///
    /// A structural no-op when neither `can_drag` nor the axis changed
    /// (the `can_drag == false` case ignores the axis). Otherwise the map
    /// is rebuilt wholesale: empty when dragging is off, exactly one
    /// recognizer keyed by the resolved axis when on. A mounted surface is
    /// hot-swapped in place.
    pub fn set_can_drag(&self, can_drag: bool, axis: Axis) {
        let mut state = self.state.lock().unwrap();
        if can_drag == state.last_can_drag && (!can_drag || Some(axis) == state.last_axis) {
            return;
        }

        let mut map = RecognizerMap::default();
        if can_drag {
            let kind = RecognizerKind::for_axis(axis);
            let core = Arc::clone(&self.core);
            let physics = state.resolved_physics.clone();
            map.insert(
                kind,
                Box::new(move || build_drag_recognizer(kind, &core, physics.as_ref())),
            );
        }
        state.recognizers = map;
        state.last_can_drag = can_drag;
        state.last_axis = Some(axis);
        tracing::debug!(can_drag, ?axis, "gesture recognizers rebuilt");

        if let Some(surface) = &state.surface {
            surface.replace_recognizers(&state.recognizers);
        }
    }

    /// Memoized update of the pointer filter
    pub fn set_ignore_pointer(&self, value: bool) {
        self.gate.set(value);
    }

    /// Mount the gesture detector surface and install current recognizers
    pub fn mount_surface(&self, surface: Arc<GestureSurface>) {
        let mut state = self.state.lock().unwrap();
        surface.replace_recognizers(&state.recognizers);
        state.surface = Some(surface);
    }

    /// Mount the pointer-filter render node; the current flag applies
    /// immediately
    pub fn mount_pointer_filter(&self, node: Arc<PointerFilter>) {
        self.gate.mount(node);
    }
}

fn build_drag_recognizer(
    kind: RecognizerKind,
    core: &Arc<Mutex<CoordinatorCore>>,
    physics: Option<&Arc<dyn ScrollPhysics>>,
) -> DragGestureRecognizer {
    let down_core = Arc::clone(core);
    let start_core = Arc::clone(core);
    let update_core = Arc::clone(core);
    let end_core = Arc::clone(core);
    let cancel_core = Arc::clone(core);
    DragGestureRecognizer::new(kind)
        .on_down(move |details| handle_drag_down(&down_core, details))
        .on_start(move |details| handle_drag_start(&start_core, details))
        .on_update(move |details| handle_drag_update(&update_core, details))
        .on_end(move |details| handle_drag_end(&end_core, details))
        .on_cancel(move || handle_drag_cancel(&cancel_core))
        .min_fling_distance(physics.map(|p| p.min_fling_distance()))
        .min_fling_velocity(physics.map(|p| p.min_fling_velocity()))
        .max_fling_velocity(physics.map(|p| p.max_fling_velocity()))
}

// Pointer-to-activity handlers. Pointer delivery ordering is not fully
// guaranteed (a cancel can arrive mid-gesture, an update after teardown),
// so each handler checks ownership before acting. The slot locks are never
// held across position calls.

fn handle_drag_down(core: &Arc<Mutex<CoordinatorCore>>, _details: DragDownDetails) {
    let position = {
        let owners = core.lock().unwrap();
        debug_assert!(owners.drag.is_none(), "pointer down with a drag outstanding");
        debug_assert!(owners.hold.is_none(), "pointer down with a hold outstanding");
        owners.position.clone()
    };
    let Some(position) = position else { return };
    let release_core = Arc::clone(core);
    let hold = position.hold(move || release_core.lock().unwrap().hold = None);
    core.lock().unwrap().hold = Some(hold);
}

fn handle_drag_start(core: &Arc<Mutex<CoordinatorCore>>, details: DragStartDetails) {
    let position = {
        let owners = core.lock().unwrap();
        debug_assert!(owners.drag.is_none(), "drag start with a drag outstanding");
        owners.position.clone()
    };
    let Some(position) = position else { return };
    let release_core = Arc::clone(core);
    let drag = position.drag(details, move || release_core.lock().unwrap().drag = None);
    // Acquiring the drag released any hold; its callback already cleared
    // that slot.
    let mut owners = core.lock().unwrap();
    owners.drag = Some(drag);
    debug_assert!(owners.hold.is_none(), "hold survived drag acquisition");
}

fn handle_drag_update(core: &Arc<Mutex<CoordinatorCore>>, details: DragUpdateDetails) {
    let drag = {
        let owners = core.lock().unwrap();
        debug_assert!(
            owners.hold.is_none() || owners.drag.is_none(),
            "hold and drag both outstanding"
        );
        owners.drag.clone()
    };
    if let Some(drag) = drag {
        drag.update(details);
    }
}

fn handle_drag_end(core: &Arc<Mutex<CoordinatorCore>>, details: DragEndDetails) {
    let drag = {
        let owners = core.lock().unwrap();
        debug_assert!(
            owners.hold.is_none() || owners.drag.is_none(),
            "hold and drag both outstanding"
        );
        owners.drag.clone()
    };
    if let Some(drag) = drag {
        drag.end(details);
    }
}

fn handle_drag_cancel(core: &Arc<Mutex<CoordinatorCore>>) {
    let (hold, drag) = {
        let owners = core.lock().unwrap();
        debug_assert!(
            owners.hold.is_none() || owners.drag.is_none(),
            "hold and drag both outstanding"
        );
        (owners.hold.clone(), owners.drag.clone())
    };
    if let Some(hold) = hold {
        hold.cancel();
    }
    if let Some(drag) = drag {
        drag.cancel();
    }
}

// ============================================================================
// Scope propagation
// ============================================================================

/// Snapshot of `(coordinator, position)` exposed to descendants
#[derive(Clone)]
pub struct ScrollScope {
    scrollable: ScrollableState,
    position: ScrollPosition,
}

impl ScrollScope {
    /// Snapshot the coordinator's current position
    pub fn of(scrollable: &ScrollableState) -> Option<ScrollScope> {
        scrollable.position().map(|position| ScrollScope {
            scrollable: scrollable.clone(),
            position,
        })
    }

    pub fn scrollable(&self) -> &ScrollableState {
        &self.scrollable
    }

    pub fn position(&self) -> &ScrollPosition {
        &self.position
    }

    /// Whether dependents of `old` must re-resolve against this snapshot
    ///
    /// Only a position identity change invalidates; offset mutations are
    /// observed through the position's own listeners instead.
    pub fn should_notify(&self, old: &ScrollScope) -> bool {
        !self.position.same_position(&old.position)
    }
}

/// Explicit stack of enclosing scroll scopes, innermost last
///
/// Stands in for tree-based inheritance: traversal code pushes a scope per
/// scrollable it descends through and hands the context to descendants.
#[derive(Clone, Default)]
pub struct ScrollContext {
    scopes: Vec<ScrollScope>,
}

impl ScrollContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: ScrollScope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<ScrollScope> {
        self.scopes.pop()
    }

    /// The nearest enclosing scope, if any
    pub fn nearest(&self) -> Option<&ScrollScope> {
        self.scopes.last()
    }

    /// Enclosing scopes from innermost to outermost
    pub fn enclosing(&self) -> impl Iterator<Item = &ScrollScope> + '_ {
        self.scopes.iter().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }
}

// ============================================================================
// Ensure-visible traversal
// ============================================================================

/// Geometry lookup for the target of an ensure-visible operation
///
/// Implementors map the target into each enclosing viewport's content
/// coordinates; returning `None` skips that level.
pub trait VisibleTarget {
    fn span_in(&self, position: &ScrollPosition) -> Option<Span>;
}

impl<F> VisibleTarget for F
where
    F: Fn(&ScrollPosition) -> Option<Span>,
{
    fn span_in(&self, position: &ScrollPosition) -> Option<Span> {
        self(position)
    }
}

/// Scroll every enclosing scrollable until `target` is visible
///
/// Walks the context innermost to outermost, starting one reveal animation
/// per level; all levels animate concurrently and the returned handle
/// resolves once every level has finished. With no enclosing scrollables
/// or a zero duration the handle is already resolved. A single
/// participating level's own completion handle is returned directly,
/// without join wrapping.
pub fn ensure_visible(
    context: &ScrollContext,
    target: &dyn VisibleTarget,
    alignment: f64,
    duration: Duration,
    easing: Easing,
) -> AnimationHandle {
    let mut handles: SmallVec<[AnimationHandle; 2]> = SmallVec::new();
    for scope in context.enclosing() {
        if let Some(span) = target.span_in(scope.position()) {
            handles.push(
                scope
                    .position()
                    .ensure_visible(span, alignment, duration, easing),
            );
        }
    }

    if handles.is_empty() || duration.is_zero() {
        return AnimationHandle::resolved(AnimationStatus::Completed);
    }
    if handles.len() == 1 {
        return handles.pop().unwrap();
    }
    AnimationHandle::join(handles)
}
