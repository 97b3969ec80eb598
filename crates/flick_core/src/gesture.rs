//! Drag gesture recognizer registry
//!
//! A scroll coordinator does not hit-test pointers itself; it publishes a
//! map of recognizer factories keyed by [`RecognizerKind`] and the platform
//! shell instantiates them on a [`GestureSurface`]. The surface supports
//! wholesale recognizer replacement so a coordinator can hot-swap its
//! gesture configuration without rebuilding the surface.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use crate::events::{DragDownDetails, DragEndDetails, DragStartDetails, DragUpdateDetails};
use crate::geometry::Axis;

/// The kind of drag recognizer, keyed by the axis it tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecognizerKind {
    VerticalDrag,
    HorizontalDrag,
}

impl RecognizerKind {
    /// The recognizer kind tracking the given axis
    pub fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Vertical => RecognizerKind::VerticalDrag,
            Axis::Horizontal => RecognizerKind::HorizontalDrag,
        }
    }

    /// The axis this recognizer tracks
    pub fn axis(self) -> Axis {
        match self {
            RecognizerKind::VerticalDrag => Axis::Vertical,
            RecognizerKind::HorizontalDrag => Axis::Horizontal,
        }
    }
}

type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;

/// A single-axis drag recognizer
///
/// Carries the five gesture callbacks plus optional fling tuning pulled
/// from the owning scrollable's physics. The recognition machinery itself
/// (touch slop, arena membership) lives in the platform shell; this type is
/// the configured endpoint it dispatches into.
pub struct DragGestureRecognizer {
    kind: RecognizerKind,
    on_down: Option<Handler<DragDownDetails>>,
    on_start: Option<Handler<DragStartDetails>>,
    on_update: Option<Handler<DragUpdateDetails>>,
    on_end: Option<Handler<DragEndDetails>>,
    on_cancel: Option<Arc<dyn Fn() + Send + Sync>>,
    /// Minimum travel before a fling is considered, unset = shell default
    pub min_fling_distance: Option<f64>,
    /// Minimum release velocity for a fling, unset = shell default
    pub min_fling_velocity: Option<f64>,
    /// Cap applied to release velocity, unset = shell default
    pub max_fling_velocity: Option<f64>,
}

impl DragGestureRecognizer {
    pub fn new(kind: RecognizerKind) -> Self {
        Self {
            kind,
            on_down: None,
            on_start: None,
            on_update: None,
            on_end: None,
            on_cancel: None,
            min_fling_distance: None,
            min_fling_velocity: None,
            max_fling_velocity: None,
        }
    }

    pub fn kind(&self) -> RecognizerKind {
        self.kind
    }

    pub fn on_down(mut self, f: impl Fn(DragDownDetails) + Send + Sync + 'static) -> Self {
        self.on_down = Some(Arc::new(f));
        self
    }

    pub fn on_start(mut self, f: impl Fn(DragStartDetails) + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_update(mut self, f: impl Fn(DragUpdateDetails) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Arc::new(f));
        self
    }

    pub fn on_end(mut self, f: impl Fn(DragEndDetails) + Send + Sync + 'static) -> Self {
        self.on_end = Some(Arc::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(f));
        self
    }

    pub fn min_fling_distance(mut self, value: Option<f64>) -> Self {
        self.min_fling_distance = value;
        self
    }

    pub fn min_fling_velocity(mut self, value: Option<f64>) -> Self {
        self.min_fling_velocity = value;
        self
    }

    pub fn max_fling_velocity(mut self, value: Option<f64>) -> Self {
        self.max_fling_velocity = value;
        self
    }

    // Dispatch entry points, invoked by the platform shell once the
    // recognizer wins its gesture.

    pub fn down(&self, details: DragDownDetails) {
        if let Some(handler) = &self.on_down {
            handler(details);
        }
    }

    pub fn start(&self, details: DragStartDetails) {
        if let Some(handler) = &self.on_start {
            handler(details);
        }
    }

    pub fn update(&self, details: DragUpdateDetails) {
        if let Some(handler) = &self.on_update {
            handler(details);
        }
    }

    pub fn end(&self, details: DragEndDetails) {
        if let Some(handler) = &self.on_end {
            handler(details);
        }
    }

    pub fn cancel(&self) {
        if let Some(handler) = &self.on_cancel {
            handler();
        }
    }
}

/// Factory producing a configured recognizer
pub type DragRecognizerFactory = Box<dyn Fn() -> DragGestureRecognizer + Send + Sync>;

/// Recognizer factories keyed by kind
pub type RecognizerMap = FxHashMap<RecognizerKind, DragRecognizerFactory>;

/// A mounted gesture detector holding live recognizers
///
/// Replacement is wholesale: the previous recognizer set is dropped and the
/// new factories are instantiated in one step. Dispatch clones the target
/// handler out of the lock before invoking it, so handlers are free to
/// re-enter the surface (e.g. a handler that reconfigures gestures).
pub struct GestureSurface {
    active: Mutex<FxHashMap<RecognizerKind, DragGestureRecognizer>>,
    generation: AtomicU64,
}

impl GestureSurface {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(FxHashMap::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace all live recognizers from the given factory map
    pub fn replace_recognizers(&self, factories: &RecognizerMap) {
        let mut rebuilt = FxHashMap::default();
        for (kind, factory) in factories {
            rebuilt.insert(*kind, factory());
        }
        let count = rebuilt.len();
        *self.active.lock().unwrap() = rebuilt;
        self.generation.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(count, "replaced gesture recognizers");
    }

    /// Number of wholesale replacements performed so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Kinds of the currently mounted recognizers
    pub fn kinds(&self) -> Vec<RecognizerKind> {
        self.active.lock().unwrap().keys().copied().collect()
    }

    /// Fling tuning of the mounted recognizer for `kind`, if any
    pub fn fling_tuning(&self, kind: RecognizerKind) -> Option<(Option<f64>, Option<f64>, Option<f64>)> {
        self.active.lock().unwrap().get(&kind).map(|r| {
            (
                r.min_fling_distance,
                r.min_fling_velocity,
                r.max_fling_velocity,
            )
        })
    }

    /// Dispatch a pointer-down to the recognizer for `kind`
    ///
    /// Returns false when no recognizer of that kind is mounted.
    pub fn drag_down(&self, kind: RecognizerKind, details: DragDownDetails) -> bool {
        let handler = self.active.lock().unwrap().get(&kind).and_then(|r| r.on_down.clone());
        match handler {
            Some(handler) => {
                handler(details);
                true
            }
            None => false,
        }
    }

    pub fn drag_start(&self, kind: RecognizerKind, details: DragStartDetails) -> bool {
        let handler = self.active.lock().unwrap().get(&kind).and_then(|r| r.on_start.clone());
        match handler {
            Some(handler) => {
                handler(details);
                true
            }
            None => false,
        }
    }

    pub fn drag_update(&self, kind: RecognizerKind, details: DragUpdateDetails) -> bool {
        let handler = self.active.lock().unwrap().get(&kind).and_then(|r| r.on_update.clone());
        match handler {
            Some(handler) => {
                handler(details);
                true
            }
            None => false,
        }
    }

    pub fn drag_end(&self, kind: RecognizerKind, details: DragEndDetails) -> bool {
        let handler = self.active.lock().unwrap().get(&kind).and_then(|r| r.on_end.clone());
        match handler {
            Some(handler) => {
                handler(details);
                true
            }
            None => false,
        }
    }

    pub fn drag_cancel(&self, kind: RecognizerKind) -> bool {
        let handler = self.active.lock().unwrap().get(&kind).and_then(|r| r.on_cancel.clone());
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }
}

impl Default for GestureSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn vertical_factory(counter: Arc<AtomicU32>) -> DragRecognizerFactory {
        Box::new(move || {
            let counter = Arc::clone(&counter);
            DragGestureRecognizer::new(RecognizerKind::VerticalDrag)
                .on_down(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .min_fling_velocity(Some(50.0))
        })
    }

    #[test]
    fn test_replace_installs_recognizers() {
        let surface = GestureSurface::new();
        let counter = Arc::new(AtomicU32::new(0));

        let mut factories = RecognizerMap::default();
        factories.insert(RecognizerKind::VerticalDrag, vertical_factory(counter));
        surface.replace_recognizers(&factories);

        assert_eq!(surface.kinds(), vec![RecognizerKind::VerticalDrag]);
        assert_eq!(surface.generation(), 1);
    }

    #[test]
    fn test_replace_with_empty_clears() {
        let surface = GestureSurface::new();
        let counter = Arc::new(AtomicU32::new(0));

        let mut factories = RecognizerMap::default();
        factories.insert(RecognizerKind::VerticalDrag, vertical_factory(counter));
        surface.replace_recognizers(&factories);
        surface.replace_recognizers(&RecognizerMap::default());

        assert!(surface.kinds().is_empty());
        assert_eq!(surface.generation(), 2);
    }

    #[test]
    fn test_dispatch_reaches_handler() {
        let surface = GestureSurface::new();
        let counter = Arc::new(AtomicU32::new(0));

        let mut factories = RecognizerMap::default();
        factories.insert(
            RecognizerKind::VerticalDrag,
            vertical_factory(Arc::clone(&counter)),
        );
        surface.replace_recognizers(&factories);

        assert!(surface.drag_down(RecognizerKind::VerticalDrag, DragDownDetails::default()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // No horizontal recognizer mounted
        assert!(!surface.drag_down(RecognizerKind::HorizontalDrag, DragDownDetails::default()));
    }

    #[test]
    fn test_fling_tuning_passthrough() {
        let surface = GestureSurface::new();
        let counter = Arc::new(AtomicU32::new(0));

        let mut factories = RecognizerMap::default();
        factories.insert(RecognizerKind::VerticalDrag, vertical_factory(counter));
        surface.replace_recognizers(&factories);

        let (distance, min_velocity, max_velocity) =
            surface.fling_tuning(RecognizerKind::VerticalDrag).unwrap();
        assert_eq!(distance, None);
        assert_eq!(min_velocity, Some(50.0));
        assert_eq!(max_velocity, None);
    }

    #[test]
    fn test_kind_axis_round_trip() {
        assert_eq!(RecognizerKind::for_axis(Axis::Vertical).axis(), Axis::Vertical);
        assert_eq!(
            RecognizerKind::for_axis(Axis::Horizontal),
            RecognizerKind::HorizontalDrag
        );
    }
}
