//! Flick Core Primitives
//!
//! This crate provides the foundational primitives for the Flick scrollable
//! subsystem:
//!
//! - **Axis Geometry**: scroll axes, directed axes, and content spans
//! - **Pointer Events**: drag gesture detail payloads and velocity
//! - **Gesture Wiring**: the drag-recognizer registry consumed by scroll
//!   coordinators
//! - **Render Hooks**: the pointer-filtering node toggled during
//!   externally-driven animations

pub mod events;
pub mod geometry;
pub mod gesture;
pub mod render;

pub use events::{DragDownDetails, DragEndDetails, DragStartDetails, DragUpdateDetails, Velocity};
pub use geometry::{Axis, AxisDirection, Span};
pub use gesture::{
    DragGestureRecognizer, DragRecognizerFactory, GestureSurface, RecognizerKind, RecognizerMap,
};
pub use render::PointerFilter;
