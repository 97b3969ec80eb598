//! Flick Animation System
//!
//! Easing curves, physics simulations, and frame scheduling for the Flick
//! scrollable subsystem.
//!
//! # Features
//!
//! - **Easing**: curve evaluation for duration-driven animations
//! - **Simulations**: friction and spring steppers for ballistic motion
//! - **Frame Scheduler**: per-frame tickers plus a deferred microtask queue
//! - **Completion Handles**: futures resolving when an animation settles,
//!   with join semantics for multi-level operations

pub mod easing;
pub mod handle;
pub mod scheduler;
pub mod simulation;

pub use easing::Easing;
pub use handle::{AnimationCompleter, AnimationHandle, AnimationStatus};
pub use scheduler::{FrameScheduler, TickerId, WeakScheduler};
pub use simulation::{FrictionSimulation, Simulation, SpringConfig, SpringSimulation};
