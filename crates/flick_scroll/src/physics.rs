//! Scroll physics strategies
//!
//! A [`ScrollPhysics`] decides how user deltas apply near the boundary,
//! when a released drag turns into a fling, and what simulation drives the
//! position afterwards. Physics compose into chains: a locally supplied
//! strategy wraps the ambient default via [`ScrollPhysics::apply_to`] and
//! may delegate unhandled decisions to its parent.
//!
//! Strategies carry a [`PhysicsKind`] tag. Reconfiguration compares chains
//! by walking kind tags only (see [`chains_match`]); tunables of the same
//! kind are deliberately not compared.

use std::sync::Arc;

use flick_animation::{FrictionSimulation, Simulation, SpringConfig, SpringSimulation};
use flick_core::AxisDirection;

/// Default minimum release velocity for a fling, pixels/second
pub const MIN_FLING_VELOCITY: f64 = 50.0;
/// Default cap on fling velocity, pixels/second
pub const MAX_FLING_VELOCITY: f64 = 8000.0;
/// Default minimum travel before a release may fling, pixels
pub const MIN_FLING_DISTANCE: f64 = 18.0;

/// Read-only view of a position, consumed by physics decisions
#[derive(Debug, Clone, Copy)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub min_offset: f64,
    pub max_offset: f64,
    pub viewport_extent: f64,
    pub axis_direction: AxisDirection,
}

impl ScrollMetrics {
    /// Signed distance past the boundary; zero when in range
    pub fn boundary_excess(&self) -> f64 {
        if self.offset < self.min_offset {
            self.offset - self.min_offset
        } else if self.offset > self.max_offset {
            self.offset - self.max_offset
        } else {
            0.0
        }
    }

    pub fn out_of_range(&self) -> bool {
        self.boundary_excess() != 0.0
    }

    /// The boundary closest to the current offset
    pub fn nearest_bound(&self) -> f64 {
        self.offset.clamp(self.min_offset, self.max_offset)
    }

    /// Whether there is any range to scroll over
    pub fn has_scrollable_range(&self) -> bool {
        self.max_offset > self.min_offset
    }
}

/// Tag identifying a physics strategy for structural chain comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsKind {
    Clamping,
    Bouncing,
    NeverScrollable,
}

/// A scroll physics strategy
///
/// Default methods delegate to the parent link and fall back to permissive
/// behavior at the end of the chain, so a strategy only overrides the
/// decisions it owns.
pub trait ScrollPhysics: Send + Sync {
    /// The strategy's kind tag
    fn kind(&self) -> PhysicsKind;

    /// The next link in the chain, if any
    fn parent(&self) -> Option<&Arc<dyn ScrollPhysics>>;

    /// Rebuild this strategy with a different parent link
    fn with_parent(&self, parent: Option<Arc<dyn ScrollPhysics>>) -> Arc<dyn ScrollPhysics>;

    /// Compose this strategy over `ancestor`, preserving any existing chain
    fn apply_to(&self, ancestor: Option<Arc<dyn ScrollPhysics>>) -> Arc<dyn ScrollPhysics> {
        let parent = match self.parent() {
            Some(parent) => Some(parent.apply_to(ancestor)),
            None => ancestor,
        };
        self.with_parent(parent)
    }

    /// Whether user drags should move the position at all
    fn should_accept_user_offset(&self, metrics: &ScrollMetrics) -> bool {
        match self.parent() {
            Some(parent) => parent.should_accept_user_offset(metrics),
            None => metrics.has_scrollable_range(),
        }
    }

    /// Transform a user drag delta (scroll space) before it is applied
    fn apply_user_offset(&self, metrics: &ScrollMetrics, delta: f64) -> f64 {
        match self.parent() {
            Some(parent) => parent.apply_user_offset(metrics, delta),
            None => delta,
        }
    }

    /// Excess of a proposed offset past the allowed range; the position
    /// subtracts the excess before committing
    fn apply_boundary_conditions(&self, metrics: &ScrollMetrics, proposed: f64) -> f64 {
        match self.parent() {
            Some(parent) => parent.apply_boundary_conditions(metrics, proposed),
            None => 0.0,
        }
    }

    /// Simulation to run after a drag releases with `velocity`, or `None`
    /// to settle immediately
    fn create_ballistic_simulation(
        &self,
        metrics: &ScrollMetrics,
        velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        match self.parent() {
            Some(parent) => parent.create_ballistic_simulation(metrics, velocity),
            None => None,
        }
    }

    fn min_fling_velocity(&self) -> f64 {
        self.parent()
            .map_or(MIN_FLING_VELOCITY, |parent| parent.min_fling_velocity())
    }

    fn max_fling_velocity(&self) -> f64 {
        self.parent()
            .map_or(MAX_FLING_VELOCITY, |parent| parent.max_fling_velocity())
    }

    fn min_fling_distance(&self) -> f64 {
        self.parent()
            .map_or(MIN_FLING_DISTANCE, |parent| parent.min_fling_distance())
    }
}

/// Structural comparison of two physics chains by kind tags
///
/// True only when both chains have the same length and every link's kind
/// matches. Tunables are ignored: two same-kind chains with different
/// deceleration compare equal.
pub fn chains_match(
    a: Option<&Arc<dyn ScrollPhysics>>,
    b: Option<&Arc<dyn ScrollPhysics>>,
) -> bool {
    let mut a = a.cloned();
    let mut b = b.cloned();
    loop {
        match (a.take(), b.take()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if x.kind() != y.kind() {
                    return false;
                }
                a = x.parent().cloned();
                b = y.parent().cloned();
            }
            _ => return false,
        }
    }
}

// ============================================================================
// Clamping physics
// ============================================================================

/// Physics that hard-stops at the content boundary
pub struct ClampingScrollPhysics {
    parent: Option<Arc<dyn ScrollPhysics>>,
    /// Fling deceleration in pixels/second²
    pub deceleration: f64,
    /// Velocity below which a fling settles, pixels/second
    pub settle_velocity: f64,
}

impl ClampingScrollPhysics {
    pub fn new() -> Self {
        Self {
            parent: None,
            deceleration: 1500.0,
            settle_velocity: 10.0,
        }
    }
}

impl Default for ClampingScrollPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollPhysics for ClampingScrollPhysics {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::Clamping
    }

    fn parent(&self) -> Option<&Arc<dyn ScrollPhysics>> {
        self.parent.as_ref()
    }

    fn with_parent(&self, parent: Option<Arc<dyn ScrollPhysics>>) -> Arc<dyn ScrollPhysics> {
        Arc::new(Self {
            parent,
            deceleration: self.deceleration,
            settle_velocity: self.settle_velocity,
        })
    }

    fn apply_boundary_conditions(&self, metrics: &ScrollMetrics, proposed: f64) -> f64 {
        if proposed < metrics.min_offset {
            proposed - metrics.min_offset
        } else if proposed > metrics.max_offset {
            proposed - metrics.max_offset
        } else {
            0.0
        }
    }

    fn create_ballistic_simulation(
        &self,
        metrics: &ScrollMetrics,
        velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        if metrics.out_of_range() {
            // Clamping positions are never left out of range by drags; a
            // programmatic jump past the edge still snaps back cleanly.
            return Some(Box::new(SpringSimulation::new(
                SpringConfig::stiff(),
                metrics.offset,
                metrics.nearest_bound(),
                velocity,
            )));
        }
        if velocity.abs() < self.settle_velocity {
            return None;
        }
        Some(Box::new(ClampedFrictionSimulation::new(
            FrictionSimulation::new(metrics.offset, velocity, self.deceleration, self.settle_velocity),
            metrics.min_offset,
            metrics.max_offset,
        )))
    }
}

/// Friction coast that stops dead at the range boundary
struct ClampedFrictionSimulation {
    friction: FrictionSimulation,
    min: f64,
    max: f64,
    stopped_at: Option<f64>,
}

impl ClampedFrictionSimulation {
    fn new(friction: FrictionSimulation, min: f64, max: f64) -> Self {
        Self {
            friction,
            min,
            max,
            stopped_at: None,
        }
    }
}

impl Simulation for ClampedFrictionSimulation {
    fn step(&mut self, dt: f64) {
        if self.stopped_at.is_some() {
            return;
        }
        self.friction.step(dt);
        let value = self.friction.value();
        if value <= self.min {
            self.stopped_at = Some(self.min);
        } else if value >= self.max {
            self.stopped_at = Some(self.max);
        }
    }

    fn value(&self) -> f64 {
        self.stopped_at.unwrap_or_else(|| self.friction.value())
    }

    fn velocity(&self) -> f64 {
        if self.stopped_at.is_some() {
            0.0
        } else {
            self.friction.velocity()
        }
    }

    fn is_settled(&self) -> bool {
        self.stopped_at.is_some() || self.friction.is_settled()
    }
}

// ============================================================================
// Bouncing physics
// ============================================================================

/// Physics with elastic overscroll and spring snap-back
pub struct BouncingScrollPhysics {
    parent: Option<Arc<dyn ScrollPhysics>>,
    /// Fling deceleration in pixels/second²
    pub deceleration: f64,
    /// Velocity below which a fling settles, pixels/second
    pub settle_velocity: f64,
    /// Spring used for boundary snap-back
    pub spring: SpringConfig,
    /// Maximum overscroll as a fraction of the viewport extent
    pub max_overscroll: f64,
}

impl BouncingScrollPhysics {
    pub fn new() -> Self {
        Self {
            parent: None,
            deceleration: 1500.0,
            settle_velocity: 10.0,
            spring: SpringConfig::stiff(),
            max_overscroll: 0.3,
        }
    }

    /// Wobblier snap-back preset
    pub fn gentle() -> Self {
        Self {
            spring: SpringConfig::gentle(),
            ..Self::new()
        }
    }

    fn overscroll_limit(&self, metrics: &ScrollMetrics) -> f64 {
        (metrics.viewport_extent * self.max_overscroll).max(1.0)
    }
}

impl Default for BouncingScrollPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollPhysics for BouncingScrollPhysics {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::Bouncing
    }

    fn parent(&self) -> Option<&Arc<dyn ScrollPhysics>> {
        self.parent.as_ref()
    }

    fn with_parent(&self, parent: Option<Arc<dyn ScrollPhysics>>) -> Arc<dyn ScrollPhysics> {
        Arc::new(Self {
            parent,
            deceleration: self.deceleration,
            settle_velocity: self.settle_velocity,
            spring: self.spring,
            max_overscroll: self.max_overscroll,
        })
    }

    fn should_accept_user_offset(&self, _metrics: &ScrollMetrics) -> bool {
        // Bouncing surfaces always respond to drags, even with nothing to
        // scroll: the rubber band is the feedback.
        true
    }

    fn apply_user_offset(&self, metrics: &ScrollMetrics, delta: f64) -> f64 {
        let excess = metrics.boundary_excess();
        let pushing_further = (excess > 0.0 && delta > 0.0) || (excess < 0.0 && delta < 0.0);
        if !pushing_further {
            return delta;
        }
        // Resistance increases as the overscroll stretches further.
        let limit = self.overscroll_limit(metrics);
        let stretch = (excess.abs() / limit).min(1.0);
        let resistance = 0.55 - stretch * 0.45;
        delta * resistance
    }

    fn apply_boundary_conditions(&self, metrics: &ScrollMetrics, proposed: f64) -> f64 {
        let limit = self.overscroll_limit(metrics);
        let floor = metrics.min_offset - limit;
        let ceiling = metrics.max_offset + limit;
        if proposed < floor {
            proposed - floor
        } else if proposed > ceiling {
            proposed - ceiling
        } else {
            0.0
        }
    }

    fn create_ballistic_simulation(
        &self,
        metrics: &ScrollMetrics,
        velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        if metrics.out_of_range() {
            return Some(Box::new(SpringSimulation::new(
                self.spring,
                metrics.offset,
                metrics.nearest_bound(),
                velocity,
            )));
        }
        if velocity.abs() < self.settle_velocity {
            return None;
        }
        Some(Box::new(BouncingBallisticSimulation::new(
            FrictionSimulation::new(metrics.offset, velocity, self.deceleration, self.settle_velocity),
            metrics.min_offset,
            metrics.max_offset,
            self.spring,
        )))
    }
}

enum BouncePhase {
    Coasting(FrictionSimulation),
    Springing(SpringSimulation),
}

/// Friction coast that hands off to a spring when it leaves the range
struct BouncingBallisticSimulation {
    phase: BouncePhase,
    min: f64,
    max: f64,
    spring: SpringConfig,
}

impl BouncingBallisticSimulation {
    fn new(friction: FrictionSimulation, min: f64, max: f64, spring: SpringConfig) -> Self {
        Self {
            phase: BouncePhase::Coasting(friction),
            min,
            max,
            spring,
        }
    }
}

impl Simulation for BouncingBallisticSimulation {
    fn step(&mut self, dt: f64) {
        let handoff = match &mut self.phase {
            BouncePhase::Coasting(friction) => {
                friction.step(dt);
                let value = friction.value();
                if value < self.min || value > self.max {
                    let bound = if value < self.min { self.min } else { self.max };
                    Some(SpringSimulation::new(
                        self.spring,
                        value,
                        bound,
                        friction.velocity(),
                    ))
                } else {
                    None
                }
            }
            BouncePhase::Springing(spring) => {
                spring.step(dt);
                None
            }
        };
        if let Some(spring) = handoff {
            self.phase = BouncePhase::Springing(spring);
        }
    }

    fn value(&self) -> f64 {
        match &self.phase {
            BouncePhase::Coasting(friction) => friction.value(),
            BouncePhase::Springing(spring) => spring.value(),
        }
    }

    fn velocity(&self) -> f64 {
        match &self.phase {
            BouncePhase::Coasting(friction) => friction.velocity(),
            BouncePhase::Springing(spring) => spring.velocity(),
        }
    }

    fn is_settled(&self) -> bool {
        match &self.phase {
            BouncePhase::Coasting(friction) => friction.is_settled(),
            BouncePhase::Springing(spring) => spring.is_settled(),
        }
    }
}

// ============================================================================
// Never-scrollable physics
// ============================================================================

/// Physics refusing all user-driven motion
pub struct NeverScrollablePhysics {
    parent: Option<Arc<dyn ScrollPhysics>>,
}

impl NeverScrollablePhysics {
    pub fn new() -> Self {
        Self { parent: None }
    }
}

impl Default for NeverScrollablePhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollPhysics for NeverScrollablePhysics {
    fn kind(&self) -> PhysicsKind {
        PhysicsKind::NeverScrollable
    }

    fn parent(&self) -> Option<&Arc<dyn ScrollPhysics>> {
        self.parent.as_ref()
    }

    fn with_parent(&self, parent: Option<Arc<dyn ScrollPhysics>>) -> Arc<dyn ScrollPhysics> {
        Arc::new(Self { parent })
    }

    fn should_accept_user_offset(&self, _metrics: &ScrollMetrics) -> bool {
        false
    }

    fn apply_user_offset(&self, _metrics: &ScrollMetrics, _delta: f64) -> f64 {
        0.0
    }

    fn create_ballistic_simulation(
        &self,
        _metrics: &ScrollMetrics,
        _velocity: f64,
    ) -> Option<Box<dyn Simulation>> {
        None
    }
}

// ============================================================================
// Ambient behavior
// ============================================================================

/// Ambient scroll configuration supplying the default physics
///
/// A scrollable resolves its effective physics as the behavior's default,
/// optionally wrapped by locally supplied physics via `apply_to`.
#[derive(Clone)]
pub struct ScrollBehavior {
    physics: Arc<dyn ScrollPhysics>,
}

impl ScrollBehavior {
    /// Elastic overscroll default
    pub fn bouncing() -> Self {
        Self {
            physics: Arc::new(BouncingScrollPhysics::new()),
        }
    }

    /// Hard-boundary default
    pub fn clamping() -> Self {
        Self {
            physics: Arc::new(ClampingScrollPhysics::new()),
        }
    }

    /// Behavior with an explicit default physics
    pub fn with_physics(physics: Arc<dyn ScrollPhysics>) -> Self {
        Self { physics }
    }

    /// The default physics for scrollables under this behavior
    pub fn physics(&self) -> Arc<dyn ScrollPhysics> {
        Arc::clone(&self.physics)
    }
}

impl Default for ScrollBehavior {
    fn default() -> Self {
        Self::bouncing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(offset: f64) -> ScrollMetrics {
        ScrollMetrics {
            offset,
            min_offset: 0.0,
            max_offset: 600.0,
            viewport_extent: 400.0,
            axis_direction: AxisDirection::Down,
        }
    }

    fn chain(kinds: &[PhysicsKind]) -> Option<Arc<dyn ScrollPhysics>> {
        // Builds head-first: kinds[0] is the outermost link
        let mut chain: Option<Arc<dyn ScrollPhysics>> = None;
        for kind in kinds.iter().rev() {
            let link: Arc<dyn ScrollPhysics> = match kind {
                PhysicsKind::Clamping => Arc::new(ClampingScrollPhysics::new()),
                PhysicsKind::Bouncing => Arc::new(BouncingScrollPhysics::new()),
                PhysicsKind::NeverScrollable => Arc::new(NeverScrollablePhysics::new()),
            };
            chain = Some(link.apply_to(chain));
        }
        chain
    }

    #[test]
    fn test_chains_match_same_kinds_different_instances() {
        let old = chain(&[PhysicsKind::Bouncing, PhysicsKind::Clamping]);
        let new = chain(&[PhysicsKind::Bouncing, PhysicsKind::Clamping]);
        assert!(chains_match(new.as_ref(), old.as_ref()));
    }

    #[test]
    fn test_chains_match_rejects_different_shape() {
        let old = chain(&[PhysicsKind::Bouncing, PhysicsKind::Clamping]);
        let new = chain(&[PhysicsKind::Clamping]);
        assert!(!chains_match(new.as_ref(), old.as_ref()));
        assert!(!chains_match(new.as_ref(), None));
        assert!(chains_match(None, None));
    }

    #[test]
    fn test_chains_match_ignores_tunables() {
        let mut fast = ClampingScrollPhysics::new();
        fast.deceleration = 9000.0;
        let a: Arc<dyn ScrollPhysics> = Arc::new(fast);
        let b: Arc<dyn ScrollPhysics> = Arc::new(ClampingScrollPhysics::new());
        assert!(chains_match(Some(&a), Some(&b)));
    }

    #[test]
    fn test_apply_to_builds_chain() {
        let ambient = ScrollBehavior::clamping().physics();
        let local = BouncingScrollPhysics::new();
        let composed = local.apply_to(Some(ambient));

        assert_eq!(composed.kind(), PhysicsKind::Bouncing);
        assert_eq!(composed.parent().unwrap().kind(), PhysicsKind::Clamping);
        assert!(composed.parent().unwrap().parent().is_none());
    }

    #[test]
    fn test_clamping_boundary_excess() {
        let physics = ClampingScrollPhysics::new();
        let m = metrics(0.0);
        assert_eq!(physics.apply_boundary_conditions(&m, -25.0), -25.0);
        assert_eq!(physics.apply_boundary_conditions(&m, 650.0), 50.0);
        assert_eq!(physics.apply_boundary_conditions(&m, 300.0), 0.0);
    }

    #[test]
    fn test_bouncing_rubber_band_resists_overscroll() {
        let physics = BouncingScrollPhysics::new();

        // In range: full delta
        assert_eq!(physics.apply_user_offset(&metrics(300.0), -20.0), -20.0);

        // Past the leading edge, pushing further out: reduced
        let applied = physics.apply_user_offset(&metrics(-40.0), -20.0);
        assert!(applied > -20.0 && applied < 0.0);

        // Past the leading edge, pulling back in: full delta
        assert_eq!(physics.apply_user_offset(&metrics(-40.0), 20.0), 20.0);
    }

    #[test]
    fn test_bouncing_allows_bounded_overscroll() {
        let physics = BouncingScrollPhysics::new();
        let m = metrics(0.0);
        let limit = 400.0 * 0.3;

        assert_eq!(physics.apply_boundary_conditions(&m, -10.0), 0.0);
        let excess = physics.apply_boundary_conditions(&m, -(limit + 50.0));
        assert!((excess - -50.0).abs() < 1e-9);
    }

    #[test]
    fn test_ballistic_below_threshold_is_none() {
        let physics = ClampingScrollPhysics::new();
        assert!(physics
            .create_ballistic_simulation(&metrics(100.0), 5.0)
            .is_none());
        assert!(physics
            .create_ballistic_simulation(&metrics(100.0), 300.0)
            .is_some());
    }

    #[test]
    fn test_bouncing_out_of_range_snaps_back() {
        let physics = BouncingScrollPhysics::new();
        let mut sim = physics
            .create_ballistic_simulation(&metrics(-60.0), 0.0)
            .expect("overscrolled position must snap back");

        for _ in 0..2000 {
            if sim.is_settled() {
                break;
            }
            sim.step(1.0 / 120.0);
        }
        assert!(sim.is_settled());
        assert!((sim.value() - 0.0).abs() < 0.1);
    }

    #[test]
    fn test_clamped_fling_stops_at_boundary() {
        let physics = ClampingScrollPhysics::new();
        // Close to the trailing edge with a big fling
        let mut sim = physics
            .create_ballistic_simulation(&metrics(550.0), 2000.0)
            .unwrap();

        for _ in 0..2000 {
            if sim.is_settled() {
                break;
            }
            sim.step(1.0 / 120.0);
        }
        assert_eq!(sim.value(), 600.0);
        assert_eq!(sim.velocity(), 0.0);
    }

    #[test]
    fn test_bouncing_fling_overshoots_then_returns() {
        let physics = BouncingScrollPhysics::new();
        let mut sim = physics
            .create_ballistic_simulation(&metrics(550.0), 2000.0)
            .unwrap();

        let mut overshot = false;
        for _ in 0..4000 {
            if sim.is_settled() {
                break;
            }
            sim.step(1.0 / 120.0);
            if sim.value() > 600.0 {
                overshot = true;
            }
        }
        assert!(overshot, "bouncing fling should pass the boundary");
        assert!((sim.value() - 600.0).abs() < 0.1);
    }

    #[test]
    fn test_never_scrollable_refuses_motion() {
        let physics = NeverScrollablePhysics::new();
        assert!(!physics.should_accept_user_offset(&metrics(0.0)));
        assert_eq!(physics.apply_user_offset(&metrics(0.0), -20.0), 0.0);
        assert!(physics
            .create_ballistic_simulation(&metrics(0.0), 500.0)
            .is_none());
    }

    #[test]
    fn test_fling_thresholds_delegate_to_chain_defaults() {
        let composed = BouncingScrollPhysics::new()
            .apply_to(Some(ScrollBehavior::clamping().physics()));
        assert_eq!(composed.min_fling_velocity(), MIN_FLING_VELOCITY);
        assert_eq!(composed.max_fling_velocity(), MAX_FLING_VELOCITY);
        assert_eq!(composed.min_fling_distance(), MIN_FLING_DISTANCE);
    }
}
