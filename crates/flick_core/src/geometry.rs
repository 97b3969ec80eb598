//! Axis geometry for scrollable surfaces

/// Scroll axis for a scrollable surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Vertical scrolling (default)
    #[default]
    Vertical,
    /// Horizontal scrolling
    Horizontal,
}

/// Directed scroll axis
///
/// The direction names the edge the content grows toward: `Down` is a
/// regular vertical list, `Up` a reversed one, and similarly for
/// `Right`/`Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisDirection {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl AxisDirection {
    /// The undirected axis this direction lies on
    pub fn axis(self) -> Axis {
        match self {
            AxisDirection::Up | AxisDirection::Down => Axis::Vertical,
            AxisDirection::Left | AxisDirection::Right => Axis::Horizontal,
        }
    }

    /// Whether the direction runs against pointer-coordinate growth
    ///
    /// For reversed directions a positive pointer delta moves the offset
    /// toward larger values instead of smaller ones.
    pub fn is_reversed(self) -> bool {
        matches!(self, AxisDirection::Up | AxisDirection::Left)
    }

    /// The opposite direction on the same axis
    pub fn flipped(self) -> AxisDirection {
        match self {
            AxisDirection::Up => AxisDirection::Down,
            AxisDirection::Down => AxisDirection::Up,
            AxisDirection::Left => AxisDirection::Right,
            AxisDirection::Right => AxisDirection::Left,
        }
    }
}

/// Extent of a target along a scroll axis, in content coordinates
///
/// `leading` is the edge closest to the scroll origin; `trailing` the far
/// edge. Used by ensure-visible computations to decide how far a viewport
/// must move before the span is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub leading: f64,
    pub trailing: f64,
}

impl Span {
    pub fn new(leading: f64, trailing: f64) -> Self {
        Self { leading, trailing }
    }

    /// Size of the span along the axis
    pub fn extent(&self) -> f64 {
        self.trailing - self.leading
    }
}
