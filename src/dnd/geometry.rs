use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of a card in viewport coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Builds a rect from its top-left corner and size.
    pub fn from_origin(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(top, top + height, left, left + width)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        Region::new(
            Span::closed(self.left, self.right),
            Span::closed(self.top, self.bottom),
        )
        .contains(px, py)
    }

    /// Horizontal span left after trimming `fraction` of the width from each side.
    pub fn inset_x(&self, fraction: f64) -> Span {
        let margin = self.width() * fraction;
        Span::closed(self.left + margin, self.right - margin)
    }

    /// Vertical span left after trimming `fraction` of the height from each side.
    pub fn inset_y(&self, fraction: f64) -> Span {
        let margin = self.height() * fraction;
        Span::closed(self.top + margin, self.bottom - margin)
    }
}

/// One-dimensional interval. Closed spans include their bounds, open ones exclude them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
    open: bool,
}

impl Span {
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            open: false,
        }
    }

    pub fn open(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            open: true,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if self.open {
            value > self.min && value < self.max
        } else {
            value >= self.min && value <= self.max
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: Span,
    pub y: Span,
}

impl Region {
    pub fn new(x: Span, y: Span) -> Self {
        Self { x, y }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        self.x.contains(px) && self.y.contains(py)
    }
}

/// `max(min, min(max, value))`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(value))
}
