//! Rectangles and validated geometry updates.

use serde::{Deserialize, Serialize};

/// Smallest width or height an element may be resized to.
pub const MIN_ELEMENT_SIZE: f32 = 1.0;

/// Axis-aligned rectangle in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Area, zero for degenerate rectangles.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Check whether a point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Area shared with another rectangle.
    #[must_use]
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Whether every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// A complete geometry write-back from direct manipulation.
///
/// Updates are all-or-nothing: [`GeometryUpdate::validated`] rejects any
/// non-finite component instead of zeroing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryUpdate {
    /// New left edge.
    pub x: f32,
    /// New top edge.
    pub y: f32,
    /// New width.
    pub width: f32,
    /// New height.
    pub height: f32,
    /// New rotation in degrees.
    pub rotation: f32,
}

impl GeometryUpdate {
    /// Validate and bound the update.
    ///
    /// Returns `None` when any component is NaN or infinite. Sizes are clamped
    /// to [`MIN_ELEMENT_SIZE`] and rotation is normalized into `[0, 360)`.
    #[must_use]
    pub fn validated(self) -> Option<Self> {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.rotation.is_finite();
        if !finite {
            return None;
        }
        Some(Self {
            x: self.x,
            y: self.y,
            width: self.width.abs().max(MIN_ELEMENT_SIZE),
            height: self.height.abs().max(MIN_ELEMENT_SIZE),
            rotation: normalize_degrees(self.rotation),
        })
    }

    /// The rectangle part of the update.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Normalize an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!((a.intersection_area(&b) - 25.0).abs() < f32::EPSILON);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersection_area(&c).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validated_rejects_nan() {
        let update = GeometryUpdate {
            x: f32::NAN,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            rotation: 0.0,
        };
        assert!(update.validated().is_none());

        let update = GeometryUpdate {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: f32::INFINITY,
            rotation: 0.0,
        };
        assert!(update.validated().is_none());
    }

    #[test]
    fn test_validated_bounds_values() {
        let update = GeometryUpdate {
            x: 4.0,
            y: 5.0,
            width: 0.2,
            height: -30.0,
            rotation: -90.0,
        }
        .validated()
        .expect("finite update");
        assert!((update.width - MIN_ELEMENT_SIZE).abs() < f32::EPSILON);
        assert!((update.height - 30.0).abs() < f32::EPSILON);
        assert!((update.rotation - 270.0).abs() < f32::EPSILON);
    }
}
