//! Plain geometry values measured from rendered elements.
//!
//! All values are CSS pixels. Rectangles returned by an [`crate::ElementTree`] are in viewport
//! (client) coordinates; engine code converts them to canvas-relative coordinates with
//! [`Rect::relative_to`].

use serde::{Deserialize, Serialize};

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Size {
    /// Size of `w` by `h`.
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// Floors both dimensions to at least one pixel so the size is safe to use as a divisor or a
    /// canvas dimension.
    pub fn at_least_one(self) -> Self {
        Self {
            w: self.w.max(1.0),
            h: self.h.max(1.0),
        }
    }

    /// Returns whole-pixel dimensions, each at least `1`.
    pub fn to_pixels(self) -> (u32, u32) {
        let floored = self.at_least_one();
        (floored.w.round() as u32, floored.h.round() as u32)
    }

    /// Whether either dimension is zero or negative.
    pub fn is_empty(self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// An axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Rectangle with its top-left corner at `(x, y)`.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Top-left corner.
    pub const fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    pub const fn size(self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Right edge.
    pub fn right(self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge.
    pub fn bottom(self) -> f64 {
        self.y + self.h
    }

    /// Re-expresses this rectangle relative to the top-left corner of `container`.
    pub fn relative_to(self, container: Rect) -> Self {
        Self {
            x: self.x - container.x,
            y: self.y - container.y,
            ..self
        }
    }

    /// Same size, moved to `origin`.
    pub fn with_origin(self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..self
        }
    }

    /// Same origin, resized to `size`.
    pub fn with_size(self, size: Size) -> Self {
        Self {
            w: size.w,
            h: size.h,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn relative_to_subtracts_container_origin_and_keeps_size() {
        let canvas = Rect::new(100.0, 40.0, 1000.0, 800.0);
        let window = Rect::new(150.0, 90.0, 300.0, 200.0);

        assert_eq!(
            window.relative_to(canvas),
            Rect::new(50.0, 50.0, 300.0, 200.0)
        );
    }

    #[test]
    fn zero_sizes_floor_to_one_pixel() {
        assert_eq!(Size::new(0.0, -3.0).at_least_one(), Size::new(1.0, 1.0));
        assert_eq!(Size::new(0.2, 12.6).to_pixels(), (1, 13));
        assert!(Size::new(0.0, 10.0).is_empty());
    }
}
