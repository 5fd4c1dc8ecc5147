// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incrementally extended axis-aligned bounding regions.

use kurbo::{Point, Rect, Vec2};

/// Axis-aligned bounding region in 2D.
///
/// A region starts out uninitialized and grows to cover every point passed to
/// [`Bounds2D::update`]. Once initialized, `min.x <= max.x` and `min.y <= max.y`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds2D {
    /// Minimum corner (left, top).
    pub min: Point,
    /// Maximum corner (right, bottom).
    pub max: Point,
    initialized: bool,
}

impl Default for Bounds2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds2D {
    /// An uninitialized region.
    pub const fn new() -> Self {
        Self {
            min: Point::ZERO,
            max: Point::ZERO,
            initialized: false,
        }
    }

    /// The smallest region covering both points.
    pub fn from_points(a: Point, b: Point) -> Self {
        let mut bounds = Self::new();
        bounds.update(a);
        bounds.update(b);
        bounds
    }

    /// A square region of half-width `radius` around `centre`.
    pub fn from_centre_radius(centre: Point, radius: f64) -> Self {
        let offset = Vec2::new(radius, radius);
        Self::from_points(centre - offset, centre + offset)
    }

    /// Returns to the uninitialized state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether any point has been added yet.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Extend the region to include `point`.
    pub fn update(&mut self, point: Point) {
        if !self.initialized {
            self.min = point;
            self.max = point;
            self.initialized = true;
            return;
        }
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Grow the region by `margin` on every side. Uninitialized regions stay uninitialized.
    pub fn expand(&mut self, margin: f64) {
        if !self.initialized {
            return;
        }
        self.min -= Vec2::new(margin, margin);
        self.max += Vec2::new(margin, margin);
    }

    /// Whether the region contains `point` (edges inclusive).
    pub fn contains(&self, point: Point) -> bool {
        self.initialized
            && self.min.x <= point.x
            && self.min.y <= point.y
            && self.max.x >= point.x
            && self.max.y >= point.y
    }

    /// Whether `other` lies entirely inside this region.
    pub fn contains_bounds(&self, other: &Self) -> bool {
        other.initialized && self.contains(other.min) && self.contains(other.max)
    }

    /// Separating-axis overlap test. Touching edges count as overlapping.
    pub fn overlaps(&self, other: &Self) -> bool {
        if !self.initialized || !other.initialized {
            return false;
        }
        !(self.max.y < other.min.y
            || self.min.y > other.max.y
            || self.max.x < other.min.x
            || self.min.x > other.max.x)
    }

    /// Centre point.
    pub fn centre(&self) -> Point {
        self.min.midpoint(self.max)
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Width times height.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The region as a Kurbo rectangle, if initialized.
    pub fn to_rect(&self) -> Option<Rect> {
        self.initialized.then(|| Rect::from_points(self.min, self.max))
    }

    /// Split into four equal quadrants: top-left, top-right, bottom-left, bottom-right.
    pub fn quadrants(&self) -> [Self; 4] {
        let min = self.min;
        let max = self.max;
        let mid = self.centre();
        [
            Self::from_points(min, mid),
            Self::from_points(Point::new(mid.x, min.y), Point::new(max.x, mid.y)),
            Self::from_points(Point::new(min.x, mid.y), Point::new(mid.x, max.y)),
            Self::from_points(mid, max),
        ]
    }
}

impl From<Rect> for Bounds2D {
    fn from(rect: Rect) -> Self {
        Self::from_points(Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y1))
    }
}
