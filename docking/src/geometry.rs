//! Integer screen-space geometry
//!
//! Points, sizes, rectangles and polygons in global (virtual desktop) pixel
//! coordinates. Rectangles are half-open: `right()` and `bottom()` are the
//! first pixel outside the rectangle.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A point in global pixel coordinates
pub type Point = IVec2;

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Frame margins around a window's client area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its top-left corner and (exclusive) bottom-right corner
    pub fn from_corners(top_left: Point, bottom_right: Point) -> Self {
        Self::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// A rectangle with a positive area
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.right(), self.y)
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.x, self.bottom())
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn with_size(&self, size: Size) -> Rect {
        Rect::new(self.x, self.y, size.width, size.height)
    }

    pub fn move_left(&mut self, left: i32) {
        self.x = left;
    }

    pub fn move_right(&mut self, right: i32) {
        self.x = right - self.width;
    }

    pub fn move_top(&mut self, top: i32) {
        self.y = top;
    }

    pub fn move_bottom(&mut self, bottom: i32) {
        self.y = bottom - self.height;
    }

    /// True if `point` lies inside the ellipse inscribed in this rectangle
    pub fn ellipse_contains(&self, point: Point) -> bool {
        if !self.is_valid() {
            return false;
        }
        let rx = self.width as f64 / 2.0;
        let ry = self.height as f64 / 2.0;
        let cx = self.x as f64 + rx;
        let cy = self.y as f64 + ry;
        let dx = (point.x as f64 + 0.5 - cx) / rx;
        let dy = (point.y as f64 + 0.5 - cy) / ry;
        dx * dx + dy * dy <= 1.0
    }
}

/// Closed polygon described by its vertices
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Polygon tracing the four corners of a rectangle
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(vec![
            rect.top_left(),
            rect.top_right(),
            rect.bottom_right(),
            rect.bottom_left(),
        ])
    }

    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }

    pub fn bounding_rect(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::default();
        };
        let (mut min, mut max) = (*first, *first);
        for p in &self.points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Rect::from_corners(min, max)
    }

    /// Odd-even fill rule containment test
    pub fn contains(&self, point: Point) -> bool {
        if self.is_empty() {
            return false;
        }
        let px = point.x as f64;
        let py = point.y as f64;
        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let (xi, yi) = (self.points[i].x as f64, self.points[i].y as f64);
            let (xj, yj) = (self.points[j].x as f64, self.points[j].y as f64);
            if (yi > py) != (yj > py) {
                let x_cross = xi + (py - yi) * (xj - xi) / (yj - yi);
                if px < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}
