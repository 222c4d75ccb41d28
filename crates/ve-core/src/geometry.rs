//! Geometry kernel: canvas rectangles, edge positions, and resize math.
//!
//! Points and drag vectors are `kurbo` types; rectangles keep an explicit
//! origin + size so that widths and heights come out of the math exactly as
//! computed (no `x1 - x0` round trip).

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

pub type CanvasPoint = Point;
pub type CanvasVector = Vec2;

// ─── Rectangles ──────────────────────────────────────────────────────────

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub const ZERO: CanvasRect = CanvasRect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalised rectangle spanning two arbitrary corners.
    pub fn from_points(a: CanvasPoint, b: CanvasPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn origin(&self) -> CanvasPoint {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> CanvasPoint {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: CanvasPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn offset(&self, by: CanvasVector) -> Self {
        Self {
            x: self.x + by.x,
            y: self.y + by.y,
            ..*self
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn from_kurbo(rect: kurbo::Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

/// Union of all rectangles, `None` for an empty input.
pub fn bounding_rectangle_array(rects: &[CanvasRect]) -> Option<CanvasRect> {
    let mut iter = rects.iter();
    let first = iter.next()?.to_kurbo();
    let union = iter.fold(first, |acc, r| acc.union(r.to_kurbo()));
    Some(CanvasRect::from_kurbo(union))
}

/// A measured frame: either a concrete rectangle or the "unmeasured /
/// unbounded" sentinel. Never partially populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaybeInfiniteRect {
    Finite(CanvasRect),
    Infinity,
}

impl MaybeInfiniteRect {
    pub fn finite(&self) -> Option<CanvasRect> {
        match self {
            Self::Finite(r) => Some(*r),
            Self::Infinity => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinity)
    }
}

impl From<CanvasRect> for MaybeInfiniteRect {
    fn from(rect: CanvasRect) -> Self {
        Self::Finite(rect)
    }
}

// ─── Edge positions ──────────────────────────────────────────────────────

/// A normalised position on a rectangle's outline: each axis is `0.0`,
/// `0.5`, or `1.0`. Corners have no `0.5` component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePosition {
    pub x: f64,
    pub y: f64,
}

impl EdgePosition {
    pub const TOP_LEFT: EdgePosition = EdgePosition { x: 0.0, y: 0.0 };
    pub const TOP: EdgePosition = EdgePosition { x: 0.5, y: 0.0 };
    pub const TOP_RIGHT: EdgePosition = EdgePosition { x: 1.0, y: 0.0 };
    pub const RIGHT: EdgePosition = EdgePosition { x: 1.0, y: 0.5 };
    pub const BOTTOM_RIGHT: EdgePosition = EdgePosition { x: 1.0, y: 1.0 };
    pub const BOTTOM: EdgePosition = EdgePosition { x: 0.5, y: 1.0 };
    pub const BOTTOM_LEFT: EdgePosition = EdgePosition { x: 0.0, y: 1.0 };
    pub const LEFT: EdgePosition = EdgePosition { x: 0.0, y: 0.5 };

    pub fn is_corner(&self) -> bool {
        self.x != 0.5 && self.y != 0.5
    }

    /// Top or bottom edge: dragging it changes only the height.
    pub fn is_horizontal_edge(&self) -> bool {
        self.x == 0.5 && (self.y == 0.0 || self.y == 1.0)
    }

    /// Left or right edge: dragging it changes only the width.
    pub fn is_vertical_edge(&self) -> bool {
        self.y == 0.5 && (self.x == 0.0 || self.x == 1.0)
    }

    /// Reflection through the rectangle's centre.
    pub fn opposite(&self) -> Self {
        Self {
            x: 1.0 - self.x,
            y: 1.0 - self.y,
        }
    }
}

/// The point at the normalised `position` on `rect` (0..1 per axis).
pub fn pick_point_on_rect(rect: &CanvasRect, position: EdgePosition) -> CanvasPoint {
    Point::new(
        rect.x + rect.width * position.x,
        rect.y + rect.height * position.y,
    )
}

// ─── Resizing ────────────────────────────────────────────────────────────

/// Resize `original` by dragging the handle at `edge` by `drag`.
///
/// Width and height are measured from the fixed opposite corner (or opposite
/// edge centre), so dragging past the anchor flips the sign and the `abs`
/// keeps both dimensions non-negative. The origin stays at the original
/// top-left.
pub fn resize_width_height(
    original: &CanvasRect,
    drag: CanvasVector,
    edge: EdgePosition,
) -> CanvasRect {
    if edge.is_corner() {
        let opposite_corner = pick_point_on_rect(original, edge.opposite());
        let dragged_corner = pick_point_on_rect(original, edge);
        let new_corner = dragged_corner + drag;

        CanvasRect {
            x: original.x,
            y: original.y,
            width: (opposite_corner.x - new_corner.x).abs(),
            height: (opposite_corner.y - new_corner.y).abs(),
        }
    } else {
        let opposite_side_center = pick_point_on_rect(original, edge.opposite());
        let dragged_side_center = pick_point_on_rect(original, edge);

        if edge.is_horizontal_edge() {
            CanvasRect {
                height: (opposite_side_center.y - (dragged_side_center.y + drag.y)).abs(),
                ..*original
            }
        } else {
            CanvasRect {
                width: (opposite_side_center.x - (dragged_side_center.x + drag.x)).abs(),
                ..*original
            }
        }
    }
}

/// Anchored resize: the sides touched by `edge` move with the drag, the
/// others stay put, and the result is re-normalised so the origin follows
/// whichever side ends up top-left.
pub fn resize_bounding_box(
    original: &CanvasRect,
    drag: CanvasVector,
    edge: EdgePosition,
) -> CanvasRect {
    let mut x0 = original.x;
    let mut y0 = original.y;
    let mut x1 = original.x + original.width;
    let mut y1 = original.y + original.height;

    if edge.x == 0.0 {
        x0 += drag.x;
    } else if edge.x == 1.0 {
        x1 += drag.x;
    }
    if edge.y == 0.0 {
        y0 += drag.y;
    } else if edge.y == 1.0 {
        y1 += drag.y;
    }

    CanvasRect::from_points(Point::new(x0, y0), Point::new(x1, y1))
}
