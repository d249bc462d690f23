use crate::geometry::point::IntPoint;

/// Axis-aligned integer bounds. Nothing forces `left <= right`; degenerate
/// rectangles are legal inputs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct IntRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl IntRect {
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Tight bounds of every point in `paths`, or a default rect when there
    /// are none.
    pub fn bounding(paths: &[Vec<IntPoint>]) -> Self {
        let mut points = paths.iter().flatten();
        let Some(first) = points.next() else {
            return Self::default();
        };
        let mut rect = Self::new(first.x, first.y, first.x, first.y);
        for p in points {
            rect.left = rect.left.min(p.x);
            rect.right = rect.right.max(p.x);
            rect.top = rect.top.min(p.y);
            rect.bottom = rect.bottom.max(p.y);
        }
        rect
    }
}
