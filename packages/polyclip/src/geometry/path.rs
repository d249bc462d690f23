//! Flat contour types and the pure-geometry operations that never cross
//! into the kernel.

use crate::enums::PointInPolygonResult;
use crate::geometry::point::IntPoint;

pub type Path = Vec<IntPoint>;
pub type Paths = Vec<Path>;

/// Signed area of a closed path. Positive for one winding direction,
/// negative for the other; see [`orientation`].
pub fn area(path: &[IntPoint]) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    let mut sum: i128 = 0;
    let mut j = path.len() - 1;
    for (i, p) in path.iter().enumerate() {
        let q = path[j];
        sum += (q.x as i128 + p.x as i128) * (p.y as i128 - q.y as i128);
        j = i;
    }
    sum as f64 / 2.0
}

/// Winding direction of a closed path. Implementation-defined for
/// self-intersecting input.
pub fn orientation(path: &[IntPoint]) -> bool {
    area(path) >= 0.0
}

/// Locates `pt` against a closed, non-self-intersecting polygon. Exact in
/// integer arithmetic, including the boundary case.
pub fn point_in_polygon(pt: IntPoint, path: &[IntPoint]) -> PointInPolygonResult {
    if path.len() < 3 {
        return PointInPolygonResult::Outside;
    }
    let mut inside = false;
    let mut a = path[path.len() - 1];
    for &b in path {
        if on_segment(pt, a, b) {
            return PointInPolygonResult::OnBoundary;
        }
        if (a.y > pt.y) != (b.y > pt.y) {
            let cross = (b.x as i128 - a.x as i128) * (pt.y as i128 - a.y as i128)
                - (pt.x as i128 - a.x as i128) * (b.y as i128 - a.y as i128);
            if (cross > 0) == (b.y > a.y) {
                inside = !inside;
            }
        }
        a = b;
    }
    if inside {
        PointInPolygonResult::Inside
    } else {
        PointInPolygonResult::Outside
    }
}

fn on_segment(pt: IntPoint, a: IntPoint, b: IntPoint) -> bool {
    let cross = (b.x as i128 - a.x as i128) * (pt.y as i128 - a.y as i128)
        - (pt.x as i128 - a.x as i128) * (b.y as i128 - a.y as i128);
    cross == 0
        && pt.x >= a.x.min(b.x)
        && pt.x <= a.x.max(b.x)
        && pt.y >= a.y.min(b.y)
        && pt.y <= a.y.max(b.y)
}

/// Reverses the vertex order in place. The passed path is mutated, not
/// copied.
pub fn reverse_path(path: &mut Path) {
    path.reverse();
}

pub fn reverse_paths(paths: &mut Paths) {
    for path in paths.iter_mut() {
        reverse_path(path);
    }
}

/// Scales every coordinate and rounds to the nearest integer.
pub fn scale_path(path: &[IntPoint], scale: f64) -> Path {
    path.iter()
        .map(|p| {
            IntPoint::new(
                (p.x as f64 * scale).round() as i64,
                (p.y as f64 * scale).round() as i64,
            )
        })
        .collect()
}

pub fn scale_paths(paths: &[Path], scale: f64) -> Paths {
    paths.iter().map(|p| scale_path(p, scale)).collect()
}
