//! Polygon and polyline offsetting.
//!
//! Raw offset rings are built edge by edge: each edge is shifted along its
//! outward normal, corners are joined per the requested join style, and open
//! ends are capped. Self-intersections introduced by concave corners or
//! over-deflation are resolved by running the raw rings through a
//! positive-fill union.

use crate::engine::boolean::{self, ClipJob, ClipOp};
use crate::engine::math::{signed_area2, FillRule, Vertex};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum JoinStyle {
    Square = 0,
    Round = 1,
    Miter = 2,
}

impl JoinStyle {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Square),
            1 => Some(Self::Round),
            2 => Some(Self::Miter),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum EndStyle {
    ClosedPolygon = 0,
    ClosedLine = 1,
    OpenButt = 2,
    OpenSquare = 3,
    OpenRound = 4,
}

impl EndStyle {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::ClosedPolygon),
            1 => Some(Self::ClosedLine),
            2 => Some(Self::OpenButt),
            3 => Some(Self::OpenSquare),
            4 => Some(Self::OpenRound),
            _ => None,
        }
    }

    fn is_open(self) -> bool {
        matches!(self, Self::OpenButt | Self::OpenSquare | Self::OpenRound)
    }
}

pub struct OffsetGroup {
    pub paths: Vec<Vec<Vertex>>,
    pub join: JoinStyle,
    pub end: EndStyle,
}

struct RingBuilder {
    delta: f64,
    miter_lim: f64,
    steps_per_rad: f64,
    join: JoinStyle,
    ring: Vec<Vertex>,
}

fn fpoint(v: Vertex) -> (f64, f64) {
    (v.x as f64, v.y as f64)
}

impl RingBuilder {
    fn new(delta: f64, miter_limit: f64, arc_tolerance: f64, join: JoinStyle) -> Self {
        let lim = miter_limit.max(2.0);
        // Arc step count from the sagitta bound; tolerance capped so the
        // acos argument stays meaningful for small deltas.
        let max_tol = (delta.abs() * 0.25).max(1e-6);
        let tol = arc_tolerance.clamp(1e-6, max_tol);
        let steps = std::f64::consts::PI / (1.0 - tol / delta.abs()).clamp(-1.0, 1.0).acos();
        Self {
            delta,
            miter_lim: 2.0 / (lim * lim),
            steps_per_rad: (steps / std::f64::consts::TAU).max(1.0 / std::f64::consts::TAU),
            join,
            ring: Vec::new(),
        }
    }

    fn push(&mut self, x: f64, y: f64) {
        let v = Vertex::new(x.round() as i64, y.round() as i64);
        if self.ring.last() != Some(&v) {
            self.ring.push(v);
        }
    }

    fn offset_pt(&mut self, pt: Vertex, n: (f64, f64)) {
        let (px, py) = fpoint(pt);
        self.push(px + n.0 * self.delta, py + n.1 * self.delta);
    }

    /// Corner at `pt` between edge normals `nk` (incoming) and `ni` (outgoing).
    fn join_pt(&mut self, pt: Vertex, nk: (f64, f64), ni: (f64, f64)) {
        let sin_a = (nk.0 * ni.1 - nk.1 * ni.0).clamp(-1.0, 1.0);
        let cos_a = nk.0 * ni.0 + nk.1 * ni.1;
        let (px, py) = fpoint(pt);

        if sin_a.abs() * self.delta.abs() < 1.0 && cos_a > 0.0 {
            // Near-collinear edges: a single offset point suffices.
            self.push(px + nk.0 * self.delta, py + nk.1 * self.delta);
            return;
        }

        if sin_a * self.delta < 0.0 {
            // Concave corner: the loop formed through the original vertex is
            // removed later by the union pass.
            self.push(px + nk.0 * self.delta, py + nk.1 * self.delta);
            self.push(px, py);
            self.push(px + ni.0 * self.delta, py + ni.1 * self.delta);
            return;
        }

        match self.join {
            JoinStyle::Miter => {
                let r = 1.0 + cos_a;
                if r >= self.miter_lim {
                    let q = self.delta / r;
                    self.push(px + (nk.0 + ni.0) * q, py + (nk.1 + ni.1) * q);
                } else {
                    self.square_join(pt, nk, ni, sin_a, cos_a);
                }
            }
            JoinStyle::Square => self.square_join(pt, nk, ni, sin_a, cos_a),
            JoinStyle::Round => self.round_join(pt, nk, ni, sin_a, cos_a),
        }
    }

    fn square_join(&mut self, pt: Vertex, nk: (f64, f64), ni: (f64, f64), sin_a: f64, cos_a: f64) {
        let dx = (sin_a.atan2(cos_a) / 4.0).tan();
        let (px, py) = fpoint(pt);
        self.push(
            px + self.delta * (nk.0 - nk.1 * dx),
            py + self.delta * (nk.1 + nk.0 * dx),
        );
        self.push(
            px + self.delta * (ni.0 + ni.1 * dx),
            py + self.delta * (ni.1 - ni.0 * dx),
        );
    }

    fn round_join(&mut self, pt: Vertex, nk: (f64, f64), ni: (f64, f64), sin_a: f64, cos_a: f64) {
        let angle = sin_a.atan2(cos_a);
        let steps = ((self.steps_per_rad * angle.abs()).ceil() as usize).max(1);
        let (px, py) = fpoint(pt);
        let step = angle / steps as f64;
        let (sin_s, cos_s) = step.sin_cos();
        let (mut x, mut y) = nk;
        for _ in 0..steps {
            self.push(px + x * self.delta, py + y * self.delta);
            let nx = x * cos_s - y * sin_s;
            y = x * sin_s + y * cos_s;
            x = nx;
        }
        self.push(px + ni.0 * self.delta, py + ni.1 * self.delta);
    }

    /// End cap at `pt` between normal `n` and its negation, sweeping through
    /// the travel direction `e`.
    fn cap(&mut self, pt: Vertex, n: (f64, f64), e: (f64, f64), style: EndStyle) {
        let (px, py) = fpoint(pt);
        let d = self.delta.abs();
        match style {
            EndStyle::OpenButt => {
                self.push(px + n.0 * d, py + n.1 * d);
                self.push(px - n.0 * d, py - n.1 * d);
            }
            EndStyle::OpenSquare => {
                self.push(px + (n.0 + e.0) * d, py + (n.1 + e.1) * d);
                self.push(px + (-n.0 + e.0) * d, py + (-n.1 + e.1) * d);
            }
            EndStyle::OpenRound => {
                let steps =
                    ((self.steps_per_rad * std::f64::consts::PI).ceil() as usize).max(2);
                let step = std::f64::consts::PI / steps as f64;
                let (sin_s, cos_s) = step.sin_cos();
                let (mut x, mut y) = n;
                for _ in 0..steps {
                    self.push(px + x * d, py + y * d);
                    let nx = x * cos_s - y * sin_s;
                    y = x * sin_s + y * cos_s;
                    x = nx;
                }
                self.push(px - n.0 * d, py - n.1 * d);
            }
            _ => unreachable!("closed end styles have no caps"),
        }
    }

    fn take(self) -> Vec<Vertex> {
        self.ring
    }
}

fn dedup(path: &[Vertex]) -> Vec<Vertex> {
    let mut out: Vec<Vertex> = Vec::with_capacity(path.len());
    for &v in path {
        if out.last() != Some(&v) {
            out.push(v);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Outward unit normal (right-hand side of travel for counter-clockwise
/// contours) of the edge a -> b.
fn edge_normal(a: Vertex, b: Vertex) -> (f64, f64) {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let len = dx.hypot(dy);
    (dy / len, -dx / len)
}

fn offset_closed(builder: &mut RingBuilder, pts: &[Vertex]) {
    let n = pts.len();
    let normals: Vec<(f64, f64)> = (0..n)
        .map(|i| edge_normal(pts[i], pts[(i + 1) % n]))
        .collect();
    let mut k = n - 1;
    for i in 0..n {
        builder.join_pt(pts[i], normals[k], normals[i]);
        k = i;
    }
}

fn offset_open(builder: &mut RingBuilder, pts: &[Vertex], style: EndStyle) {
    let n = pts.len();
    let normals: Vec<(f64, f64)> = (0..n - 1)
        .map(|i| edge_normal(pts[i], pts[i + 1]))
        .collect();

    // Forward side.
    builder.offset_pt(pts[0], normals[0]);
    for i in 1..n - 1 {
        builder.join_pt(pts[i], normals[i - 1], normals[i]);
    }
    // Far cap, sweeping through the outgoing travel direction.
    let last = normals[n - 2];
    builder.cap(pts[n - 1], last, (-last.1, last.0), style);
    // Back side, walking the reversed path.
    for i in (1..n - 1).rev() {
        builder.join_pt(pts[i], (-normals[i].0, -normals[i].1), (-normals[i - 1].0, -normals[i - 1].1));
    }
    let first = (-normals[0].0, -normals[0].1);
    builder.cap(pts[0], first, (-first.1, first.0), style);
}

/// A path that degenerates to a single point grows into a square or a circle
/// around it.
fn offset_point(builder: &mut RingBuilder, pt: Vertex, join: JoinStyle) {
    let (px, py) = fpoint(pt);
    let d = builder.delta.abs();
    match join {
        JoinStyle::Round => {
            let steps =
                ((builder.steps_per_rad * std::f64::consts::TAU).ceil() as usize).max(4);
            let step = std::f64::consts::TAU / steps as f64;
            for i in 0..steps {
                let (s, c) = (step * i as f64).sin_cos();
                builder.push(px + c * d, py + s * d);
            }
        }
        _ => {
            builder.push(px - d, py - d);
            builder.push(px + d, py - d);
            builder.push(px + d, py + d);
            builder.push(px - d, py + d);
        }
    }
}

pub fn execute(
    groups: &[OffsetGroup],
    delta: f64,
    miter_limit: f64,
    arc_tolerance: f64,
) -> Vec<Vec<Vertex>> {
    if delta.abs() < 1e-9 {
        // Degenerate offset: pass closed inputs through untouched.
        return groups
            .iter()
            .filter(|g| !g.end.is_open())
            .flat_map(|g| g.paths.iter().map(|p| dedup(p)))
            .filter(|p| p.len() >= 3)
            .collect();
    }

    let mut rings: Vec<Vec<Vertex>> = Vec::new();
    for group in groups {
        if group.end.is_open() && delta <= 0.0 {
            // An open contour has no interior to shrink.
            continue;
        }
        for path in &group.paths {
            let pts = dedup(path);
            if pts.is_empty() {
                continue;
            }
            let mut builder = RingBuilder::new(delta, miter_limit, arc_tolerance, group.join);
            match (pts.len(), group.end) {
                (1, _) => offset_point(&mut builder, pts[0], group.join),
                (_, EndStyle::ClosedPolygon) => offset_closed(&mut builder, &pts),
                (_, EndStyle::ClosedLine) => {
                    offset_closed(&mut builder, &pts);
                    let ring = builder.take();
                    if ring.len() >= 3 {
                        rings.push(ring);
                    }
                    builder = RingBuilder::new(delta, miter_limit, arc_tolerance, group.join);
                    let mut rev = pts.clone();
                    rev.reverse();
                    offset_closed(&mut builder, &rev);
                }
                (_, style) => offset_open(&mut builder, &pts, style),
            }
            let ring = builder.take();
            if ring.len() >= 3 {
                rings.push(ring);
            }
        }
    }

    let sol = boolean::execute(&ClipJob {
        subject: &rings,
        subject_open: &[],
        clip: &[],
        op: ClipOp::Union,
        subject_fill: FillRule::Positive,
        clip_fill: FillRule::Positive,
    });
    sol.closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn square(x: i64, y: i64, size: i64) -> Vec<Vertex> {
        vec![
            Vertex::new(x, y),
            Vertex::new(x + size, y),
            Vertex::new(x + size, y + size),
            Vertex::new(x, y + size),
        ]
    }

    fn run(paths: Vec<Vec<Vertex>>, delta: f64, join: JoinStyle, end: EndStyle) -> Vec<Vec<Vertex>> {
        execute(
            &[OffsetGroup { paths, join, end }],
            delta,
            2.0,
            0.25,
        )
    }

    fn contour_set(path: &[Vertex]) -> HashSet<(i64, i64)> {
        path.iter().map(|v| (v.x, v.y)).collect()
    }

    #[test]
    fn miter_inflate_square_is_exact() {
        let out = run(
            vec![square(0, 0, 10)],
            2.0,
            JoinStyle::Miter,
            EndStyle::ClosedPolygon,
        );
        assert_eq!(out.len(), 1);
        let expect: HashSet<_> = [(-2, -2), (12, -2), (12, 12), (-2, 12)]
            .into_iter()
            .collect();
        assert_eq!(contour_set(&out[0]), expect);
    }

    #[test]
    fn deflate_square_shrinks() {
        let out = run(
            vec![square(0, 0, 10)],
            -2.0,
            JoinStyle::Miter,
            EndStyle::ClosedPolygon,
        );
        assert_eq!(out.len(), 1);
        let expect: HashSet<_> = [(2, 2), (8, 2), (8, 8), (2, 8)].into_iter().collect();
        assert_eq!(contour_set(&out[0]), expect);
    }

    #[test]
    fn over_deflate_collapses_to_nothing() {
        let out = run(
            vec![square(0, 0, 10)],
            -6.0,
            JoinStyle::Miter,
            EndStyle::ClosedPolygon,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn square_join_bevels_corners() {
        let out = run(
            vec![square(0, 0, 10)],
            2.0,
            JoinStyle::Square,
            EndStyle::ClosedPolygon,
        );
        assert_eq!(out.len(), 1);
        // Beveled: two points per corner, and the result stays within the
        // miter bounding box while containing the butt box.
        assert_eq!(out[0].len(), 8);
        for v in &out[0] {
            assert!(v.x >= -2 && v.x <= 12 && v.y >= -2 && v.y <= 12);
        }
        assert!(signed_area2(&out[0]) > 2 * 140);
    }

    #[test]
    fn round_join_approximates_arcs() {
        let out = run(
            vec![square(0, 0, 100)],
            10.0,
            JoinStyle::Round,
            EndStyle::ClosedPolygon,
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].len() > 8);
        let area = signed_area2(&out[0]) as f64 / 2.0;
        let exact = 100.0 * 100.0 + 4.0 * 100.0 * 10.0 + std::f64::consts::PI * 100.0;
        assert!((area - exact).abs() / exact < 0.05);
    }

    #[test]
    fn hole_deflates_while_outer_inflates() {
        let mut hole = square(3, 3, 4);
        hole.reverse();
        let out = run(
            vec![square(0, 0, 10), hole],
            1.0,
            JoinStyle::Miter,
            EndStyle::ClosedPolygon,
        );
        assert_eq!(out.len(), 2);
        let mut areas: Vec<i128> = out.iter().map(|c| signed_area2(c)).collect();
        areas.sort();
        // Hole narrowed to 2x2, outer grown to 12x12.
        assert_eq!(areas, vec![-8, 288]);
    }

    #[test]
    fn open_path_butt_cap_strokes_a_segment() {
        let out = run(
            vec![vec![Vertex::new(0, 0), Vertex::new(10, 0)]],
            2.0,
            JoinStyle::Miter,
            EndStyle::OpenButt,
        );
        assert_eq!(out.len(), 1);
        let expect: HashSet<_> = [(0, -2), (10, -2), (10, 2), (0, 2)].into_iter().collect();
        assert_eq!(contour_set(&out[0]), expect);
    }

    #[test]
    fn single_point_grows_a_square() {
        let out = run(
            vec![vec![Vertex::new(5, 5)]],
            3.0,
            JoinStyle::Miter,
            EndStyle::ClosedPolygon,
        );
        assert_eq!(out.len(), 1);
        let expect: HashSet<_> = [(2, 2), (8, 2), (8, 8), (2, 8)].into_iter().collect();
        assert_eq!(contour_set(&out[0]), expect);
    }
}
