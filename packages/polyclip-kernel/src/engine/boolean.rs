//! Boolean operations on integer polygon sets.
//!
//! The engine works on a segment arrangement: every input edge is split at
//! every pairwise crossing, each resulting sub-segment is classified by the
//! fill state of the regions on its two sides, and the segments whose sides
//! disagree under the requested operation are stitched back into contours
//! with the result interior kept on the left. Outer contours therefore come
//! out counter-clockwise and holes clockwise.

use std::collections::{HashMap, HashSet};

use crate::engine::math::{
    cross3, point_at, segment_cross, signed_area2, winding_number, FillRule, SegCross, Vertex,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ClipOp {
    Intersection = 0,
    Union = 1,
    Difference = 2,
    Xor = 3,
}

impl ClipOp {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Intersection),
            1 => Some(Self::Union),
            2 => Some(Self::Difference),
            3 => Some(Self::Xor),
            _ => None,
        }
    }
}

pub struct ClipJob<'a> {
    pub subject: &'a [Vec<Vertex>],
    pub subject_open: &'a [Vec<Vertex>],
    pub clip: &'a [Vec<Vertex>],
    pub op: ClipOp,
    pub subject_fill: FillRule,
    pub clip_fill: FillRule,
}

#[derive(Default)]
pub struct ClipSolution {
    pub closed: Vec<Vec<Vertex>>,
    pub open: Vec<Vec<Vertex>>,
}

#[inline]
fn combine(op: ClipOp, in_subject: bool, in_clip: bool) -> bool {
    match op {
        ClipOp::Intersection => in_subject && in_clip,
        ClipOp::Union => in_subject || in_clip,
        ClipOp::Difference => in_subject && !in_clip,
        ClipOp::Xor => in_subject != in_clip,
    }
}

/// Drops consecutive duplicates and a repeated closing vertex; discards
/// contours that collapse below a triangle.
fn sanitize_closed(paths: &[Vec<Vertex>]) -> Vec<Vec<Vertex>> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let mut p: Vec<Vertex> = Vec::with_capacity(path.len());
        for &v in path {
            if p.last() != Some(&v) {
                p.push(v);
            }
        }
        while p.len() > 1 && p.first() == p.last() {
            p.pop();
        }
        // Keep zero-area paths: a self-intersecting contour can enclose
        // real regions while its net shoelace sum cancels to zero.
        if p.len() >= 3 {
            out.push(p);
        }
    }
    out
}

fn collect_edges(paths: &[Vec<Vertex>]) -> Vec<(Vertex, Vertex)> {
    let mut edges = Vec::new();
    for path in paths {
        for i in 0..path.len() {
            let a = path[i];
            let b = path[(i + 1) % path.len()];
            if a != b {
                edges.push((a, b));
            }
        }
    }
    edges
}

/// Splits every edge at its crossings with every other edge and returns the
/// deduplicated undirected sub-segments, canonically ordered.
fn split_edges(edges: &[(Vertex, Vertex)]) -> Vec<(Vertex, Vertex)> {
    let mut splits: Vec<Vec<f64>> = vec![Vec::new(); edges.len()];
    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            let (a1, a2) = edges[i];
            let (b1, b2) = edges[j];
            match segment_cross(a1, a2, b1, b2) {
                SegCross::None => {}
                SegCross::At { ta, tb } => {
                    if ta > 0.0 && ta < 1.0 {
                        splits[i].push(ta);
                    }
                    if tb > 0.0 && tb < 1.0 {
                        splits[j].push(tb);
                    }
                }
                SegCross::Overlap { b_on_a, a_on_b } => {
                    splits[i].extend(b_on_a.iter().flatten());
                    splits[j].extend(a_on_b.iter().flatten());
                }
            }
        }
    }

    let mut seen: HashSet<(Vertex, Vertex)> = HashSet::new();
    let mut out = Vec::new();
    for (idx, (a, b)) in edges.iter().copied().enumerate() {
        let ts = &mut splits[idx];
        ts.sort_by(f64::total_cmp);
        let mut pts = Vec::with_capacity(ts.len() + 2);
        pts.push(a);
        for &t in ts.iter() {
            pts.push(point_at(a, b, t));
        }
        pts.push(b);
        for w in pts.windows(2) {
            if w[0] == w[1] {
                continue;
            }
            let key = if w[0] < w[1] {
                (w[0], w[1])
            } else {
                (w[1], w[0])
            };
            if seen.insert(key) {
                out.push(key);
            }
        }
    }
    out
}

/// Fill state of the result on both sides of a segment, probed a small step
/// off the midpoint along each normal.
fn side_states(
    seg: (Vertex, Vertex),
    subject: &[Vec<Vertex>],
    clip: &[Vec<Vertex>],
    op: ClipOp,
    subject_fill: FillRule,
    clip_fill: FillRule,
) -> (bool, bool) {
    let (p, q) = seg;
    let dx = (q.x - p.x) as f64;
    let dy = (q.y - p.y) as f64;
    let len = dx.hypot(dy);
    let eps = (len * 0.25).min(0.25);
    let mx = (p.x as f64 + q.x as f64) / 2.0;
    let my = (p.y as f64 + q.y as f64) / 2.0;
    // Left normal of p -> q.
    let nx = -dy / len;
    let ny = dx / len;

    let probe = |x: f64, y: f64| {
        let in_subject = subject_fill.filled(winding_number(subject, x, y));
        let in_clip = clip_fill.filled(winding_number(clip, x, y));
        combine(op, in_subject, in_clip)
    };
    (
        probe(mx + nx * eps, my + ny * eps),
        probe(mx - nx * eps, my - ny * eps),
    )
}

/// Chains directed edges into contours, picking at every junction the most
/// counter-clockwise continuation so each traced face stays simple.
fn stitch(directed: Vec<(Vertex, Vertex)>) -> Vec<Vec<Vertex>> {
    let mut by_start: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (idx, (a, _)) in directed.iter().enumerate() {
        by_start.entry(*a).or_default().push(idx);
    }

    let mut used = vec![false; directed.len()];
    let mut contours = Vec::new();

    for start in 0..directed.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let origin = directed[start].0;
        let mut contour = vec![origin];
        let mut cur = start;
        let mut closed = false;

        for _ in 0..directed.len() {
            let (from, to) = directed[cur];
            if to == origin {
                closed = true;
                break;
            }
            contour.push(to);
            let in_dx = (to.x - from.x) as f64;
            let in_dy = (to.y - from.y) as f64;
            // Reference direction: back along the incoming edge.
            let rx = -in_dx;
            let ry = -in_dy;

            let mut best: Option<(f64, usize)> = None;
            if let Some(cands) = by_start.get(&to) {
                for &c in cands {
                    if used[c] {
                        continue;
                    }
                    let (_, next_to) = directed[c];
                    let wx = (next_to.x - to.x) as f64;
                    let wy = (next_to.y - to.y) as f64;
                    let mut ang = (rx * wy - ry * wx).atan2(rx * wx + ry * wy);
                    if ang <= 0.0 {
                        ang += std::f64::consts::TAU;
                    }
                    if best.map_or(true, |(b, _)| ang > b) {
                        best = Some((ang, c));
                    }
                }
            }
            match best {
                Some((_, next)) => {
                    used[next] = true;
                    cur = next;
                }
                None => break,
            }
        }

        if closed {
            if let Some(clean) = tidy_contour(contour) {
                contours.push(clean);
            }
        }
    }
    contours
}

/// Removes repeated and collinear vertices left behind by edge splitting.
fn tidy_contour(mut contour: Vec<Vertex>) -> Option<Vec<Vertex>> {
    loop {
        let n = contour.len();
        if n < 3 {
            return None;
        }
        let mut removed = false;
        let mut i = 0;
        while i < contour.len() && contour.len() >= 3 {
            let n = contour.len();
            let prev = contour[(i + n - 1) % n];
            let cur = contour[i];
            let next = contour[(i + 1) % n];
            if cur == prev || cross3(prev, cur, next) == 0 {
                contour.remove(i);
                removed = true;
            } else {
                i += 1;
            }
        }
        if !removed {
            break;
        }
    }
    if contour.len() >= 3 && signed_area2(&contour) != 0 {
        Some(contour)
    } else {
        None
    }
}

fn clip_open_paths(
    open: &[Vec<Vertex>],
    clip: &[Vec<Vertex>],
    op: ClipOp,
    clip_fill: FillRule,
) -> Vec<Vec<Vertex>> {
    // Union and xor have no clipping effect on contours without interior.
    if matches!(op, ClipOp::Union | ClipOp::Xor) {
        return open
            .iter()
            .filter(|p| p.len() >= 2)
            .cloned()
            .collect();
    }
    let clip_edges = collect_edges(clip);
    let mut out = Vec::new();

    for path in open {
        if path.len() < 2 {
            continue;
        }
        let mut current: Vec<Vertex> = Vec::new();
        for w in path.windows(2) {
            let (a, b) = (w[0], w[1]);
            if a == b {
                continue;
            }
            let mut ts = vec![0.0, 1.0];
            for &(c1, c2) in &clip_edges {
                match segment_cross(a, b, c1, c2) {
                    SegCross::At { ta, .. } if ta > 0.0 && ta < 1.0 => ts.push(ta),
                    SegCross::Overlap { b_on_a, .. } => ts.extend(b_on_a.iter().flatten()),
                    _ => {}
                }
            }
            ts.sort_by(f64::total_cmp);
            for pair in ts.windows(2) {
                let p = point_at(a, b, pair[0]);
                let q = point_at(a, b, pair[1]);
                if p == q {
                    continue;
                }
                let mx = (p.x as f64 + q.x as f64) / 2.0;
                let my = (p.y as f64 + q.y as f64) / 2.0;
                let inside = clip_fill.filled(winding_number(clip, mx, my));
                let keep = match op {
                    ClipOp::Intersection => inside,
                    ClipOp::Difference => !inside,
                    _ => unreachable!(),
                };
                if keep {
                    if current.last() == Some(&p) {
                        current.push(q);
                    } else {
                        if current.len() >= 2 {
                            out.push(std::mem::take(&mut current));
                        }
                        current = vec![p, q];
                    }
                } else if current.len() >= 2 {
                    out.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
        if current.len() >= 2 {
            out.push(current);
        }
    }
    out
}

pub fn execute(job: &ClipJob) -> ClipSolution {
    let subject = sanitize_closed(job.subject);
    let clip = sanitize_closed(job.clip);

    let mut edges = collect_edges(&subject);
    edges.extend(collect_edges(&clip));

    let mut directed = Vec::new();
    for seg in split_edges(&edges) {
        let (left, right) = side_states(
            seg,
            &subject,
            &clip,
            job.op,
            job.subject_fill,
            job.clip_fill,
        );
        if left == right {
            continue;
        }
        // Keep the result interior on the left of the directed edge.
        if left {
            directed.push(seg);
        } else {
            directed.push((seg.1, seg.0));
        }
    }

    ClipSolution {
        closed: stitch(directed),
        open: clip_open_paths(job.subject_open, &clip, job.op, job.clip_fill),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i64, y: i64, size: i64) -> Vec<Vertex> {
        vec![
            Vertex::new(x, y),
            Vertex::new(x + size, y),
            Vertex::new(x + size, y + size),
            Vertex::new(x, y + size),
        ]
    }

    fn run(op: ClipOp, subject: Vec<Vec<Vertex>>, clip: Vec<Vec<Vertex>>) -> ClipSolution {
        execute(&ClipJob {
            subject: &subject,
            subject_open: &[],
            clip: &clip,
            op,
            subject_fill: FillRule::EvenOdd,
            clip_fill: FillRule::EvenOdd,
        })
    }

    fn contour_set(path: &[Vertex]) -> HashSet<(i64, i64)> {
        path.iter().map(|v| (v.x, v.y)).collect()
    }

    #[test]
    fn intersection_of_overlapping_squares() {
        let sol = run(
            ClipOp::Intersection,
            vec![square(0, 0, 10)],
            vec![square(5, 5, 10)],
        );
        assert_eq!(sol.closed.len(), 1);
        let expect: HashSet<_> = [(5, 5), (10, 5), (10, 10), (5, 10)].into_iter().collect();
        assert_eq!(contour_set(&sol.closed[0]), expect);
        assert!(signed_area2(&sol.closed[0]) > 0);
    }

    #[test]
    fn union_of_overlapping_squares() {
        let sol = run(
            ClipOp::Union,
            vec![square(0, 0, 10)],
            vec![square(5, 5, 10)],
        );
        assert_eq!(sol.closed.len(), 1);
        let expect: HashSet<_> = [
            (0, 0),
            (10, 0),
            (10, 5),
            (15, 5),
            (15, 15),
            (5, 15),
            (5, 10),
            (0, 10),
        ]
        .into_iter()
        .collect();
        assert_eq!(contour_set(&sol.closed[0]), expect);
        assert_eq!(signed_area2(&sol.closed[0]), 2 * 175);
    }

    #[test]
    fn difference_of_concentric_squares_yields_hole() {
        let sol = run(
            ClipOp::Difference,
            vec![square(0, 0, 10)],
            vec![square(3, 3, 4)],
        );
        assert_eq!(sol.closed.len(), 2);
        let mut areas: Vec<i128> = sol.closed.iter().map(|c| signed_area2(c)).collect();
        areas.sort();
        // Hole traced clockwise, outer counter-clockwise.
        assert_eq!(areas, vec![-32, 200]);
    }

    #[test]
    fn xor_of_disjoint_squares_keeps_both() {
        let sol = run(
            ClipOp::Xor,
            vec![square(0, 0, 4)],
            vec![square(10, 10, 4)],
        );
        assert_eq!(sol.closed.len(), 2);
        let total: i128 = sol.closed.iter().map(|c| signed_area2(c)).sum();
        assert_eq!(total, 2 * 32);
    }

    #[test]
    fn shared_edge_union_merges() {
        let sol = run(
            ClipOp::Union,
            vec![square(0, 0, 10)],
            vec![square(10, 0, 10)],
        );
        assert_eq!(sol.closed.len(), 1);
        assert_eq!(signed_area2(&sol.closed[0]), 2 * 200);
    }

    #[test]
    fn self_intersecting_union_splits_bowtie() {
        // Bowtie crossing at (5, 5); even-odd union resolves it into two
        // triangles meeting at the crossing.
        let bowtie = vec![vec![
            Vertex::new(0, 0),
            Vertex::new(10, 10),
            Vertex::new(10, 0),
            Vertex::new(0, 10),
        ]];
        let sol = run(ClipOp::Union, bowtie, vec![]);
        assert_eq!(sol.closed.len(), 2);
        for c in &sol.closed {
            assert!(signed_area2(c) > 0);
        }
    }

    #[test]
    fn open_path_intersection_keeps_inner_portion() {
        let open = vec![vec![Vertex::new(-5, 5), Vertex::new(15, 5)]];
        let sol = execute(&ClipJob {
            subject: &[],
            subject_open: &open,
            clip: &[square(0, 0, 10)],
            op: ClipOp::Intersection,
            subject_fill: FillRule::EvenOdd,
            clip_fill: FillRule::EvenOdd,
        });
        assert!(sol.closed.is_empty());
        assert_eq!(sol.open, vec![vec![Vertex::new(0, 5), Vertex::new(10, 5)]]);
    }

    #[test]
    fn contained_subject_difference_is_empty() {
        let sol = run(
            ClipOp::Difference,
            vec![square(2, 2, 2)],
            vec![square(0, 0, 10)],
        );
        assert!(sol.closed.is_empty());
    }
}
