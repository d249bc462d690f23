//! Minkowski sum and difference via translated-pattern quad strips merged
//! under a non-zero union.

use crate::engine::boolean::{self, ClipJob, ClipOp};
use crate::engine::math::{signed_area2, FillRule, Vertex};

fn quad_strip(pattern: &[Vertex], path: &[Vertex], is_sum: bool, path_closed: bool) -> Vec<Vec<Vertex>> {
    let translate = |p: Vertex, by: Vertex| {
        if is_sum {
            Vertex::new(by.x + p.x, by.y + p.y)
        } else {
            Vertex::new(by.x - p.x, by.y - p.y)
        }
    };

    let shifted: Vec<Vec<Vertex>> = path
        .iter()
        .map(|&by| pattern.iter().map(|&p| translate(p, by)).collect())
        .collect();

    let plen = pattern.len();
    let segs = if path_closed {
        path.len()
    } else {
        path.len().saturating_sub(1)
    };

    let mut quads = Vec::with_capacity(segs * plen);
    for i in 0..segs {
        let a = &shifted[i];
        let b = &shifted[(i + 1) % shifted.len()];
        for j in 0..plen {
            let j2 = (j + 1) % plen;
            let mut quad = vec![a[j], b[j], b[j2], a[j2]];
            if signed_area2(&quad) < 0 {
                quad.reverse();
            }
            quads.push(quad);
        }
    }
    quads
}

fn merge(quads: Vec<Vec<Vertex>>) -> Vec<Vec<Vertex>> {
    let sol = boolean::execute(&ClipJob {
        subject: &quads,
        subject_open: &[],
        clip: &[],
        op: ClipOp::Union,
        subject_fill: FillRule::NonZero,
        clip_fill: FillRule::NonZero,
    });
    sol.closed
}

pub fn sum(pattern: &[Vertex], paths: &[Vec<Vertex>], path_closed: bool) -> Vec<Vec<Vertex>> {
    if pattern.len() < 3 {
        return Vec::new();
    }
    let mut quads = Vec::new();
    for path in paths {
        if path.len() < 2 {
            continue;
        }
        quads.extend(quad_strip(pattern, path, true, path_closed));
    }
    merge(quads)
}

/// The difference contains the origin exactly when the two polygons overlap.
pub fn diff(poly1: &[Vertex], poly2: &[Vertex]) -> Vec<Vec<Vertex>> {
    if poly1.len() < 3 || poly2.len() < 2 {
        return Vec::new();
    }
    merge(quad_strip(poly1, poly2, false, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::math::winding_number;

    fn pattern() -> Vec<Vertex> {
        vec![
            Vertex::new(-1, -1),
            Vertex::new(1, -1),
            Vertex::new(1, 1),
            Vertex::new(-1, 1),
        ]
    }

    #[test]
    fn sum_sweeps_a_segment_into_a_band() {
        let path = vec![vec![Vertex::new(0, 0), Vertex::new(10, 0)]];
        let out = sum(&pattern(), &path, false);
        assert_eq!(out.len(), 1);
        // 12 x 2 band around the swept segment.
        assert_eq!(signed_area2(&out[0]), 48);
        assert_eq!(winding_number(&out, 5.0, 0.0), 1);
        assert_eq!(winding_number(&out, 12.5, 0.0), 0);
    }

    #[test]
    fn diff_of_overlapping_squares_contains_origin() {
        let a = vec![
            Vertex::new(0, 0),
            Vertex::new(10, 0),
            Vertex::new(10, 10),
            Vertex::new(0, 10),
        ];
        let b: Vec<Vertex> = a.iter().map(|v| Vertex::new(v.x + 5, v.y + 5)).collect();
        let out = diff(&a, &b);
        assert!(!out.is_empty());
        let w = winding_number(&out, 0.0, 0.0);
        assert_ne!(w, 0);
    }

    #[test]
    fn diff_of_disjoint_squares_misses_origin() {
        let a = vec![
            Vertex::new(0, 0),
            Vertex::new(4, 0),
            Vertex::new(4, 4),
            Vertex::new(0, 4),
        ];
        let b: Vec<Vertex> = a.iter().map(|v| Vertex::new(v.x + 20, v.y)).collect();
        let out = diff(&a, &b);
        assert!(!out.is_empty());
        assert_eq!(winding_number(&out, 0.0, 0.0), 0);
    }
}
