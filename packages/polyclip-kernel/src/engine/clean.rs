//! Vertex simplification: collapses near-duplicate neighbours and vertices
//! sitting within a distance threshold of the line through their neighbours.

use crate::engine::math::{cycle_index, Vertex};

fn dist2(a: Vertex, b: Vertex) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy
}

/// Squared distance from `p` to the infinite line through `a` and `b`.
fn line_dist2(p: Vertex, a: Vertex, b: Vertex) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return dist2(p, a);
    }
    let cross = dx * (p.y - a.y) as f64 - dy * (p.x - a.x) as f64;
    cross * cross / len2
}

/// Removes vertices of a closed path that are within `distance` of their
/// predecessor or near-collinear with their neighbours. Returns an empty
/// path when fewer than three vertices survive.
pub fn clean_path(path: &[Vertex], distance: f64) -> Vec<Vertex> {
    let d2 = distance * distance;
    let mut pts: Vec<Vertex> = path.to_vec();
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }

    loop {
        if pts.len() < 3 {
            return Vec::new();
        }
        let n = pts.len();
        let mut removed = None;
        for i in 0..n {
            let prev = pts[cycle_index(i, n, -1)];
            let cur = pts[i];
            let next = pts[cycle_index(i, n, 1)];
            if dist2(cur, prev) <= d2 || line_dist2(cur, prev, next) <= d2 {
                removed = Some(i);
                break;
            }
        }
        match removed {
            Some(i) => {
                pts.remove(i);
            }
            None => break,
        }
    }
    pts
}

pub fn clean_paths(paths: &[Vec<Vertex>], distance: f64) -> Vec<Vec<Vertex>> {
    paths
        .iter()
        .map(|p| clean_path(p, distance))
        .filter(|p| !p.is_empty())
        .collect()
}
