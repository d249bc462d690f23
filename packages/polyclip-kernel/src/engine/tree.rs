//! Nesting of result contours into a containment tree and its flat stream
//! encoding for the call surface.

use crate::engine::math::{signed_area2, winding_number, Vertex};

pub struct TreeNode {
    pub contour: Vec<Vertex>,
    pub is_open: bool,
    pub children: Vec<TreeNode>,
}

fn contains(outer: &[Vertex], inner: &[Vertex]) -> bool {
    // A vertex of a nested contour never lies strictly outside its container,
    // so probing the first vertex off the shared grid by a hair is enough.
    let v = inner[0];
    let paths = [outer.to_vec()];
    winding_number(&paths, v.x as f64 + 0.5, v.y as f64 + 0.25) != 0
        || winding_number(&paths, v.x as f64 - 0.5, v.y as f64 - 0.25) != 0
}

/// Builds the containment forest over closed contours; open paths become
/// top-level nodes.
pub fn nest(closed: Vec<Vec<Vertex>>, open: Vec<Vec<Vertex>>) -> Vec<TreeNode> {
    let n = closed.len();
    let mut parent: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        let mut best: Option<usize> = None;
        for j in 0..n {
            if i == j || !contains(&closed[j], &closed[i]) {
                continue;
            }
            // The tightest container is the one with the smallest area.
            let better = match best {
                None => true,
                Some(b) => signed_area2(&closed[j]).abs() < signed_area2(&closed[b]).abs(),
            };
            if better {
                best = Some(j);
            }
        }
        parent[i] = best;
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots = Vec::new();
    for i in 0..n {
        match parent[i] {
            Some(p) => children[p].push(i),
            None => roots.push(i),
        }
    }

    fn build(idx: usize, closed: &[Vec<Vertex>], children: &[Vec<usize>]) -> TreeNode {
        TreeNode {
            contour: closed[idx].clone(),
            is_open: false,
            children: children[idx]
                .iter()
                .map(|&c| build(c, closed, children))
                .collect(),
        }
    }

    let mut nodes: Vec<TreeNode> = roots
        .iter()
        .map(|&r| build(r, &closed, &children))
        .collect();
    nodes.extend(open.into_iter().map(|contour| TreeNode {
        contour,
        is_open: true,
        children: Vec::new(),
    }));
    nodes
}

pub const NODE_FLAG_OPEN: i64 = 0b01;
pub const NODE_FLAG_HOLE: i64 = 0b10;

fn encode_node(node: &TreeNode, depth: usize, out: &mut Vec<i64>) {
    let mut flags = 0;
    if node.is_open {
        flags |= NODE_FLAG_OPEN;
    } else if depth % 2 == 1 {
        flags |= NODE_FLAG_HOLE;
    }
    out.push(flags);
    out.push(node.contour.len() as i64);
    for v in &node.contour {
        out.push(v.x);
        out.push(v.y);
    }
    out.push(node.children.len() as i64);
    for child in &node.children {
        encode_node(child, depth + 1, out);
    }
}

/// Stream layout: top-level count, then per node: flags, point count,
/// coordinate pairs, child count, children recursively.
pub fn encode_forest(nodes: &[TreeNode]) -> Vec<i64> {
    let mut out = vec![nodes.len() as i64];
    for node in nodes {
        encode_node(node, 0, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i64, y: i64, size: i64, cw: bool) -> Vec<Vertex> {
        let mut sq = vec![
            Vertex::new(x, y),
            Vertex::new(x + size, y),
            Vertex::new(x + size, y + size),
            Vertex::new(x, y + size),
        ];
        if cw {
            sq.reverse();
        }
        sq
    }

    #[test]
    fn nests_hole_inside_outer() {
        let nodes = nest(vec![square(0, 0, 10, false), square(3, 3, 4, true)], vec![]);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children.len(), 1);
        assert!(nodes[0].children[0].children.is_empty());
    }

    #[test]
    fn siblings_stay_at_top_level() {
        let nodes = nest(vec![square(0, 0, 4, false), square(10, 0, 4, false)], vec![]);
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn island_inside_hole_nests_two_deep() {
        let nodes = nest(
            vec![
                square(0, 0, 20, false),
                square(4, 4, 12, true),
                square(8, 8, 4, false),
            ],
            vec![],
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children.len(), 1);
        assert_eq!(nodes[0].children[0].children.len(), 1);
    }

    #[test]
    fn stream_flags_mark_holes_and_open_paths() {
        let open = vec![vec![Vertex::new(0, 0), Vertex::new(5, 5)]];
        let nodes = nest(vec![square(0, 0, 10, false), square(3, 3, 4, true)], open);
        let words = encode_forest(&nodes);
        assert_eq!(words[0], 2);
        // Outer node: no flags, 4 points.
        assert_eq!(words[1], 0);
        assert_eq!(words[2], 4);
        // Its child starts right after the outer's coordinates + child count.
        let child_at = 3 + 8 + 1;
        assert_eq!(words[child_at], NODE_FLAG_HOLE);
        // Open path node carries the open flag at depth zero.
        let open_at = child_at + 2 + 8 + 1;
        assert_eq!(words[open_at], NODE_FLAG_OPEN);
    }
}
