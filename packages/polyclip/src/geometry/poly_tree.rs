//! Result tree preserving containment and the open/closed distinction.
//!
//! Nodes live in an arena owned by the tree; parent links are indices, so
//! the structure carries no ownership cycles. Index 0 is the root, which
//! has no contour of its own.

use crate::geometry::path::{Path, Paths};

#[derive(Debug)]
struct PolyNodeData {
    contour: Path,
    is_open: bool,
    is_hole: bool,
    parent: usize,
    children: Vec<usize>,
}

#[derive(Debug)]
pub struct PolyTree {
    nodes: Vec<PolyNodeData>,
}

impl PolyTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![PolyNodeData {
                contour: Path::new(),
                is_open: false,
                is_hole: false,
                parent: 0,
                children: Vec::new(),
            }],
        }
    }

    /// Appends a node under `parent` and returns its index. `parent` must
    /// already be in the tree; the root is index 0.
    pub fn add_node(&mut self, parent: usize, contour: Path, is_open: bool, is_hole: bool) -> usize {
        debug_assert!(parent < self.nodes.len());
        let index = self.nodes.len();
        self.nodes.push(PolyNodeData {
            contour,
            is_open,
            is_hole,
            parent,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        index
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            index: 0,
        }
    }

    /// Contour-bearing nodes, excluding the root.
    pub fn total(&self) -> usize {
        self.nodes.len() - 1
    }

    fn walk(&self, mut keep: impl FnMut(&PolyNodeData) -> bool) -> Paths {
        self.nodes
            .iter()
            .skip(1)
            .filter(|n| keep(n))
            .map(|n| n.contour.clone())
            .collect()
    }
}

impl Default for PolyTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t PolyTree,
    index: usize,
}

impl<'t> NodeRef<'t> {
    pub fn contour(&self) -> &'t [crate::geometry::point::IntPoint] {
        &self.tree.nodes[self.index].contour
    }

    pub fn is_open(&self) -> bool {
        self.tree.nodes[self.index].is_open
    }

    pub fn is_hole(&self) -> bool {
        self.tree.nodes[self.index].is_hole
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        if self.index == 0 {
            None
        } else {
            Some(NodeRef {
                tree: self.tree,
                index: self.tree.nodes[self.index].parent,
            })
        }
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'t>> + '_ {
        self.tree.nodes[self.index]
            .children
            .iter()
            .map(|&index| NodeRef {
                tree: self.tree,
                index,
            })
    }
}

/// Every contour in the tree, open and closed alike, in arena order.
pub fn poly_tree_to_paths(tree: &PolyTree) -> Paths {
    tree.walk(|_| true)
}

pub fn open_paths_from_poly_tree(tree: &PolyTree) -> Paths {
    tree.walk(|n| n.is_open)
}

pub fn closed_paths_from_poly_tree(tree: &PolyTree) -> Paths {
    tree.walk(|n| !n.is_open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::IntPoint;

    fn sample_tree() -> PolyTree {
        let mut tree = PolyTree::new();
        let outer = tree.add_node(0, vec![IntPoint::new(0, 0), IntPoint::new(20, 0)], false, false);
        tree.add_node(outer, vec![IntPoint::new(5, 5)], false, true);
        tree.add_node(0, vec![IntPoint::new(30, 30), IntPoint::new(40, 30)], true, false);
        tree
    }

    #[test]
    fn parent_links_mirror_children() {
        let tree = sample_tree();
        let root = tree.root();
        assert!(root.parent().is_none());
        let outer = root.children().next().unwrap();
        let hole = outer.children().next().unwrap();
        assert!(hole.is_hole());
        assert_eq!(hole.parent().unwrap().contour(), outer.contour());
    }

    #[test]
    fn flatteners_partition_the_tree() {
        let tree = sample_tree();
        let all = poly_tree_to_paths(&tree);
        let open = open_paths_from_poly_tree(&tree);
        let closed = closed_paths_from_poly_tree(&tree);
        assert_eq!(all.len(), tree.total());
        assert_eq!(open.len() + closed.len(), all.len());
        assert_eq!(open.len(), 1);
        assert!(open[0].starts_with(&[IntPoint::new(30, 30)]));
    }
}
