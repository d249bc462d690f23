pub mod path;
pub mod point;
pub mod poly_tree;
pub mod rect;

pub use path::{
    area, orientation, point_in_polygon, reverse_path, reverse_paths, scale_path, scale_paths,
    Path, Paths,
};
pub use point::{IntPoint, HI_RANGE};
pub use poly_tree::{
    closed_paths_from_poly_tree, open_paths_from_poly_tree, poly_tree_to_paths, NodeRef, PolyTree,
};
pub use rect::IntRect;
