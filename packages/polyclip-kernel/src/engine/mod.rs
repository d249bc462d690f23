//! Geometry engine: exact integer predicates and the clipping, offsetting,
//! cleaning and Minkowski algorithms they drive.

pub mod boolean;
pub mod clean;
pub mod math;
pub mod minkowski;
pub mod offset;
pub mod tree;
