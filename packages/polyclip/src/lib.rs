//! Polygon clipping and offsetting over a precompiled geometry kernel.
//!
//! The kernel ships as two interchangeable binary formats. [`ClipperLib::load`]
//! picks one per the requested policy, memoizes it process-wide, and the
//! returned handle backs every boolean, offset, clean, simplify, and
//! Minkowski operation. Pure-geometry utilities (area, orientation,
//! point-in-polygon, reversal, scaling, tree flattening) never touch the
//! kernel and are free functions.
//!
//! ```no_run
//! use polyclip::{
//!     ClipParams, ClipType, ClipperLib, IntPoint, LoadOptions, PolyFillType, RequestedFormat,
//!     SubjectInput,
//! };
//!
//! # fn main() -> polyclip::Result<()> {
//! let lib = ClipperLib::load(RequestedFormat::WasmWithAsmJsFallback, &LoadOptions::default())?;
//! let square = |x: i64, y: i64| {
//!     vec![
//!         IntPoint::new(x, y),
//!         IntPoint::new(x + 10, y),
//!         IntPoint::new(x + 10, y + 10),
//!         IntPoint::new(x, y + 10),
//!     ]
//! };
//! let solution = lib.clip_to_paths(&ClipParams {
//!     clip_type: ClipType::Intersection,
//!     subject_inputs: vec![SubjectInput { data: vec![square(0, 0)], closed: true }],
//!     clip_inputs: vec![vec![square(5, 5)]],
//!     subject_fill_type: PolyFillType::EvenOdd,
//!     clip_fill_type: PolyFillType::EvenOdd,
//! })?;
//! assert_eq!(solution.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod enums;
pub mod errors;
pub mod geometry;
pub mod loader;
mod marshal;
pub mod ops;

pub use enums::{
    ClipType, EndType, JoinType, NativeLibFormat, PointInPolygonResult, PolyFillType,
    RequestedFormat,
};
pub use errors::{ClipperError, Result};
pub use geometry::{
    area, closed_paths_from_poly_tree, open_paths_from_poly_tree, orientation, point_in_polygon,
    poly_tree_to_paths, reverse_path, reverse_paths, scale_path, scale_paths, IntPoint, IntRect,
    NodeRef, Path, Paths, PolyTree, HI_RANGE,
};
pub use loader::{load_native_library, KernelFactory, KernelRegistry, LoadOptions, ModuleFactory};
pub use ops::{
    ClipParams, ClipperLib, OffsetInput, OffsetParams, SubjectInput, DEFAULT_CLEAN_DISTANCE,
};
