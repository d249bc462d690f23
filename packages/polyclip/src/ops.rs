//! The application-facing operation surface.
//!
//! [`ClipperLib`] holds the acquired kernel handle and exposes the
//! kernel-backed operations; the pure-geometry utilities live in
//! [`crate::geometry`] and need no handle at all.

use std::sync::Arc;

use polyclip_kernel::NativeModule;

use crate::enums::{ClipType, EndType, JoinType, NativeLibFormat, PolyFillType, RequestedFormat};
use crate::errors::Result;
use crate::geometry::{Path, Paths, PolyTree};
use crate::loader::{load_native_library, LoadOptions};
use crate::marshal;

/// Collapse threshold used when a clean distance is not supplied. Slightly
/// under sqrt(2), so diagonally adjacent integer vertices merge.
pub const DEFAULT_CLEAN_DISTANCE: f64 = 1.1415;

/// One subject path set and whether its paths are closed contours.
pub struct SubjectInput {
    pub data: Paths,
    pub closed: bool,
}

pub struct ClipParams {
    pub clip_type: ClipType,
    pub subject_inputs: Vec<SubjectInput>,
    pub clip_inputs: Vec<Paths>,
    pub subject_fill_type: PolyFillType,
    pub clip_fill_type: PolyFillType,
}

pub struct OffsetInput {
    pub data: Paths,
    pub join_type: JoinType,
    pub end_type: EndType,
}

pub struct OffsetParams {
    /// Positive inflates, negative deflates.
    pub delta: f64,
    pub miter_limit: f64,
    pub arc_tolerance: f64,
    pub offset_inputs: Vec<OffsetInput>,
}

impl OffsetParams {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            miter_limit: 2.0,
            arc_tolerance: 0.25,
            offset_inputs: Vec::new(),
        }
    }
}

/// A ready kernel plus the operations it backs. Cheap to clone the inner
/// handle; safe to share across threads once loaded.
pub struct ClipperLib {
    module: Arc<NativeModule>,
    format: NativeLibFormat,
}

impl ClipperLib {
    /// Acquires a kernel per the requested format policy. Repeated loads
    /// reuse the process-wide cached handle.
    pub fn load(requested: RequestedFormat, options: &LoadOptions) -> Result<Self> {
        let (format, module) = load_native_library(requested, options)?;
        Ok(Self { module, format })
    }

    /// Wraps an already-acquired handle.
    pub fn from_module(format: NativeLibFormat, module: Arc<NativeModule>) -> Self {
        Self { module, format }
    }

    pub fn format(&self) -> NativeLibFormat {
        self.format
    }

    fn split_subjects(params: &ClipParams) -> (Paths, Paths, Paths) {
        let mut closed = Paths::new();
        let mut open = Paths::new();
        for input in &params.subject_inputs {
            if input.closed {
                closed.extend(input.data.iter().cloned());
            } else {
                open.extend(input.data.iter().cloned());
            }
        }
        let clip: Paths = params.clip_inputs.iter().flatten().cloned().collect();
        (closed, open, clip)
    }

    pub fn clip_to_paths(&self, params: &ClipParams) -> Result<Paths> {
        if params.subject_inputs.iter().any(|input| !input.closed) {
            return Err(crate::errors::ClipperError::UsagePrecondition(
                "open subject paths require the PolyTree result form",
            ));
        }
        let (closed, open, clip) = Self::split_subjects(params);
        let words = marshal::call_clip(
            &self.module,
            &closed,
            &open,
            &clip,
            params.clip_type,
            params.subject_fill_type,
            params.clip_fill_type,
            false,
        )?;
        marshal::paths_from_words(&words)
    }

    pub fn clip_to_poly_tree(&self, params: &ClipParams) -> Result<PolyTree> {
        let (closed, open, clip) = Self::split_subjects(params);
        let words = marshal::call_clip(
            &self.module,
            &closed,
            &open,
            &clip,
            params.clip_type,
            params.subject_fill_type,
            params.clip_fill_type,
            true,
        )?;
        marshal::poly_tree_from_words(&words)
    }

    pub fn offset_to_paths(&self, params: &OffsetParams) -> Result<Paths> {
        let words = self.offset_words(params, false)?;
        marshal::paths_from_words(&words)
    }

    pub fn offset_to_poly_tree(&self, params: &OffsetParams) -> Result<PolyTree> {
        let words = self.offset_words(params, true)?;
        marshal::poly_tree_from_words(&words)
    }

    fn offset_words(&self, params: &OffsetParams, as_tree: bool) -> Result<Vec<i64>> {
        let groups: Vec<_> = params
            .offset_inputs
            .iter()
            .map(|input| (input.join_type, input.end_type, &input.data))
            .collect();
        marshal::call_offset(
            &self.module,
            &groups,
            params.delta,
            params.miter_limit,
            params.arc_tolerance,
            as_tree,
        )
    }

    /// Removes near-duplicate and near-collinear vertices within
    /// `distance`; [`DEFAULT_CLEAN_DISTANCE`] suits integer lattices.
    pub fn clean_polygon(&self, path: &Path, distance: f64) -> Result<Path> {
        let cleaned = marshal::call_clean(&self.module, std::slice::from_ref(path), distance)?;
        Ok(cleaned.into_iter().next().unwrap_or_default())
    }

    pub fn clean_polygons(&self, paths: &Paths, distance: f64) -> Result<Paths> {
        marshal::call_clean(&self.module, paths, distance)
    }

    /// Removes self-intersections by unioning the path with itself under
    /// `fill_type`. The result is not guaranteed strictly simple.
    pub fn simplify_polygon(&self, path: &Path, fill_type: PolyFillType) -> Result<Paths> {
        self.simplify_polygons(std::slice::from_ref(path), fill_type)
    }

    pub fn simplify_polygons(&self, paths: &[Path], fill_type: PolyFillType) -> Result<Paths> {
        let words = marshal::call_clip(
            &self.module,
            paths,
            &[],
            &[],
            ClipType::Union,
            fill_type,
            fill_type,
            false,
        )?;
        marshal::paths_from_words(&words)
    }

    pub fn minkowski_sum_path(
        &self,
        pattern: &Path,
        path: &Path,
        path_is_closed: bool,
    ) -> Result<Paths> {
        marshal::call_minkowski(
            &self.module,
            pattern,
            std::slice::from_ref(path),
            true,
            path_is_closed,
        )
    }

    pub fn minkowski_sum_paths(
        &self,
        pattern: &Path,
        paths: &Paths,
        path_is_closed: bool,
    ) -> Result<Paths> {
        marshal::call_minkowski(&self.module, pattern, paths, true, path_is_closed)
    }

    /// Minkowski difference of two polygons. The result contains the
    /// origin exactly when the inputs touch or overlap.
    pub fn minkowski_diff(&self, poly1: &Path, poly2: &Path) -> Result<Paths> {
        marshal::call_minkowski(&self.module, poly1, std::slice::from_ref(poly2), false, true)
    }
}
